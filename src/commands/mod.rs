// ABOUTME: Command module aggregator for the craftpod CLI.
// ABOUTME: Re-exports start, stop, restart, logs, status, doctor, and config handlers.

mod config;
mod context;
mod doctor;
mod start;
mod status;
mod stop;

pub use config::config;
pub use doctor::doctor;
pub use start::start;
pub use status::{logs, status};
pub use stop::{restart, stop};
