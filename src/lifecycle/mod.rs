// ABOUTME: Container lifecycle control: start, stop, restart, logs, and status.
// ABOUTME: Runs prebuilt compose command lines without a shell and streams their output.

mod error;
mod output;
mod runner;
mod xhost;

pub use error::{LifecycleError, LifecycleErrorKind};
pub use output::{LifecycleEvent, LogStream, OutputLine, RunningState, STARTED_MARKERS};
pub use runner::{BackgroundStart, ContainerStatus, DEFAULT_CONTAINER, LifecycleRunner};
pub use xhost::grant_x_access;
