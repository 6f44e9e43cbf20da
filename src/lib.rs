// ABOUTME: Library root for craftpod - host detection, config resolution, compose, lifecycle.
// ABOUTME: The terminal interface binary is in main.rs.

pub mod compose;
pub mod config;
pub mod detect;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod output;
pub mod types;
pub mod validate;
