// ABOUTME: Strongly typed host choices shared by detection, preferences, and compose.
// ABOUTME: Each field is an explicit enum rather than a free-form string key.

mod choice;

pub use choice::{Audio, Display, Gpu, ParseChoiceError, Runtime};
