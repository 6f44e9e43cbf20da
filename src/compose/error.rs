// ABOUTME: Errors raised while turning a configuration into a compose command.
// ABOUTME: Missing fragment files are collected and reported together.

use super::FragmentId;
use nonempty::NonEmpty;
use std::fmt;
use std::path::PathBuf;

/// A fragment whose backing file is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFragmentFile {
    pub fragment: FragmentId,
    pub expected_path: PathBuf,
}

impl fmt::Display for MissingFragmentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.fragment, self.expected_path.display())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// A mandatory field resolved to a value no fragment exists for.
    #[error("configuration error: {field} is '{value}' but a {field} is required")]
    Config {
        field: &'static str,
        value: &'static str,
    },

    #[error("missing compose fragment file(s): {}", join_missing(.0))]
    MissingFragments(NonEmpty<MissingFragmentFile>),

    /// The child receives UTF-8 arguments, so a lossy path would name another file.
    #[error("compose fragment path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

fn join_missing(missing: &NonEmpty<MissingFragmentFile>) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
