// ABOUTME: Locates the directory holding the compose fragment files.
// ABOUTME: Checks explicit settings, then install-relative paths, then the working directory.

use super::FragmentId;
use std::path::{Path, PathBuf};

/// Environment variable naming the compose fragment directory.
pub const COMPOSE_DIR_ENV: &str = "CRAFTPOD_COMPOSE_DIR";

/// Pick the compose fragment directory.
///
/// An explicit directory or `CRAFTPOD_COMPOSE_DIR` is used as-is. Otherwise the first of
/// the executable's directory, `<exe dir>/../share/craftpod`, and the working directory
/// that contains the base fragment wins; with no match the working directory is used so
/// validation can report the missing files.
pub fn discover_compose_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Some(dir) = std::env::var_os(COMPOSE_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut candidates = Vec::new();
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join("..").join("share").join("craftpod"));
        candidates.insert(0, exe_dir);
    }
    candidates.push(cwd.clone());

    first_with_base(&candidates).unwrap_or(cwd)
}

/// First candidate directory containing the base fragment.
pub fn first_with_base(candidates: &[PathBuf]) -> Option<PathBuf> {
    let base = FragmentId::BASE.file_name();
    candidates
        .iter()
        .find(|dir| dir.join(&base).is_file())
        .cloned()
}
