// ABOUTME: Grants the local user access to the X server before an X11 start.
// ABOUTME: Failure is reported to the caller but never aborts startup.

use super::runner::capture;
use crate::compose::CommandLine;
use std::time::Duration;

const XHOST_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `xhost +SI:localuser:<user>`. Returns whether access was granted.
pub async fn grant_x_access(user: &str) -> bool {
    if user.is_empty() {
        return false;
    }

    let command = CommandLine::new("xhost", [format!("+SI:localuser:{user}")]);
    match capture(&command, XHOST_TIMEOUT).await {
        Ok(output) => output.status.success(),
        Err(e) => {
            tracing::debug!("xhost failed: {e}");
            false
        }
    }
}
