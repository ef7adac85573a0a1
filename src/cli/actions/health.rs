use super::announce;
use crate::{cli::globals::GlobalArgs, notify::Notification};
use anyhow::{anyhow, Result};

/// Probe the back office on request.
/// # Errors
/// Returns an error if the back office is unreachable.
pub async fn execute(globals: &GlobalArgs) -> Result<()> {
    let session = globals.build_session()?;
    let healthy = session.check_service_health().await;
    session.shutdown();

    if healthy {
        announce(Notification::success(
            "Connection restored",
            "The server is available again.",
        ));
        Ok(())
    } else {
        announce(Notification::error(
            "Service unavailable",
            "The server is still not responding.",
        ));
        Err(anyhow!("back office unreachable at {}", globals.api_url))
    }
}
