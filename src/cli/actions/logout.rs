use super::announce;
use crate::{cli::globals::GlobalArgs, notify::Notification};
use anyhow::Result;

/// End the session. Local state is always cleared.
/// # Errors
/// Returns an error only if the session cannot be wired.
pub async fn execute(globals: &GlobalArgs) -> Result<()> {
    let session = globals.build_session()?;
    session.logout().await;
    session.shutdown();

    announce(Notification::info(
        "Signed out",
        "The stored session token was removed.",
    ));
    Ok(())
}
