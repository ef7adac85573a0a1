use crate::{auth::SessionPhase, cli::globals::GlobalArgs};
use anyhow::Result;

/// Resolve the stored session and print it.
/// # Errors
/// Returns an error only if the session cannot be wired.
pub async fn execute(globals: &GlobalArgs) -> Result<()> {
    let session = globals.build_session()?;
    let phase = session.initialize().await;
    let state = session.snapshot();
    session.shutdown();

    println!("phase: {phase}");

    match phase {
        SessionPhase::ServiceDown => {
            println!("The server is not available at {}", globals.api_url);
        }
        _ => {
            if let Some(identity) = &state.identity {
                println!("admin: {} <{}>", identity.display_name, identity.email);
                println!("access level: {}", identity.access_level);
                match &state.profile {
                    Some(profile) => println!("profile: {} ({})", profile.name, profile.id),
                    None => println!("profile: role defaults"),
                }
            }
        }
    }

    Ok(())
}
