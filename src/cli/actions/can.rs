use crate::{
    auth::{Action, Module},
    cli::globals::GlobalArgs,
};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub module: String,
    pub action: String,
}

/// Print the authorization decision for `module`/`action`.
/// # Errors
/// Returns an error only if the session cannot be wired.
pub async fn execute(args: Args) -> Result<()> {
    if let Err(err) = args.module.parse::<Module>() {
        eprintln!("warning: {err}");
    }
    if let Err(err) = args.action.parse::<Action>() {
        eprintln!("warning: {err}");
    }

    let session = args.globals.build_session()?;
    let phase = session.initialize().await;
    let allowed = session.authorize_named(&args.module, &args.action);
    session.shutdown();

    println!(
        "{} {}: {} ({phase})",
        args.module,
        args.action,
        if allowed { "allowed" } else { "denied" }
    );

    Ok(())
}
