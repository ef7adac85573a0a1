use crate::cli::actions::{can, defaults, health, login, logout, status, watch, Action};
use anyhow::Result;

/// Execute the provided action.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => login::execute(args).await,
        Action::Logout(globals) => logout::execute(&globals).await,
        Action::Status(globals) => status::execute(&globals).await,
        Action::Health(globals) => health::execute(&globals).await,
        Action::Can(args) => can::execute(args).await,
        Action::Defaults(args) => defaults::execute(&args),
        Action::Watch(args) => watch::execute(args).await,
    }
}
