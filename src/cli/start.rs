use crate::cli::{
    actions::Action,
    commands::{self, output},
    dispatch, telemetry,
};
use anyhow::Result;

/// Parse arguments, initialize logging and build the action to run.
///
/// # Errors
///
/// Returns an error if logging initialization or action dispatch fails
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    telemetry::init(output::level_from(&matches), output::format_from(&matches))?;

    dispatch::handler(&matches)
}
