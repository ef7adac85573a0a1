//! How much the CLI logs and in which shape. Logs always go to stderr.

use crate::cli::telemetry::LogFormat;
use clap::{builder::ValueParser, Arg, ArgAction, ArgMatches, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";
pub const ARG_LOG_FORMAT: &str = "log-format";

/// Level names in verbosity order. `error` is the quiet default, so a bare
/// `-v` already shows warnings.
const LEVELS: [(&str, Level); 5] = [
    ("error", Level::ERROR),
    ("warn", Level::WARN),
    ("info", Level::INFO),
    ("debug", Level::DEBUG),
    ("trace", Level::TRACE),
];

/// Accepts a level name or its position in [`LEVELS`].
fn parse_verbosity(value: &str) -> Result<u8, String> {
    let value = value.trim();
    let index = match value.parse::<usize>() {
        Ok(index) => Some(index).filter(|index| *index < LEVELS.len()),
        Err(_) => LEVELS
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(value)),
    };

    index.and_then(|index| u8::try_from(index).ok()).ok_or_else(|| {
        format!(
            "expected 0-{} or one of: {}",
            LEVELS.len() - 1,
            LEVELS.map(|(name, _)| name).join(", ")
        )
    })
}

/// Tracing level for a verbosity count; extra `-v`s stay at `trace`.
#[must_use]
pub fn tracing_level(verbosity: u8) -> Level {
    LEVELS
        .get(usize::from(verbosity))
        .map_or(Level::TRACE, |(_, level)| *level)
}

/// Verbosity from the parsed arguments, `error` when absent.
#[must_use]
pub fn level_from(matches: &ArgMatches) -> Level {
    tracing_level(matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0))
}

#[must_use]
pub fn format_from(matches: &ArgMatches) -> LogFormat {
    match matches.get_one::<String>(ARG_LOG_FORMAT).map(String::as_str) {
        Some("json") => LogFormat::Json,
        _ => LogFormat::Text,
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Log more: -v warn, -vv info, -vvv debug, -vvvv trace (default: error)")
                .env("SAMCAST_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(ValueParser::from(parse_verbosity)),
        )
        .arg(
            Arg::new(ARG_LOG_FORMAT)
                .long(ARG_LOG_FORMAT)
                .help("Log line format on stderr")
                .env("SAMCAST_LOG_FORMAT")
                .default_value("text")
                .ignore_case(true)
                .value_parser(["text", "json"])
                .global(true),
        )
}
