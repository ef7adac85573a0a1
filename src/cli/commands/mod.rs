pub mod output;
pub mod session;

use crate::auth::{AccessLevel, Action, Module};
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        PossibleValuesParser,
    },
    Arg, ColorChoice, Command,
};

fn level_names() -> Vec<&'static str> {
    AccessLevel::ALL.iter().map(|level| level.as_str()).collect()
}

fn subcommands() -> Vec<Command> {
    vec![
        Command::new("login")
            .about("Sign in and store the session token")
            .arg(
                Arg::new("email")
                    .short('e')
                    .long("email")
                    .help("Administrator email")
                    .env("SAMCAST_EMAIL")
                    .required(true),
            )
            .arg(
                Arg::new("password")
                    .long("password")
                    .help("Password (read from stdin when not set)")
                    .env("SAMCAST_PASSWORD")
                    .hide_env_values(true),
            ),
        Command::new("logout").about("End the session and remove the stored token"),
        Command::new("status").about("Resolve the stored session and print who is signed in"),
        Command::new("health").about("Check whether the back office is reachable"),
        Command::new("can")
            .about("Check whether the signed-in administrator may perform an action")
            .arg(
                Arg::new("module")
                    .help(format!(
                        "Module: {}",
                        Module::ALL.map(Module::as_str).join(", ")
                    ))
                    .required(true),
            )
            .arg(
                Arg::new("action")
                    .help(format!(
                        "Action: {}",
                        Action::ALL.map(Action::as_str).join(", ")
                    ))
                    .required(true),
            ),
        Command::new("defaults")
            .about("Print the default permissions of each access level")
            .arg(
                Arg::new("level")
                    .short('l')
                    .long("level")
                    .help("Only print this access level")
                    .value_parser(PossibleValuesParser::new(level_names())),
            ),
        Command::new("watch")
            .about("Follow session changes through the route guard until interrupted")
            .arg(
                Arg::new("location")
                    .long("location")
                    .help("Location evaluated by the route guard")
                    .default_value("/dashboard"),
            )
            .arg(
                Arg::new("revalidate-every")
                    .long("revalidate-every")
                    .help("Re-validate the session token every N seconds")
                    .env("SAMCAST_REVALIDATE_EVERY")
                    .value_parser(clap::value_parser!(u64).range(1..)),
            ),
    ]
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("samcast-admin")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommands(subcommands());

    let command = session::with_args(command);
    output::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{
        commands::{output::*, session::*},
        telemetry::LogFormat,
    };

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "samcast-admin");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_login_args() {
        temp_env::with_vars(
            [
                ("SAMCAST_PASSWORD", None::<&str>),
                ("SAMCAST_EMAIL", None::<&str>),
            ],
            || {
                let matches = new().get_matches_from(vec![
                    "samcast-admin",
                    "--api-url",
                    "https://painel.samcast.com.br/api",
                    "login",
                    "--email",
                    "admin@samcast.com.br",
                ]);

                assert_eq!(
                    matches.get_one::<String>(ARG_API_URL).cloned(),
                    Some("https://painel.samcast.com.br/api".to_string())
                );
                let login = matches.subcommand_matches("login");
                assert_eq!(
                    login.and_then(|m| m.get_one::<String>("email").cloned()),
                    Some("admin@samcast.com.br".to_string())
                );
                assert!(login.is_some_and(|m| m.get_one::<String>("password").is_none()));
            },
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("SAMCAST_API_URL", Some("http://localhost:3001/api")),
                ("SAMCAST_TOKEN_FILE", Some("/tmp/samcast-token")),
                ("SAMCAST_POLL_INTERVAL", Some("15")),
                ("SAMCAST_TIMEOUT", Some("3")),
                ("SAMCAST_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["samcast-admin", "status"]);
                assert_eq!(
                    matches.get_one::<String>(ARG_API_URL).cloned(),
                    Some("http://localhost:3001/api".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_TOKEN_FILE).cloned(),
                    Some("/tmp/samcast-token".to_string())
                );
                assert_eq!(matches.get_one::<u64>(ARG_POLL_INTERVAL).copied(), Some(15));
                assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT).copied(), Some(3));
                assert_eq!(matches.get_one::<u8>(ARG_VERBOSITY).copied(), Some(2));
            },
        );
    }

    #[test]
    fn test_defaults_when_env_missing() {
        temp_env::with_vars(
            [
                ("SAMCAST_POLL_INTERVAL", None::<&str>),
                ("SAMCAST_TIMEOUT", None::<&str>),
                ("SAMCAST_API_URL", None::<&str>),
            ],
            || {
                let matches = new().get_matches_from(vec!["samcast-admin", "defaults"]);
                assert_eq!(matches.get_one::<u64>(ARG_POLL_INTERVAL).copied(), Some(60));
                assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT).copied(), Some(10));
                assert!(matches.get_one::<String>(ARG_API_URL).is_none());
            },
        );
    }

    #[test]
    fn test_defaults_level_is_restricted() {
        let result =
            new().try_get_matches_from(vec!["samcast-admin", "defaults", "--level", "root"]);
        assert!(result.is_err());

        let matches = new()
            .try_get_matches_from(vec!["samcast-admin", "defaults", "--level", "suporte"])
            .ok();
        assert_eq!(
            matches
                .as_ref()
                .and_then(|m| m.subcommand_matches("defaults"))
                .and_then(|m| m.get_one::<String>("level").cloned()),
            Some("suporte".to_string())
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("SAMCAST_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["samcast-admin", "health"]);
                assert_eq!(
                    matches.get_one::<u8>(ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars([("SAMCAST_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["samcast-admin".to_string(), "status".to_string()];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_log_level_env_out_of_range() {
        temp_env::with_vars([("SAMCAST_LOG_LEVEL", Some("5"))], || {
            assert!(new()
                .try_get_matches_from(vec!["samcast-admin", "status"])
                .is_err());
        });
    }

    #[test]
    fn test_check_log_format() {
        temp_env::with_vars([("SAMCAST_LOG_FORMAT", None::<&str>)], || {
            let matches = new().get_matches_from(vec!["samcast-admin", "status"]);
            assert_eq!(format_from(&matches), LogFormat::Text);

            let matches =
                new().get_matches_from(vec!["samcast-admin", "--log-format", "json", "status"]);
            assert_eq!(format_from(&matches), LogFormat::Json);
        });

        temp_env::with_vars([("SAMCAST_LOG_FORMAT", Some("JSON"))], || {
            let matches = new().get_matches_from(vec!["samcast-admin", "health"]);
            assert_eq!(format_from(&matches), LogFormat::Json);
        });

        temp_env::with_vars([("SAMCAST_LOG_FORMAT", Some("xml"))], || {
            assert!(new()
                .try_get_matches_from(vec!["samcast-admin", "health"])
                .is_err());
        });
    }

    #[test]
    fn test_subcommand_required() {
        assert!(new().try_get_matches_from(vec!["samcast-admin"]).is_err());
    }
}
