use crate::{
    auth::AccessLevel,
    cli::{
        actions::{can, defaults, login, watch, Action},
        commands::session::{ARG_API_URL, ARG_POLL_INTERVAL, ARG_TIMEOUT, ARG_TOKEN_FILE},
        globals::GlobalArgs,
    },
};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let api_url = matches
        .get_one::<String>(ARG_API_URL)
        .cloned()
        .context("missing required argument: --api-url (or SAMCAST_API_URL)")?;

    let mut globals = GlobalArgs::new(api_url);

    if let Some(token_file) = matches.get_one::<String>(ARG_TOKEN_FILE) {
        globals.token_file = PathBuf::from(token_file);
    }
    if let Some(seconds) = matches.get_one::<u64>(ARG_POLL_INTERVAL) {
        globals.poll_interval = Duration::from_secs(*seconds);
    }
    if let Some(seconds) = matches.get_one::<u64>(ARG_TIMEOUT) {
        globals.timeout = Duration::from_secs(*seconds);
    }

    Ok(globals)
}

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    // global args are propagated into the subcommand matches
    let Some((name, sub_m)) = matches.subcommand() else {
        return Err(anyhow!("missing subcommand"));
    };

    let action = match name {
        "login" => Action::Login(login::Args {
            globals: globals(sub_m)?,
            email: sub_m
                .get_one::<String>("email")
                .cloned()
                .context("missing required argument: --email")?,
            password: sub_m
                .get_one::<String>("password")
                .map(|password| SecretString::from(password.clone())),
        }),
        "logout" => Action::Logout(globals(sub_m)?),
        "status" => Action::Status(globals(sub_m)?),
        "health" => Action::Health(globals(sub_m)?),
        "can" => Action::Can(can::Args {
            globals: globals(sub_m)?,
            module: sub_m
                .get_one::<String>("module")
                .cloned()
                .context("missing required argument: <module>")?,
            action: sub_m
                .get_one::<String>("action")
                .cloned()
                .context("missing required argument: <action>")?,
        }),
        "defaults" => Action::Defaults(defaults::Args {
            level: sub_m
                .get_one::<String>("level")
                .map(|level| level.parse::<AccessLevel>())
                .transpose()
                .map_err(|e| anyhow!(e))?,
        }),
        "watch" => Action::Watch(watch::Args {
            globals: globals(sub_m)?,
            location: sub_m
                .get_one::<String>("location")
                .cloned()
                .unwrap_or_else(|| "/dashboard".to_string()),
            revalidate_every: sub_m
                .get_one::<u64>("revalidate-every")
                .map(|seconds| Duration::from_secs(*seconds)),
        }),
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    fn action_from(args: &[&str]) -> Result<Action> {
        let matches = commands::new().try_get_matches_from(args)?;
        handler(&matches)
    }

    #[test]
    fn test_login_action() {
        temp_env::with_vars(
            [
                ("SAMCAST_API_URL", None::<&str>),
                ("SAMCAST_PASSWORD", Some("s3cret")),
                ("SAMCAST_TOKEN_FILE", None::<&str>),
            ],
            || {
                let action = action_from(&[
                    "samcast-admin",
                    "login",
                    "--api-url",
                    "http://localhost:3001/api",
                    "--email",
                    "admin@samcast.com.br",
                ]);

                match action {
                    Ok(Action::Login(args)) => {
                        assert_eq!(args.globals.api_url, "http://localhost:3001/api");
                        assert_eq!(args.email, "admin@samcast.com.br");
                        assert!(args.password.is_some());
                    }
                    other => panic!("unexpected action: {other:?}"),
                }
            },
        );
    }

    #[test]
    fn test_missing_api_url() {
        temp_env::with_vars([("SAMCAST_API_URL", None::<&str>)], || {
            let action = action_from(&["samcast-admin", "status"]);
            assert!(action.is_err());
        });
    }

    #[test]
    fn test_defaults_needs_no_api_url() {
        temp_env::with_vars([("SAMCAST_API_URL", None::<&str>)], || {
            match action_from(&["samcast-admin", "defaults", "--level", "admin"]) {
                Ok(Action::Defaults(args)) => assert_eq!(args.level, Some(AccessLevel::Admin)),
                other => panic!("unexpected action: {other:?}"),
            }
        });
    }

    #[test]
    fn test_watch_action() {
        temp_env::with_vars(
            [
                ("SAMCAST_API_URL", Some("http://localhost:3001/api")),
                ("SAMCAST_POLL_INTERVAL", Some("30")),
                ("SAMCAST_REVALIDATE_EVERY", None::<&str>),
            ],
            || match action_from(&[
                "samcast-admin",
                "watch",
                "--location",
                "/revendas",
                "--revalidate-every",
                "120",
            ]) {
                Ok(Action::Watch(args)) => {
                    assert_eq!(args.location, "/revendas");
                    assert_eq!(args.revalidate_every, Some(Duration::from_secs(120)));
                    assert_eq!(args.globals.poll_interval, Duration::from_secs(30));
                }
                other => panic!("unexpected action: {other:?}"),
            },
        );
    }

    #[test]
    fn test_token_file_override() {
        temp_env::with_vars([("SAMCAST_TOKEN_FILE", Some("/tmp/samcast/token"))], || {
            match action_from(&[
                "samcast-admin",
                "--api-url",
                "http://localhost:3001",
                "logout",
            ]) {
                Ok(Action::Logout(globals)) => {
                    assert_eq!(globals.token_file, PathBuf::from("/tmp/samcast/token"));
                }
                other => panic!("unexpected action: {other:?}"),
            }
        });
    }
}
