use clap::{Arg, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_TOKEN_FILE: &str = "token-file";
pub const ARG_POLL_INTERVAL: &str = "poll-interval";
pub const ARG_TIMEOUT: &str = "timeout";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .short('u')
                .long(ARG_API_URL)
                .help("Back office API base URL, example: https://painel.samcast.com.br/api")
                .env("SAMCAST_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_FILE)
                .long(ARG_TOKEN_FILE)
                .help("File holding the session token (default: <local data dir>/samcast-admin/admin_token)")
                .env("SAMCAST_TOKEN_FILE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_POLL_INTERVAL)
                .long(ARG_POLL_INTERVAL)
                .help("Seconds between liveness probes while signed in")
                .env("SAMCAST_POLL_INTERVAL")
                .default_value("60")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Request timeout in seconds")
                .env("SAMCAST_TIMEOUT")
                .default_value("10")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
