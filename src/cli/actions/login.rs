use crate::{cli::globals::GlobalArgs, errors::SessionError};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: Option<SecretString>,
}

async fn read_password() -> Result<SecretString> {
    eprint!("Password: ");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read password from stdin")?;

    Ok(SecretString::from(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Sign in and persist the session token.
/// # Errors
/// Returns an error if the back office is unavailable or rejects the credentials.
pub async fn execute(args: Args) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => read_password().await?,
    };

    let session = args.globals.build_session()?;
    session.initialize().await;
    let result = session.login(&args.email, &password).await;
    session.shutdown();

    match result {
        Ok(identity) => {
            debug!(token_file = %args.globals.token_file.display(), "session token stored");
            println!(
                "Signed in as {} <{}> ({})",
                identity.display_name, identity.email, identity.access_level
            );
            Ok(())
        }
        Err(SessionError::ServiceUnavailable) => Err(anyhow!(
            "{} ({})",
            SessionError::ServiceUnavailable,
            args.globals.api_url
        )),
        Err(err) => Err(anyhow!(err)),
    }
}
