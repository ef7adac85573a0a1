pub mod can;
pub mod defaults;
pub mod health;
pub mod login;
pub mod logout;
pub mod status;
pub mod watch;

// The match over `Action` lives in `run` so this file stays a list of variants.
mod run;

use crate::{
    cli::globals::GlobalArgs,
    notify::{LogNotifier, Notification, NotificationSink},
};

#[derive(Debug)]
pub enum Action {
    Login(login::Args),
    Logout(GlobalArgs),
    Status(GlobalArgs),
    Health(GlobalArgs),
    Can(can::Args),
    Defaults(defaults::Args),
    Watch(watch::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}

/// One-shot commands print the notice for the operator and keep a log record.
fn announce(notification: Notification) {
    println!("{notification}");
    LogNotifier.notify(notification);
}
