use crate::{
    auth::{GuardDecision, RouteGuard, SessionPhase, SessionState},
    cli::globals::GlobalArgs,
    notify::ChannelNotifier,
};
use anyhow::{Context, Result};
use std::{future::pending, sync::Arc, time::Duration};
use tokio::{
    sync::mpsc::UnboundedReceiver,
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub location: String,
    pub revalidate_every: Option<Duration>,
}

struct Watcher {
    guard: RouteGuard,
    notifications: UnboundedReceiver<crate::notify::Notification>,
    location: String,
    last: Option<(SessionPhase, GuardDecision)>,
}

impl Watcher {
    fn report(&mut self, state: &SessionState) {
        let decision = self.guard.evaluate(state, &self.location);
        let current = (state.phase(), decision);

        if self.last.as_ref() != Some(&current) {
            let (phase, decision) = &current;
            match decision {
                GuardDecision::Loading => println!("{phase}: loading"),
                GuardDecision::Render => println!("{phase}: render {}", self.location),
                GuardDecision::Redirect { to } => println!("{phase}: redirect to {to}"),
            }
            self.last = Some(current);
        }

        while let Ok(notification) = self.notifications.try_recv() {
            println!("{notification}");
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending::<()>().await,
    }
}

/// Follow the session until Ctrl-C, printing every guard decision change.
/// # Errors
/// Returns an error if the session cannot be wired or the signal handler fails.
pub async fn execute(args: Args) -> Result<()> {
    let session = args.globals.build_session()?;
    let (sink, notifications) = ChannelNotifier::new();
    let mut watcher = Watcher {
        guard: RouteGuard::new(session.config().entry_point(), Arc::new(sink)),
        notifications,
        location: args.location,
        last: None,
    };

    let mut updates = session.subscribe();
    session.initialize().await;
    watcher.report(&updates.borrow_and_update().clone());

    let mut ticker = args.revalidate_every.map(|every| {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(location = %watcher.location, "watching session");

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                watcher.report(&state);
            }
            () = next_tick(&mut ticker) => {
                // an outage is only retried on request, and this tick is the request
                let phase = if session.phase() == SessionPhase::ServiceDown {
                    session.check_service_health().await;
                    session.phase()
                } else {
                    session.revalidate().await
                };
                debug!(%phase, "periodic session check");
            }
            signal = &mut shutdown => {
                signal.context("failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    session.shutdown();
    debug!("watch finished");
    Ok(())
}
