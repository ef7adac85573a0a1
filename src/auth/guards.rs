//! Route guard for protected views.
//!
//! The guard is evaluated once per published session snapshot. It never
//! mutates the session; its only side effect is the "session expired"
//! notification, which fires once per expiry.

use crate::{
    auth::state::{SessionExit, SessionPhase, SessionState},
    notify::{Notification, NotificationSink},
};
use std::sync::Arc;
use tracing::debug;

pub const SESSION_EXPIRED_TITLE: &str = "Session expired";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not resolved yet; show a neutral loading indicator.
    Loading,
    Redirect { to: String },
    Render,
}

pub struct RouteGuard {
    entry_point: String,
    sink: Arc<dyn NotificationSink>,
    // expirations already reported (or absorbed by a later sign-in)
    notified_expirations: u64,
}

impl RouteGuard {
    pub fn new(entry_point: &str, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            entry_point: entry_point.to_string(),
            sink,
            notified_expirations: 0,
        }
    }

    #[must_use]
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    fn at_entry_point(&self, location: &str) -> bool {
        let path = location.split(['?', '#']).next().unwrap_or_default();
        path.trim_end_matches('/') == self.entry_point.trim_end_matches('/')
    }

    fn redirect_unless_at_entry(&self, location: &str) -> GuardDecision {
        if self.at_entry_point(location) {
            GuardDecision::Render
        } else {
            GuardDecision::Redirect {
                to: self.entry_point.clone(),
            }
        }
    }

    pub fn evaluate(&mut self, state: &SessionState, location: &str) -> GuardDecision {
        let decision = match state.phase() {
            SessionPhase::Uninitialized | SessionPhase::Checking => GuardDecision::Loading,
            SessionPhase::Authenticated => {
                self.notified_expirations = state.expirations;
                GuardDecision::Render
            }
            SessionPhase::ServiceDown => self.redirect_unless_at_entry(location),
            SessionPhase::Unauthenticated => {
                if !self.at_entry_point(location) {
                    self.maybe_notify_expiry(state);
                }
                self.redirect_unless_at_entry(location)
            }
        };

        debug!(phase = %state.phase(), location, ?decision, "route guard evaluated");
        decision
    }

    fn maybe_notify_expiry(&mut self, state: &SessionState) {
        if state.expirations <= self.notified_expirations {
            return;
        }
        self.notified_expirations = state.expirations;

        if state.last_exit == Some(SessionExit::LoggedOut) {
            return;
        }

        self.sink.notify(Notification::warning(
            SESSION_EXPIRED_TITLE,
            SESSION_EXPIRED_MESSAGE,
        ));
    }
}
