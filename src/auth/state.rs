//! Session state owned by the session manager and the phase derived from it.
//! Only non-sensitive data lives here; the token stays in the token store.

use crate::auth::{
    permissions::{self, Action, Module},
    types::{AccessProfile, AdminIdentity},
};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Uninitialized,
    Checking,
    Unauthenticated,
    Authenticated,
    ServiceDown,
}

impl SessionPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Uninitialized => "uninitialized",
            SessionPhase::Checking => "checking",
            SessionPhase::Unauthenticated => "unauthenticated",
            SessionPhase::Authenticated => "authenticated",
            SessionPhase::ServiceDown => "service_down",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the last authenticated session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionExit {
    LoggedOut,
    Expired,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub identity: Option<AdminIdentity>,
    pub profile: Option<AccessProfile>,
    pub initializing: bool,
    pub initialized: bool,
    pub service_unavailable: bool,
    pub last_exit: Option<SessionExit>,
    /// Number of sessions that ended by expiring, for one-shot notices.
    pub expirations: u64,
}

impl SessionState {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.initializing {
            SessionPhase::Checking
        } else if self.service_unavailable {
            SessionPhase::ServiceDown
        } else if self.identity.is_some() {
            SessionPhase::Authenticated
        } else if self.initialized {
            SessionPhase::Unauthenticated
        } else {
            SessionPhase::Uninitialized
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    #[must_use]
    pub fn authorize(&self, module: Module, action: Action) -> bool {
        permissions::authorize(self.identity.as_ref(), self.profile.as_ref(), module, action)
    }

    /// Install a signed-in administrator in a single step.
    pub(crate) fn sign_in(&mut self, identity: AdminIdentity, profile: Option<AccessProfile>) {
        self.identity = Some(identity);
        self.profile = profile;
        self.last_exit = None;
    }

    /// Drop identity and profile together so the profile never outlives it.
    /// Returns `true` if someone was signed in.
    pub(crate) fn sign_out(&mut self, exit: SessionExit) -> bool {
        let was_signed_in = self.identity.take().is_some();
        self.profile = None;
        if was_signed_in {
            self.last_exit = Some(exit);
            if exit == SessionExit::Expired {
                self.expirations += 1;
            }
        }
        was_signed_in
    }
}
