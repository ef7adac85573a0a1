//! Session lifecycle, permission evaluation and route guarding.

pub mod config;
pub mod guards;
pub mod permissions;
pub(crate) mod poller;
pub mod session;
pub mod state;
pub mod types;

pub use self::{
    config::SessionConfig,
    guards::{GuardDecision, RouteGuard},
    permissions::{authorize, authorize_named, Action, Module},
    session::SessionManager,
    state::{SessionExit, SessionPhase, SessionState},
    types::{AccessLevel, AccessProfile, AdminIdentity},
};
