//! # samcast-admin
//!
//! Session and authorization engine for the streaming back office console.
//!
//! The console needs to know two things at all times: who is signed in, and
//! whether the back office API is reachable. [`auth::SessionManager`] owns that
//! state and is the only writer. Everything else reads snapshots of it:
//!
//! - [`auth::permissions`] resolves `(identity, profile, module, action)` to a
//!   yes/no decision, preferring a custom access profile over the role defaults.
//! - [`auth::RouteGuard`] decides whether protected views may render and emits
//!   a single "session expired" notification when a session is lost.
//!
//! Remote calls go through the [`gateway::AuthGateway`] trait, the session token
//! lives in a [`storage::TokenStore`], and user-facing messages are delivered to
//! a [`notify::NotificationSink`]. The `samcast-admin` binary wires the HTTP
//! gateway and a file-backed token store behind a small CLI.

pub mod auth;
pub mod cli;
pub mod errors;
pub mod gateway;
pub mod notify;
pub mod storage;

pub use errors::SessionError;

pub(crate) static APP_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
