//! The session manager: single source of truth for who is signed in and whether
//! the back office is reachable.
//!
//! Flow Overview:
//! 1. `initialize` probes liveness, then validates the stored token (if any) and
//!    loads the access profile. Failures demote to unauthenticated silently.
//! 2. `login` re-probes liveness, exchanges credentials, persists the token and
//!    publishes identity and profile in one transition.
//! 3. `logout` always clears local state, whatever the server says.
//! 4. While authenticated, a background poll marks the service down on outage
//!    without signing the administrator out.
//!
//! State lives in a `watch` channel. Each mutation is a single
//! `send_modify`/`send_if_modified` call, followed by a poll reconciliation that
//! starts or stops the background task to match the new phase.

use crate::{
    auth::{
        config::SessionConfig,
        permissions::{self, Action, Module},
        poller::{Cancellation, LivenessPoller},
        state::{SessionExit, SessionPhase, SessionState},
        types::{AccessProfile, AdminIdentity},
    },
    errors::SessionError,
    gateway::{AuthGateway, GatewayError},
    storage::TokenStore,
};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::{
    ops::ControlFlow,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

pub(crate) fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Whether `state` still belongs to the administrator `id`.
fn same_admin(state: &SessionState, id: &str) -> bool {
    state
        .identity
        .as_ref()
        .is_some_and(|identity| identity.id == id)
}

enum Startup {
    ServiceDown,
    Anonymous,
    SignedIn(AdminIdentity, Option<AccessProfile>),
}

struct Inner {
    gateway: Arc<dyn AuthGateway>,
    store: Arc<dyn TokenStore>,
    config: SessionConfig,
    state: watch::Sender<SessionState>,
    login_in_flight: AtomicBool,
    poller: Mutex<Option<LivenessPoller>>,
}

/// Releases the login slot when the login future completes or is dropped.
struct LoginSlot<'a>(&'a AtomicBool);

impl<'a> LoginSlot<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LoginSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Cheap to clone; all clones share one session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        store: Arc<dyn TokenStore>,
        config: SessionConfig,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());

        Self {
            inner: Arc::new(Inner {
                gateway,
                store,
                config: config.normalize(),
                state,
                login_in_flight: AtomicBool::new(false),
                poller: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every published transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.inner.state.borrow().phase()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn identity(&self) -> Option<AdminIdentity> {
        self.inner.state.borrow().identity.clone()
    }

    #[must_use]
    pub fn profile(&self) -> Option<AccessProfile> {
        self.inner.state.borrow().profile.clone()
    }

    #[must_use]
    pub fn authorize(&self, module: Module, action: Action) -> bool {
        self.inner.state.borrow().authorize(module, action)
    }

    #[must_use]
    pub fn authorize_named(&self, module: &str, action: &str) -> bool {
        let state = self.inner.state.borrow();
        permissions::authorize_named(state.identity.as_ref(), state.profile.as_ref(), module, action)
    }

    /// Whether the background liveness poll is currently scheduled.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Resolve the startup session. Runs once; later calls return the current
    /// phase without touching the network.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> SessionPhase {
        let started = self.inner.state.send_if_modified(|state| {
            if state.initialized || state.initializing {
                false
            } else {
                state.initializing = true;
                true
            }
        });

        if !started {
            debug!("session already initialized");
            return self.phase();
        }

        let startup = self.resolve_startup().await;

        self.inner.state.send_modify(|state| {
            state.initializing = false;
            state.initialized = true;
            match startup {
                Startup::ServiceDown => state.service_unavailable = true,
                Startup::Anonymous => state.service_unavailable = false,
                Startup::SignedIn(identity, profile) => {
                    state.service_unavailable = false;
                    state.sign_in(identity, profile);
                }
            }
        });
        self.reconcile_poller();

        let phase = self.phase();
        info!(%phase, "session initialized");
        phase
    }

    async fn resolve_startup(&self) -> Startup {
        if !self.inner.gateway.check_health().await {
            warn!("back office unreachable at startup");
            return Startup::ServiceDown;
        }

        let token = match self.inner.store.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("no stored session token");
                return Startup::Anonymous;
            }
            Err(err) => {
                warn!("failed to read stored session token: {err:#}");
                return Startup::Anonymous;
            }
        };

        match self.inner.gateway.validate_token(&token).await {
            Ok(identity) => {
                let profile = self.load_profile(&identity).await;
                Startup::SignedIn(identity, profile)
            }
            Err(err) => {
                // expired sessions are routine; nothing to show the user
                warn!("stored session token rejected: {err}");
                self.discard_token();
                Startup::Anonymous
            }
        }
    }

    /// Exchange credentials for a session.
    ///
    /// # Errors
    /// `ServiceUnavailable` when the back office cannot be reached (the session
    /// is marked down), `Credentials` when the server rejects the login or the
    /// input is malformed, `LoginInProgress` for overlapping calls and
    /// `Initializing` until `initialize` has completed.
    #[instrument(skip(self, secret))]
    pub async fn login(
        &self,
        email: &str,
        secret: &SecretString,
    ) -> Result<AdminIdentity, SessionError> {
        let email = email.trim();
        if !valid_email(email) || secret.expose_secret().is_empty() {
            return Err(SessionError::Credentials(
                "A valid email and password are required.".to_string(),
            ));
        }

        // a login racing startup could have its fresh token discarded by it
        if !self.inner.state.borrow().initialized {
            return Err(SessionError::Initializing);
        }

        let _slot =
            LoginSlot::acquire(&self.inner.login_in_flight).ok_or(SessionError::LoginInProgress)?;

        if !self.check_service_health().await {
            warn!("login refused: back office unreachable");
            return Err(SessionError::ServiceUnavailable);
        }

        let grant = match self.inner.gateway.login(email, secret).await {
            Ok(grant) => grant,
            Err(err) if err.is_unreachable() => {
                warn!("login failed: {err}");
                self.mark_service_down();
                return Err(SessionError::ServiceUnavailable);
            }
            Err(GatewayError::InvalidCredentials) => {
                info!("login rejected: invalid credentials");
                return Err(SessionError::invalid_credentials());
            }
            Err(err) => {
                warn!("login failed: {err}");
                return Err(SessionError::Credentials(err.to_string()));
            }
        };

        if let Err(err) = self.inner.store.save(&grant.token) {
            warn!("failed to persist session token: {err:#}");
        }

        let profile = self.load_profile(&grant.identity).await;
        let identity = grant.identity;

        self.inner.state.send_modify(|state| {
            state.service_unavailable = false;
            state.sign_in(identity.clone(), profile);
        });
        self.reconcile_poller();

        info!(admin_id = %identity.id, access_level = %identity.access_level, "admin signed in");
        Ok(identity)
    }

    /// End the session. Always succeeds locally; the server is told when
    /// reachable.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let token = match self.inner.store.load() {
            Ok(token) => token,
            Err(err) => {
                warn!("failed to read stored session token: {err:#}");
                None
            }
        };

        let service_down = self.inner.state.borrow().service_unavailable;
        if let Some(token) = token {
            if service_down {
                debug!("back office marked unavailable; skipping remote logout");
            } else if let Err(err) = self.inner.gateway.logout(&token).await {
                warn!("remote logout failed: {err}");
            }
        }

        self.discard_token();

        let signed_out = self
            .inner
            .state
            .send_if_modified(|state| state.sign_out(SessionExit::LoggedOut));
        self.reconcile_poller();

        if signed_out {
            info!("admin signed out");
        }
    }

    /// Probe liveness on request and record the outcome.
    #[instrument(skip(self))]
    pub async fn check_service_health(&self) -> bool {
        let healthy = self.inner.gateway.check_health().await;

        self.inner.state.send_if_modified(|state| {
            if state.service_unavailable == healthy {
                state.service_unavailable = !healthy;
                true
            } else {
                false
            }
        });
        self.reconcile_poller();

        debug!(healthy, "service health checked");
        healthy
    }

    /// Re-validate the stored token of an authenticated session. An invalid or
    /// missing token ends the session as expired; an outage only marks the
    /// service down. Any other failure keeps the session as it is.
    ///
    /// Results are dropped when a different administrator signed in while the
    /// token was being checked.
    #[instrument(skip(self))]
    pub async fn revalidate(&self) -> SessionPhase {
        let current = {
            let state = self.inner.state.borrow();
            if state.is_authenticated() && !state.initializing && !state.service_unavailable {
                state
                    .identity
                    .as_ref()
                    .map(|identity| (identity.id.clone(), identity.profile_ref.clone()))
            } else {
                None
            }
        };

        let Some((current_id, current_ref)) = current else {
            return self.phase();
        };

        let token = match self.inner.store.load() {
            Ok(token) => token,
            Err(err) => {
                warn!("failed to read stored session token: {err:#}");
                None
            }
        };

        let outcome = match token {
            Some(token) => self.inner.gateway.validate_token(&token).await,
            None => Err(GatewayError::InvalidToken),
        };

        match outcome {
            Ok(identity) => {
                let refreshed_profile = if identity.profile_ref == current_ref {
                    None
                } else {
                    Some(self.load_profile(&identity).await)
                };

                self.inner.state.send_if_modified(|state| {
                    if !same_admin(state, &current_id) {
                        return false;
                    }
                    state.identity = Some(identity);
                    if let Some(profile) = refreshed_profile {
                        state.profile = profile;
                    }
                    true
                });
            }
            Err(err) if err.is_unreachable() => {
                warn!("revalidation failed: {err}");
                self.mark_service_down();
            }
            Err(GatewayError::InvalidToken) => {
                let expired = self.inner.state.send_if_modified(|state| {
                    same_admin(state, &current_id) && state.sign_out(SessionExit::Expired)
                });
                if expired {
                    warn!(admin_id = %current_id, "session expired");
                    self.discard_token();
                } else {
                    debug!("session changed during revalidation; result dropped");
                }
            }
            Err(err) => {
                warn!("revalidation failed, keeping session: {err}");
            }
        }
        self.reconcile_poller();

        self.phase()
    }

    /// Stop background work. Safe to call more than once.
    pub fn shutdown(&self) {
        if let Some(poller) = self
            .inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            poller.cancel();
            debug!("liveness poll stopped on shutdown");
        }
    }

    async fn load_profile(&self, identity: &AdminIdentity) -> Option<AccessProfile> {
        let profile_ref = identity.profile_ref.as_deref()?;

        match self.inner.gateway.fetch_profile(profile_ref).await {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!(profile_ref, "access profile unavailable, using role defaults: {err}");
                None
            }
        }
    }

    fn discard_token(&self) {
        if let Err(err) = self.inner.store.clear() {
            warn!("failed to clear stored session token: {err:#}");
        }
    }

    fn mark_service_down(&self) {
        self.inner.state.send_if_modified(|state| {
            let changed = !state.service_unavailable;
            state.service_unavailable = true;
            changed
        });
        self.reconcile_poller();
    }

    /// Start or stop the liveness poll so it runs exactly while authenticated.
    fn reconcile_poller(&self) {
        let mut slot = self
            .inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let authenticated = self.phase() == SessionPhase::Authenticated;

        if authenticated {
            if slot.is_none() {
                *slot = Some(self.spawn_poller());
                debug!(interval = ?self.inner.config.poll_interval(), "liveness poll started");
            }
        } else if let Some(poller) = slot.take() {
            poller.cancel();
            debug!("liveness poll stopped");
        }
    }

    fn spawn_poller(&self) -> LivenessPoller {
        let weak = Arc::downgrade(&self.inner);

        LivenessPoller::spawn(self.inner.config.poll_interval(), move |cancellation| {
            let weak = weak.clone();
            async move {
                let Some(inner) = weak.upgrade() else {
                    return ControlFlow::Break(());
                };
                let manager = SessionManager { inner };
                manager.poll_tick(&cancellation).await
            }
        })
    }

    async fn poll_tick(&self, cancellation: &Cancellation) -> ControlFlow<()> {
        if self.inner.gateway.check_health().await {
            debug!("liveness poll: back office reachable");
            return ControlFlow::Continue(());
        }

        let marked = self.inner.state.send_if_modified(|state| {
            if cancellation.is_cancelled() || state.phase() != SessionPhase::Authenticated {
                return false;
            }
            state.service_unavailable = true;
            true
        });

        if marked {
            warn!("liveness poll: back office unreachable, keeping current session");
            self.reconcile_poller();
            ControlFlow::Break(())
        } else if cancellation.is_cancelled() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}
