#![allow(dead_code)]

use async_trait::async_trait;
use samcast_admin::{
    auth::{AccessLevel, AccessProfile, AdminIdentity},
    gateway::{AuthGateway, GatewayError, LoginGrant},
    notify::{Notification, NotificationSink},
};
use secrecy::{ExposeSecret, SecretString};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

pub const VALID_TOKEN: &str = "valid-token";
pub const ISSUED_TOKEN: &str = "issued-token";
pub const PASSWORD: &str = "s3cret";

pub fn identity(level: AccessLevel, profile_ref: Option<&str>) -> AdminIdentity {
    AdminIdentity {
        id: "7".to_string(),
        display_name: "Operador".to_string(),
        email: "operador@samcast.com.br".to_string(),
        access_level: level,
        profile_ref: profile_ref.map(str::to_string),
    }
}

/// In-memory back office with switchable health and call counters.
pub struct FakeGateway {
    healthy: AtomicBool,
    login_delay: Mutex<Duration>,
    validate_delay: Mutex<Duration>,
    // answered by validate_token instead of checking the token
    validate_error: Mutex<Option<GatewayError>>,
    identity: Mutex<AdminIdentity>,
    profiles: Mutex<HashMap<String, AccessProfile>>,
    // login/validate report `Unreachable` instead of answering
    unreachable: AtomicBool,
    pub health_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub validate_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn new(identity: AdminIdentity) -> Self {
        Self {
            healthy: AtomicBool::new(true),
            login_delay: Mutex::new(Duration::ZERO),
            validate_delay: Mutex::new(Duration::ZERO),
            validate_error: Mutex::new(None),
            identity: Mutex::new(identity),
            profiles: Mutex::new(HashMap::new()),
            unreachable: AtomicBool::new(false),
            health_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
            validate_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn set_login_delay(&self, delay: Duration) {
        *self.login_delay.lock().unwrap() = delay;
    }

    pub fn set_validate_delay(&self, delay: Duration) {
        *self.validate_delay.lock().unwrap() = delay;
    }

    pub fn set_validate_error(&self, error: Option<GatewayError>) {
        *self.validate_error.lock().unwrap() = error;
    }

    pub fn set_identity(&self, identity: AdminIdentity) {
        *self.identity.lock().unwrap() = identity;
    }

    pub fn add_profile(&self, profile: AccessProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.id.clone(), profile);
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthGateway for FakeGateway {
    async fn check_health(&self) -> bool {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        self.healthy.load(Ordering::SeqCst)
    }

    async fn login(&self, email: &str, secret: &SecretString) -> Result<LoginGrant, GatewayError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.login_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.unreachable.load(Ordering::SeqCst) {
            return Err(GatewayError::Unreachable("connection refused".to_string()));
        }

        let identity = self.identity.lock().unwrap().clone();
        if email != identity.email || secret.expose_secret() != PASSWORD {
            return Err(GatewayError::InvalidCredentials);
        }

        Ok(LoginGrant {
            identity,
            token: SecretString::from(ISSUED_TOKEN.to_string()),
        })
    }

    async fn validate_token(&self, token: &SecretString) -> Result<AdminIdentity, GatewayError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);

        // read before sleeping so the answer reflects the call time
        let answer = self.identity.lock().unwrap().clone();
        let delay = *self.validate_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.validate_error.lock().unwrap().clone() {
            return Err(error);
        }

        if self.unreachable.load(Ordering::SeqCst) {
            return Err(GatewayError::Unreachable("connection refused".to_string()));
        }

        match token.expose_secret() {
            VALID_TOKEN | ISSUED_TOKEN => Ok(answer),
            _ => Err(GatewayError::InvalidToken),
        }
    }

    async fn fetch_profile(&self, profile_ref: &str) -> Result<AccessProfile, GatewayError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .lock()
            .unwrap()
            .get(profile_ref)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn logout(&self, _token: &SecretString) -> Result<(), GatewayError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GatewayError::Unreachable("connection refused".to_string()))
        }
    }
}

/// Sink that keeps every notification for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}
