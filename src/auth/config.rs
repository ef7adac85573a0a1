use std::time::Duration;

/// Default interval between background liveness probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
/// Default unauthenticated entry point; it is also where outages are explained.
pub const DEFAULT_ENTRY_POINT: &str = "/login";

#[derive(Clone, Debug)]
pub struct SessionConfig {
    poll_interval: Duration,
    entry_point: String,
}

impl SessionConfig {
    /// Default config: 60s liveness poll, `/login` entry point.
    #[must_use]
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_poll_interval_seconds(self, seconds: u64) -> Self {
        self.with_poll_interval(Duration::from_secs(seconds))
    }

    #[must_use]
    pub fn with_entry_point(mut self, entry_point: &str) -> Self {
        self.entry_point = entry_point.to_string();
        self
    }

    #[must_use]
    pub fn normalize(self) -> Self {
        let poll_interval = if self.poll_interval.is_zero() {
            Duration::from_secs(1)
        } else {
            self.poll_interval
        };

        let trimmed = self.entry_point.trim().trim_end_matches('/');
        let entry_point = if trimmed.is_empty() {
            DEFAULT_ENTRY_POINT.to_string()
        } else if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };

        Self {
            poll_interval,
            entry_point,
        }
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    #[must_use]
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}
