//! User-facing notifications. The session engine only describes what happened;
//! sinks decide how to show it. Notification text must never carry tokens or
//! passwords.

use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Success, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, message)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.title, self.message)
    }
}

/// Fire-and-forget delivery of notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that writes notifications to the tracing log, at the level matching
/// their severity.
#[derive(Clone, Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success | Severity::Info => {
                info!(title = %notification.title, "{}", notification.message);
            }
            Severity::Warning => warn!(title = %notification.title, "{}", notification.message),
            Severity::Error => error!(title = %notification.title, "{}", notification.message),
        }
    }
}

/// Sink that forwards notifications to a channel so a UI loop can render them.
#[derive(Clone, Debug)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // a closed receiver means nobody is rendering anymore
        let _ = self.tx.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io,
        sync::{Arc, Mutex, PoisonError},
    };
    use tracing::Level;

    #[test]
    fn channel_notifier_forwards_in_order() {
        let (sink, mut rx) = ChannelNotifier::new();
        sink.notify(Notification::success("Connection restored", "Server is back."));
        sink.notify(Notification::warning("Session expired", "Sign in again."));

        assert_eq!(rx.try_recv().map(|n| n.severity), Ok(Severity::Success));
        assert_eq!(
            rx.try_recv().map(|n| n.title),
            Ok("Session expired".to_string())
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_notifier_ignores_closed_receiver() {
        let (sink, rx) = ChannelNotifier::new();
        drop(rx);
        sink.notify(Notification::error("Error", "nobody listens"));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn log_lines(max_level: Level, notifications: Vec<Notification>) -> Vec<String> {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(max_level)
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            for notification in notifications {
                LogNotifier.notify(notification);
            }
        });

        let bytes = captured.0.lock().unwrap_or_else(PoisonError::into_inner).clone();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn log_notifier_logs_at_matching_level() {
        let lines = log_lines(
            Level::INFO,
            vec![
                Notification::info("Signed out", "The session was closed."),
                Notification::warning("Session expired", "Sign in again."),
                Notification::error("Service unavailable", "The server is not responding."),
            ],
        );

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("INFO") && lines[0].contains("The session was closed."));
        assert!(lines[0].contains("title=Signed out"));
        assert!(lines[1].contains("WARN") && lines[1].contains("Sign in again."));
        assert!(lines[2].contains("ERROR") && lines[2].contains("Service unavailable"));
    }

    #[test]
    fn log_notifier_respects_the_filter() {
        let lines = log_lines(
            Level::ERROR,
            vec![
                Notification::success("Connection restored", "Server is back."),
                Notification::info("Signed out", "The session was closed."),
                Notification::error("Service unavailable", "Still down."),
            ],
        );

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Still down."));
    }

    #[test]
    fn notification_display_includes_severity() {
        let notification = Notification::warning("Session expired", "Sign in again.");
        assert_eq!(
            notification.to_string(),
            "[warning] Session expired: Sign in again."
        );
        assert_eq!(
            Notification::info("Signed out", "Bye.").to_string(),
            "[info] Signed out: Bye."
        );
    }
}
