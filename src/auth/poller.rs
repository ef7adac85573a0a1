//! Background liveness poll.
//!
//! The poll runs only while a session is authenticated. The session manager
//! owns at most one [`LivenessPoller`]; dropping it (or calling `cancel`) stops
//! the task. A tick that is already in flight when the poller is cancelled sees
//! the cancellation flag and must not write anything.

use std::{
    future::Future,
    ops::ControlFlow,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Shared flag a tick checks before acting on its result.
#[derive(Clone, Debug, Default)]
pub(crate) struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

#[derive(Debug)]
pub(crate) struct LivenessPoller {
    cancellation: Cancellation,
    handle: JoinHandle<()>,
}

impl LivenessPoller {
    /// Run `tick` every `period`, first after one full period. The loop ends
    /// when `tick` breaks or the poller is cancelled.
    pub(crate) fn spawn<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut(Cancellation) -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let cancellation = Cancellation::default();
        let task_cancellation = cancellation.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                if task_cancellation.is_cancelled() {
                    break;
                }

                if tick(task_cancellation.clone()).await.is_break() {
                    break;
                }
            }

            debug!("liveness poll loop finished");
        });

        Self {
            cancellation,
            handle,
        }
    }

    /// Stop the poll. Consuming `self` makes a second cancel impossible.
    pub(crate) fn cancel(self) {
        drop(self);
    }
}

impl Drop for LivenessPoller {
    fn drop(&mut self) {
        self.cancellation.cancel();
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;

    #[tokio::test]
    async fn ticks_until_cancelled() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();

        let poller = LivenessPoller::spawn(Duration::from_millis(10), move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            }
        });

        sleep(Duration::from_millis(75)).await;
        poller.cancel();
        let seen = ticks.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected a few ticks, got {seen}");

        sleep(Duration::from_millis(50)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
    }

    #[tokio::test]
    async fn break_ends_the_loop() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();

        let poller = LivenessPoller::spawn(Duration::from_millis(5), move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Break(())
            }
        });

        sleep(Duration::from_millis(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        assert!(poller.handle.is_finished());
    }

    #[tokio::test]
    async fn cancel_sets_flag_seen_by_ticks() {
        let poller = LivenessPoller::spawn(Duration::from_secs(60), |_| async {
            ControlFlow::Continue(())
        });
        let cancellation = poller.cancellation.clone();
        assert!(!cancellation.is_cancelled());

        poller.cancel();
        assert!(cancellation.is_cancelled());
    }
}
