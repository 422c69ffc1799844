//! Cancellable one-shot timer

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// One-shot timer running its action on a separate tokio task
///
/// The timer only stops on an explicit [`OutstandingTimer::cancel`]; dropping
/// the handle leaves it armed.
#[derive(Debug)]
pub struct OutstandingTimer {
    cancel: oneshot::Sender<()>,
    fired: Arc<AtomicBool>,
}

impl OutstandingTimer {
    /// Arms a timer that runs `action` once `delay` has elapsed
    pub fn arm<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (cancel, cancelled) = oneshot::channel::<()>();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        tokio::spawn(async move {
            let cancelled = async {
                // A dropped sender is not a cancellation
                if cancelled.await.is_err() {
                    std::future::pending::<()>().await;
                }
            };

            tokio::select! {
                biased;
                _ = cancelled => debug!("Timer cancelled before firing"),
                _ = tokio::time::sleep(delay) => {
                    flag.store(true, Ordering::SeqCst);
                    action().await;
                }
            }
        });

        Self { cancel, fired }
    }

    /// Whether the action has started
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Cancels the timer; a no-op once it has fired
    pub fn cancel(self) {
        let _ = self.cancel.send(());
    }
}
