use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// Collapses bursts of calls into a single delayed invocation.
///
/// Every [`call`](Debouncer::call) cancels the pending invocation, if any,
/// and schedules the callback `delay` later with the latest arguments.
/// Scheduling spawns onto the current tokio runtime.
pub struct Debouncer<T> {
    delay: Duration,
    callback: Arc<dyn Fn(T) + Send + Sync>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            callback: Arc::new(callback),
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn call(&mut self, args: T) {
        self.cancel();
        let deadline = Instant::now() + self.delay;
        let callback = Arc::clone(&self.callback);
        self.pending = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            callback(args);
        }));
    }

    /// Drop the pending invocation without running it.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
