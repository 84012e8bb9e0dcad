use std::sync::Mutex;
use std::time::Duration;
use log::trace;
use tokio::task::JoinHandle;

/// Delays an action until calls have stopped for the configured time.
///
/// Every call cancels the pending action and schedules the new one.
/// Outside of a tokio runtime the action runs immediately.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedule `action`, replacing any action that has not fired yet
    pub fn call<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                trace!("No runtime available, running debounced action immediately");
                action();
                return;
            }
        };

        let delay = self.delay;
        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });

        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(task);
        }
    }

    /// Drop the pending action, if any
    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(task) = pending.take() {
                task.abort();
            }
        }
    }

    /// Check if an action is scheduled and has not fired yet
    pub fn is_pending(&self) -> bool {
        match self.pending.lock() {
            Ok(pending) => pending.as_ref().map_or(false, |task| !task.is_finished()),
            Err(_) => false,
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_calls_are_coalesced() {
        let debouncer = Debouncer::new(Duration::from_millis(1000));
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let c = counter.clone();
            debouncer.call(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_action() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        debouncer.call(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_runs_immediately_without_runtime() {
        let debouncer = Debouncer::new(Duration::from_secs(10));
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        debouncer.call(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
