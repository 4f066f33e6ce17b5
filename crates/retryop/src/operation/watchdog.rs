// Per-attempt watchdog and cross-task stop handle
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

type WatchdogCallback = Arc<dyn Fn(u32) + Send + Sync>;

/// A per-attempt time limit with the callback to run when it is exceeded
///
/// The callback receives the attempt number that overran. It runs on a Tokio
/// worker and is independent of the backoff timer.
#[derive(Clone)]
pub struct Watchdog {
    timeout: Duration,
    callback: WatchdogCallback,
}

impl Watchdog {
    pub fn new<F>(timeout: Duration, callback: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        Self { timeout, callback: Arc::new(callback) }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn callback(&self) -> WatchdogCallback {
        Arc::clone(&self.callback)
    }
}

impl fmt::Debug for Watchdog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watchdog")
            .field("timeout", &self.timeout)
            .field("callback", &"<function>")
            .finish()
    }
}

/// Stops a retry operation from another task
///
/// Raising the flag wakes a pending backoff wait, which then gives up without
/// starting another attempt. The next `retry()` sees the flag and behaves as
/// after `stop()`. `reset()` lowers the flag again.
#[derive(Debug, Clone)]
pub struct StopHandle {
    signal: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub(crate) fn new(signal: Arc<watch::Sender<bool>>) -> Self {
        Self { signal }
    }

    /// Request the operation to stop; idempotent
    pub fn stop(&self) {
        self.signal.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.signal.borrow()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for operation::watchdog.
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn test_watchdog_invokes_callback_with_attempt() {
        let seen = Arc::new(AtomicU32::new(0));
        let seen_clone = Arc::clone(&seen);
        let watchdog = Watchdog::new(Duration::from_millis(5), move |attempt| {
            seen_clone.store(attempt, Ordering::SeqCst);
        });

        (watchdog.callback())(4);

        assert_eq!(seen.load(Ordering::SeqCst), 4);
        assert_eq!(watchdog.timeout(), Duration::from_millis(5));
        assert!(format!("{watchdog:?}").contains("<function>"));
    }

    #[test]
    fn test_stop_handle_is_shared() {
        let (tx, _rx) = watch::channel(false);
        let handle = StopHandle::new(Arc::new(tx));
        let other = handle.clone();

        assert!(!other.is_stopped());
        handle.stop();
        handle.stop();
        assert!(other.is_stopped());
    }
}
