//! One-shot timers with cancellation support
//!
//! Two kinds of timer back a retry operation:
//!
//! - [`timeout`] spawns a detached one-shot callback (the per-attempt
//!   watchdog) and hands back a [`TimerHandle`] to cancel it.
//! - [`delay`] is awaited in place (the backoff wait) and can be cut short
//!   through a `watch` channel carrying a stop flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::sleep;

/// A handle that cancels a scheduled callback
#[derive(Debug, Clone)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    task: AbortHandle,
}

impl TimerHandle {
    /// Cancel the timer; the callback will not run if it has not yet
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }

    /// Check if the timer has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Run `callback` once after `duration` unless cancelled first
///
/// Returns `None` when called outside a Tokio runtime; nothing is scheduled
/// in that case.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use retryop::time::timer::timeout;
///
/// #[tokio::main]
/// async fn main() {
///     let handle = timeout(Duration::from_secs(5), || {
///         println!("attempt overran");
///     });
///     if let Some(handle) = handle {
///         handle.cancel();
///     }
/// }
/// ```
pub fn timeout<F>(duration: Duration, callback: F) -> Option<TimerHandle>
where
    F: FnOnce() + Send + 'static,
{
    let runtime = Handle::try_current().ok()?;
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);

    let task = runtime.spawn(async move {
        sleep(duration).await;
        if !flag.load(Ordering::SeqCst) {
            callback();
        }
    });

    Some(TimerHandle { cancelled, task: task.abort_handle() })
}

/// How a [`delay`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// The full duration passed
    Elapsed,
    /// The stop flag was raised first
    Stopped,
}

/// Wait for `duration`, returning early once `stop` reads `true`
///
/// A flag that is already raised ends the wait immediately.
pub async fn delay(duration: Duration, stop: &mut watch::Receiver<bool>) -> Wakeup {
    tokio::select! {
        () = sleep(duration) => Wakeup::Elapsed,
        _ = stop.wait_for(|stopped| *stopped) => Wakeup::Stopped,
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for time::timer.
    use std::sync::atomic::AtomicU32;

    use super::*;

    /// Validates `timeout` behavior for the callback fires scenario.
    ///
    /// Assertions:
    /// - Confirms `counter.load(Ordering::SeqCst)` equals `1`.
    /// - Ensures `!handle.is_cancelled()` evaluates to true.
    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let handle = timeout(Duration::from_millis(10), move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        })
        .expect("runtime is available");

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!handle.is_cancelled());
    }

    /// Validates `timeout` behavior for the timeout cancelled scenario.
    ///
    /// Assertions:
    /// - Confirms `counter.load(Ordering::SeqCst)` equals `0`.
    #[tokio::test(start_paused = true)]
    async fn test_timeout_cancelled() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let handle = timeout(Duration::from_millis(50), move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        })
        .expect("runtime is available");

        handle.cancel();
        tokio::time::sleep(Duration::from_millis(60)).await;

        // Should not have fired because it was cancelled
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_timeout_without_runtime_schedules_nothing() {
        assert!(timeout(Duration::from_millis(1), || {}).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_elapses() {
        let (_tx, mut rx) = watch::channel(false);
        let start = tokio::time::Instant::now();

        assert_eq!(delay(Duration::from_millis(250), &mut rx).await, Wakeup::Elapsed);
        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    /// Validates `delay` behavior for the stop raised mid-wait scenario.
    ///
    /// Assertions:
    /// - Confirms the wait ends as `Wakeup::Stopped` long before the delay.
    #[tokio::test(start_paused = true)]
    async fn test_delay_stopped_mid_wait() {
        let (tx, mut rx) = watch::channel(false);
        let start = tokio::time::Instant::now();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tx.send_replace(true);
        });

        assert_eq!(delay(Duration::from_secs(60), &mut rx).await, Wakeup::Stopped);
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_already_stopped() {
        let (_tx, mut rx) = watch::channel(true);

        assert_eq!(delay(Duration::from_secs(60), &mut rx).await, Wakeup::Stopped);
    }
}
