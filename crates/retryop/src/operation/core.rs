//! The retry operation state machine
//!
//! A [`RetryOperation`] walks an immutable [`TimeoutSequence`] with a cursor.
//! Each failed attempt reported through [`RetryOperation::retry`] consumes one
//! delay, waits it out, and invokes the stored work function again. The
//! operation records every failure, enforces an optional wall-clock budget,
//! and can arm a per-attempt [`Watchdog`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::warn;

use super::error::OperationError;
use super::tracing::{RetrySpan, RetryTracer, DEFAULT_OPERATION_NAME};
use super::watchdog::{StopHandle, Watchdog};
use crate::backoff::{compute_sequence, TimeoutSequence};
use crate::config::RetryOptions;
use crate::error::{RetryError, RetryResult};
use crate::time::timer::{self, TimerHandle, Wakeup};
use crate::time::{Clock, SystemClock};

type WorkFn = Box<dyn FnMut(u32) + Send>;

/// Lifecycle of a retry operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    /// Created or reset; no attempt in flight
    Idle,
    /// An attempt has been started and not yet resolved
    Running,
    /// `succeed()` was called
    Succeeded,
    /// No delay left, or the wall-clock budget ran out
    Exhausted,
    /// Stopped by `stop()` or a [`StopHandle`]
    Stopped,
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Exhausted => "exhausted",
            Self::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// A single retryable unit of work
///
/// Methods take `&mut self`, so an operation is driven from one task at a
/// time. Cross-task cancellation goes through [`RetryOperation::stop_handle`].
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use retryop::config::RetryOptions;
/// use retryop::operation::RetryOperation;
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let options = RetryOptions::builder()
///     .retries(2)
///     .min_timeout(Duration::from_millis(10))
///     .build()
///     .unwrap();
/// let mut operation = RetryOperation::<String>::new(&options).unwrap();
///
/// operation.attempt(|attempt| println!("attempt {attempt}"));
/// assert!(operation.retry("refused".to_string()).await);
/// assert!(operation.retry("refused".to_string()).await);
/// assert!(!operation.retry("refused".to_string()).await);
/// assert_eq!(operation.attempts(), 3);
/// # }
/// ```
pub struct RetryOperation<E, C: Clock = SystemClock> {
    original_timeouts: TimeoutSequence,
    cursor: usize,
    forever_cache: Option<Duration>,
    forever: bool,
    max_retry_time: Option<Duration>,
    attempts: u32,
    errors: Vec<OperationError<E>>,
    operation_start: Option<Instant>,
    work: Option<WorkFn>,
    watchdog: Option<Watchdog>,
    watchdog_timer: Option<TimerHandle>,
    stop_signal: Arc<watch::Sender<bool>>,
    state: OperationState,
    span: RetrySpan,
    clock: C,
}

impl<E: fmt::Display> RetryOperation<E, SystemClock> {
    /// Build an operation from options using the system clock
    pub fn new(options: &RetryOptions) -> RetryResult<Self> {
        Self::with_clock(options, SystemClock)
    }
}

impl<E: fmt::Display, C: Clock> RetryOperation<E, C> {
    /// Build an operation from options, measuring its budget with `clock`
    pub fn with_clock(options: &RetryOptions, clock: C) -> RetryResult<Self> {
        let timeouts = compute_sequence(options)?;
        Ok(Self::from_sequence(timeouts, options.resolved_forever(), options.max_retry_time, clock))
    }

    /// Build an operation over an already computed sequence
    ///
    /// In forever mode the last delay of `timeouts` is kept for reuse once the
    /// sequence is used up; an empty sequence has nothing to reuse.
    pub fn from_sequence(
        timeouts: TimeoutSequence,
        forever: bool,
        max_retry_time: Option<Duration>,
        clock: C,
    ) -> Self {
        let span = RetryTracer::new().start_retry_span(DEFAULT_OPERATION_NAME, timeouts.len());
        let (stop_signal, _) = watch::channel(false);
        let forever_cache = if forever { timeouts.last() } else { None };

        Self {
            original_timeouts: timeouts,
            cursor: 0,
            forever_cache,
            forever,
            max_retry_time,
            attempts: 1,
            errors: Vec::new(),
            operation_start: None,
            work: None,
            watchdog: None,
            watchdog_timer: None,
            stop_signal: Arc::new(stop_signal),
            state: OperationState::Idle,
            span,
            clock,
        }
    }

    /// Name used in this operation's log events
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.span = RetryTracer::new().start_retry_span(name, self.original_timeouts.len());
        self
    }

    /// Start the first attempt by invoking `work(attempts)`
    pub fn attempt<F>(&mut self, work: F)
    where
        F: FnMut(u32) + Send + 'static,
    {
        self.attempt_with(work, None);
    }

    /// Start the first attempt with a per-attempt watchdog
    ///
    /// `None` keeps whatever watchdog an earlier call configured; use
    /// [`clear_watchdog`](Self::clear_watchdog) to remove it.
    pub fn attempt_with<F>(&mut self, work: F, watchdog: Option<Watchdog>)
    where
        F: FnMut(u32) + Send + 'static,
    {
        self.begin(watchdog);
        self.schedule_watchdog();

        let mut work: WorkFn = Box::new(work);
        work(self.attempts);
        self.work = Some(work);
    }

    /// Report a failed attempt and schedule the next one if allowed
    ///
    /// Returns `true` once the backoff delay has elapsed and the stored work
    /// function has been invoked with the new attempt number. Returns `false`
    /// when the budget has run out, no delay is left, or the operation was
    /// stopped; nothing further is scheduled in that case.
    pub async fn retry(&mut self, error: E) -> bool {
        self.cancel_watchdog();

        if self.is_stop_requested() {
            self.halt();
        }

        if let (Some(budget), Some(start)) = (self.max_retry_time, self.operation_start) {
            let elapsed = self.clock.elapsed_since(start);
            if elapsed >= budget {
                self.span.record_failure(self.attempts, &error.to_string());
                self.errors.push(OperationError::Failed(error));
                self.errors.insert(0, OperationError::Retry(RetryError::timeout(elapsed, budget)));
                self.span.record_timeout(elapsed, budget);
                self.state = OperationState::Exhausted;
                return false;
            }
        }

        self.span.record_failure(self.attempts, &error.to_string());
        self.errors.push(OperationError::Failed(error));

        let delay = match self.next_timeout() {
            Some(delay) => delay,
            None => match self.forever_cache {
                Some(last) if self.forever => {
                    self.keep_last_error();
                    self.span.record_forever(last);
                    last
                }
                _ => {
                    self.span.record_exhausted(self.attempts, self.errors.len());
                    if !self.is_stop_requested() {
                        self.state = OperationState::Exhausted;
                    }
                    return false;
                }
            },
        };

        self.span.record_backoff(self.attempts, delay);
        let mut stop = self.stop_signal.subscribe();
        if timer::delay(delay, &mut stop).await == Wakeup::Stopped {
            self.halt();
            return false;
        }

        self.attempts = self.attempts.saturating_add(1);
        self.state = OperationState::Running;
        self.span.record_attempt(self.attempts);
        if let Some(work) = self.work.as_mut() {
            work(self.attempts);
        }
        self.schedule_watchdog();
        true
    }

    /// Mark the current attempt as successful and disarm its watchdog
    pub fn succeed(&mut self) {
        self.cancel_watchdog();
        self.state = OperationState::Succeeded;
        self.span.record_success(self.attempts, self.elapsed());
    }

    /// Stop the operation; later `retry` calls return `false`
    ///
    /// Discards the remaining delays and the forever-mode delay. Idempotent.
    pub fn stop(&mut self) {
        self.stop_signal.send_replace(true);
        self.halt();
    }

    /// Return to the first attempt with the full delay sequence
    ///
    /// The error log is kept and no timer is cancelled. A forever-mode delay
    /// discarded by `stop()` stays discarded.
    pub fn reset(&mut self) {
        self.attempts = 1;
        self.cursor = 0;
        self.stop_signal.send_replace(false);
        self.state = OperationState::Idle;
        self.span.record_reset();
    }

    /// The most frequent error message, ties going to the latest candidate
    pub fn main_error(&self) -> Option<&OperationError<E>> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut main: Option<(&OperationError<E>, usize)> = None;

        for error in &self.errors {
            let count = counts.entry(error.message()).or_insert(0);
            *count += 1;
            let count = *count;

            if main.map_or(true, |(_, best)| count >= best) {
                main = Some((error, count));
            }
        }

        main.map(|(error, _)| error)
    }

    /// 1-based number of the attempt in flight
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Every recorded error in order
    pub fn errors(&self) -> &[OperationError<E>] {
        &self.errors
    }

    pub fn into_errors(mut self) -> Vec<OperationError<E>> {
        std::mem::take(&mut self.errors)
    }

    /// The full delay sequence the operation was built with
    pub fn timeouts(&self) -> &TimeoutSequence {
        &self.original_timeouts
    }

    /// Delays not yet consumed
    pub fn remaining_timeouts(&self) -> &[Duration] {
        &self.original_timeouts[self.cursor..]
    }

    pub fn is_forever(&self) -> bool {
        self.forever
    }

    pub fn max_retry_time(&self) -> Option<Duration> {
        self.max_retry_time
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Time since the first attempt started, if it has
    pub fn elapsed(&self) -> Option<Duration> {
        self.operation_start.map(|start| self.clock.elapsed_since(start))
    }

    /// A handle that stops this operation from another task
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::new(Arc::clone(&self.stop_signal))
    }

    /// Disarm and forget the configured watchdog
    ///
    /// Later attempts run unwatched until a new watchdog is passed to
    /// `attempt_with` or `run_with`.
    pub fn clear_watchdog(&mut self) {
        self.cancel_watchdog();
        self.watchdog = None;
    }

    /// Whether a watchdog is configured
    pub fn has_watchdog(&self) -> bool {
        self.watchdog.is_some()
    }

    /// Record the start of the first attempt
    pub(crate) fn begin(&mut self, watchdog: Option<Watchdog>) {
        if let Some(watchdog) = watchdog {
            self.watchdog = Some(watchdog);
        }
        self.work = None;
        self.operation_start = Some(self.clock.now());
        self.state = OperationState::Running;
        self.span.record_attempt(self.attempts);
    }

    pub(crate) fn schedule_watchdog(&mut self) {
        let Some(watchdog) = self.watchdog.as_ref() else {
            return;
        };

        let attempt = self.attempts;
        let limit = watchdog.timeout();
        let callback = watchdog.callback();
        let operation = self.span.operation_name().to_string();

        self.cancel_watchdog();
        self.watchdog_timer = timer::timeout(limit, move || {
            warn!(
                operation = %operation,
                attempt = attempt,
                timeout_ms = limit.as_millis(),
                "Attempt exceeded watchdog timeout"
            );
            callback(attempt);
        });

        if self.watchdog_timer.is_none() {
            self.span.record_watchdog_unavailable(attempt);
        }
    }

    fn cancel_watchdog(&mut self) {
        if let Some(handle) = self.watchdog_timer.take() {
            handle.cancel();
        }
    }

    fn halt(&mut self) {
        self.cancel_watchdog();
        self.cursor = self.original_timeouts.len();
        self.forever_cache = None;
        if self.state != OperationState::Stopped {
            self.state = OperationState::Stopped;
            self.span.record_stopped(self.attempts);
        }
    }

    fn is_stop_requested(&self) -> bool {
        *self.stop_signal.borrow()
    }

    fn next_timeout(&mut self) -> Option<Duration> {
        let delay = self.original_timeouts.get(self.cursor).copied();
        if delay.is_some() {
            self.cursor += 1;
        }
        delay
    }

    fn keep_last_error(&mut self) {
        let drop_count = self.errors.len().saturating_sub(1);
        self.errors.drain(..drop_count);
    }
}

impl<E, C: Clock> Drop for RetryOperation<E, C> {
    fn drop(&mut self) {
        // A pending watchdog must not outlive the attempt it guards.
        if let Some(handle) = self.watchdog_timer.take() {
            handle.cancel();
        }
    }
}

impl<E: fmt::Debug, C: Clock> fmt::Debug for RetryOperation<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOperation")
            .field("operation", &self.span.operation_name())
            .field("state", &self.state)
            .field("attempts", &self.attempts)
            .field("timeouts", &self.original_timeouts.as_slice())
            .field("cursor", &self.cursor)
            .field("forever", &self.forever)
            .field("max_retry_time", &self.max_retry_time)
            .field("errors", &self.errors)
            .field("watchdog", &self.watchdog)
            .finish_non_exhaustive()
    }
}

/// Build a retry operation from options
pub fn build_operation<E: fmt::Display>(options: &RetryOptions) -> RetryResult<RetryOperation<E>> {
    RetryOperation::new(options)
}
