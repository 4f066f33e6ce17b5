//! Tracing support for retry operations
//!
//! Structured events through the standard `tracing` crate, one span object
//! per retry operation.

use std::time::Duration;

use tracing::{debug, info, warn};

/// Default operation name used in log events
pub const DEFAULT_OPERATION_NAME: &str = "retry_operation";

/// Entry point for retry operation spans
#[derive(Debug, Default)]
pub struct RetryTracer;

impl RetryTracer {
    pub fn new() -> Self {
        Self
    }

    /// Start a retry operation span
    pub fn start_retry_span(&self, operation_name: &str, planned_retries: usize) -> RetrySpan {
        debug!(
            operation = operation_name,
            planned_retries = planned_retries,
            "Retry operation created"
        );

        RetrySpan { operation_name: operation_name.to_string(), planned_retries }
    }
}

/// A span representing a retry operation
#[derive(Debug, Clone)]
pub struct RetrySpan {
    operation_name: String,
    planned_retries: usize,
}

impl RetrySpan {
    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    /// Record an attempt being started
    pub fn record_attempt(&self, attempt: u32) {
        debug!(operation = %self.operation_name, attempt = attempt, "Starting attempt");
    }

    /// Record a failed attempt
    pub fn record_failure(&self, attempt: u32, error: &str) {
        warn!(
            operation = %self.operation_name,
            attempt = attempt,
            error = %error,
            "Attempt failed"
        );
    }

    /// Record the wait before the next attempt
    pub fn record_backoff(&self, attempt: u32, delay: Duration) {
        info!(
            operation = %self.operation_name,
            attempt = attempt,
            delay_ms = delay.as_millis(),
            "Retrying after delay"
        );
    }

    /// Record forever mode reusing its last delay
    pub fn record_forever(&self, delay: Duration) {
        debug!(
            operation = %self.operation_name,
            delay_ms = delay.as_millis(),
            "Timeout sequence used up, repeating last delay"
        );
    }

    /// Record a successful attempt
    pub fn record_success(&self, attempts: u32, elapsed: Option<Duration>) {
        info!(
            operation = %self.operation_name,
            attempts = attempts,
            elapsed_ms = elapsed.map(|e| e.as_millis()),
            "Retry operation succeeded"
        );
    }

    /// Record that all planned retries have been used
    pub fn record_exhausted(&self, attempts: u32, errors: usize) {
        warn!(
            operation = %self.operation_name,
            attempts = attempts,
            planned_retries = self.planned_retries,
            errors = errors,
            "All retry attempts exhausted"
        );
    }

    /// Record the wall-clock budget running out
    pub fn record_timeout(&self, elapsed: Duration, budget: Duration) {
        warn!(
            operation = %self.operation_name,
            elapsed_ms = elapsed.as_millis(),
            budget_ms = budget.as_millis(),
            "Retry operation timed out"
        );
    }

    /// Record the operation being stopped
    pub fn record_stopped(&self, attempts: u32) {
        info!(operation = %self.operation_name, attempts = attempts, "Retry operation stopped");
    }

    /// Record a reset back to the first attempt
    pub fn record_reset(&self) {
        debug!(operation = %self.operation_name, "Retry operation reset");
    }

    /// Record that a watchdog could not be scheduled
    pub fn record_watchdog_unavailable(&self, attempt: u32) {
        warn!(
            operation = %self.operation_name,
            attempt = attempt,
            "No Tokio runtime available, attempt runs without watchdog"
        );
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for operation::tracing.
    use super::*;

    /// Validates `RetryTracer::new` behavior for the retry tracer creation
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms `span.operation_name` equals `"test_operation"`.
    /// - Confirms `span.planned_retries` equals `3`.
    #[test]
    fn test_retry_tracer_creation() {
        let tracer = RetryTracer::new();
        let span = tracer.start_retry_span("test_operation", 3);
        assert_eq!(span.operation_name(), "test_operation");
        assert_eq!(span.planned_retries, 3);
    }

    /// Validates `RetryTracer::new` behavior for the span recording scenario.
    ///
    /// Assertion coverage: ensures the routine completes without panicking.
    #[test]
    fn test_span_recording() {
        let span = RetryTracer::new().start_retry_span("test_operation", 3);

        span.record_attempt(1);
        span.record_failure(1, "test error");
        span.record_backoff(1, Duration::from_millis(100));
        span.record_forever(Duration::from_millis(100));
        span.record_success(2, Some(Duration::from_secs(1)));
        span.record_exhausted(4, 3);
        span.record_timeout(Duration::from_secs(2), Duration::from_secs(1));
        span.record_stopped(2);
        span.record_reset();
        span.record_watchdog_unavailable(1);
    }
}
