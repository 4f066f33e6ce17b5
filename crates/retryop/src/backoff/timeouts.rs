// Timeout sequence generation with exponential growth and optional jitter
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::backoff::constants::{JITTER_HIGH, JITTER_LOW, MIN_BASE_MILLIS};
use crate::config::RetryOptions;
use crate::error::{RetryError, RetryResult};

/// The fields that drive a single delay computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeoutParameters {
    /// Growth multiplier, not restricted to integers
    pub factor: f64,
    /// Floor of the first delay
    pub min_timeout: Duration,
    /// Ceiling of every delay (`None` = unbounded)
    pub max_timeout: Option<Duration>,
    /// Multiply by a random factor in `[1, 2)`
    pub randomize: bool,
}

impl Default for TimeoutParameters {
    fn default() -> Self {
        RetryOptions::default().timeout_parameters()
    }
}

impl TimeoutParameters {
    /// Check the invariants a delay computation relies on
    pub fn validate(&self) -> RetryResult<()> {
        if let Some(max_timeout) = self.max_timeout {
            if self.min_timeout > max_timeout {
                return Err(RetryError::config_field(
                    "min_timeout",
                    format!(
                        "min_timeout ({}ms) is greater than max_timeout ({}ms)",
                        self.min_timeout.as_millis(),
                        max_timeout.as_millis()
                    ),
                ));
            }
        }

        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(RetryError::config_field(
                "factor",
                format!("factor must be a positive finite number, got {}", self.factor),
            ));
        }

        Ok(())
    }
}

/// An immutable, ascending run of delays
///
/// Cloning shares the underlying storage, so an operation can keep the
/// original sequence around for `reset()` without copying it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeoutSequence {
    delays: Arc<[Duration]>,
}

impl TimeoutSequence {
    /// Take caller-chosen delays verbatim, in the given order
    pub fn explicit(delays: Vec<Duration>) -> Self {
        Self { delays: delays.into() }
    }

    pub fn as_slice(&self) -> &[Duration] {
        &self.delays
    }

    /// Last (largest, for computed sequences) delay
    pub fn last(&self) -> Option<Duration> {
        self.delays.last().copied()
    }

    /// Total time the sequence would spend waiting if fully consumed
    pub fn total(&self) -> Duration {
        self.delays.iter().fold(Duration::ZERO, |acc, delay| acc.saturating_add(*delay))
    }
}

impl Deref for TimeoutSequence {
    type Target = [Duration];

    fn deref(&self) -> &Self::Target {
        &self.delays
    }
}

impl From<Vec<Duration>> for TimeoutSequence {
    fn from(delays: Vec<Duration>) -> Self {
        Self::explicit(delays)
    }
}

/// Compute the delay before retry number `attempt` (zero-based)
///
/// `round(jitter * max(min_timeout, 1ms) * factor^attempt)`, clamped to
/// `max_timeout`. Results too large to represent saturate.
pub fn compute_delay(attempt: u32, params: &TimeoutParameters) -> Duration {
    let jitter =
        if params.randomize { rand::thread_rng().gen_range(JITTER_LOW..JITTER_HIGH) } else { 1.0 };

    let base = (params.min_timeout.as_millis() as f64).max(MIN_BASE_MILLIS);
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let raw = (jitter * base * params.factor.powi(exponent)).round();

    let ceiling = params
        .max_timeout
        .map_or(u64::MAX as f64, |max_timeout| max_timeout.as_millis() as f64);

    // `as` saturates: +inf lands on u64::MAX and NaN on zero.
    Duration::from_millis(raw.min(ceiling) as u64)
}

/// Compute the full timeout sequence for `options`
///
/// Produces `retries` entries, or exactly one when forever mode is on and no
/// finite retries were requested, so the forever cache is never empty.
pub fn compute_sequence(options: &RetryOptions) -> RetryResult<TimeoutSequence> {
    let params = options.timeout_parameters();
    params.validate()?;

    let retries = options.retries.count();
    let mut delays: Vec<Duration> =
        (0..retries).map(|attempt| compute_delay(attempt, &params)).collect();

    if options.resolved_forever() && delays.is_empty() {
        delays.push(compute_delay(retries, &params));
    }

    delays.sort_unstable();
    Ok(TimeoutSequence::explicit(delays))
}
