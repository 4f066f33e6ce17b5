//! Exponential-backoff retry operations.
//!
//! Computes retry delay sequences from a small options record and drives a
//! stateful retry operation over them: attempt counting, error history,
//! most-frequent error, wall-clock budget, forever mode, and per-attempt
//! watchdogs.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: errors, options, timeout sequences (no async runtime)
//! - `observability`: structured logging through `tracing`
//! - `runtime`: retry operations, timers, clocks (enabled by default)
//! - `test-utils`: testing helpers such as [`testing::MockClock`]
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use retryop::{retry_with, RetryOptions};
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let options = RetryOptions::builder()
//!     .retries(5)
//!     .min_timeout(Duration::from_millis(100))
//!     .randomize(true)
//!     .build()
//!     .unwrap();
//!
//! let body = retry_with(&options, |attempt| async move {
//!     if attempt == 1 { Err("connection refused".to_string()) } else { Ok("payload") }
//! })
//! .await
//! .unwrap();
//! assert_eq!(body, "payload");
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod backoff;
#[cfg(feature = "foundation")]
pub mod config;
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod utils;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod operation;
#[cfg(feature = "runtime")]
pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "runtime", feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use backoff::{compute_delay, compute_sequence, TimeoutParameters, TimeoutSequence};
#[cfg(feature = "foundation")]
pub use config::{Retries, RetryOptions, RetryOptionsBuilder};
#[cfg(feature = "foundation")]
pub use error::{ErrorClassification, ErrorSeverity, RetryError, RetryResult};
#[cfg(feature = "runtime")]
pub use operation::{
    build_operation, retry_with, OperationError, OperationState, RetryOperation, StopHandle,
    Watchdog,
};
#[cfg(feature = "foundation")]
pub use utils::serde::{duration_millis, unbounded_millis};
