//! Timeout sequence generation
//!
//! Pure functions turning [`RetryOptions`](crate::config::RetryOptions) into
//! the ordered delays a retry operation waits between attempts:
//!
//! - [`compute_delay`]: one delay, `round(jitter * max(min, 1ms) *
//!   factor^n)` clamped to the ceiling
//! - [`compute_sequence`]: `retries` delays (one in forever mode when no
//!   finite retries were asked for), sorted ascending
//!
//! ```rust
//! use std::time::Duration;
//!
//! use retryop::backoff::{compute_sequence, TimeoutSequence};
//! use retryop::config::RetryOptions;
//!
//! let options = RetryOptions::builder()
//!     .retries(4)
//!     .min_timeout(Duration::from_millis(100))
//!     .max_timeout(Duration::from_millis(500))
//!     .build()
//!     .unwrap();
//!
//! let sequence: TimeoutSequence = compute_sequence(&options).unwrap();
//! let millis: Vec<u128> = sequence.iter().map(Duration::as_millis).collect();
//! assert_eq!(millis, vec![100, 200, 400, 500]);
//! ```

pub mod constants;
pub mod timeouts;

pub use timeouts::{compute_delay, compute_sequence, TimeoutParameters, TimeoutSequence};
