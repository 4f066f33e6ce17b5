//! Testing utilities
//!
//! - **[`time`]**: Clock abstraction with a controllable [`MockClock`]
//!
//! ```rust
//! use std::time::Duration;
//!
//! use retryop::config::RetryOptions;
//! use retryop::operation::RetryOperation;
//! use retryop::testing::MockClock;
//!
//! let clock = MockClock::new();
//! let options = RetryOptions::builder().max_retry_time(Duration::from_secs(1)).build().unwrap();
//! let operation = RetryOperation::<std::io::Error, _>::with_clock(&options, clock.clone()).unwrap();
//!
//! // The operation's budget now follows `clock.advance(..)`.
//! assert_eq!(operation.max_retry_time(), Some(Duration::from_secs(1)));
//! ```

pub mod time;

pub use time::{Clock, MockClock, SystemClock};
