//! Retry operations
//!
//! - **[`RetryOperation`]**: stateful retry controller over a timeout
//!   sequence, with error log, wall-clock budget, and stop/reset
//! - **[`Watchdog`]**: per-attempt time limit with a callback
//! - **[`StopHandle`]**: stops an operation from another task
//! - **[`retry_with`]**: one-call async driver
//!
//! Usage:
//!
//! ```rust
//! use std::time::Duration;
//!
//! use retryop::config::RetryOptions;
//! use retryop::operation::{build_operation, OperationState};
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let options = RetryOptions::builder()
//!     .retries(1)
//!     .min_timeout(Duration::from_millis(50))
//!     .build()
//!     .unwrap();
//! let mut operation = build_operation::<String>(&options).unwrap();
//!
//! operation.attempt(|_| {});
//! assert!(operation.retry("busy".to_string()).await);
//! operation.succeed();
//! assert_eq!(operation.state(), OperationState::Succeeded);
//! # }
//! ```

pub mod core;
pub mod error;
pub mod runner;
pub mod tracing;
pub mod watchdog;

pub use self::core::{build_operation, OperationState, RetryOperation};
pub use self::error::OperationError;
pub use self::runner::retry_with;
pub use self::tracing::{RetrySpan, RetryTracer};
pub use self::watchdog::{StopHandle, Watchdog};
