//! Time utilities and abstractions
//!
//! - **Clock abstractions**: real and mock time for budget accounting
//!   (re-exported from testing)
//! - **[`timer`]**: cancellable one-shot callbacks and stoppable delays

pub mod timer;

// Re-export commonly used items
pub use timer::{delay, timeout, TimerHandle, Wakeup};

// Re-export Clock abstractions from testing module
pub use crate::testing::time::{Clock, MockClock, SystemClock};
