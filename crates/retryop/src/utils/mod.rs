//! Common utility functions
//!
//! - **[`serde`]**: Serialization helpers for durations and unbounded limits

pub mod serde;

// Re-export commonly used items for convenience
pub use self::serde::{duration_millis, unbounded_millis};
