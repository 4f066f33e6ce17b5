// Constants for the backoff module
use std::time::Duration;

/// Default number of retries after the initial attempt
pub const DEFAULT_RETRIES: u32 = 10;

/// Default growth factor between consecutive delays
pub const DEFAULT_FACTOR: f64 = 2.0;

/// Default floor of the first delay
pub const DEFAULT_MIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Randomization is off unless asked for
pub const DEFAULT_RANDOMIZE: bool = false;

/// Smallest base delay in milliseconds; a zero floor still grows
pub const MIN_BASE_MILLIS: f64 = 1.0;

/// Lower bound (inclusive) of the randomization multiplier
pub const JITTER_LOW: f64 = 1.0;

/// Upper bound (exclusive) of the randomization multiplier
pub const JITTER_HIGH: f64 = 2.0;
