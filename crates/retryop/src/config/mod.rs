//! Retry options
//!
//! [`RetryOptions`] is the single inbound configuration record. Every field is
//! optional with a documented default, so options can be written by hand,
//! assembled with [`RetryOptionsBuilder`], or loaded from TOML:
//!
//! ```rust
//! use std::time::Duration;
//!
//! use retryop::config::{Retries, RetryOptions};
//!
//! let options = RetryOptions::from_toml_str(
//!     r#"
//!     retries = 5
//!     min_timeout = 200
//!     max_timeout = 5000
//!     max_retry_time = "unlimited"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(options.retries, Retries::Limited(5));
//! assert_eq!(options.max_timeout, Some(Duration::from_secs(5)));
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::backoff::constants::{
    DEFAULT_FACTOR, DEFAULT_MIN_TIMEOUT, DEFAULT_RANDOMIZE, DEFAULT_RETRIES,
};
use crate::backoff::TimeoutParameters;
use crate::error::{RetryError, RetryResult};
use crate::utils::serde::{is_unbounded_keyword, LimitVisitor, UNBOUNDED_KEYWORD};
use crate::utils::{duration_millis, unbounded_millis};

/// How many retries a timeout sequence plans for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Retries {
    /// A fixed number of retries after the initial attempt
    Limited(u32),
    /// Retry without a count limit; implies forever mode
    Unlimited,
}

impl Retries {
    /// Number of entries a finite sequence gets (zero for `Unlimited`)
    pub fn count(self) -> u32 {
        match self {
            Self::Limited(count) => count,
            Self::Unlimited => 0,
        }
    }

    pub fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

impl Default for Retries {
    fn default() -> Self {
        Self::Limited(DEFAULT_RETRIES)
    }
}

impl From<u32> for Retries {
    fn from(count: u32) -> Self {
        Self::Limited(count)
    }
}

impl fmt::Display for Retries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(count) => write!(f, "{count}"),
            Self::Unlimited => f.write_str(UNBOUNDED_KEYWORD),
        }
    }
}

impl Serialize for Retries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Limited(count) => serializer.serialize_u32(*count),
            Self::Unlimited => serializer.serialize_str(UNBOUNDED_KEYWORD),
        }
    }
}

impl<'de> Deserialize<'de> for Retries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let limit = deserializer
            .deserialize_any(LimitVisitor { expecting: "a retry count or \"unlimited\"" })?;
        match limit {
            None => Ok(Self::Unlimited),
            Some(count) => u32::try_from(count).map(Self::Limited).map_err(|_| {
                serde::de::Error::custom(format!("retry count {count} does not fit in u32"))
            }),
        }
    }
}

impl std::str::FromStr for Retries {
    type Err = RetryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if is_unbounded_keyword(value) {
            return Ok(Self::Unlimited);
        }
        value
            .trim()
            .parse::<u32>()
            .map(Self::Limited)
            .map_err(|e| RetryError::config_field("retries", format!("'{value}': {e}")))
    }
}

/// Options for building a timeout sequence and a retry operation
///
/// Defaults: `retries = 10`, `factor = 2`, `min_timeout = 1000ms`,
/// `max_timeout = unbounded`, `randomize = false`, `forever = false`,
/// `max_retry_time = unbounded`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryOptions {
    /// Planned retries after the initial attempt
    pub retries: Retries,
    /// Growth multiplier between consecutive delays
    pub factor: f64,
    /// Floor of the first delay
    #[serde(with = "duration_millis", alias = "minTimeout")]
    pub min_timeout: Duration,
    /// Ceiling applied to every delay (`None` = unbounded)
    #[serde(with = "unbounded_millis", alias = "maxTimeout")]
    pub max_timeout: Option<Duration>,
    /// Multiply each delay by a random factor in `[1, 2)`
    pub randomize: bool,
    /// Keep retrying with the last delay once the sequence is used up
    pub forever: bool,
    /// Wall-clock budget measured from the first attempt (`None` = unbounded)
    #[serde(with = "unbounded_millis", alias = "maxRetryTime")]
    pub max_retry_time: Option<Duration>,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            retries: Retries::default(),
            factor: DEFAULT_FACTOR,
            min_timeout: DEFAULT_MIN_TIMEOUT,
            max_timeout: None,
            randomize: DEFAULT_RANDOMIZE,
            forever: false,
            max_retry_time: None,
        }
    }
}

impl RetryOptions {
    /// Create a configuration builder
    pub fn builder() -> RetryOptionsBuilder {
        RetryOptionsBuilder::new()
    }

    /// Parse options from a TOML document and validate them
    ///
    /// Missing keys take their defaults. Both `snake_case` and the camelCase
    /// spellings (`minTimeout`, `maxTimeout`, `maxRetryTime`) are accepted.
    pub fn from_toml_str(source: &str) -> RetryResult<Self> {
        let options: Self =
            toml::from_str(source).map_err(|e| RetryError::serialization("TOML", e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Render the options as a TOML document
    pub fn to_toml_string(&self) -> RetryResult<String> {
        toml::to_string(self).map_err(|e| RetryError::serialization("TOML", e.to_string()))
    }

    /// Forever mode as resolved for an operation: explicit flag or unlimited
    /// retries
    pub fn resolved_forever(&self) -> bool {
        self.forever || self.retries.is_unlimited()
    }

    /// The subset of fields that drives delay computation
    pub fn timeout_parameters(&self) -> TimeoutParameters {
        TimeoutParameters {
            factor: self.factor,
            min_timeout: self.min_timeout,
            max_timeout: self.max_timeout,
            randomize: self.randomize,
        }
    }

    /// Validate the options
    pub fn validate(&self) -> RetryResult<()> {
        self.timeout_parameters().validate()
    }
}

/// Builder for [`RetryOptions`] with fluent API
#[derive(Debug, Default)]
pub struct RetryOptionsBuilder {
    options: RetryOptions,
}

impl RetryOptionsBuilder {
    pub fn new() -> Self {
        Self { options: RetryOptions::default() }
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.options.retries = Retries::Limited(retries);
        self
    }

    pub fn unlimited_retries(mut self) -> Self {
        self.options.retries = Retries::Unlimited;
        self
    }

    pub fn factor(mut self, factor: f64) -> Self {
        self.options.factor = factor;
        self
    }

    pub fn min_timeout(mut self, timeout: Duration) -> Self {
        self.options.min_timeout = timeout;
        self
    }

    pub fn max_timeout(mut self, timeout: Duration) -> Self {
        self.options.max_timeout = Some(timeout);
        self
    }

    pub fn unbounded_timeout(mut self) -> Self {
        self.options.max_timeout = None;
        self
    }

    pub fn randomize(mut self, randomize: bool) -> Self {
        self.options.randomize = randomize;
        self
    }

    pub fn forever(mut self, forever: bool) -> Self {
        self.options.forever = forever;
        self
    }

    pub fn max_retry_time(mut self, budget: Duration) -> Self {
        self.options.max_retry_time = Some(budget);
        self
    }

    pub fn unlimited_time(mut self) -> Self {
        self.options.max_retry_time = None;
        self
    }

    pub fn build(self) -> RetryResult<RetryOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}
