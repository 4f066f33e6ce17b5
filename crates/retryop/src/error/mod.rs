//! Error types for retry orchestration
//!
//! The crate raises very few errors of its own. Work failures are never
//! thrown by the retry core; they are data handed to
//! [`RetryOperation::retry`](crate::operation::RetryOperation::retry). What
//! remains is:
//!
//! - **Configuration errors**, raised synchronously while options are built
//!   or a timeout sequence is computed (for example `min_timeout` greater than
//!   `max_timeout`).
//! - **The retry timeout marker**, a synthetic error inserted at the front of
//!   an operation's error log when its wall-clock budget runs out.
//! - **Serialization errors** produced while loading options from TOML.
//!
//! ## ErrorClassification
//!
//! Every error type implements [`ErrorClassification`] so callers can treat
//! them uniformly in monitoring:
//!
//! | Variant | retryable | severity |
//! |---------|-----------|----------|
//! | `Config` | no | Error |
//! | `Timeout` | no | Warning |
//! | `Serialization` | no | Error |

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Message carried by the timeout marker.
pub const TIMEOUT_MARKER_MESSAGE: &str = "RetryOperation timeout occurred";

/// Errors raised by the retry core itself
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetryError {
    /// Invalid options; never retried, surfaced at setup time
    #[error("{}", format_config(message, field.as_deref()))]
    Config { message: String, field: Option<String> },

    /// The wall-clock budget of a retry operation was used up
    #[error(
        "{} after {}ms (budget {}ms)",
        TIMEOUT_MARKER_MESSAGE,
        elapsed.as_millis(),
        budget.as_millis()
    )]
    Timeout { elapsed: Duration, budget: Duration },

    /// Options could not be parsed
    #[error("Serialization error ({format}): {message}")]
    Serialization { message: String, format: String },
}

fn format_config(message: &str, field: Option<&str>) -> String {
    match field {
        Some(field) => format!("Configuration error in field '{field}': {message}"),
        None => format!("Configuration error: {message}"),
    }
}

/// Result type for fallible setup operations
pub type RetryResult<T> = Result<T, RetryError>;

impl RetryError {
    /// Create a configuration error that is not tied to a single field
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), field: None }
    }

    /// Create a configuration error for a specific field
    pub fn config_field<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::Config { message: message.into(), field: Some(field.into()) }
    }

    /// Create the retry timeout marker
    pub fn timeout(elapsed: Duration, budget: Duration) -> Self {
        Self::Timeout { elapsed, budget }
    }

    /// Create a serialization error for the given format
    pub fn serialization<F: Into<String>, S: Into<String>>(format: F, message: S) -> Self {
        Self::Serialization { message: message.into(), format: format.into() }
    }

    /// Whether this is the timeout marker
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Key-value pairs suitable for structured logging
    pub fn to_log_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("severity", self.severity().to_string())];
        match self {
            Self::Config { field, .. } => {
                if let Some(field) = field {
                    fields.push(("field", field.clone()));
                }
            }
            Self::Timeout { elapsed, budget } => {
                fields.push(("elapsed_ms", elapsed.as_millis().to_string()));
                fields.push(("budget_ms", budget.as_millis().to_string()));
            }
            Self::Serialization { format, .. } => fields.push(("format", format.clone())),
        }
        fields
    }
}

/// Severity levels shared by all error types of the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// Standard interface for classifying errors
pub trait ErrorClassification {
    /// Can the failed operation be attempted again?
    fn is_retryable(&self) -> bool;

    /// How serious is this error?
    fn severity(&self) -> ErrorSeverity;

    /// Does this require immediate attention?
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Suggested delay before trying again, if any
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl ErrorClassification for RetryError {
    fn is_retryable(&self) -> bool {
        false
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Config { .. } | Self::Serialization { .. } => ErrorSeverity::Error,
            Self::Timeout { .. } => ErrorSeverity::Warning,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for error.
    use super::*;

    /// Validates the config error display scenario.
    ///
    /// Assertions:
    /// - Confirms the field name is rendered when present.
    /// - Confirms the plain form omits the field.
    #[test]
    fn test_config_error_display() {
        let err = RetryError::config_field("min_timeout", "must not exceed max_timeout");
        assert_eq!(
            err.to_string(),
            "Configuration error in field 'min_timeout': must not exceed max_timeout"
        );

        let err = RetryError::config("bad options");
        assert_eq!(err.to_string(), "Configuration error: bad options");
        assert!(err.is_config());
    }

    /// Validates the timeout marker display scenario.
    ///
    /// Assertions:
    /// - Ensures the message starts with the marker text.
    /// - Ensures elapsed and budget are rendered in milliseconds.
    #[test]
    fn test_timeout_marker_display() {
        let err = RetryError::timeout(Duration::from_millis(620), Duration::from_millis(500));
        let message = err.to_string();

        assert!(message.starts_with(TIMEOUT_MARKER_MESSAGE));
        assert!(message.contains("620ms"));
        assert!(message.contains("budget 500ms"));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_classification() {
        let config = RetryError::config("x");
        let timeout = RetryError::timeout(Duration::ZERO, Duration::ZERO);

        assert!(!config.is_retryable());
        assert_eq!(config.severity(), ErrorSeverity::Error);
        assert_eq!(timeout.severity(), ErrorSeverity::Warning);
        assert!(!timeout.is_critical());
        assert_eq!(timeout.retry_after(), None);
    }

    #[test]
    fn test_log_fields() {
        let err = RetryError::timeout(Duration::from_secs(2), Duration::from_secs(1));
        let fields = err.to_log_fields();

        assert!(fields.contains(&("severity", "WARNING".to_string())));
        assert!(fields.contains(&("elapsed_ms", "2000".to_string())));
        assert!(fields.contains(&("budget_ms", "1000".to_string())));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Info < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
        assert_eq!(ErrorSeverity::Critical.to_string(), "CRITICAL");
    }
}
