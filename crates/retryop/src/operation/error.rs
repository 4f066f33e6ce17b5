// Entries of a retry operation's error log
use thiserror::Error;

use crate::error::RetryError;

/// One entry in a retry operation's error log
///
/// Caller failures are stored as given. The only entry the operation creates
/// itself is the timeout marker (`Retry(RetryError::Timeout { .. })`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperationError<E> {
    /// A failure reported through `retry(error)`
    #[error("{0}")]
    Failed(E),

    /// An error produced by the retry core
    #[error(transparent)]
    Retry(RetryError),
}

impl<E: std::fmt::Display> OperationError<E> {
    /// Display text; the grouping key used by `main_error()`
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl<E> OperationError<E> {
    /// Whether this entry is the wall-clock budget marker
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Retry(err) if err.is_timeout())
    }

    /// The caller-supplied failure, if this entry holds one
    pub fn as_failure(&self) -> Option<&E> {
        match self {
            Self::Failed(error) => Some(error),
            Self::Retry(_) => None,
        }
    }

    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(error) => Some(error),
            Self::Retry(_) => None,
        }
    }
}

impl<E> From<RetryError> for OperationError<E> {
    fn from(err: RetryError) -> Self {
        Self::Retry(err)
    }
}
