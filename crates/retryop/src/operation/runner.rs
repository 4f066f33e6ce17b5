// Async driver over a retry operation
use std::fmt;
use std::future::Future;

use super::core::{build_operation, RetryOperation};
use super::error::OperationError;
use super::watchdog::Watchdog;
use crate::config::RetryOptions;
use crate::time::Clock;

impl<E, C> RetryOperation<E, C>
where
    E: fmt::Display + Clone,
    C: Clock,
{
    /// Drive `work` until it succeeds or the operation gives up
    ///
    /// `work` receives the attempt number. On failure the error goes through
    /// [`RetryOperation::retry`]; once that refuses, the result is the
    /// operation's [`main_error`](RetryOperation::main_error).
    pub async fn run<F, Fut, T>(&mut self, work: F) -> Result<T, OperationError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_with(None, work).await
    }

    /// Like [`run`](Self::run), arming `watchdog` for every attempt
    pub async fn run_with<F, Fut, T>(
        &mut self,
        watchdog: Option<Watchdog>,
        mut work: F,
    ) -> Result<T, OperationError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.begin(watchdog);
        self.schedule_watchdog();

        loop {
            match work(self.attempts()).await {
                Ok(value) => {
                    self.succeed();
                    return Ok(value);
                }
                Err(error) => {
                    if !self.retry(error).await {
                        let Some(main) = self.main_error().cloned() else {
                            unreachable!("a refused retry always records its error");
                        };
                        return Err(main);
                    }
                }
            }
        }
    }
}

/// Build an operation from `options` and drive `work` through it
///
/// Invalid options surface as `OperationError::Retry` before any attempt.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use retryop::config::RetryOptions;
/// use retryop::operation::retry_with;
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let options = RetryOptions::builder()
///     .retries(3)
///     .min_timeout(Duration::from_millis(5))
///     .build()
///     .unwrap();
///
/// let value = retry_with(&options, |attempt| async move {
///     if attempt < 3 { Err(format!("attempt {attempt} failed")) } else { Ok(attempt) }
/// })
/// .await
/// .unwrap();
///
/// assert_eq!(value, 3);
/// # }
/// ```
pub async fn retry_with<E, F, Fut, T>(
    options: &RetryOptions,
    work: F,
) -> Result<T, OperationError<E>>
where
    E: fmt::Display + Clone,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut operation = build_operation::<E>(options).map_err(OperationError::Retry)?;
    operation.run(work).await
}
