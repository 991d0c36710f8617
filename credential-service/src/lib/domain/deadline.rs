use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// Raised when a store-facing operation outlives its caller's deadline.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("deadline exceeded")]
pub struct DeadlineExceeded;

/// Caller-supplied deadline for store-facing operations.
///
/// When the deadline elapses the wrapped future is dropped. A dropped sqlx
/// transaction rolls back, so no partial write survives cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline; the operation runs to completion.
    pub fn none() -> Self {
        Self(None)
    }

    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self(Some(Instant::now() + timeout))
    }

    pub fn is_expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// Drive `future` to completion unless the deadline elapses first.
    ///
    /// # Errors
    /// * `E::from(DeadlineExceeded)` - Deadline elapsed before completion
    pub async fn run<F, T, E>(self, future: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<DeadlineExceeded>,
    {
        match self.0 {
            None => future.await,
            Some(at) => tokio::time::timeout_at(at, future)
                .await
                .map_err(|_| E::from(DeadlineExceeded))?,
        }
    }
}
