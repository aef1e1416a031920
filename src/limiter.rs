//! Admission control capability
//!
//! A [`Limiter`] is a rate limiter or circuit breaker supplied by the
//! application. The options only carry a shared reference to it; the pool
//! consults it before each operation.

use crate::metrics::{counters, labels};
use crate::{BoxError, Error, Result};
use std::future::Future;

/// Failure reported to a limiter: the operation's own error, borrowed as-is.
pub type OperationError = dyn std::error::Error + Send + Sync + 'static;

/// Rate limiter or circuit breaker.
///
/// For every successful [`allow`](Limiter::allow) the caller must call
/// [`report_result`](Limiter::report_result) exactly once. [`Admission`]
/// enforces that pairing.
pub trait Limiter: Send + Sync {
    /// Returns `Ok(())` if the next operation may proceed, or the reason it may not.
    fn allow(&self) -> std::result::Result<(), BoxError>;

    /// Reports the outcome of an operation admitted by a prior `allow`.
    ///
    /// Errors are whatever the operation failed with; downcast to inspect them.
    fn report_result(&self, result: std::result::Result<(), &OperationError>);
}

/// An admitted operation awaiting its result.
///
/// Consumed by [`report`](Admission::report). If dropped unreported, the
/// limiter receives [`Error::Abandoned`].
#[must_use = "an admitted operation must report its result"]
pub struct Admission<'a> {
    limiter: &'a dyn Limiter,
    reported: bool,
}

impl<'a> Admission<'a> {
    /// Ask the limiter for permission.
    pub fn acquire(limiter: &'a dyn Limiter) -> Result<Self> {
        match limiter.allow() {
            Ok(()) => {
                counters::admission(labels::OUTCOME_ALLOWED);
                Ok(Self {
                    limiter,
                    reported: false,
                })
            }
            Err(reason) => {
                counters::admission(labels::OUTCOME_DENIED);
                tracing::debug!(reason = %reason, "limiter denied operation");
                Err(Error::LimiterDenied(reason))
            }
        }
    }

    /// Report the operation's outcome.
    pub fn report(mut self, result: std::result::Result<(), &OperationError>) {
        self.reported = true;
        self.limiter.report_result(result);
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        if !self.reported {
            counters::admission(labels::OUTCOME_ABANDONED);
            tracing::warn!("admitted operation dropped without a result");
            self.limiter.report_result(Err(&Error::Abandoned));
        }
    }
}

impl std::fmt::Debug for Admission<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admission")
            .field("reported", &self.reported)
            .finish_non_exhaustive()
    }
}

/// Run `op` under admission control.
///
/// Without a limiter the operation runs directly. A denied operation is never
/// started and yields [`Error::LimiterDenied`] in the outer result. An
/// admitted one reports its outcome, then its own result is returned
/// untouched in the inner result.
///
/// ```
/// use kv_options::limiter::admit;
///
/// # tokio_test::block_on(async {
/// let reply = admit(None, || async { Ok::<_, std::io::Error>("PONG") }).await?;
/// assert_eq!(reply.unwrap(), "PONG");
/// # Ok::<(), kv_options::Error>(())
/// # }).unwrap();
/// ```
pub async fn admit<F, Fut, T, E>(
    limiter: Option<&dyn Limiter>,
    op: F,
) -> Result<std::result::Result<T, E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let Some(limiter) = limiter else {
        return Ok(op().await);
    };

    let admission = Admission::acquire(limiter)?;
    let result = op().await;
    admission.report(match &result {
        Ok(_) => Ok(()),
        Err(e) => Err(e as &OperationError),
    });
    Ok(result)
}
