use crate::source::{ExtractionRequest, ExtractionService};
use rolodex_core::Record;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Wait after the `failures`-th failed attempt: `base_delay * 2^failures`.
    pub fn delay_after(&self, failures: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(failures))
    }
}

/// Shared cancellation flag. Waits wake as soon as it is cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (lock, condvar) = &*self.inner;
        let mut cancelled = lock.lock().unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks for up to `timeout`. Returns `true` if cancelled meanwhile.
    pub fn wait(&self, timeout: Duration) -> bool {
        let (lock, condvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = condvar
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Success(Vec<Record>),
    Failure(String),
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success(_))
    }
}

/// Calls `service` until it succeeds, the attempt budget runs out, or
/// `cancel` fires. Never returns an error: exhaustion becomes
/// [`ExtractionOutcome::Failure`] with a message fit for the operator.
pub fn extract_with_retry<S>(
    service: &S,
    request: &ExtractionRequest,
    policy: RetryPolicy,
    cancel: &CancelToken,
) -> ExtractionOutcome
where
    S: ExtractionService + ?Sized,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        if cancel.is_cancelled() {
            return ExtractionOutcome::Failure("extraction cancelled".to_string());
        }

        match service.extract(request) {
            Ok(records) => {
                debug!(
                    service = service.service_name(),
                    attempt,
                    records = records.len(),
                    "extraction succeeded"
                );
                return ExtractionOutcome::Success(records);
            }
            Err(err) => {
                warn!(
                    service = service.service_name(),
                    attempt,
                    error = %err,
                    "extraction attempt failed"
                );
                last_error = err.to_string();
            }
        }

        if attempt < attempts && cancel.wait(policy.delay_after(attempt)) {
            return ExtractionOutcome::Failure("extraction cancelled".to_string());
        }
    }

    ExtractionOutcome::Failure(format!(
        "failed to process input after {attempts} attempts: {last_error}"
    ))
}
