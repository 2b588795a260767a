// ABOUTME: Time-budgeted retry engine with jittered intervals.
// ABOUTME: Operations tag their failures as retriable or fatal; the loop is purely mechanical.

use rand::Rng;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Default pause between attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Default jitter bound applied to each pause.
pub const DEFAULT_JITTER: Duration = Duration::from_millis(500);

/// Timing parameters for a single retry call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total time allowed across all attempts.
    pub budget: Duration,
    /// Base pause between attempts.
    pub interval: Duration,
    /// Each pause is `interval ± random(0, jitter)`.
    pub jitter: Duration,
}

impl RetryPolicy {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            interval: DEFAULT_INTERVAL,
            jitter: DEFAULT_JITTER,
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Draw the pause before the next attempt. Never negative.
    pub fn next_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.interval;
        }

        let mut rng = rand::thread_rng();
        let offset = Duration::from_nanos(rng.gen_range(0..=saturating_nanos(self.jitter)));
        if rng.gen_bool(0.5) {
            self.interval.saturating_add(offset)
        } else {
            self.interval.saturating_sub(offset)
        }
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Failure reported by a single attempt.
#[derive(Debug)]
pub enum Attempt<E> {
    /// Worth trying again after a pause.
    Retriable(E),
    /// Stop immediately and surface the cause.
    Fatal(E),
}

/// Why a retry call gave up.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// The budget ran out while failures kept recurring.
    #[error("timed out after {attempts} attempt(s) in {elapsed:?}: {last}")]
    Timeout {
        attempts: u32,
        elapsed: Duration,
        last: E,
    },

    /// The operation reported a fatal failure.
    #[error("{0}")]
    Aborted(E),
}

impl<E> RetryError<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RetryError::Timeout { .. })
    }

    /// The underlying cause, whichever way the call ended.
    pub fn cause(&self) -> &E {
        match self {
            RetryError::Timeout { last, .. } => last,
            RetryError::Aborted(e) => e,
        }
    }
}

/// Run `op` until it succeeds, fails fatally, or the policy's budget is spent.
///
/// At least one attempt is always made, even with a zero budget. The budget is
/// checked after each failed attempt, so the call can overrun it by at most one
/// pause plus one attempt.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Attempt<E>>>,
    E: fmt::Display,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let cause = match op().await {
            Ok(value) => {
                tracing::debug!(attempts, "attempt succeeded");
                return Ok(value);
            }
            Err(Attempt::Fatal(e)) => {
                tracing::debug!(attempts, error = %e, "attempt failed fatally");
                return Err(RetryError::Aborted(e));
            }
            Err(Attempt::Retriable(e)) => e,
        };

        let elapsed = start.elapsed();
        if elapsed >= policy.budget {
            tracing::debug!(attempts, ?elapsed, error = %cause, "retry budget exhausted");
            return Err(RetryError::Timeout {
                attempts,
                elapsed,
                last: cause,
            });
        }

        let delay = policy.next_delay();
        tracing::debug!(attempts, ?delay, error = %cause, "attempt failed, retrying");
        tokio::time::sleep(delay).await;
    }
}

/// Poll `fetch` until `ready` holds for the fetched value.
///
/// Each attempt re-queries remote state. A fetch error and an unready value
/// are both retriable; `not_ready` builds the cause reported for the latter.
pub async fn poll_until<T, E, F, Fut, P, N>(
    policy: &RetryPolicy,
    mut fetch: F,
    ready: P,
    not_ready: N,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&T) -> bool,
    N: Fn(&T) -> E,
    E: fmt::Display,
{
    let ready = &ready;
    let not_ready = &not_ready;
    retry(policy, || {
        let fut = fetch();
        async move {
            let value = fut.await.map_err(Attempt::Retriable)?;
            if ready(&value) {
                Ok(value)
            } else {
                Err(Attempt::Retriable(not_ready(&value)))
            }
        }
    })
    .await
}
