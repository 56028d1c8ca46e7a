//! Bounded retry with linear backoff.
//!
//! The policy is separate from the transport: [`RetryPolicy::run`] drives any
//! factory of fallible futures, so it can be exercised with a counting
//! closure instead of a network.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use reqwest::Method;

use super::error::ApiError;

/// Which failures a retrying policy retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryEligibility {
    /// Every failure is retried until the attempt budget is spent.
    #[default]
    All,
    /// Only transport failures, timeouts and HTTP 408/429/502/503/504.
    Transient,
}

impl std::str::FromStr for RetryEligibility {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "transient" => Ok(Self::Transient),
            other => Err(format!("expected 'all' or 'transient', got '{other}'")),
        }
    }
}

/// Attempt budget and backoff schedule for one logical request.
///
/// After attempt `n` fails, the policy waits `base_delay * n` before attempt
/// `n + 1`. With the defaults (3 attempts, 150ms) that is 150ms then 300ms.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use moliyachi_client::http::RetryPolicy;
/// use reqwest::Method;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.backoff_after(1), Duration::from_millis(150));
/// assert_eq!(policy.backoff_after(2), Duration::from_millis(300));
///
/// assert_eq!(policy.for_method(&Method::GET).max_attempts(), 3);
/// assert_eq!(policy.for_method(&Method::POST).max_attempts(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
    eligibility: RetryEligibility,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_BASE_DELAY)
    }
}

impl RetryPolicy {
    /// Attempts made for safe methods by default.
    pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
    /// Backoff unit by default.
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(150);

    /// Creates a policy. A budget of zero is raised to one attempt.
    #[must_use]
    pub const fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            base_delay,
            eligibility: RetryEligibility::All,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Replaces the retry eligibility.
    #[must_use]
    pub const fn with_eligibility(mut self, eligibility: RetryEligibility) -> Self {
        self.eligibility = eligibility;
        self
    }

    /// Total attempts allowed, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// The backoff unit.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Which failures are retried.
    #[must_use]
    pub const fn eligibility(&self) -> RetryEligibility {
        self.eligibility
    }

    /// The policy applied to a request using `method`.
    ///
    /// Only GET is treated as safe to retry; every other method gets a
    /// single attempt.
    #[must_use]
    pub fn for_method(&self, method: &Method) -> Self {
        if *method == Method::GET {
            *self
        } else {
            Self {
                max_attempts: 1,
                ..*self
            }
        }
    }

    /// Delay after the failed 1-based `attempt`, before the next one.
    #[must_use]
    pub fn backoff_after(&self, attempt: usize) -> Duration {
        let multiplier = u32::try_from(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(multiplier)
    }

    /// Whether an [`ApiError`] is eligible for another attempt.
    ///
    /// Cancelled requests are never retried.
    #[must_use]
    pub fn should_retry(&self, error: &ApiError) -> bool {
        if error.is_cancelled() {
            return false;
        }
        match self.eligibility {
            RetryEligibility::All => true,
            RetryEligibility::Transient => error.is_transient(),
        }
    }

    /// Runs `factory` until it succeeds, the budget is spent, or
    /// `is_retryable` rejects an error.
    ///
    /// `factory` receives the 1-based attempt number. Attempts are strictly
    /// sequential: attempt `n + 1` starts only after attempt `n` failed and
    /// its backoff elapsed. The error of the last attempt is returned.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `factory`.
    pub async fn run<A, E, F, Fut, R>(&self, mut factory: F, is_retryable: R) -> Result<A, E>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<A, E>>,
        R: Fn(&E) -> bool,
        E: Display,
    {
        let mut attempt = 1;
        loop {
            match factory(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_attempts && is_retryable(&error) => {
                    let delay = self.backoff_after(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        %error,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
