//! # Retry Policy
//!
//! One reusable retry-with-backoff abstraction, applied uniformly instead
//! of being reimplemented at each call site.
//!
//! ## Where Retrying Is Allowed
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Retry Discipline                                  │
//! │                                                                         │
//! │  ✅ SAFE TO RETRY                     ❌ NEVER BLIND-RETRIED            │
//! │  ─────────────────────────────        ───────────────────────────       │
//! │  • Read-only lookups                  • Return processing (multi-step   │
//! │  • Sequence counter increments          side effects; duplicating       │
//! │    (single atomic statement)            ReturnItems is worse than       │
//! │                                         failing loudly)                 │
//! │                                       • Checkout persistence           │
//! │                                                                         │
//! │  The retryable predicate decides per error KIND: only transient        │
//! │  contention/connection failures requalify; constraint violations       │
//! │  and missing rows fail immediately.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;

// =============================================================================
// Retry Policy
// =============================================================================

/// Bounded exponential backoff: `max_attempts` tries total, starting at
/// `base_delay` and multiplying by `multiplier` between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first (1 = no retries).
    pub max_attempts: u32,

    /// Delay before the first retry.
    pub base_delay: Duration,

    /// Exponential multiplier applied per retry.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(50),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given bounds.
    pub fn new(max_attempts: u32, base_delay: Duration, multiplier: f64) -> Self {
        RetryPolicy {
            max_attempts,
            base_delay,
            multiplier,
        }
    }

    /// A policy that never retries. For operations with non-idempotent
    /// side effects.
    pub fn no_retry() -> Self {
        RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Runs `op`, retrying failures that `is_retryable` approves until the
    /// attempt budget is exhausted. The final error is surfaced unchanged.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let value = policy
    ///     .run(|| store.next_value("TRX"), DbError::is_transient)
    ///     .await?;
    /// ```
    pub async fn run<T, E, Op, Fut, P>(&self, mut op: Op, is_retryable: P) -> Result<T, E>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let max = self.max_attempts.max(1);
        let attempts = AtomicU32::new(0);
        let is_retryable = &is_retryable;

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.base_delay)
            .with_multiplier(self.multiplier)
            .with_randomization_factor(0.1)
            // Attempt count, not wall clock, bounds the loop
            .with_max_elapsed_time(None)
            .build();

        backoff::future::retry(policy, || {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            let fut = op();
            async move {
                match fut.await {
                    Ok(value) => Ok(value),
                    Err(e) if attempt < max && is_retryable(&e) => {
                        Err(backoff::Error::transient(e))
                    }
                    Err(e) => Err(backoff::Error::permanent(e)),
                }
            }
        })
        .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1), 1.0)
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = fast_policy(5)
            .run(
                || {
                    let n = calls.fetch_add(1, Ordering::Relaxed) + 1;
                    async move {
                        if n < 3 {
                            Err("transient")
                        } else {
                            Ok(n)
                        }
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = fast_policy(5)
            .run(
                || {
                    calls.fetch_add(1, Ordering::Relaxed);
                    async { Err("permanent") }
                },
                |_| false,
            )
            .await;

        assert_eq!(result, Err("permanent"));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_attempt_budget_exhaustion() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = fast_policy(3)
            .run(
                || {
                    calls.fetch_add(1, Ordering::Relaxed);
                    async { Err("still down") }
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Err("still down"));
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_no_retry_policy() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = RetryPolicy::no_retry()
            .run(
                || {
                    calls.fetch_add(1, Ordering::Relaxed);
                    async { Err("nope") }
                },
                |_| true,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }
}
