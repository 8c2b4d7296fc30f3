//! Fixed-delay retry policy for delivery attempts.
//!
//! Every attempt is a fresh transport call. A transient failure waits
//! `delay` and tries again until `max_attempts` calls have been made; a
//! permanent failure stops immediately. There is no backoff growth and no
//! jitter. The wait between attempts races the caller's cancellation token.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use courier_common::types::Channel;

use crate::error::TransportError;
use crate::outcome::DispatchOutcome;

/// Default total attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default wait between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `attempt` until it succeeds, fails permanently, runs out of
    /// attempts or `cancel` fires. `attempt` receives the 1-based attempt number.
    pub async fn run<F, Fut>(
        &self,
        channel: Channel,
        cancel: &CancellationToken,
        mut attempt: F,
    ) -> DispatchOutcome
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<(), TransportError>>,
    {
        let mut made = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Self::cancelled(channel, made, "cancelled before delivery was attempted");
            }

            made += 1;
            let err = match attempt(made).await {
                Ok(()) => {
                    tracing::info!(%channel, attempts = made, "Notification delivered");
                    return DispatchOutcome::Delivered {
                        channel,
                        attempts: made,
                    };
                }
                Err(err) => err,
            };

            if !err.is_transient() {
                tracing::error!(
                    %channel,
                    attempt = made,
                    error = %err,
                    "Delivery failed permanently, not retrying"
                );
                return DispatchOutcome::FailedPermanent {
                    channel,
                    attempts: made,
                    reason: err.message().to_string(),
                };
            }

            if made >= self.max_attempts {
                tracing::warn!(
                    %channel,
                    attempts = made,
                    error = %err,
                    "Delivery failed after exhausting retries"
                );
                return DispatchOutcome::FailedAfterRetries {
                    channel,
                    attempts: made,
                    reason: err.message().to_string(),
                };
            }

            tracing::debug!(
                %channel,
                attempt = made,
                max_attempts = self.max_attempts,
                delay = ?self.delay,
                error = %err,
                "Transient delivery failure, retrying"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Self::cancelled(channel, made, err.message());
                }
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
    }

    fn cancelled(channel: Channel, attempts: u32, reason: &str) -> DispatchOutcome {
        tracing::warn!(%channel, attempts, reason, "Delivery cancelled");
        DispatchOutcome::Cancelled {
            channel,
            attempts,
            reason: reason.to_string(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}
