//! Backoff for idempotent backend reads.
//!
//! A read is re-sent only when the request never produced a response
//! (connection refused, reset, timed out). Any HTTP status, including 5xx,
//! is returned to the caller as-is. Writes are sent exactly once.

use std::time::Duration;

/// Default number of re-sends after the first attempt.
pub const DEFAULT_READ_RETRIES: u32 = 3;

const FIRST_DELAY: Duration = Duration::from_millis(200);

/// Exponential backoff schedule: 200ms, 400ms, 800ms, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Backoff {
    retries: u32,
}

impl Backoff {
    pub(crate) fn new(retries: u32) -> Self {
        Self { retries }
    }

    /// Pause before re-send number `n` (zero-based).
    fn pause(&self, n: u32) -> Duration {
        FIRST_DELAY.saturating_mul(1u32 << n.min(8))
    }

    /// Send the request built by `send`, re-sending on transport failure.
    pub(crate) async fn read<F, Fut>(
        &self,
        endpoint: &str,
        send: F,
    ) -> Result<reqwest::Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut resent = 0;
        loop {
            let err = match send().await {
                Ok(resp) => return Ok(resp),
                Err(err) => err,
            };
            // Builder errors (bad URL, no base configured) cannot succeed later.
            if err.is_builder() || resent >= self.retries {
                return Err(err);
            }
            let pause = self.pause(resent);
            resent += 1;
            tracing::warn!(
                endpoint,
                attempt = resent,
                of = self.retries,
                "backend read failed, re-sending in {pause:?}: {err}"
            );
            tokio::time::sleep(pause).await;
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_READ_RETRIES)
    }
}
