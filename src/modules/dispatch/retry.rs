// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::{future::Future, time::Duration};

use tracing::warn;

use crate::modules::smtp::transport::TransportError;

/// Linear backoff for provider throttling: attempt `n` failing with a
/// transient error waits `base_delay * n` before attempt `n + 1`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Runs `op` with the 1-based attempt number until it succeeds, fails
    /// with a non-transient error, or the attempts are exhausted.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, TransportError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if error.kind.is_transient() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "Provider throttled send (attempt {}/{}): {}. Retrying in {:?}",
                        attempt, self.max_attempts, error, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
