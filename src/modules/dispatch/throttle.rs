// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::{num::NonZeroU32, time::Duration};

use governor::{
    clock::{Clock, QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use tracing::debug;

pub type GovRateLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock, NoOpMiddleware<QuantaInstant>>;

/// Keeps at least `min_interval` between two provider sends.
pub struct SendThrottle {
    limiter: Option<GovRateLimiter>,
    clock: QuantaClock,
    min_interval: Duration,
}

impl SendThrottle {
    /// A zero interval disables throttling.
    pub fn new(min_interval: Duration) -> Self {
        let clock = QuantaClock::default();
        let limiter = Quota::with_period(min_interval).map(|quota| {
            RateLimiter::direct_with_clock(quota.allow_burst(NonZeroU32::MIN), clock.clone())
        });
        Self {
            limiter,
            clock,
            min_interval,
        }
    }

    /// Suspends the caller until the next send slot and claims it.
    pub async fn wait(&self) {
        let Some(limiter) = &self.limiter else {
            return;
        };
        if let Err(not_until) = limiter.check() {
            debug!(
                "Send throttled for {:?} (min interval {:?})",
                not_until.wait_time_from(self.clock.now()),
                self.min_interval
            );
            limiter.until_ready().await;
        }
    }
}
