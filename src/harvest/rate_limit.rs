//! Global request-rate ceiling shared by all query workers of a session
//!
//! Each request reserves the next free dispatch slot. Slots are handed out
//! `1/K` seconds apart under a lock and waited on outside it, so aggregate
//! dispatch across every worker stays at or below `K` per second.
//!
//! This only spaces requests out. How many workers may be blocked waiting
//! for a slot is bounded by the worker pool.

use crate::config::{RateLimitConfig, RatePolicy};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    policy: RatePolicy,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / config.requests_per_second),
            policy: config.policy,
            next_slot: Mutex::new(None),
        }
    }

    /// Builds a limiter when rate limiting is configured
    pub fn from_config(config: Option<&RateLimitConfig>) -> Option<Self> {
        config.map(Self::new)
    }

    /// Minimum spacing between two dispatches
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits for the next dispatch slot, returning the slot time
    pub async fn acquire(&self) -> Instant {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(reserved) if reserved > now => reserved,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };

        let now = Instant::now();
        if slot > now {
            tracing::debug!(wait_ms = %(slot - now).as_millis(), "Throttling request");
            tokio::time::sleep_until(slot).await;
        }
        slot
    }

    /// Reports a finished request
    ///
    /// Under [`RatePolicy::Completion`] the next slot moves to at least one
    /// interval after this completion. Under [`RatePolicy::Dispatch`] this
    /// does nothing.
    pub async fn complete(&self) {
        if self.policy != RatePolicy::Completion {
            return;
        }
        let earliest = Instant::now() + self.interval;
        let mut next = self.next_slot.lock().await;
        if next.map_or(true, |reserved| reserved < earliest) {
            *next = Some(earliest);
        }
    }
}
