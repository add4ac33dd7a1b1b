//! Rate limit records, policy and decisions.

use serde::Serialize;
use std::time::Duration;

use super::clock::{duration_millis, Timestamp};

/// Default block penalty once an identifier exceeds its quota (2 hours).
pub const DEFAULT_BLOCK_DURATION: Duration = Duration::from_secs(2 * 60 * 60);

/// Immutable rate limit policy: a fixed window with an escalating block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Length of a counting window
    pub interval: Duration,
    /// Requests admitted per window before the identifier is blocked
    pub max_requests: u32,
    /// How long an identifier stays blocked after exceeding the quota
    pub block_duration: Duration,
}

impl RateLimitPolicy {
    /// Create a policy with the default block duration.
    pub fn new(interval: Duration, max_requests: u32) -> Self {
        Self {
            interval,
            max_requests,
            block_duration: DEFAULT_BLOCK_DURATION,
        }
    }

    /// Override the block duration.
    pub fn with_block_duration(mut self, block_duration: Duration) -> Self {
        self.block_duration = block_duration;
        self
    }

    pub(crate) fn interval_millis(&self) -> i64 {
        duration_millis(self.interval)
    }

    pub(crate) fn block_millis(&self) -> i64 {
        duration_millis(self.block_duration)
    }
}

/// Per-identifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    /// Requests admitted in the current window; meaningless while blocked
    pub count: u32,
    /// When the current window, or block, ends
    pub reset_time: Timestamp,
    /// Whether the identifier is serving a block penalty
    pub blocked: bool,
}

impl RateLimitRecord {
    /// A record for the first request of a new window.
    pub fn fresh(now: Timestamp, policy: &RateLimitPolicy) -> Self {
        Self {
            count: 1,
            reset_time: now.saturating_add(policy.interval_millis()),
            blocked: false,
        }
    }

    /// Whether the window or block has ended as of `now`.
    ///
    /// Both kinds of expiry share this one comparison, which is what lets an
    /// elapsed block fall back to a brand new window.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.reset_time
    }
}

/// The outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// Whether the request is admitted
    pub success: bool,
    /// Requests left in the current window; always 0 on rejection
    pub remaining: u32,
    /// When the current window or block ends
    pub reset_time: Timestamp,
}

impl Decision {
    pub(crate) fn admit(remaining: u32, reset_time: Timestamp) -> Self {
        Self {
            success: true,
            remaining,
            reset_time,
        }
    }

    pub(crate) fn reject(reset_time: Timestamp) -> Self {
        Self {
            success: false,
            remaining: 0,
            reset_time,
        }
    }

    /// Time left until `reset_time`, or zero if it has already passed.
    pub fn retry_after(&self, now: Timestamp) -> Duration {
        let millis = self.reset_time.saturating_sub(now).max(0);
        Duration::from_millis(millis as u64)
    }
}
