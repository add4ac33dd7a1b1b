//! Core rate limiter implementation.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace};

use super::clock::{Clock, SystemClock, Timestamp};
use super::record::{Decision, RateLimitPolicy, RateLimitRecord};
use super::store::RateLimitStore;

/// Fixed-window rate limiter that escalates repeat offenders into a block.
///
/// Each limiter owns its store, so unrelated limiters never share state.
/// The limiter is thread-safe and is meant to be shared behind an `Arc`.
pub struct RateLimiter<C: Clock = SystemClock> {
    policy: RateLimitPolicy,
    store: RateLimitStore,
    clock: C,
}

impl RateLimiter<SystemClock> {
    /// Create a limiter with an unbounded store and the system clock.
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Create a limiter with an unbounded store and a custom clock.
    pub fn with_clock(policy: RateLimitPolicy, clock: C) -> Self {
        Self::with_store(policy, RateLimitStore::new(), clock)
    }

    /// Create a limiter from a pre-built store, e.g. a bounded one.
    pub fn with_store(policy: RateLimitPolicy, store: RateLimitStore, clock: C) -> Self {
        Self {
            policy,
            store,
            clock,
        }
    }

    /// The policy this limiter enforces.
    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Current time according to the limiter's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Record a request from `identifier` and decide whether to admit it.
    pub fn check(&self, identifier: &str) -> Decision {
        let now = self.clock.now();
        let policy = &self.policy;

        trace!(identifier = %identifier, now, "Checking rate limit");

        let decision = self.store.update(identifier, now, |existing| match existing {
            // Covers both a finished window and a finished block.
            None => fresh_window(now, policy),
            Some(record) if record.is_expired(now) => fresh_window(now, policy),

            Some(record) if record.blocked => (*record, Decision::reject(record.reset_time)),

            Some(record) if record.count >= policy.max_requests => {
                let blocked = RateLimitRecord {
                    blocked: true,
                    reset_time: now.saturating_add(policy.block_millis()),
                    ..*record
                };
                (blocked, Decision::reject(blocked.reset_time))
            }

            Some(record) => {
                let next = RateLimitRecord {
                    count: record.count + 1,
                    ..*record
                };
                let remaining = policy.max_requests.saturating_sub(next.count);
                (next, Decision::admit(remaining, next.reset_time))
            }
        });

        if !decision.success {
            debug!(
                identifier = %identifier,
                reset_time = decision.reset_time,
                "Rate limit exceeded"
            );
        }

        decision
    }

    /// Forget everything about `identifier`.
    pub fn reset(&self, identifier: &str) {
        if self.store.remove(identifier) {
            debug!(identifier = %identifier, "Rate limit record reset");
        }
    }

    /// Drop records whose window or block has ended.
    ///
    /// Expired records are indistinguishable from missing ones, so this never
    /// changes a later decision.
    pub fn sweep_expired(&self) -> usize {
        self.store.sweep_expired(self.clock.now())
    }

    /// Get the stored record for `identifier`, if any.
    pub fn record(&self, identifier: &str) -> Option<RateLimitRecord> {
        self.store.get(identifier)
    }

    /// Number of tracked identifiers.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

fn fresh_window(now: Timestamp, policy: &RateLimitPolicy) -> (RateLimitRecord, Decision) {
    let record = RateLimitRecord::fresh(now, policy);
    let remaining = policy.max_requests.saturating_sub(1);
    (record, Decision::admit(remaining, record.reset_time))
}

/// Periodically evict expired records until the task is dropped.
pub async fn run_sweeper<C: Clock>(limiter: Arc<RateLimiter<C>>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    info!(interval = ?every, "Rate limit sweeper started");

    loop {
        ticker.tick().await;

        let evicted = limiter.sweep_expired();
        if evicted > 0 {
            debug!(
                evicted,
                remaining = limiter.len(),
                "Swept expired rate limit records"
            );
        }
    }
}
