//! Behaviour of the contact form limiter through the public API.

use std::sync::Arc;
use std::time::Duration;

use contactgate::ratelimit::{Clock, ManualClock, RateLimitPolicy, RateLimitStore, RateLimiter};

const START: i64 = 1_700_000_000_000;
const IP: &str = "1.2.3.4";

fn limiter() -> (RateLimiter<Arc<ManualClock>>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START));
    let policy = RateLimitPolicy::new(Duration::from_millis(60_000), 2)
        .with_block_duration(Duration::from_millis(7_200_000));
    (RateLimiter::with_clock(policy, Arc::clone(&clock)), clock)
}

#[test]
fn window_then_block_then_recovery() {
    let (limiter, clock) = limiter();

    let first = limiter.check(IP);
    assert!(first.success);
    assert_eq!(first.remaining, 1);
    assert_eq!(first.reset_time, START + 60_000);

    clock.advance(Duration::from_secs(5));
    let second = limiter.check(IP);
    assert!(second.success);
    assert_eq!(second.remaining, 0);
    assert_eq!(second.reset_time, first.reset_time);

    clock.advance(Duration::from_secs(5));
    let third = limiter.check(IP);
    assert!(!third.success);
    assert_eq!(third.remaining, 0);
    assert_eq!(third.reset_time, clock.now() + 7_200_000);

    clock.advance(Duration::from_secs(3_600));
    let fourth = limiter.check(IP);
    assert!(!fourth.success);
    assert_eq!(fourth.reset_time, third.reset_time);

    clock.set(third.reset_time + 1);
    let after_block = limiter.check(IP);
    assert!(after_block.success);
    assert_eq!(after_block.remaining, 1);
    assert_eq!(after_block.reset_time, clock.now() + 60_000);
}

#[test]
fn reset_forgets_everything() {
    let (limiter, clock) = limiter();

    for _ in 0..4 {
        limiter.check(IP);
    }
    limiter.reset(IP);

    let decision = limiter.check(IP);
    assert!(decision.success);
    assert_eq!(decision.remaining, 1);
    assert_eq!(decision.reset_time, clock.now() + 60_000);

    // Resetting an unknown identifier is a no-op.
    limiter.reset("never-seen");
    assert_eq!(limiter.len(), 1);
}

#[test]
fn identifiers_are_isolated() {
    let (limiter, clock) = limiter();

    limiter.check("a");
    limiter.check("a");
    limiter.check("a");
    let blocked = limiter.record("a").unwrap();

    clock.advance(Duration::from_secs(1));
    for _ in 0..3 {
        limiter.check("b");
    }
    limiter.reset("b");

    assert_eq!(limiter.record("a").unwrap(), blocked);
}

#[test]
fn remaining_stays_in_range() {
    let clock = Arc::new(ManualClock::new(START));
    let policy = RateLimitPolicy::new(Duration::from_secs(10), 5)
        .with_block_duration(Duration::from_secs(30));
    let limiter = RateLimiter::with_clock(policy, Arc::clone(&clock));

    for step in 0..200 {
        let identifier = if step % 3 == 0 { "x" } else { "y" };
        let decision = limiter.check(identifier);
        if decision.success {
            assert!(decision.remaining <= 4);
        } else {
            assert_eq!(decision.remaining, 0);
        }
        assert!(decision.reset_time >= clock.now());
        clock.advance(Duration::from_millis(700));
    }
}

#[test]
fn bounded_store_caps_memory() {
    let clock = Arc::new(ManualClock::new(START));
    let policy = RateLimitPolicy::new(Duration::from_secs(60), 2);
    let limiter = RateLimiter::with_store(policy, RateLimitStore::bounded(100), Arc::clone(&clock));

    for i in 0..1_000 {
        limiter.check(&format!("10.0.{}.{}", i / 256, i % 256));
        clock.advance(Duration::from_millis(10));
    }

    assert_eq!(limiter.len(), 100);
}

#[test]
fn sweep_is_invisible_to_decisions() {
    let (swept, clock_a) = limiter();
    let (kept, clock_b) = limiter();

    for limiter in [&swept, &kept] {
        limiter.check("p");
        limiter.check("q");
        limiter.check("q");
        limiter.check("q");
    }
    for clock in [&clock_a, &clock_b] {
        clock.advance(Duration::from_secs(61));
    }

    assert_eq!(swept.sweep_expired(), 1);
    assert_eq!(swept.check("p"), kept.check("p"));
    assert_eq!(swept.check("q"), kept.check("q"));
}
