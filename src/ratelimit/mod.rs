//! Rate limiting logic and state management.

mod clock;
mod identifier;
mod limiter;
mod record;
mod store;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use identifier::{client_identifier, FORWARDED_FOR, UNKNOWN_CLIENT};
pub use limiter::{run_sweeper, RateLimiter};
pub use record::{Decision, RateLimitPolicy, RateLimitRecord, DEFAULT_BLOCK_DURATION};
pub use store::RateLimitStore;
