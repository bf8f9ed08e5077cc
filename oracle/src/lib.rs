//! Oracle alert engine.
//!
//! Externally submitted alerts pass three gates before they touch value:
//! range validation, a per-(region, day) cap, and a per-(region, type)
//! cooldown. High-confidence alerts then burn recipient stake and earn the
//! submitting operator a reward drawn from a pre-funded pool:
//!
//! `reward = min(burn × reward_rate_bps / 10_000, max_per_alert, daily_budget_left, pool_available)`
//!
//! Burn and reward are separate steps. The caller commits the burn first;
//! a reward that cannot be issued never undoes it.

pub mod alert;
pub mod engine;
pub mod error;
pub mod rate_limit;
pub mod reward_pool;

pub use alert::{Alert, AlertId, AlertStatus, AlertSubmission};
pub use engine::OracleEngine;
pub use error::OracleError;
pub use rate_limit::RateLimiter;
pub use reward_pool::{DailyIssuance, RewardPool};
