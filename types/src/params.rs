//! Economy parameters: every tunable constant of the control plane.
//!
//! Each section is consumed by one engine. All fields are governable via
//! `SetParameter` proposals; ranges are enforced by the governance crate
//! before a change is applied.

use crate::amount::tokens;
use serde::{Deserialize, Serialize};

/// Parameters of the staking and burn engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingParams {
    /// Minimum stake (raw) for a record to be active.
    #[serde(with = "crate::amount::as_u64")]
    pub min_stake: u128,

    /// Fraction of each active stake burned per executed alert (basis points).
    pub burn_rate_bps: u32,

    /// Upper bound on recipients per burn call. Larger fan-out requires
    /// multiple calls.
    pub max_recipients_per_call: usize,
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            min_stake: tokens(100),
            burn_rate_bps: 1000, // 10%
            max_recipients_per_call: 100,
        }
    }
}

/// Parameters of the oracle alert engine and its reward pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleParams {
    /// Alerts at or above this confidence (0-100) auto-execute.
    pub min_confidence: u8,

    /// Alerts accepted per region per UTC calendar day.
    pub max_alerts_per_region_per_day: u32,

    /// Minimum seconds between two alerts of the same type for a region.
    pub alert_cooldown_secs: u64,

    /// Operator reward as a fraction of the burn total (basis points).
    pub reward_rate_bps: u32,

    /// Hard cap (raw) on the reward for a single alert.
    #[serde(with = "crate::amount::as_u64")]
    pub max_reward_per_alert: u128,

    /// Hard cap (raw) on rewards issued per UTC calendar day.
    #[serde(with = "crate::amount::as_u64")]
    pub daily_reward_cap: u128,
}

impl Default for OracleParams {
    fn default() -> Self {
        Self {
            min_confidence: 70,
            max_alerts_per_region_per_day: 10,
            alert_cooldown_secs: 3600, // 1 hour
            reward_rate_bps: 500,      // 5%
            max_reward_per_alert: tokens(1_000),
            daily_reward_cap: tokens(10_000),
        }
    }
}

/// Parameters of the governance engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceParams {
    /// Minimum liquid balance (raw) required to propose.
    #[serde(with = "crate::amount::as_u64")]
    pub proposal_threshold: u128,

    /// Seconds a proposer must wait between proposals.
    pub proposal_cooldown_secs: u64,

    /// Seconds a proposal accepts votes.
    pub voting_period_secs: u64,

    /// Seconds between queueing and earliest execution.
    pub timelock_delay_secs: u64,

    /// Quorum as a fraction of snapshot supply, passed through the vote
    /// weight transform (basis points).
    pub quorum_bps: u32,

    /// Numerator of the quadratic weight scaling.
    #[serde(with = "crate::amount::as_u64")]
    pub quadratic_multiplier: u128,

    /// Denominator of the quadratic weight scaling.
    #[serde(with = "crate::amount::as_u64")]
    pub weight_scale: u128,

    /// Distinct guardian vetoes needed to block a proposal. Never below 2.
    pub veto_threshold: u32,
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            proposal_threshold: tokens(1_000),
            proposal_cooldown_secs: 24 * 3600,   // 1 day
            voting_period_secs: 3 * 24 * 3600,   // 3 days
            timelock_delay_secs: 2 * 24 * 3600,  // 2 days
            quorum_bps: 400,                     // 4%
            quadratic_multiplier: 1_000,
            weight_scale: 1_000,
            veto_threshold: 3,
        }
    }
}

/// All parameters, grouped by the engine that consumes them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyParams {
    pub staking: StakingParams,
    pub oracle: OracleParams,
    pub governance: GovernanceParams,
}
