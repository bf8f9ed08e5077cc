//! Stake records and burn results.

use serde::{Deserialize, Serialize};
use vigil_types::{AccountId, Timestamp};

/// An account's escrowed stake.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    pub owner: AccountId,
    /// Raw units currently held in escrow for this owner.
    pub amount: u128,
    /// Time of the first stake call (kept across top-ups).
    pub staked_at: Timestamp,
    /// Executed alerts that burned this stake.
    pub alerts_received: u64,
    /// Cumulative burns, never decreases.
    pub total_burned: u128,
    /// Always equal to `amount >= min_stake`.
    pub active: bool,
}

impl Stake {
    pub(crate) fn new(owner: AccountId, staked_at: Timestamp) -> Self {
        Self {
            owner,
            amount: 0,
            staked_at,
            alerts_received: 0,
            total_burned: 0,
            active: false,
        }
    }

    pub(crate) fn refresh_active(&mut self, min_stake: u128) {
        self.active = self.amount >= min_stake;
    }
}

/// One recipient's share of a burn batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientBurn {
    pub owner: AccountId,
    pub burned: u128,
    pub remaining: u128,
    /// The burn dropped the stake below the minimum.
    pub deactivated: bool,
}

/// Aggregate outcome of one `apply_alert_burn` call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnSummary {
    pub total_burned: u128,
    /// Recipients that held an active stake.
    pub affected: u32,
    /// Inactive, unknown or duplicate recipients.
    pub skipped: u32,
    pub burns: Vec<RecipientBurn>,
}
