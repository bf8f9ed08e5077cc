//! Pre-funded reward pool.
//!
//! The pool's value lives in the ledger's reward-pool account. This struct
//! splits that value into an unreserved `available` balance and per-operator
//! `pending` rewards, and tracks how much was issued per calendar day:
//!
//! `ledger.balance(reward-pool) == available + Σ pending`
//!
//! Each day also remembers the highest cap it was issued under, so a cap
//! lowered later by governance is not applied retroactively.

use crate::error::OracleError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vigil_types::{AccountId, DayIndex};

/// Issuance for one calendar day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyIssuance {
    pub issued: u128,
    /// Highest cap in force when this day's rewards were reserved.
    pub cap: u128,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RewardPool {
    available: u128,
    pending: BTreeMap<AccountId, u128>,
    daily_issued: BTreeMap<DayIndex, DailyIssuance>,
}

impl RewardPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Funded value not yet reserved for any operator.
    pub fn available(&self) -> u128 {
        self.available
    }

    pub fn pending_for(&self, operator: &AccountId) -> u128 {
        self.pending.get(operator).copied().unwrap_or(0)
    }

    pub fn total_pending(&self) -> u128 {
        self.pending.values().sum()
    }

    pub fn issued_on(&self, day: DayIndex) -> u128 {
        self.daily_issued.get(&day).map_or(0, |d| d.issued)
    }

    /// Budget left under `cap` for `day`.
    pub fn remaining_daily_budget(&self, day: DayIndex, cap: u128) -> u128 {
        cap.saturating_sub(self.issued_on(day))
    }

    /// Every retained day with its issuance.
    pub fn daily_issuance(&self) -> impl Iterator<Item = (DayIndex, DailyIssuance)> + '_ {
        self.daily_issued.iter().map(|(d, v)| (*d, *v))
    }

    pub(crate) fn fund(&mut self, amount: u128) -> Result<(), OracleError> {
        self.available = self
            .available
            .checked_add(amount)
            .ok_or(OracleError::Overflow)?;
        Ok(())
    }

    /// Move `amount` from available into the operator's pending reward and
    /// count it against `day`. The caller has already capped `amount`.
    pub(crate) fn reserve(
        &mut self,
        operator: &AccountId,
        amount: u128,
        day: DayIndex,
        cap: u128,
    ) -> Result<(), OracleError> {
        if amount > self.available {
            return Err(OracleError::InvariantViolation(format!(
                "reserving {amount} from a pool with {} available",
                self.available
            )));
        }
        let entry = self.daily_issued.get(&day).copied().unwrap_or_default();
        let issued = entry
            .issued
            .checked_add(amount)
            .ok_or(OracleError::Overflow)?;
        if issued > cap {
            return Err(OracleError::InvariantViolation(format!(
                "daily issuance {issued} would exceed cap {cap}"
            )));
        }
        let pending = self
            .pending_for(operator)
            .checked_add(amount)
            .ok_or(OracleError::Overflow)?;

        self.available -= amount;
        self.pending.insert(operator.clone(), pending);
        self.daily_issued.insert(
            day,
            DailyIssuance {
                issued,
                cap: entry.cap.max(cap),
            },
        );
        self.daily_issued.retain(|d, _| d.as_u64() + 7 >= day.as_u64());
        Ok(())
    }

    /// Remove and return the operator's pending reward.
    pub(crate) fn take_pending(&mut self, operator: &AccountId) -> u128 {
        self.pending.remove(operator).unwrap_or(0)
    }
}
