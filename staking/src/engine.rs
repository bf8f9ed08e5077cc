//! Core staking and burn engine.

use crate::error::StakingError;
use crate::stake::{BurnSummary, RecipientBurn, Stake};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use vigil_ledger::Ledger;
use vigil_types::{apply_bps, AccountId, AlertType, RegionId, StakingParams, Timestamp};

/// Owns stake records and moves value through escrow.
///
/// Every staked unit sits in the ledger's escrow account, so the sum of all
/// stake amounts always equals the escrow balance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StakingEngine {
    params: StakingParams,
    stakes: BTreeMap<AccountId, Stake>,
    /// Global burn counter: sum of every stake's `total_burned`.
    total_burned: u128,
}

impl StakingEngine {
    pub fn new(params: StakingParams) -> Self {
        Self {
            params,
            stakes: BTreeMap::new(),
            total_burned: 0,
        }
    }

    pub fn params(&self) -> &StakingParams {
        &self.params
    }

    pub fn stake_of(&self, owner: &AccountId) -> Option<&Stake> {
        self.stakes.get(owner)
    }

    pub fn stakes(&self) -> impl Iterator<Item = &Stake> {
        self.stakes.values()
    }

    pub fn total_staked(&self) -> u128 {
        self.stakes.values().map(|s| s.amount).sum()
    }

    pub fn total_burned(&self) -> u128 {
        self.total_burned
    }

    /// Move `amount` from `owner` into escrow and add it to their stake.
    ///
    /// The resulting stake must meet the minimum, so a small top-up onto an
    /// existing stake is fine. The owner must have approved at least
    /// `amount` for escrow beforehand.
    pub fn stake(
        &mut self,
        ledger: &mut Ledger,
        owner: &AccountId,
        amount: u128,
        now: Timestamp,
    ) -> Result<Stake, StakingError> {
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let current = self.stakes.get(owner).map_or(0, |s| s.amount);
        let new_amount = current.checked_add(amount).ok_or(StakingError::Overflow)?;
        if new_amount < self.params.min_stake {
            return Err(StakingError::BelowMinimum {
                amount: new_amount,
                minimum: self.params.min_stake,
            });
        }

        ledger.transfer_into_escrow(owner, amount)?;

        let min_stake = self.params.min_stake;
        let record = self
            .stakes
            .entry(owner.clone())
            .or_insert_with(|| Stake::new(owner.clone(), now));
        if record.amount == 0 {
            record.staked_at = now;
        }
        record.amount = new_amount;
        record.refresh_active(min_stake);
        tracing::debug!(owner = %owner, amount, total = new_amount, "stake added");
        Ok(record.clone())
    }

    /// Return the full stake to its owner. No partial withdrawal.
    ///
    /// The record is kept (zeroed and inactive) so its burn history survives.
    pub fn unstake(&mut self, ledger: &mut Ledger, owner: &AccountId) -> Result<u128, StakingError> {
        let amount = match self.stakes.get(owner) {
            Some(s) if s.amount > 0 => s.amount,
            _ => return Err(StakingError::NoStake(owner.to_string())),
        };
        ledger.transfer(&AccountId::escrow(), owner, amount)?;
        if let Some(record) = self.stakes.get_mut(owner) {
            record.amount = 0;
            record.active = false;
        }
        tracing::debug!(owner = %owner, amount, "stake withdrawn");
        Ok(amount)
    }

    /// Burn a fixed fraction of each recipient's active stake.
    ///
    /// Inactive, unknown and duplicate recipients are skipped without
    /// aborting the batch. The whole batch is planned before any mutation,
    /// so a ledger failure leaves every record untouched.
    pub fn apply_alert_burn(
        &mut self,
        ledger: &mut Ledger,
        alert_type: AlertType,
        region: &RegionId,
        recipients: &[AccountId],
    ) -> Result<BurnSummary, StakingError> {
        if recipients.len() > self.params.max_recipients_per_call {
            return Err(StakingError::TooManyRecipients {
                count: recipients.len(),
                max: self.params.max_recipients_per_call,
            });
        }
        self.apply_admitted_burn(ledger, alert_type, region, recipients)
    }

    /// Same as [`apply_alert_burn`](Self::apply_alert_burn) for a recipient
    /// list already bounded when its alert was admitted.
    ///
    /// The per-call cap is not re-checked: lowering it afterwards must not
    /// strand alerts that were accepted under the old cap.
    pub fn apply_admitted_burn(
        &mut self,
        ledger: &mut Ledger,
        alert_type: AlertType,
        region: &RegionId,
        recipients: &[AccountId],
    ) -> Result<BurnSummary, StakingError> {
        let mut summary = BurnSummary::default();
        let mut plan: Vec<(AccountId, u128)> = Vec::with_capacity(recipients.len());
        let mut seen = HashSet::with_capacity(recipients.len());
        for recipient in recipients {
            if !seen.insert(recipient) {
                summary.skipped += 1;
                continue;
            }
            match self.stakes.get(recipient) {
                Some(stake) if stake.active => {
                    let burn = apply_bps(stake.amount, self.params.burn_rate_bps)
                        .ok_or(StakingError::Overflow)?;
                    plan.push((recipient.clone(), burn));
                }
                _ => {
                    tracing::debug!(recipient = %recipient, "skipping recipient without active stake");
                    summary.skipped += 1;
                }
            }
        }

        let batch_total = plan
            .iter()
            .try_fold(0u128, |acc, (_, b)| acc.checked_add(*b))
            .ok_or(StakingError::Overflow)?;
        let new_global = self
            .total_burned
            .checked_add(batch_total)
            .ok_or(StakingError::Overflow)?;
        let escrow = ledger.balance_of(&AccountId::escrow());
        if escrow < batch_total {
            return Err(StakingError::InvariantViolation(format!(
                "escrow holds {escrow}, burn batch needs {batch_total}"
            )));
        }
        if batch_total > 0 {
            ledger.burn(&AccountId::escrow(), batch_total)?;
        }

        let min_stake = self.params.min_stake;
        for (owner, burn) in plan {
            let Some(stake) = self.stakes.get_mut(&owner) else {
                continue;
            };
            let was_active = stake.active;
            stake.amount -= burn;
            stake.total_burned += burn;
            stake.alerts_received += 1;
            stake.refresh_active(min_stake);
            summary.affected += 1;
            summary.burns.push(RecipientBurn {
                owner,
                burned: burn,
                remaining: stake.amount,
                deactivated: was_active && !stake.active,
            });
        }
        summary.total_burned = batch_total;
        self.total_burned = new_global;

        tracing::info!(
            alert_type = alert_type.label(),
            region = %region,
            burned = batch_total,
            affected = summary.affected,
            skipped = summary.skipped,
            "alert burn applied"
        );
        Ok(summary)
    }

    /// Change the minimum stake and re-derive every `active` flag.
    ///
    /// Returns the owners whose flag flipped.
    pub fn set_min_stake(&mut self, min_stake: u128) -> Vec<AccountId> {
        self.params.min_stake = min_stake;
        let mut flipped = Vec::new();
        for stake in self.stakes.values_mut() {
            let before = stake.active;
            stake.refresh_active(min_stake);
            if stake.active != before {
                flipped.push(stake.owner.clone());
            }
        }
        flipped
    }

    pub fn set_burn_rate_bps(&mut self, bps: u32) -> Result<(), StakingError> {
        if bps > 10_000 {
            return Err(StakingError::InvalidRate(bps));
        }
        self.params.burn_rate_bps = bps;
        Ok(())
    }

    pub fn set_max_recipients_per_call(&mut self, max: usize) {
        self.params.max_recipients_per_call = max;
    }

    /// Check the engine's invariants against the ledger.
    pub fn audit(&self, ledger: &Ledger) -> Result<(), StakingError> {
        let mut staked: u128 = 0;
        let mut burned: u128 = 0;
        for stake in self.stakes.values() {
            if stake.active != (stake.amount >= self.params.min_stake) {
                return Err(StakingError::InvariantViolation(format!(
                    "stake of {} has active={} with amount {} (minimum {})",
                    stake.owner, stake.active, stake.amount, self.params.min_stake
                )));
            }
            staked = staked.checked_add(stake.amount).ok_or(StakingError::Overflow)?;
            burned = burned
                .checked_add(stake.total_burned)
                .ok_or(StakingError::Overflow)?;
        }
        if burned != self.total_burned {
            return Err(StakingError::InvariantViolation(format!(
                "per-stake burns sum to {burned}, global counter is {}",
                self.total_burned
            )));
        }
        let escrow = ledger.balance_of(&AccountId::escrow());
        if staked != escrow {
            return Err(StakingError::InvariantViolation(format!(
                "stakes sum to {staked}, escrow holds {escrow}"
            )));
        }
        if staked > ledger.total_supply() {
            return Err(StakingError::InvariantViolation(format!(
                "stakes sum to {staked}, above total supply {}",
                ledger.total_supply()
            )));
        }
        Ok(())
    }
}

impl Default for StakingEngine {
    fn default() -> Self {
        Self::new(StakingParams::default())
    }
}
