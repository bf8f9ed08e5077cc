//! The balance ledger.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vigil_types::AccountId;

/// Per-account balances plus supply accounting.
///
/// Accounts are created on first credit and never deleted; a drained
/// account simply reads as zero. `total_supply` always equals the sum of all
/// balances, and `total_burned` only ever grows.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Ledger {
    balances: BTreeMap<AccountId, u128>,
    /// Owner → amount pre-authorized for transfer into escrow.
    escrow_allowances: BTreeMap<AccountId, u128>,
    total_supply: u128,
    total_burned: u128,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Total value permanently destroyed through [`Ledger::burn`].
    pub fn total_burned(&self) -> u128 {
        self.total_burned
    }

    pub fn allowance(&self, owner: &AccountId) -> u128 {
        self.escrow_allowances.get(owner).copied().unwrap_or(0)
    }

    /// Iterate all known accounts in deterministic order.
    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, u128)> {
        self.balances.iter().map(|(k, v)| (k, *v))
    }

    /// External inflow: funds arriving from outside the system.
    pub fn credit(&mut self, account: &AccountId, amount: u128) -> Result<(), LedgerError> {
        check_account(account)?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.insert(account.clone(), balance);
        self.total_supply = supply;
        Ok(())
    }

    /// External outflow: funds leaving the system.
    pub fn debit(&mut self, account: &AccountId, amount: u128) -> Result<(), LedgerError> {
        let remaining = self.checked_remaining(account, amount)?;
        self.balances.insert(account.clone(), remaining);
        self.total_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Move funds between two accounts. Supply is unchanged.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        check_account(to)?;
        let remaining = self.checked_remaining(from, amount)?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.insert(from.clone(), remaining);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }

    /// Permanently destroy funds held by `account`.
    pub fn burn(&mut self, account: &AccountId, amount: u128) -> Result<(), LedgerError> {
        let remaining = self.checked_remaining(account, amount)?;
        let burned = self
            .total_burned
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.insert(account.clone(), remaining);
        self.total_burned = burned;
        self.total_supply = supply;
        Ok(())
    }

    /// Authorize up to `amount` to be moved into escrow on the owner's behalf.
    /// Replaces any previous allowance; zero revokes it.
    pub fn approve_escrow(&mut self, owner: &AccountId, amount: u128) -> Result<(), LedgerError> {
        check_account(owner)?;
        if amount == 0 {
            self.escrow_allowances.remove(owner);
        } else {
            self.escrow_allowances.insert(owner.clone(), amount);
        }
        Ok(())
    }

    /// Move `amount` from `owner` into escrow, consuming allowance.
    ///
    /// Allowance and balance are both checked before either is touched.
    pub fn transfer_into_escrow(
        &mut self,
        owner: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let available = self.allowance(owner);
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: owner.to_string(),
                needed: amount,
                available,
            });
        }
        self.transfer(owner, &AccountId::escrow(), amount)?;
        let left = available - amount;
        if left == 0 {
            self.escrow_allowances.remove(owner);
        } else {
            self.escrow_allowances.insert(owner.clone(), left);
        }
        Ok(())
    }

    /// Recompute the balance sum and compare it to the recorded supply.
    pub fn audit_supply(&self) -> Result<(), LedgerError> {
        let mut sum: u128 = 0;
        for balance in self.balances.values() {
            sum = sum.checked_add(*balance).ok_or(LedgerError::Overflow)?;
        }
        if sum != self.total_supply {
            return Err(LedgerError::SupplyMismatch {
                balances: sum,
                supply: self.total_supply,
            });
        }
        Ok(())
    }

    fn checked_remaining(&self, account: &AccountId, amount: u128) -> Result<u128, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let available = self.balance_of(account);
        available
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientFunds {
                account: account.to_string(),
                needed: amount,
                available,
            })
    }
}

fn check_account(account: &AccountId) -> Result<(), LedgerError> {
    if account.is_valid() {
        Ok(())
    } else {
        Err(LedgerError::InvalidAccount(account.to_string()))
    }
}
