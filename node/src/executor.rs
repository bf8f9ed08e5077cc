//! Dispatch of governance actions onto the live engines.

use crate::access::AccessControl;
use vigil_governance::{ActionExecutor, GovernableParam, ProposalAction};
use vigil_ledger::Ledger;
use vigil_oracle::OracleEngine;
use vigil_store::Event;
use vigil_types::{AccountId, EconomyParams, Role};

/// Executes proposal actions against borrowed engine state.
///
/// Parameter changes are written into `params`; the caller pushes the
/// changed sections into the engines once the proposal is marked executed,
/// since the governance engine is mutably borrowed during dispatch.
pub struct EconomyExecutor<'a, A: AccessControl> {
    pub ledger: &'a mut Ledger,
    pub oracle: &'a mut OracleEngine,
    pub access: &'a mut A,
    pub params: EconomyParams,
    pub events: Vec<Event>,
}

impl<'a, A: AccessControl> EconomyExecutor<'a, A> {
    fn check_treasury(&self, value: u128) -> Result<(), String> {
        if value == 0 {
            return Err("amount must be non-zero".into());
        }
        let held = self.ledger.balance_of(&AccountId::treasury());
        if held < value {
            return Err(format!("treasury holds {held}, action needs {value}"));
        }
        Ok(())
    }
}

fn user_account(account: &AccountId) -> Result<(), String> {
    if !account.is_valid() || account.is_system() {
        return Err(format!("account '{account}' is invalid or reserved"));
    }
    Ok(())
}

impl<A: AccessControl> ActionExecutor for EconomyExecutor<'_, A> {
    fn validate(&self, action: &ProposalAction, value: u128) -> Result<(), String> {
        match action {
            ProposalAction::SetParameter(param) => param.validate(value).map_err(|e| e.to_string()),
            ProposalAction::FundRewardPool => self.check_treasury(value),
            ProposalAction::TreasuryGrant(to) => {
                user_account(to)?;
                self.check_treasury(value)
            }
            ProposalAction::AddGuardian(account) => {
                user_account(account)?;
                if self.access.holders(Role::Guardian).contains(account) {
                    return Err(format!("{account} is already a guardian"));
                }
                Ok(())
            }
            ProposalAction::RemoveGuardian(account) => {
                if !self.access.holders(Role::Guardian).contains(account) {
                    return Err(format!("{account} is not a guardian"));
                }
                Ok(())
            }
            ProposalAction::Signal => Ok(()),
        }
    }

    fn execute(&mut self, action: &ProposalAction, value: u128) -> Result<(), String> {
        match action {
            ProposalAction::SetParameter(param) => {
                param
                    .apply(&mut self.params, value)
                    .map_err(|e| e.to_string())?;
                self.events.push(Event::ParameterChanged {
                    name: param.name().to_string(),
                    value,
                });
            }
            ProposalAction::FundRewardPool => {
                self.oracle
                    .fund_pool(self.ledger, &AccountId::treasury(), value)
                    .map_err(|e| e.to_string())?;
                self.events.push(Event::PoolFunded {
                    funder: AccountId::treasury(),
                    amount: value,
                });
            }
            ProposalAction::TreasuryGrant(to) => {
                self.ledger
                    .transfer(&AccountId::treasury(), to, value)
                    .map_err(|e| e.to_string())?;
                self.events.push(Event::Transferred {
                    from: AccountId::treasury(),
                    to: to.clone(),
                    amount: value,
                });
            }
            ProposalAction::AddGuardian(account) => {
                self.access.grant(account, Role::Guardian);
                self.events.push(Event::RoleGranted {
                    account: account.clone(),
                    role: Role::Guardian,
                });
            }
            ProposalAction::RemoveGuardian(account) => {
                self.access.revoke(account, Role::Guardian);
                self.events.push(Event::RoleRevoked {
                    account: account.clone(),
                    role: Role::Guardian,
                });
            }
            ProposalAction::Signal => {}
        }
        Ok(())
    }
}

/// Parameters whose value differs between `before` and `after`.
pub fn changed_params(before: &EconomyParams, after: &EconomyParams) -> Vec<GovernableParam> {
    GovernableParam::ALL
        .into_iter()
        .filter(|p| p.read(before) != p.read(after))
        .collect()
}
