//! Proposal target actions and the seam that executes them.

use crate::params::GovernableParam;
use serde::{Deserialize, Serialize};
use vigil_types::AccountId;

/// Broad category a proposal declares up front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalKind {
    Parameter,
    Treasury,
    Guardian,
    Signal,
}

/// What a proposal does once executed. The proposal's `value` is the
/// action's operand (new parameter value or amount).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalAction {
    /// Set a governable parameter to `value`.
    SetParameter(GovernableParam),
    /// Move `value` from the treasury into the reward pool.
    FundRewardPool,
    /// Pay `value` from the treasury to an account.
    TreasuryGrant(AccountId),
    AddGuardian(AccountId),
    RemoveGuardian(AccountId),
    /// Non-binding; executing it changes nothing.
    Signal,
}

impl ProposalAction {
    /// The only kind this action may be filed under.
    pub fn kind(&self) -> ProposalKind {
        match self {
            Self::SetParameter(_) => ProposalKind::Parameter,
            Self::FundRewardPool | Self::TreasuryGrant(_) => ProposalKind::Treasury,
            Self::AddGuardian(_) | Self::RemoveGuardian(_) => ProposalKind::Guardian,
            Self::Signal => ProposalKind::Signal,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::SetParameter(p) => format!("set {p}"),
            Self::FundRewardPool => "fund reward pool".into(),
            Self::TreasuryGrant(to) => format!("treasury grant to {to}"),
            Self::AddGuardian(g) => format!("add guardian {g}"),
            Self::RemoveGuardian(g) => format!("remove guardian {g}"),
            Self::Signal => "signal".into(),
        }
    }
}

/// Applies a queued proposal's action to the rest of the system.
///
/// `validate` must not mutate anything. `execute` is only called after
/// `validate` succeeded; a failure from either leaves the proposal queued.
pub trait ActionExecutor {
    fn validate(&self, action: &ProposalAction, value: u128) -> Result<(), String>;
    fn execute(&mut self, action: &ProposalAction, value: u128) -> Result<(), String>;
}
