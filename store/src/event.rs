//! The event vocabulary: one variant per committed state change.
//!
//! Events carry outcomes, not commands. Replaying them never re-runs engine
//! logic, so a projection can be rebuilt without the engines' parameters.

use serde::{Deserialize, Serialize};
use vigil_governance::{ProposalDraft, ProposalId, ProposalStatus, VoteChoice};
use vigil_oracle::{AlertId, AlertSubmission};
use vigil_types::{AccountId, Role};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    // Funds movement
    Credited {
        account: AccountId,
        amount: u128,
    },
    Debited {
        account: AccountId,
        amount: u128,
    },
    Transferred {
        from: AccountId,
        to: AccountId,
        amount: u128,
    },
    EscrowApproved {
        owner: AccountId,
        amount: u128,
    },

    // Staking
    Staked {
        owner: AccountId,
        amount: u128,
    },
    Unstaked {
        owner: AccountId,
        amount: u128,
    },
    ParameterChanged {
        name: String,
        value: u128,
    },

    // Oracle
    AlertSubmitted {
        alert_id: AlertId,
        operator: AccountId,
        submission: AlertSubmission,
    },
    AlertConfirmed {
        alert_id: AlertId,
        confidence: u8,
    },
    /// Per-recipient burns, in batch order.
    AlertExecuted {
        alert_id: AlertId,
        burns: Vec<(AccountId, u128)>,
    },
    RewardIssued {
        alert_id: AlertId,
        operator: AccountId,
        amount: u128,
    },
    AlertBlocked {
        alert_id: AlertId,
        guardian: AccountId,
        reason: String,
    },
    PoolFunded {
        funder: AccountId,
        amount: u128,
    },
    RewardsClaimed {
        operator: AccountId,
        amount: u128,
    },

    // Governance
    ProposalCreated {
        proposal_id: ProposalId,
        proposer: AccountId,
        draft: ProposalDraft,
    },
    VoteCast {
        proposal_id: ProposalId,
        voter: AccountId,
        choice: VoteChoice,
        weight: u128,
    },
    ProposalFinalized {
        proposal_id: ProposalId,
        status: ProposalStatus,
    },
    ProposalExecuted {
        proposal_id: ProposalId,
    },
    ProposalExecutionFailed {
        proposal_id: ProposalId,
        reason: String,
    },
    VetoCast {
        proposal_id: ProposalId,
        guardian: AccountId,
        vetoed: bool,
    },

    // Access control
    RoleGranted {
        account: AccountId,
        role: Role,
    },
    RoleRevoked {
        account: AccountId,
        role: Role,
    },
}

impl Event {
    /// Short tag for logs and CLI summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Credited { .. } => "credited",
            Self::Debited { .. } => "debited",
            Self::Transferred { .. } => "transferred",
            Self::EscrowApproved { .. } => "escrow_approved",
            Self::Staked { .. } => "staked",
            Self::Unstaked { .. } => "unstaked",
            Self::ParameterChanged { .. } => "parameter_changed",
            Self::AlertSubmitted { .. } => "alert_submitted",
            Self::AlertConfirmed { .. } => "alert_confirmed",
            Self::AlertExecuted { .. } => "alert_executed",
            Self::RewardIssued { .. } => "reward_issued",
            Self::AlertBlocked { .. } => "alert_blocked",
            Self::PoolFunded { .. } => "pool_funded",
            Self::RewardsClaimed { .. } => "rewards_claimed",
            Self::ProposalCreated { .. } => "proposal_created",
            Self::VoteCast { .. } => "vote_cast",
            Self::ProposalFinalized { .. } => "proposal_finalized",
            Self::ProposalExecuted { .. } => "proposal_executed",
            Self::ProposalExecutionFailed { .. } => "proposal_execution_failed",
            Self::VetoCast { .. } => "veto_cast",
            Self::RoleGranted { .. } => "role_granted",
            Self::RoleRevoked { .. } => "role_revoked",
        }
    }
}
