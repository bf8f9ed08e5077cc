//! Governance proposals and their lifecycle.

use crate::action::{ProposalAction, ProposalKind};
use serde::{Deserialize, Serialize};
use vigil_types::{AccountId, Timestamp};

pub type ProposalId = u64;
pub type SnapshotId = u64;

/// Lifecycle of a proposal.
///
/// `Active → {Defeated, Succeeded → Queued} → Executed`, with `Vetoed`
/// reachable from `Active` or `Queued`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Accepting votes until the deadline.
    Active,
    /// Missed quorum, or against ≥ for.
    Defeated,
    /// Passed. Transient: finalization moves it straight to `Queued`.
    Succeeded,
    /// Waiting out the timelock (or a failed execution).
    Queued,
    Executed,
    Vetoed,
}

impl ProposalStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Defeated | Self::Executed | Self::Vetoed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteChoice {
    For,
    Against,
    Abstain,
}

/// One account's vote on one proposal. Immutable once cast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub proposal: ProposalId,
    pub voter: AccountId,
    pub choice: VoteChoice,
    pub weight: u128,
    pub cast_at: Timestamp,
}

/// What a proposer submits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub kind: ProposalKind,
    pub title: String,
    pub description: String,
    pub action: ProposalAction,
    pub value: u128,
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: AccountId,
    pub kind: ProposalKind,
    pub title: String,
    pub description: String,
    pub action: ProposalAction,
    pub value: u128,
    pub votes_for: u128,
    pub votes_against: u128,
    pub votes_abstain: u128,
    pub status: ProposalStatus,
    /// Key of the balance memo used for every vote on this proposal.
    pub snapshot_id: SnapshotId,
    pub total_supply_at_snapshot: u128,
    pub created_at: Timestamp,
    pub voting_ends_at: Timestamp,
    pub queued_at: Option<Timestamp>,
    pub executed: bool,
    /// Reason the most recent execution attempt failed, if any.
    pub last_failure: Option<String>,
}

impl Proposal {
    pub fn participation(&self) -> u128 {
        self.votes_for
            .saturating_add(self.votes_against)
            .saturating_add(self.votes_abstain)
    }
}
