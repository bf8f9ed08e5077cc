//! Stake-weighted governance for the Vigil control plane.
//!
//! Lifecycle: Active → {Defeated, Succeeded → Queued} → Executed, with a
//! guardian veto reachable from Active or Queued.
//!
//! Key principles:
//! - Weight grows with the square root of balance, never linearly.
//! - Balances are fixed per proposal at each voter's first interaction.
//! - Passing a vote only queues a proposal; execution waits out a
//!   wall-clock timelock and can still be vetoed.
//! - All economy parameters are governable, including these thresholds.

pub mod action;
pub mod engine;
pub mod error;
pub mod params;
pub mod proposal;
pub mod voting;

pub use action::{ActionExecutor, ProposalAction, ProposalKind};
pub use engine::{BalanceSource, GovernanceEngine, VetoOutcome};
pub use error::GovernanceError;
pub use params::{GovernableParam, ParamSection};
pub use proposal::{
    Proposal, ProposalDraft, ProposalId, ProposalStatus, SnapshotId, VoteChoice, VoteRecord,
};
pub use voting::{isqrt, quadratic_weight};
