use crate::proposal::ProposalStatus;
use thiserror::Error;
use vigil_types::{ErrorKind, Timestamp};

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    ProposalNotFound(u64),

    #[error("proposal title must not be empty")]
    EmptyTitle,

    #[error("proposal kind {kind} does not match action {action}")]
    KindMismatch { kind: String, action: String },

    #[error("invalid value {value} for {param}: {reason}")]
    InvalidParameter {
        param: &'static str,
        value: u128,
        reason: &'static str,
    },

    #[error("insufficient balance to propose: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },

    #[error("proposer {proposer} is cooling down until {retry_at}")]
    ProposerCooldown { proposer: String, retry_at: Timestamp },

    #[error("voting on proposal {0} has closed")]
    VotingClosed(u64),

    #[error("voting on proposal {id} is open until {ends_at}")]
    VotingOpen { id: u64, ends_at: Timestamp },

    #[error("{voter} has already voted on proposal {id}")]
    AlreadyVoted { id: u64, voter: String },

    #[error("{voter} has zero voting weight on proposal {id}")]
    ZeroWeight { id: u64, voter: String },

    #[error("proposal {id} is already {status:?}")]
    AlreadyFinalized { id: u64, status: ProposalStatus },

    #[error("proposal {id} is {status:?}, not queued")]
    NotQueued { id: u64, status: ProposalStatus },

    #[error("proposal {id} is timelocked until {ready_at}")]
    TimelockActive { id: u64, ready_at: Timestamp },

    #[error("proposal {id} execution failed: {reason}")]
    ExecutionFailed { id: u64, reason: String },

    #[error("guardian {guardian} has already vetoed proposal {id}")]
    AlreadyVetoed { id: u64, guardian: String },

    #[error("proposal {id} is {status:?} and can no longer be vetoed")]
    NotVetoable { id: u64, status: ProposalStatus },

    #[error("arithmetic overflow in governance computation")]
    Overflow,
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProposalNotFound(_)
            | Self::EmptyTitle
            | Self::KindMismatch { .. }
            | Self::InvalidParameter { .. }
            | Self::VotingClosed(_)
            | Self::VotingOpen { .. }
            | Self::NotQueued { .. } => ErrorKind::Validation,
            Self::InsufficientBalance { .. } | Self::ZeroWeight { .. } => {
                ErrorKind::InsufficientResource
            }
            Self::ProposerCooldown { .. } | Self::TimelockActive { .. } => ErrorKind::RateLimited,
            Self::ExecutionFailed { .. } => ErrorKind::ExecutionFailure,
            Self::AlreadyVoted { .. }
            | Self::AlreadyFinalized { .. }
            | Self::AlreadyVetoed { .. }
            | Self::NotVetoable { .. } => ErrorKind::Idempotency,
            Self::Overflow => ErrorKind::Internal,
        }
    }
}
