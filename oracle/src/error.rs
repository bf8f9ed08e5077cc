//! Oracle-specific errors.

use thiserror::Error;
use vigil_ledger::LedgerError;
use vigil_staking::StakingError;
use vigil_types::{ErrorKind, Timestamp};

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("confidence {0} is outside 0-100")]
    InvalidConfidence(u8),

    #[error("severity {0} is outside 1-5")]
    InvalidSeverity(u8),

    #[error("region must not be empty")]
    EmptyRegion,

    #[error("source tag must not be empty")]
    EmptySource,

    #[error("{count} recipients exceeds the per-alert limit of {max}")]
    TooManyRecipients { count: usize, max: usize },

    #[error("alert {0} not found")]
    AlertNotFound(u64),

    #[error("region {region} reached its daily cap of {cap} alerts; retry at {retry_at}")]
    DailyCapReached {
        region: String,
        cap: u32,
        retry_at: Timestamp,
    },

    #[error("{alert_type} alerts for {region} are cooling down until {retry_at}")]
    CooldownActive {
        region: String,
        alert_type: String,
        retry_at: Timestamp,
    },

    #[error("alert {0} has already been executed")]
    AlreadyExecuted(u64),

    #[error("alert {0} is blocked by a guardian override")]
    Blocked(u64),

    #[error("alert {id} confidence {confidence} is below the execution threshold {minimum}")]
    BelowConfidence { id: u64, confidence: u8, minimum: u8 },

    #[error("alert {0} has not been executed")]
    NotExecuted(u64),

    #[error("reward for alert {0} has already been issued")]
    RewardAlreadyIssued(u64),

    #[error("no pending reward for {0}")]
    NothingToClaim(String),

    #[error("reward pool holds {available}, claim needs {needed}")]
    InsufficientPool { needed: u128, available: u128 },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("arithmetic overflow in oracle computation")]
    Overflow,

    #[error("oracle invariant violated: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Staking(#[from] StakingError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl OracleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfidence(_)
            | Self::InvalidSeverity(_)
            | Self::EmptyRegion
            | Self::EmptySource
            | Self::TooManyRecipients { .. }
            | Self::AlertNotFound(_)
            | Self::BelowConfidence { .. }
            | Self::NotExecuted(_)
            | Self::ZeroAmount => ErrorKind::Validation,
            Self::DailyCapReached { .. } | Self::CooldownActive { .. } => ErrorKind::RateLimited,
            Self::AlreadyExecuted(_) | Self::Blocked(_) | Self::RewardAlreadyIssued(_) => {
                ErrorKind::Idempotency
            }
            Self::NothingToClaim(_) | Self::InsufficientPool { .. } => {
                ErrorKind::InsufficientResource
            }
            Self::Overflow | Self::InvariantViolation(_) => ErrorKind::Internal,
            Self::Staking(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
        }
    }
}
