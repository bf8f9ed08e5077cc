//! Staking-specific errors.

use thiserror::Error;
use vigil_ledger::LedgerError;
use vigil_types::ErrorKind;

#[derive(Debug, Error)]
pub enum StakingError {
    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("stake amount {amount} is below the minimum of {minimum}")]
    BelowMinimum { amount: u128, minimum: u128 },

    #[error("no stake held by {0}")]
    NoStake(String),

    #[error("{count} recipients exceeds the per-call limit of {max}")]
    TooManyRecipients { count: usize, max: usize },

    #[error("burn rate {0} bps exceeds 10000")]
    InvalidRate(u32),

    #[error("arithmetic overflow in staking computation")]
    Overflow,

    #[error("staking invariant violated: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl StakingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroAmount
            | Self::NoStake(_)
            | Self::TooManyRecipients { .. }
            | Self::InvalidRate(_) => ErrorKind::Validation,
            Self::BelowMinimum { .. } => ErrorKind::InsufficientResource,
            Self::Overflow | Self::InvariantViolation(_) => ErrorKind::Internal,
            Self::Ledger(e) => e.kind(),
        }
    }
}
