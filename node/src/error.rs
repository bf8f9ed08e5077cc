use thiserror::Error;
use vigil_types::{ErrorKind, Timestamp};

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] vigil_ledger::LedgerError),

    #[error("staking error: {0}")]
    Staking(#[from] vigil_staking::StakingError),

    #[error("oracle error: {0}")]
    Oracle(#[from] vigil_oracle::OracleError),

    #[error("governance error: {0}")]
    Governance(#[from] vigil_governance::GovernanceError),

    #[error("store error: {0}")]
    Store(#[from] vigil_store::StoreError),

    #[error("{caller} lacks the {capability} capability")]
    Unauthorized { caller: String, capability: String },

    #[error("account {0} is invalid or reserved")]
    InvalidAccount(String),

    #[error("clock moved backwards: {now} is before {last}")]
    ClockRegression { now: Timestamp, last: Timestamp },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("event log replay failed: {0}")]
    Replay(String),

    #[error("config error: {0}")]
    Config(String),
}

impl NodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger(e) => e.kind(),
            Self::Staking(e) => e.kind(),
            Self::Oracle(e) => e.kind(),
            Self::Governance(e) => e.kind(),
            Self::Store(e) => e.kind(),
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidAccount(_) | Self::Config(_) => ErrorKind::Validation,
            Self::ClockRegression { .. }
            | Self::InvariantViolation(_)
            | Self::Replay(_) => ErrorKind::Internal,
        }
    }
}
