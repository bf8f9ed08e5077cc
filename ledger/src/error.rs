use thiserror::Error;
use vigil_types::ErrorKind;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("invalid account id: {0:?}")]
    InvalidAccount(String),

    #[error("insufficient funds in {account}: need {needed}, available {available}")]
    InsufficientFunds {
        account: String,
        needed: u128,
        available: u128,
    },

    #[error("escrow allowance for {owner} is {available}, need {needed}")]
    InsufficientAllowance {
        owner: String,
        needed: u128,
        available: u128,
    },

    #[error("arithmetic overflow in ledger computation")]
    Overflow,

    #[error("supply mismatch: balances sum to {balances}, recorded supply {supply}")]
    SupplyMismatch { balances: u128, supply: u128 },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroAmount | Self::InvalidAccount(_) => ErrorKind::Validation,
            Self::InsufficientFunds { .. } | Self::InsufficientAllowance { .. } => {
                ErrorKind::InsufficientResource
            }
            Self::Overflow | Self::SupplyMismatch { .. } => ErrorKind::Internal,
        }
    }
}
