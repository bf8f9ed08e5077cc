//! Error taxonomy shared across crates.
//!
//! Every crate keeps its own `thiserror` enum; each variant reports one of
//! these kinds so callers can decide whether to retry, fix input, or escalate.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Out-of-range input, unknown id, zero amount.
    Validation,
    /// Below minimum stake, pool or budget exhausted, missing allowance.
    InsufficientResource,
    /// Cooldown active or daily cap reached; retry once the window passes.
    RateLimited,
    /// Caller lacks the capability for this operation.
    Unauthorized,
    /// A governance target action failed to dispatch.
    ExecutionFailure,
    /// Already voted, vetoed, executed, finalized.
    Idempotency,
    /// Storage failure or detected invariant violation.
    Internal,
}

impl ErrorKind {
    /// Whether the same call may succeed later without different input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ExecutionFailure)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::InsufficientResource => "insufficient_resource",
            Self::RateLimited => "rate_limited",
            Self::Unauthorized => "unauthorized",
            Self::ExecutionFailure => "execution_failure",
            Self::Idempotency => "idempotency",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}
