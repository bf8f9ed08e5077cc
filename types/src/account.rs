//! Account identity type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a ledger account.
///
/// User accounts are opaque strings handed to us by the access-control
/// collaborator. Accounts prefixed with `sys:` are reserved for the
/// control plane itself (escrow, reward pool, treasury).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Prefix reserved for system-owned accounts.
    pub const SYSTEM_PREFIX: &'static str = "sys:";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Account holding every staked unit.
    pub fn escrow() -> Self {
        Self::new("sys:escrow")
    }

    /// Account holding the funded reward pool (available + pending).
    pub fn reward_pool() -> Self {
        Self::new("sys:reward-pool")
    }

    /// Governance-controlled treasury.
    pub fn treasury() -> Self {
        Self::new("sys:treasury")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_system(&self) -> bool {
        self.0.starts_with(Self::SYSTEM_PREFIX)
    }

    /// Non-empty and free of whitespace.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && !self.0.chars().any(char::is_whitespace)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
