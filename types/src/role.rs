//! Roles granted to accounts by the access-control collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May submit and confirm alerts.
    Oracle,
    /// May veto proposals and block pending alerts.
    Guardian,
    /// May move external funds and manage roles.
    Admin,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Oracle => "oracle",
            Self::Guardian => "guardian",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
