//! Authorization seam.
//!
//! Every control-plane operation names the capability it needs and asks the
//! [`AccessControl`] collaborator before touching state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use vigil_types::{AccountId, Role};

/// Privileged operations. Anything not listed here is open to any caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    /// Submit or confirm oracle alerts.
    SubmitAlert,
    /// Veto proposals and block pending alerts.
    Guardian,
    /// Move external funds and manage roles.
    Administer,
}

impl Capability {
    /// Role that grants this capability.
    pub fn role(&self) -> Role {
        match self {
            Self::SubmitAlert => Role::Oracle,
            Self::Guardian => Role::Guardian,
            Self::Administer => Role::Admin,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SubmitAlert => "submit-alert",
            Self::Guardian => "guardian",
            Self::Administer => "administer",
        };
        f.write_str(s)
    }
}

pub trait AccessControl {
    fn authorize(&self, caller: &AccountId, capability: Capability) -> bool;

    /// Returns false if the account already held the role.
    fn grant(&mut self, account: &AccountId, role: Role) -> bool;

    /// Returns false if the account did not hold the role.
    fn revoke(&mut self, account: &AccountId, role: Role) -> bool;

    fn holders(&self, role: Role) -> Vec<AccountId>;
}

/// In-process role registry: account → set of roles.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoleRegistry {
    roles: BTreeMap<AccountId, BTreeSet<Role>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_role(&self, account: &AccountId, role: Role) -> bool {
        self.roles.get(account).is_some_and(|r| r.contains(&role))
    }

    pub fn roles_of(&self, account: &AccountId) -> Vec<Role> {
        self.roles
            .get(account)
            .map(|r| r.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl AccessControl for RoleRegistry {
    fn authorize(&self, caller: &AccountId, capability: Capability) -> bool {
        self.has_role(caller, capability.role())
    }

    fn grant(&mut self, account: &AccountId, role: Role) -> bool {
        self.roles.entry(account.clone()).or_default().insert(role)
    }

    fn revoke(&mut self, account: &AccountId, role: Role) -> bool {
        let Some(set) = self.roles.get_mut(account) else {
            return false;
        };
        let removed = set.remove(&role);
        if set.is_empty() {
            self.roles.remove(account);
        }
        removed
    }

    fn holders(&self, role: Role) -> Vec<AccountId> {
        self.roles
            .iter()
            .filter(|(_, r)| r.contains(&role))
            .map(|(a, _)| a.clone())
            .collect()
    }
}
