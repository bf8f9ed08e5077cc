//! Control-plane configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use vigil_governance::GovernableParam;
use vigil_types::{AccountId, EconomyParams, Role};
use vigil_utils::LogFormat;

use crate::NodeError;

/// A role assigned at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    pub account: AccountId,
    pub role: Role,
}

/// Configuration for a control plane.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Append-only event log.
    #[serde(default = "default_event_log")]
    pub event_log: PathBuf,

    /// Roles granted when the control plane starts on an empty log.
    #[serde(default)]
    pub roles: Vec<RoleGrant>,

    /// Economy parameters (staking, oracle and governance sections).
    #[serde(default)]
    pub params: EconomyParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

fn default_event_log() -> PathBuf {
    PathBuf::from("./vigil_data/events.log")
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Range-check every governable parameter and the role list.
    pub fn validate(&self) -> Result<(), NodeError> {
        for param in GovernableParam::ALL {
            param
                .validate(param.read(&self.params))
                .map_err(|e| NodeError::Config(e.to_string()))?;
        }
        for grant in &self.roles {
            if !grant.account.is_valid() || grant.account.is_system() {
                return Err(NodeError::Config(format!(
                    "cannot grant {} to account '{}'",
                    grant.role, grant.account
                )));
            }
        }
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            event_log: default_event_log(),
            roles: Vec::new(),
            params: EconomyParams::default(),
        }
    }
}
