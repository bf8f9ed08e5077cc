//! Alert records.

use serde::{Deserialize, Serialize};
use vigil_types::{AccountId, AlertType, RegionId, Timestamp};

/// Sequential alert identifier, starting at 1.
pub type AlertId = u64;

/// Lifecycle of an alert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    /// Recorded but not executed (confidence below threshold).
    Pending,
    /// Burn applied. Immutable from here on.
    Executed,
    /// Suppressed by a guardian override; can never execute.
    Blocked,
}

/// What an oracle operator submits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSubmission {
    pub alert_type: AlertType,
    pub region: RegionId,
    /// 0-100.
    pub confidence: u8,
    /// 1-5.
    pub severity: u8,
    /// Free-form tag naming the upstream data source.
    pub source: String,
    /// Accounts in the affected region, supplied by the eligibility feed.
    pub recipients: Vec<AccountId>,
}

/// A recorded alert.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub alert_type: AlertType,
    pub region: RegionId,
    pub confidence: u8,
    pub severity: u8,
    pub source: String,
    pub recipients: Vec<AccountId>,
    /// Operator who submitted the alert and earns its reward.
    pub operator: AccountId,
    pub submitted_at: Timestamp,
    pub status: AlertStatus,
    /// Total stake burned by this alert.
    pub burned: u128,
    /// Recipients whose active stake was burned.
    pub affected: u32,
    pub executed_at: Option<Timestamp>,
    /// `Some` once the reward step ran (possibly issuing zero).
    pub reward: Option<u128>,
    pub override_reason: Option<String>,
}

impl Alert {
    pub fn is_executed(&self) -> bool {
        self.status == AlertStatus::Executed
    }
}
