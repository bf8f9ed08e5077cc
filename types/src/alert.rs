//! Alert classification shared by the oracle and staking engines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of hazard an alert reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertType {
    Earthquake,
    Flood,
    Wildfire,
    Cyclone,
    Drought,
    Tsunami,
    Landslide,
    Volcanic,
    Epidemic,
    Heatwave,
}

impl AlertType {
    pub const ALL: [AlertType; 10] = [
        Self::Earthquake,
        Self::Flood,
        Self::Wildfire,
        Self::Cyclone,
        Self::Drought,
        Self::Tsunami,
        Self::Landslide,
        Self::Volcanic,
        Self::Epidemic,
        Self::Heatwave,
    ];

    /// Short tag used in logs and event records.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Earthquake => "earthquake",
            Self::Flood => "flood",
            Self::Wildfire => "wildfire",
            Self::Cyclone => "cyclone",
            Self::Drought => "drought",
            Self::Tsunami => "tsunami",
            Self::Landslide => "landslide",
            Self::Volcanic => "volcanic",
            Self::Epidemic => "epidemic",
            Self::Heatwave => "heatwave",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Region code an alert applies to (e.g. `"KE-30"`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RegionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
