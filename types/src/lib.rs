//! Fundamental types for the Vigil control plane.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account identities, amounts and basis-point math, timestamps and the clock
//! seam, alert classification, roles, economy parameters, and the error taxonomy.

pub mod account;
pub mod alert;
pub mod amount;
pub mod error;
pub mod params;
pub mod role;
pub mod time;

pub use account::AccountId;
pub use alert::{AlertType, RegionId};
pub use amount::{apply_bps, tokens, BPS_DENOMINATOR, UNIT};
pub use error::ErrorKind;
pub use params::{EconomyParams, GovernanceParams, OracleParams, StakingParams};
pub use role::Role;
pub use time::{Clock, DayIndex, SystemClock, Timestamp, SECS_PER_DAY};
