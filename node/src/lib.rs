//! Vigil control plane: every engine behind one handle.
//!
//! The [`ControlPlane`] is the only way to change state:
//! - Authorizes each privileged call through [`AccessControl`]
//! - Reads the injected clock once per transaction and rejects regressions
//! - Runs each operation all-or-nothing, auditing invariants before commit
//! - Appends the resulting events to a hash-chained [`EventStore`](vigil_store::EventStore)
//! - Dispatches executed governance actions through [`EconomyExecutor`]
//!
//! A [`Projection`] rebuilt from the log must agree with the live engines.

pub mod access;
pub mod config;
pub mod control;
pub mod error;
pub mod executor;
pub mod projection;

pub use access::{AccessControl, Capability, RoleRegistry};
pub use config::{NodeConfig, RoleGrant};
pub use control::{AlertOutcome, ControlPlane};
pub use error::NodeError;
pub use executor::{changed_params, EconomyExecutor};
pub use projection::{AlertView, Projection, ProjectionSummary, ProposalView, StakeView};
