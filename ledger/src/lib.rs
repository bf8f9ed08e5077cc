//! Account ledger.
//!
//! Holds per-account balances, the escrow allowances that authorize staking,
//! and the supply/burn counters. Every other component reads and mutates
//! value through this crate; no operation here can drive a balance negative.

pub mod error;
pub mod ledger;

pub use error::LedgerError;
pub use ledger::Ledger;
