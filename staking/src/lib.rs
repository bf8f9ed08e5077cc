//! Staking and burn engine.
//!
//! Stake is value an account moves into escrow. Every executed alert burns a
//! fixed fraction of each recipient's active stake:
//! `burn = floor(amount × burn_rate_bps / 10_000)`
//!
//! This crate handles:
//! - Staking (escrow transfer gated on a pre-authorized allowance)
//! - Full withdrawal (no partial unstake)
//! - Proportional burns over a bounded recipient batch
//! - Keeping `active == (amount >= min_stake)` under every mutation

pub mod engine;
pub mod error;
pub mod stake;

pub use engine::StakingEngine;
pub use error::StakingError;
pub use stake::{BurnSummary, RecipientBurn, Stake};
