//! Nullable infrastructure for deterministic testing.
//!
//! The control plane reaches the outside world through two seams: the
//! [`Clock`](vigil_types::Clock) and the [`EventStore`](vigil_store::EventStore).
//! This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod store;

pub use clock::NullClock;
pub use store::NullEventStore;
