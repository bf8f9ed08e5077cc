//! Event log storage for the Vigil control plane.
//!
//! Every committed transaction appends one or more [`EventRecord`]s. Records
//! are hash-chained, so any edit to history is detectable by
//! [`verify_chain`]. The rest of the codebase depends only on the
//! [`EventStore`] trait; backends are the file store here and the in-memory
//! store in `vigil-nullables`.

pub mod error;
pub mod event;
pub mod file;
pub mod record;

pub use error::StoreError;
pub use event::Event;
pub use file::FileEventStore;
pub use record::{verify_chain, EventRecord, GENESIS_HASH};

/// Append-only event log.
pub trait EventStore {
    /// Persist records at the end of the log, in order.
    fn append(&self, records: &[EventRecord]) -> Result<(), StoreError>;

    /// Every record, oldest first.
    fn load(&self) -> Result<Vec<EventRecord>, StoreError>;
}
