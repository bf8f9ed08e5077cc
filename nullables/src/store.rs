//! Nullable event store: in-memory log for testing.

use std::sync::Mutex;
use vigil_store::{EventRecord, EventStore, StoreError};

/// A scheduled append failure: skip `after` successful appends, then fail.
#[derive(Debug)]
struct PlannedFailure {
    after: usize,
    reason: String,
}

/// An in-memory event log. Can be told to fail an upcoming append.
#[derive(Debug, Default)]
pub struct NullEventStore {
    records: Mutex<Vec<EventRecord>>,
    failure: Mutex<Option<PlannedFailure>>,
}

impl NullEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `append` fail with a backend error.
    pub fn fail_next_append(&self, reason: &str) {
        self.fail_append_after(0, reason);
    }

    /// Let `after` appends succeed, then fail the one following them.
    pub fn fail_append_after(&self, after: usize, reason: &str) {
        *lock(&self.failure) = Some(PlannedFailure {
            after,
            reason: reason.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite one record in place, bypassing the append-only contract.
    pub fn tamper(&self, seq: usize, f: impl FnOnce(&mut EventRecord)) {
        if let Some(record) = lock(&self.records).get_mut(seq) {
            f(record);
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl EventStore for NullEventStore {
    fn append(&self, records: &[EventRecord]) -> Result<(), StoreError> {
        {
            let mut failure = lock(&self.failure);
            let fire = match failure.as_mut() {
                Some(planned) if planned.after == 0 => true,
                Some(planned) => {
                    planned.after -= 1;
                    false
                }
                None => false,
            };
            if fire {
                let reason = failure.take().map(|p| p.reason).unwrap_or_default();
                return Err(StoreError::Backend(reason));
            }
        }
        lock(&self.records).extend_from_slice(records);
        Ok(())
    }

    fn load(&self) -> Result<Vec<EventRecord>, StoreError> {
        Ok(lock(&self.records).clone())
    }
}
