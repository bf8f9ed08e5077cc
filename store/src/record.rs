//! Hash-chained event records.

use crate::error::StoreError;
use crate::event::Event;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use vigil_types::Timestamp;

type Blake2b256 = Blake2b<U32>;

/// Hash that precedes the first record.
pub const GENESIS_HASH: [u8; 32] = [0u8; 32];

/// One committed event, linked to its predecessor by hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0.
    pub seq: u64,
    pub timestamp: Timestamp,
    pub event: Event,
    pub prev_hash: [u8; 32],
    /// Blake2b-256 over (seq, timestamp, event, prev_hash).
    pub hash: [u8; 32],
}

impl EventRecord {
    /// Build a record and compute its hash.
    pub fn seal(
        seq: u64,
        timestamp: Timestamp,
        event: Event,
        prev_hash: [u8; 32],
    ) -> Result<Self, StoreError> {
        let hash = Self::compute_hash(seq, timestamp, &event, &prev_hash)?;
        Ok(Self {
            seq,
            timestamp,
            event,
            prev_hash,
            hash,
        })
    }

    fn compute_hash(
        seq: u64,
        timestamp: Timestamp,
        event: &Event,
        prev_hash: &[u8; 32],
    ) -> Result<[u8; 32], StoreError> {
        let body = bincode::serialize(&(seq, timestamp, event, prev_hash))?;
        let mut hasher = Blake2b256::new();
        hasher.update(&body);
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Ok(out)
    }

    /// Whether the stored hash matches the record's contents.
    pub fn verify(&self) -> bool {
        Self::compute_hash(self.seq, self.timestamp, &self.event, &self.prev_hash)
            .is_ok_and(|h| h == self.hash)
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Check sequence numbers, links and hashes of a whole log.
///
/// Returns the head hash (or [`GENESIS_HASH`] for an empty log).
pub fn verify_chain(records: &[EventRecord]) -> Result<[u8; 32], StoreError> {
    let mut prev = GENESIS_HASH;
    for (i, record) in records.iter().enumerate() {
        let expected_seq = i as u64;
        if record.seq != expected_seq {
            return Err(StoreError::ChainBroken {
                seq: record.seq,
                reason: format!("expected sequence {expected_seq}"),
            });
        }
        if record.prev_hash != prev {
            return Err(StoreError::ChainBroken {
                seq: record.seq,
                reason: format!(
                    "previous hash {} does not match {}",
                    hex::encode(record.prev_hash),
                    hex::encode(prev)
                ),
            });
        }
        if !record.verify() {
            return Err(StoreError::ChainBroken {
                seq: record.seq,
                reason: "record hash does not match contents".into(),
            });
        }
        prev = record.hash;
    }
    Ok(prev)
}
