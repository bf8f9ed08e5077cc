//! File-backed event store.
//!
//! Layout: a flat sequence of `[len: u32 LE][bincode(EventRecord)]` frames.
//!
//! A failed append truncates the file back to its previous length, so a
//! half-written frame never sits in front of later records.

use crate::error::StoreError;
use crate::record::EventRecord;
use crate::EventStore;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

pub struct FileEventStore {
    path: PathBuf,
}

impl FileEventStore {
    /// Open (or create on first append) the log at `path`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventStore for FileEventStore {
    fn append(&self, records: &[EventRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        let mut buf = Vec::new();
        for record in records {
            let body = bincode::serialize(record)?;
            let len = u32::try_from(body.len())
                .map_err(|_| StoreError::Serialization("record larger than 4 GiB".into()))?;
            buf.extend_from_slice(&len.to_le_bytes());
            buf.extend_from_slice(&body);
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let start = file.metadata()?.len();
        let written = file.write_all(&buf).and_then(|()| file.sync_data());
        rewind_on_error(&file, start, written)
    }

    fn load(&self) -> Result<Vec<EventRecord>, StoreError> {
        let mut bytes = Vec::new();
        match File::open(&self.path) {
            Ok(mut file) => {
                file.read_to_end(&mut bytes)?;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        }

        let mut records = Vec::new();
        let mut offset = 0usize;
        while offset < bytes.len() {
            let header = bytes.get(offset..offset + 4).ok_or_else(|| {
                StoreError::Corruption(format!("truncated frame header at byte {offset}"))
            })?;
            let mut len_bytes = [0u8; 4];
            len_bytes.copy_from_slice(header);
            let len = u32::from_le_bytes(len_bytes) as usize;
            let start = offset + 4;
            let body = bytes.get(start..start + len).ok_or_else(|| {
                StoreError::Corruption(format!("truncated record at byte {offset}"))
            })?;
            records.push(bincode::deserialize(body)?);
            offset = start + len;
        }
        Ok(records)
    }
}

/// Cut `file` back to `start` bytes if `result` failed.
fn rewind_on_error(file: &File, start: u64, result: std::io::Result<()>) -> Result<(), StoreError> {
    if let Err(e) = result {
        if let Err(trunc) = file.set_len(start) {
            tracing::error!(error = %trunc, start, "could not truncate event log after failed append");
        }
        return Err(e.into());
    }
    Ok(())
}
