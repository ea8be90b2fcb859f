//! In-memory store of package records keyed by package directory

use crate::package::{FileKind, PackageKey, PackageRecord};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
struct StoredRecord {
    /// Order of first discovery
    seq: u64,
    record: PackageRecord,
}

/// Whether an upsert created a new record or updated an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Authoritative owner of every package record discovered in a run
///
/// Records live in a sharded map; `upsert` holds the shard lock of its key
/// for the whole create-or-update, so concurrent writers to one key are
/// serialized while writers to other shards proceed in parallel.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: DashMap<PackageKey, StoredRecord>,
    next_seq: AtomicU64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the record for `key` if needed, then sets the `kind` URL
    ///
    /// # Arguments
    ///
    /// * `key` - Package directory the file belongs to
    /// * `kind` - Which well-known file was found
    /// * `url` - Absolute URL of the file
    ///
    /// # Returns
    ///
    /// `Created` if this call created the record, `Updated` otherwise
    pub fn upsert(&self, key: PackageKey, kind: FileKind, url: &str) -> UpsertOutcome {
        match self.records.entry(key) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().record.set(kind, url);
                UpsertOutcome::Updated
            }
            Entry::Vacant(vacant) => {
                let mut record = PackageRecord::new(vacant.key());
                record.set(kind, url);
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                vacant.insert(StoredRecord { seq, record });
                UpsertOutcome::Created
            }
        }
    }

    /// Returns a copy of the record for `key`
    pub fn get(&self, key: &PackageKey) -> Option<PackageRecord> {
        self.records.get(key).map(|stored| stored.record.clone())
    }

    /// All records in order of first discovery
    pub fn snapshot(&self) -> Vec<PackageRecord> {
        let mut entries: Vec<(u64, PackageRecord)> = self
            .records
            .iter()
            .map(|stored| (stored.seq, stored.record.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, record)| record).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records carrying both file URLs
    pub fn complete_count(&self) -> usize {
        self.records
            .iter()
            .filter(|stored| stored.record.is_complete())
            .count()
    }
}
