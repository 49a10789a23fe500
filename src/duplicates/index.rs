//! Concurrent digest → paths index.
//!
//! # Overview
//!
//! [`DuplicateIndex`] is the only structure shared by the hashing tasks of a
//! run. It maps each content digest to the paths that produced it, in the
//! order their hashes completed. Updates lock only the shard holding the
//! key, so hashers that finish different digests do not serialize on a
//! single lock, while two hashers finishing the same digest never lose an
//! append.
//!
//! The index is append-only for the lifetime of a run and is read for
//! reporting only after the coordinator reports that all tasks drained.
//!
//! # Example
//!
//! ```
//! use dupscan::duplicates::DuplicateIndex;
//! use std::path::PathBuf;
//!
//! let index = DuplicateIndex::new();
//! index.insert([7u8; 32], PathBuf::from("/a/x"));
//! index.insert([7u8; 32], PathBuf::from("/a/y"));
//! index.insert([9u8; 32], PathBuf::from("/a/z"));
//!
//! assert_eq!(index.len(), 2);
//! assert_eq!(index.duplicate_groups().len(), 1);
//! ```

use std::path::PathBuf;

use dashmap::DashMap;

use super::groups::DuplicateGroup;
use crate::scanner::Hash;

/// Thread-safe mapping from digest to the paths sharing it.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    entries: DashMap<Hash, Vec<PathBuf>>,
}

impl DuplicateIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` to the entry for `hash`, creating the entry if needed.
    ///
    /// The read-modify-write holds the key's shard lock for its whole
    /// duration.
    pub fn insert(&self, hash: Hash, path: PathBuf) {
        self.entries.entry(hash).or_default().push(path);
    }

    /// Number of distinct digests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no file has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of recorded paths across all digests.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.entries.iter().map(|e| e.value().len()).sum()
    }

    /// Paths recorded for `hash`, in completion order.
    #[must_use]
    pub fn paths(&self, hash: &Hash) -> Option<Vec<PathBuf>> {
        self.entries.get(hash).map(|e| e.value().clone())
    }

    /// Snapshot every entry with more than one path.
    ///
    /// Groups come out in map iteration order; paths keep completion order.
    #[must_use]
    pub fn duplicate_groups(&self) -> Vec<DuplicateGroup> {
        self.entries
            .iter()
            .filter(|e| e.value().len() > 1)
            .map(|e| DuplicateGroup::new(*e.key(), e.value().clone()))
            .collect()
    }
}
