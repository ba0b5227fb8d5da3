//! Copy-on-write overlay over a read-only store.
//!
//! Reads fall through to the parent unless the key was written or deleted
//! in the overlay. Nested overlays give cheap snapshots: the inner overlay
//! is either dropped (rollback) or its changes are applied to the outer one
//! (merge).

use std::collections::BTreeMap;

use crate::changes::Changes;
use crate::error::StorageResult;
use crate::traits::{ReadStore, WriteStore};

/// Staged writes on top of a borrowed parent store.
pub struct Overlay<'a> {
    parent: &'a dyn ReadStore,
    changes: Changes,
}

impl<'a> Overlay<'a> {
    pub fn new(parent: &'a dyn ReadStore) -> Self {
        Self {
            parent,
            changes: Changes::new(),
        }
    }

    /// Writes staged so far.
    pub fn changes(&self) -> &Changes {
        &self.changes
    }

    /// Consumes the overlay and returns its diff against the parent.
    pub fn into_changes(self) -> Changes {
        self.changes
    }
}

impl ReadStore for Overlay<'_> {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        match self.changes.get(key) {
            Some(value) => Ok(value.map(<[u8]>::to_vec)),
            None => self.parent.get(key),
        }
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.scan_prefix(prefix)?.into_iter().collect();
        for (key, value) in self.changes.range_prefix(prefix) {
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}

impl WriteStore for Overlay<'_> {
    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()> {
        self.changes.put(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StorageResult<()> {
        self.changes.delete(key.to_vec());
        Ok(())
    }
}

impl std::fmt::Debug for Overlay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overlay")
            .field("staged", &self.changes.len())
            .finish()
    }
}
