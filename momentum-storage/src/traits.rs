use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::changes::Changes;
use crate::error::{StorageError, StorageResult};

/// Read access to a flat, ordered key space.
pub trait ReadStore {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Returns every entry whose key starts with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>>;

    fn contains(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Write access on top of [`ReadStore`].
pub trait WriteStore: ReadStore {
    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()>;

    fn delete(&mut self, key: &[u8]) -> StorageResult<()>;

    /// Applies a state diff in key order.
    fn apply(&mut self, changes: &Changes) -> StorageResult<()> {
        for (key, value) in changes.iter() {
            match value {
                Some(value) => self.put(key.to_vec(), value.to_vec())?,
                None => self.delete(key)?,
            }
        }
        Ok(())
    }
}

/// Typed reads of `bincode` records.
pub trait ReadStoreExt: ReadStore {
    fn get_record<V: DeserializeOwned>(&self, key: &[u8]) -> StorageResult<Option<V>> {
        match self.get(key)? {
            Some(bytes) => bincode::deserialize(&bytes)
                .map(Some)
                .map_err(|err| StorageError::codec(std::any::type_name::<V>(), err)),
            None => Ok(None),
        }
    }
}

impl<T: ReadStore + ?Sized> ReadStoreExt for T {}

/// Typed writes of `bincode` records.
pub trait WriteStoreExt: WriteStore {
    fn put_record<V: Serialize>(&mut self, key: Vec<u8>, value: &V) -> StorageResult<()> {
        let bytes = bincode::serialize(value)
            .map_err(|err| StorageError::codec(std::any::type_name::<V>(), err))?;
        self.put(key, bytes)
    }
}

impl<T: WriteStore + ?Sized> WriteStoreExt for T {}
