/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! A simple, volatile, in-memory implementation of [`KVStore`].

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use super::pluggables::{KVGet, KVStore, KVStoreError, WriteBatch};

/// An in-memory implementation of [`KVStore`].
///
/// A whole [`MemWriteBatch`] is applied while holding the store's lock, so concurrent readers see
/// either none or all of its writes.
#[derive(Clone, Default)]
pub struct MemDB(Arc<Mutex<HashMap<Vec<u8>, Vec<u8>>>>);

impl MemDB {
    /// Create a new, empty `MemDB`.
    pub fn new() -> MemDB {
        MemDB(Arc::new(Mutex::new(HashMap::new())))
    }

    /// Get the number of keys currently committed.
    pub fn len(&self) -> Result<usize, KVStoreError> {
        let map = self.0.lock().map_err(|err| KVStoreError::ReadFailed {
            key: Vec::new(),
            reason: err.to_string(),
        })?;
        Ok(map.len())
    }

    pub fn is_empty(&self) -> Result<bool, KVStoreError> {
        Ok(self.len()? == 0)
    }
}

impl KVStore for MemDB {
    type WriteBatch = MemWriteBatch;

    fn begin(&self) -> MemWriteBatch {
        MemWriteBatch {
            insertions: HashMap::new(),
        }
    }

    fn write(&mut self, wb: Self::WriteBatch) -> Result<(), KVStoreError> {
        let mut map = self.0.lock().map_err(|err| KVStoreError::CommitFailed {
            reason: err.to_string(),
        })?;
        for (key, value) in wb.insertions {
            map.insert(key, value);
        }
        Ok(())
    }
}

impl KVGet for MemDB {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        let map = self.0.lock().map_err(|err| KVStoreError::ReadFailed {
            key: key.to_vec(),
            reason: err.to_string(),
        })?;
        Ok(map.get(key).cloned())
    }
}

/// A simple implementation of [`WriteBatch`] for `MemDB`.
pub struct MemWriteBatch {
    insertions: HashMap<Vec<u8>, Vec<u8>>,
}

impl WriteBatch for MemWriteBatch {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.insertions.insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
