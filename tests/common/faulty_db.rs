//! [`FaultyDB`], a [`KVStore`] that can be told to fail, used to exercise the fatal error paths.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use kvstore_app::storage::{
    mem_db::{MemDB, MemWriteBatch},
    pluggables::{KVGet, KVStore, KVStoreError, WriteBatch},
};

/// A wrapper around [`MemDB`] whose reads, staged writes, and commits can each be made to fail.
#[derive(Clone)]
pub(crate) struct FaultyDB {
    inner: MemDB,
    faults: Arc<Faults>,
}

#[derive(Default)]
struct Faults {
    fail_reads: AtomicBool,
    fail_sets: AtomicBool,
    fail_commits: AtomicBool,
}

impl FaultyDB {
    /// Create a new `FaultyDB` that does not fail until told to.
    pub(crate) fn new() -> FaultyDB {
        FaultyDB {
            inner: MemDB::new(),
            faults: Arc::new(Faults::default()),
        }
    }

    /// Make every subsequent `get` fail.
    pub(crate) fn fail_reads(&self) {
        self.faults.fail_reads.store(true, Ordering::SeqCst)
    }

    /// Make every subsequent `WriteBatch::set` fail.
    pub(crate) fn fail_sets(&self) {
        self.faults.fail_sets.store(true, Ordering::SeqCst)
    }

    /// Make every subsequent `write` fail.
    pub(crate) fn fail_commits(&self) {
        self.faults.fail_commits.store(true, Ordering::SeqCst)
    }

    /// Get the underlying `MemDB`, which is never made to fail.
    pub(crate) fn inner(&self) -> &MemDB {
        &self.inner
    }
}

impl KVStore for FaultyDB {
    type WriteBatch = FaultyWriteBatch;

    fn begin(&self) -> FaultyWriteBatch {
        FaultyWriteBatch {
            inner: self.inner.begin(),
            faults: self.faults.clone(),
        }
    }

    fn write(&mut self, wb: FaultyWriteBatch) -> Result<(), KVStoreError> {
        if self.faults.fail_commits.load(Ordering::SeqCst) {
            return Err(KVStoreError::CommitFailed {
                reason: String::from("injected commit failure"),
            });
        }
        self.inner.write(wb.inner)
    }
}

impl KVGet for FaultyDB {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        if self.faults.fail_reads.load(Ordering::SeqCst) {
            return Err(KVStoreError::ReadFailed {
                key: key.to_vec(),
                reason: String::from("injected read failure"),
            });
        }
        self.inner.get(key)
    }
}

pub(crate) struct FaultyWriteBatch {
    inner: MemWriteBatch,
    faults: Arc<Faults>,
}

impl WriteBatch for FaultyWriteBatch {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        if self.faults.fail_sets.load(Ordering::SeqCst) {
            return Err(KVStoreError::WriteFailed {
                key: key.to_vec(),
                reason: String::from("injected write failure"),
            });
        }
        self.inner.set(key, value)
    }
}
