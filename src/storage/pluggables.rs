/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Traits for pluggable, transactional key-value persistence.
//!
//! The key-value app stores its committed state in a single key-value namespace: every key is the
//! raw key part of a transaction, and every value is its raw value part. Library users provide the
//! storage engine by implementing the traits in this module.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// A key-value store with point reads and atomic, batched writes.
///
/// # Required properties
///
/// 1. [`write`](Self::write) must be atomic: either every write in the batch becomes durable, or
/// none    does.
/// 2. A [`get`](KVGet::get) that runs concurrently with a `write` must observe either none or all
/// of    the batch's writes, never a part of them.
/// 3. Clones of a `KVStore` must be handles to the same underlying store.
pub trait KVStore: KVGet + Clone + Send + Sync + 'static {
    type WriteBatch: WriteBatch + Send;

    /// Start a new, empty write batch. Nothing staged in the batch is visible through
    /// [`get`](KVGet::get) until the batch is passed into [`write`](Self::write).
    fn begin(&self) -> Self::WriteBatch;

    /// Atomically and durably apply every write staged in `wb`.
    fn write(&mut self, wb: Self::WriteBatch) -> Result<(), KVStoreError>;
}

pub trait KVGet {
    /// Get the committed value of `key`, or `None` if `key` is not in the store.
    ///
    /// `Err` must only be returned if the store could not be read, never to signal that `key` is
    /// absent.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;
}

pub trait WriteBatch {
    /// Stage `key -> value`, replacing any value staged earlier for `key` in this batch.
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;
}

/// Error returned by the storage engine. Every variant indicates that the store can no longer be
/// trusted to reflect the replicated state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KVStoreError {
    /// Reading `key` from the store failed.
    ReadFailed { key: Vec<u8>, reason: String },

    /// Staging a write to `key` in a write batch failed.
    WriteFailed { key: Vec<u8>, reason: String },

    /// Durably applying a write batch failed.
    CommitFailed { reason: String },
}

impl Display for KVStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            KVStoreError::ReadFailed { key, reason } => write!(
                f,
                "failed to read key {:?}: {}",
                String::from_utf8_lossy(key),
                reason
            ),
            KVStoreError::WriteFailed { key, reason } => write!(
                f,
                "failed to stage write to key {:?}: {}",
                String::from_utf8_lossy(key),
                reason
            ),
            KVStoreError::CommitFailed { reason } => {
                write!(f, "failed to commit write batch: {}", reason)
            }
        }
    }
}

impl Error for KVStoreError {}
