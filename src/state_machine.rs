/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The key-value state machine, with every fallible operation returning a [`Result`].
//!
//! [`StateMachine`] implements the semantics of the key-value app. It never stops the process by
//! itself: every condition that could make this replica diverge from its peers is returned as a
//! [`StateMachineError`], and it is up to the caller, normally
//! [`KVStoreApp`](crate::kvstore_app::KVStoreApp), to turn that error into a halt.
//!
//! ## Block lifecycle
//!
//! The state machine is always in one of two block states:
//!
//! ```text
//!            begin_block                 commit
//!   Idle ─────────────────▶ Open ─────────────────▶ Idle
//!                          │   ▲
//!                          └───┘ apply_transaction*, end_block,
//!                                begin_block (abandons the open block)
//! ```
//!
//! `apply_transaction`, `end_block` and `commit` fail with [`StateMachineError::NoOpenBlock`] in
//! the
//! `Idle` state.
//!
//! ## Concurrency
//!
//! Block-lifecycle calls are serialized through a mutex that owns the open block's write batch.
//! [`validate_transaction`](StateMachine::validate_transaction), [`query`](StateMachine::query) and
//! [`last_commit`](StateMachine::last_commit) never take that mutex, so they can run concurrently
//! with an open block and never observe its staged writes.
//!
//! `commit` holds the write lock on the last commit while it writes to the store, and `query` holds
//! the read lock while it reads from the store, so the height a query reports is always the height
//! of the commit its value came from. Locks are always taken in the order block path, then last
//! commit.
//!
//! ## App hash
//!
//! If enabled, the app hash after a block is the SHA256 digest of the previous app hash followed by
//! the borsh encoding of every accepted `(key, value)` pair of the block, in delivery order. Blocks
//! without accepted transactions leave the app hash unchanged.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::sync::{Mutex, RwLock};

use borsh::BorshSerialize;

use crate::config::BeginBlockPolicy;
use crate::messages::Code;
use crate::storage::pluggables::{KVGet, KVStore, KVStoreError, WriteBatch};
use crate::types::{
    crypto_primitives::{CryptoHasher, Digest},
    data_types::{AppHash, BlockHeight},
    transaction::Transaction,
};

pub struct StateMachine<K: KVStore> {
    // Handle used only for reads of committed state.
    kv_store: K,
    block_path: Mutex<BlockPath<K>>,
    last_commit: RwLock<CommitInfo>,
    compute_app_hash: bool,
    begin_block_policy: BeginBlockPolicy,
}

// Everything owned by the block-processing path.
struct BlockPath<K: KVStore> {
    kv_store: K,
    state: BlockState<K::WriteBatch>,
}

/// Whether a block is currently open.
pub(crate) enum BlockState<W: WriteBatch> {
    Idle,
    Open(OpenBlock<W>),
}

/// The in-flight block transaction.
pub(crate) struct OpenBlock<W: WriteBatch> {
    height: BlockHeight,
    write_batch: W,
    writes: usize,
    hasher: Option<CryptoHasher>,
}

/// Summary of the last successful commit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitInfo {
    pub height: BlockHeight,
    pub writes: usize,
    pub app_hash: AppHash,
}

/// An open block that was discarded by [`begin_block`](StateMachine::begin_block).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbandonedBlock {
    pub height: BlockHeight,
    pub writes: usize,
}

/// Result of applying a transaction to the open block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The transaction's key and value were staged in the block at `height`.
    Staged { height: BlockHeight },
    /// The transaction was malformed; nothing was staged.
    Rejected,
}

impl ApplyOutcome {
    pub const fn code(&self) -> Code {
        match self {
            ApplyOutcome::Staged { .. } => Code::Accepted,
            ApplyOutcome::Rejected => Code::Rejected,
        }
    }
}

impl<K: KVStore> StateMachine<K> {
    /// Create a state machine over `kv_store`, in the `Idle` state.
    pub fn new(kv_store: K, compute_app_hash: bool, begin_block_policy: BeginBlockPolicy) -> Self {
        StateMachine {
            kv_store: kv_store.clone(),
            block_path: Mutex::new(BlockPath {
                kv_store,
                state: BlockState::Idle,
            }),
            last_commit: RwLock::new(CommitInfo::default()),
            compute_app_hash,
            begin_block_policy,
        }
    }

    /// Check whether `tx` is well-formed. Pure: depends on nothing but `tx`.
    pub fn validate_transaction(tx: &Transaction) -> Code {
        if tx.is_valid() {
            Code::Accepted
        } else {
            Code::Rejected
        }
    }

    /// Open a block transaction for the block at `height`.
    ///
    /// If a block is already open, what happens depends on the [`BeginBlockPolicy`]: either the
    /// open block is discarded and returned, or this call fails.
    pub fn begin_block(
        &self,
        height: BlockHeight,
    ) -> Result<Option<AbandonedBlock>, StateMachineError> {
        let mut block_path = self.block_path.lock().map_err(|_| StateMachineError::LockPoisoned)?;

        let abandoned = match &block_path.state {
            BlockState::Idle => None,
            BlockState::Open(open_block) => match self.begin_block_policy {
                BeginBlockPolicy::AbandonPrevious => Some(AbandonedBlock {
                    height: open_block.height,
                    writes: open_block.writes,
                }),
                BeginBlockPolicy::Halt => {
                    return Err(StateMachineError::BlockAlreadyOpen {
                        open_height: open_block.height,
                        requested_height: height,
                    })
                }
            },
        };

        let hasher = if self.compute_app_hash {
            let mut hasher = CryptoHasher::new();
            hasher.update(self.last_commit()?.app_hash.bytes());
            Some(hasher)
        } else {
            None
        };

        // Replacing the state drops the previous write batch, if any, without writing it.
        let write_batch = block_path.kv_store.begin();
        block_path.state = BlockState::Open(OpenBlock {
            height,
            write_batch,
            writes: 0,
            hasher,
        });

        Ok(abandoned)
    }

    /// Re-validate `tx` and, if it is well-formed, stage its key and value in the open block.
    ///
    /// A later write to the same key in the same block replaces this one.
    pub fn apply_transaction(&self, tx: &Transaction) -> Result<ApplyOutcome, StateMachineError> {
        let mut block_path = self.block_path.lock().map_err(|_| StateMachineError::LockPoisoned)?;
        let open_block = match &mut block_path.state {
            BlockState::Open(open_block) => open_block,
            BlockState::Idle => {
                return Err(StateMachineError::NoOpenBlock {
                    operation: BlockOperation::ApplyTransaction,
                })
            }
        };

        let (key, value) = match tx.key_value() {
            Some(key_value) => key_value,
            None => return Ok(ApplyOutcome::Rejected),
        };

        open_block.write_batch.set(key, value)?;
        open_block.writes += 1;
        if let Some(hasher) = &mut open_block.hasher {
            let encoded = (key.to_vec(), value.to_vec())
                .try_to_vec()
                .map_err(|err| StateMachineError::SerializeError { source: err })?;
            hasher.update(&encoded);
        }

        Ok(ApplyOutcome::Staged {
            height: open_block.height,
        })
    }

    /// Check that a block is open. Returns its height.
    pub fn end_block(&self) -> Result<BlockHeight, StateMachineError> {
        let block_path = self.block_path.lock().map_err(|_| StateMachineError::LockPoisoned)?;
        match &block_path.state {
            BlockState::Open(open_block) => Ok(open_block.height),
            BlockState::Idle => Err(StateMachineError::NoOpenBlock {
                operation: BlockOperation::EndBlock,
            }),
        }
    }

    /// Atomically write every staged write of the open block into the store, and return to `Idle`.
    ///
    /// The staged writes become visible to [`query`](Self::query), together with the new height,
    /// when this method returns.
    pub fn commit(&self) -> Result<CommitInfo, StateMachineError> {
        let mut block_path = self.block_path.lock().map_err(|_| StateMachineError::LockPoisoned)?;
        let open_block = match std::mem::replace(&mut block_path.state, BlockState::Idle) {
            BlockState::Open(open_block) => open_block,
            BlockState::Idle => {
                return Err(StateMachineError::NoOpenBlock {
                    operation: BlockOperation::Commit,
                })
            }
        };

        let OpenBlock {
            height,
            write_batch,
            writes,
            hasher,
        } = open_block;

        // Held across the write so that queries see the new height and the new values together.
        let mut last_commit = self
            .last_commit
            .write()
            .map_err(|_| StateMachineError::LockPoisoned)?;
        block_path.kv_store.write(write_batch)?;

        let app_hash = match hasher {
            Some(hasher) if writes > 0 => AppHash::new(hasher.finalize().to_vec()),
            Some(_) => last_commit.app_hash.clone(),
            None => AppHash::empty(),
        };
        *last_commit = CommitInfo {
            height,
            writes,
            app_hash,
        };

        Ok(last_commit.clone())
    }

    /// Get the committed value of `key`, together with the height of the commit the value was read
    /// from.
    ///
    /// Never observes writes staged in an open block.
    pub fn query(
        &self,
        key: &[u8],
    ) -> Result<(Option<Vec<u8>>, BlockHeight), StateMachineError> {
        let last_commit = self
            .last_commit
            .read()
            .map_err(|_| StateMachineError::LockPoisoned)?;
        let value = self.kv_store.get(key)?;
        Ok((value, last_commit.height))
    }

    /// Get a summary of the last successful commit in this process.
    pub fn last_commit(&self) -> Result<CommitInfo, StateMachineError> {
        self.last_commit
            .read()
            .map(|last_commit| last_commit.clone())
            .map_err(|_| StateMachineError::LockPoisoned)
    }

    /// Get the number of writes staged in the open block, or `None` if no block is open.
    pub fn staged_writes(&self) -> Result<Option<usize>, StateMachineError> {
        let block_path = self.block_path.lock().map_err(|_| StateMachineError::LockPoisoned)?;
        match &block_path.state {
            BlockState::Open(open_block) => Ok(Some(open_block.writes)),
            BlockState::Idle => Ok(None),
        }
    }
}

/// A block-lifecycle operation that requires an open block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockOperation {
    ApplyTransaction,
    EndBlock,
    Commit,
}

impl Display for BlockOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BlockOperation::ApplyTransaction => write!(f, "ApplyTransaction"),
            BlockOperation::EndBlock => write!(f, "EndBlock"),
            BlockOperation::Commit => write!(f, "Commit"),
        }
    }
}

/// Conditions after which the state machine can no longer be trusted to agree with its peers.
#[derive(Debug)]
pub enum StateMachineError {
    /// `operation` was called while no block was open.
    NoOpenBlock { operation: BlockOperation },

    /// `begin_block` was called while a block was open, under [`BeginBlockPolicy::Halt`].
    BlockAlreadyOpen {
        open_height: BlockHeight,
        requested_height: BlockHeight,
    },

    /// Encoding a write for the app hash failed.
    SerializeError { source: std::io::Error },

    /// A thread panicked while holding one of the state machine's locks.
    LockPoisoned,

    /// The storage engine failed.
    KVStoreError(KVStoreError),
}

impl From<KVStoreError> for StateMachineError {
    fn from(value: KVStoreError) -> Self {
        StateMachineError::KVStoreError(value)
    }
}

impl Display for StateMachineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StateMachineError::NoOpenBlock { operation } => {
                write!(f, "{} called while no block is open", operation)
            }
            StateMachineError::BlockAlreadyOpen {
                open_height,
                requested_height,
            } => write!(
                f,
                "BeginBlock for height {} called while block {} is still open",
                requested_height, open_height
            ),
            StateMachineError::SerializeError { source } => {
                write!(f, "failed to encode a write for the app hash: {}", source)
            }
            StateMachineError::LockPoisoned => write!(f, "state machine lock poisoned"),
            StateMachineError::KVStoreError(err) => write!(f, "storage failure: {}", err),
        }
    }
}

impl Error for StateMachineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StateMachineError::SerializeError { source } => Some(source),
            StateMachineError::KVStoreError(err) => Some(err),
            _ => None,
        }
    }
}
