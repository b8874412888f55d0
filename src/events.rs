/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Definitions of events emitted by the key-value app, for event handling and logging.
//!
//! Note: an event for a given action indicates that the action has been completed.
//!
//! Users can register handlers for these events when building a
//! [`KVStoreApp`](crate::kvstore_app::KVStoreApp). Handlers run synchronously on the thread that
//! made the call which caused the event, after the call's effects have taken place.

use std::time::SystemTime;

use crate::types::{
    data_types::{AppHash, BlockHeight},
    transaction::Transaction,
};

pub enum Event {
    // Events in the block lifecycle.
    BeginBlock(BeginBlockEvent),
    AbandonBlock(AbandonBlockEvent),
    CommitBlock(CommitBlockEvent),
    // Events about individual transactions.
    ApplyTransaction(ApplyTransactionEvent),
    RejectTransaction(RejectTransactionEvent),
}

/// A block transaction was opened.
pub struct BeginBlockEvent {
    pub timestamp: SystemTime,
    pub height: BlockHeight,
}

/// An open block was discarded by a `begin_block` that arrived before it was committed. None of its
/// staged writes became durable.
pub struct AbandonBlockEvent {
    pub timestamp: SystemTime,
    pub abandoned_height: BlockHeight,
    pub abandoned_writes: usize,
    pub new_height: BlockHeight,
}

/// The writes staged in a block became durable.
pub struct CommitBlockEvent {
    pub timestamp: SystemTime,
    pub height: BlockHeight,
    pub writes: usize,
    pub app_hash: AppHash,
}

/// A well-formed transaction was staged in the open block.
pub struct ApplyTransactionEvent {
    pub timestamp: SystemTime,
    pub height: BlockHeight,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// A malformed transaction was rejected.
pub struct RejectTransactionEvent {
    pub timestamp: SystemTime,
    pub stage: RejectionStage,
    pub tx: Transaction,
}

/// Where a transaction was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectionStage {
    /// In `validate_transaction`, before entering the mempool.
    Mempool,
    /// In `apply_transaction`, while being applied to an open block.
    Block,
}
