/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Requests and responses exchanged across the [`App`](crate::app::App) boundary.
//!
//! The consensus engine owns the wire encoding of these messages. All of them derive borsh's
//! `BorshSerialize` and `BorshDeserialize` so that a transport embedding this crate can carry them
//! without defining its own schema.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::types::{
    data_types::{AppHash, AppVersion, BlockHeight},
    transaction::Transaction,
};

/// Outcome of validating or applying a [`Transaction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub enum Code {
    /// The transaction is well-formed. Code 0.
    Accepted,

    /// The transaction is malformed. Code 1.
    Rejected,
}

impl Code {
    /// Get the numeric code that the consensus engine expects: 0 for `Accepted`, non-zero
    /// otherwise.
    pub const fn int(&self) -> u32 {
        match self {
            Code::Accepted => 0,
            Code::Rejected => 1,
        }
    }

    pub const fn is_accepted(&self) -> bool {
        matches!(self, Code::Accepted)
    }
}

/* ↓↓↓ Info and Query ↓↓↓ */

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct InfoRequest {
    /// Version of the consensus engine.
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct InfoResponse {
    /// Name of the application.
    pub data: String,
    /// Version of this crate.
    pub version: String,
    pub app_version: AppVersion,
    /// Height of the last block committed by this process, or 0 if none has been.
    pub last_block_height: BlockHeight,
    /// App hash returned by the last commit, or empty if none has happened.
    pub last_block_app_hash: AppHash,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct QueryRequest {
    /// The key to look up.
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct QueryResponse {
    /// The key that was looked up.
    pub key: Vec<u8>,
    /// The committed value of `key`, if any.
    pub value: Option<Vec<u8>>,
    /// Human-readable status: [`EXISTS`] or [`KEY_DOES_NOT_EXIST`].
    pub log: String,
    /// Height of the last commit the query was answered against.
    pub height: BlockHeight,
}

pub const EXISTS: &str = "exists";
pub const KEY_DOES_NOT_EXIST: &str = "key does not exist";

/* ↓↓↓ Mempool ↓↓↓ */

#[derive(Clone, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct ValidateTransactionRequest {
    pub tx: Transaction,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct ValidateTransactionResponse {
    pub code: Code,
}

/* ↓↓↓ Consensus ↓↓↓ */

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct InitChainRequest {
    pub chain_id: String,
    pub initial_height: BlockHeight,
    pub app_state_bytes: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct InitChainResponse {}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct PrepareProposalRequest {
    pub height: BlockHeight,
    pub txs: Vec<Transaction>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct PrepareProposalResponse {
    pub txs: Vec<Transaction>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct ProcessProposalRequest {
    pub height: BlockHeight,
    pub txs: Vec<Transaction>,
}

/// Whether the application accepts a proposed block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub enum ProposalStatus {
    #[default]
    Unknown,
    Accept,
    Reject,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct ProcessProposalResponse {
    pub status: ProposalStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct BeginBlockRequest {
    /// Hash of the block header.
    pub hash: Vec<u8>,
    pub height: BlockHeight,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct BeginBlockResponse {}

#[derive(Clone, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct ApplyTransactionRequest {
    pub tx: Transaction,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct ApplyTransactionResponse {
    pub code: Code,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct EndBlockRequest {
    pub height: BlockHeight,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct EndBlockResponse {}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct CommitResponse {
    /// The app hash after this commit. Empty if app hashes are disabled.
    pub data: AppHash,
    /// Blocks below this height may be pruned by the consensus engine. Always 0: retain everything.
    pub retain_height: BlockHeight,
}

/* ↓↓↓ State sync ↓↓↓ */

/// Metadata of a state-sync snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct Snapshot {
    pub height: BlockHeight,
    pub format: u32,
    pub chunks: u32,
    pub hash: Vec<u8>,
    pub metadata: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct ListSnapshotsRequest {}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct ListSnapshotsResponse {
    pub snapshots: Vec<Snapshot>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct OfferSnapshotRequest {
    pub snapshot: Option<Snapshot>,
    pub app_hash: AppHash,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub enum OfferSnapshotResult {
    #[default]
    Unknown,
    Accept,
    Abort,
    Reject,
    RejectFormat,
    RejectSender,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct OfferSnapshotResponse {
    pub result: OfferSnapshotResult,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct LoadSnapshotChunkRequest {
    pub height: BlockHeight,
    pub format: u32,
    pub chunk: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct LoadSnapshotChunkResponse {
    pub chunk: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct ApplySnapshotChunkRequest {
    pub index: u32,
    pub chunk: Vec<u8>,
    pub sender: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub enum ApplySnapshotChunkResult {
    #[default]
    Unknown,
    Accept,
    Abort,
    Retry,
    RetrySnapshot,
    RejectSnapshot,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct ApplySnapshotChunkResponse {
    pub result: ApplySnapshotChunkResult,
    pub refetch_chunks: Vec<u32>,
    pub reject_senders: Vec<String>,
}
