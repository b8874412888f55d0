/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The [`App`] trait: the boundary through which an external consensus engine drives a replicated
//! state machine.
//!
//! # Call order
//!
//! The consensus engine calls the block-lifecycle methods for each block strictly in this order, on
//! one logical connection:
//!
//! ```text
//! begin_block → apply_transaction* → end_block → commit
//! ```
//!
//! The remaining methods, most importantly [`validate_transaction`](App::validate_transaction),
//! [`query`](App::query) and [`info`](App::info), may be called at any time from other connections,
//! including concurrently with an open block. This is why every method takes `&self`.
//!
//! # Determinism requirements
//!
//! Every replica of a chain must reach bit-identical state after applying the same transactions in
//! the same order. Implementors of `App` must therefore make the block-lifecycle methods depend
//! only on their arguments and on committed state: not on the wall clock, randomness, or any other
//! local condition.
//!
//! # Fatal errors
//!
//! `App` methods do not return errors. A method that cannot be serviced safely, for example because
//! the storage engine failed during `commit`, must stop the process instead of answering, since a
//! replica whose state has silently diverged from its peers is worse than a replica that crashed.
//!
//! # State sync
//!
//! The provided implementations of the snapshot methods answer with empty responses, which tell the
//! consensus engine that state sync is not supported.

use crate::messages::*;

pub trait App: Send + Sync {
    /// Return the application's metadata for the consensus engine's handshake. No side effects.
    fn info(&self, request: InfoRequest) -> InfoResponse;

    /// Look up a key in the committed state. Never observes uncommitted writes.
    fn query(&self, request: QueryRequest) -> QueryResponse;

    /// Decide whether a transaction may enter the mempool. Advisory and stateless: a transaction
    /// that was accepted here is validated again in [`apply_transaction`](Self::apply_transaction).
    fn validate_transaction(
        &self,
        request: ValidateTransactionRequest,
    ) -> ValidateTransactionResponse;

    /// Called once, when the chain is created.
    fn init_chain(&self, request: InitChainRequest) -> InitChainResponse;

    /// Called when this replica is the proposer, with the candidate transactions from the mempool.
    /// Returns the transactions to propose, in order.
    fn prepare_proposal(&self, request: PrepareProposalRequest) -> PrepareProposalResponse;

    /// Called on every replica with a proposed block, to decide whether to vote for it.
    fn process_proposal(&self, request: ProcessProposalRequest) -> ProcessProposalResponse;

    /// Open a block.
    fn begin_block(&self, request: BeginBlockRequest) -> BeginBlockResponse;

    /// Apply one transaction of the open block.
    fn apply_transaction(&self, request: ApplyTransactionRequest) -> ApplyTransactionResponse;

    /// Called after the last transaction of the open block has been applied.
    fn end_block(&self, request: EndBlockRequest) -> EndBlockResponse;

    /// Durably persist the open block's writes, atomically.
    fn commit(&self) -> CommitResponse;

    fn list_snapshots(&self, _request: ListSnapshotsRequest) -> ListSnapshotsResponse {
        ListSnapshotsResponse::default()
    }

    fn offer_snapshot(&self, _request: OfferSnapshotRequest) -> OfferSnapshotResponse {
        OfferSnapshotResponse::default()
    }

    fn load_snapshot_chunk(&self, _request: LoadSnapshotChunkRequest) -> LoadSnapshotChunkResponse {
        LoadSnapshotChunkResponse::default()
    }

    fn apply_snapshot_chunk(
        &self,
        _request: ApplySnapshotChunkRequest,
    ) -> ApplySnapshotChunkResponse {
        ApplySnapshotChunkResponse::default()
    }
}
