/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Methods to build and run the key-value app.
//!
//! The key components of this module are:
//! - The builder-pattern interface to construct a [specification of the app](KVStoreAppSpec) with:
//!   1. `KVStoreAppSpec::builder` to construct a `KVStoreAppSpecBuilder`,
//!   2. The setters of the `KVStoreAppSpecBuilder`, and
//!   3. The `KVStoreAppSpecBuilder::build` method to construct a [KVStoreAppSpec],
//! - The function to [initialize](KVStoreAppSpec::init) a [KVStoreApp] given its specification,
//! - [The type](KVStoreApp) which implements [`App`] for the consensus engine to call.
//!
//! ## Building an app
//!
//! ```ignore
//! let app =
//!     KVStoreAppSpec::builder()
//!     .kv_store(kv_store)
//!     .configuration(configuration)
//!     .on_commit_block(commit_handler)
//!     .build()
//!     .init()
//! ```
//!
//! ### Required setters
//!
//! - `.kv_store(...)`
//!
//! ### Optional setters
//!
//! - `.configuration(...)`, which defaults to [`Configuration::default`].
//! - The setters for registering user-defined event handlers for events from [crate::events]:
//!   - `.on_begin_block(...)`
//!   - `.on_abandon_block(...)`
//!   - `.on_commit_block(...)`
//!   - `.on_apply_transaction(...)`
//!   - `.on_reject_transaction(...)`
//!
//! ## Halting
//!
//! [`KVStoreApp`] delegates every operation to a [`StateMachine`]. When the state machine returns a
//! [`StateMachineError`], `KVStoreApp` logs the error and stops the process according to the
//! configured [`FatalErrorPolicy`]. It never answers the consensus engine after a fatal error.

use std::time::SystemTime;

use typed_builder::TypedBuilder;

use crate::app::App;
use crate::config::{Configuration, FatalErrorPolicy};
use crate::event_handlers::{EventHandlers, HandlerPtr};
use crate::events::*;
use crate::messages::*;
use crate::state_machine::{ApplyOutcome, StateMachine, StateMachineError};
use crate::storage::pluggables::KVStore;

/// Stores all necessary parameters and trait implementations required to run a [KVStoreApp].
#[derive(TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building a [KVStoreAppSpec]. On the builder call the following methods to construct a valid [KVStoreAppSpec].

    Required:
    - `.kv_store(...)`

    Optional:
    - `.configuration(...)`
    - `.on_begin_block(...)`
    - `.on_abandon_block(...)`
    - `.on_commit_block(...)`
    - `.on_apply_transaction(...)`
    - `.on_reject_transaction(...)`
"))]
pub struct KVStoreAppSpec<K: KVStore> {
    // Required parameters
    #[builder(setter(doc = "Set the storage engine holding the committed state. The argument must implement the [KVStore](crate::storage::pluggables::KVStore) trait. Required."))]
    kv_store: K,
    // Optional parameters
    #[builder(default, setter(doc = "Set the [configuration](Configuration). Optional."))]
    configuration: Configuration,
    #[builder(default, setter(transform = |handler: impl Fn(&BeginBlockEvent) + Send + Sync + 'static| Some(Box::new(handler) as HandlerPtr<BeginBlockEvent>),
    doc = "Register a handler closure to be invoked after a block is opened. Optional."))]
    on_begin_block: Option<HandlerPtr<BeginBlockEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&AbandonBlockEvent) + Send + Sync + 'static| Some(Box::new(handler) as HandlerPtr<AbandonBlockEvent>),
    doc = "Register a handler closure to be invoked after an uncommitted block is discarded by a new block. Optional."))]
    on_abandon_block: Option<HandlerPtr<AbandonBlockEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&CommitBlockEvent) + Send + Sync + 'static| Some(Box::new(handler) as HandlerPtr<CommitBlockEvent>),
    doc = "Register a handler closure to be invoked after a block is committed. Optional."))]
    on_commit_block: Option<HandlerPtr<CommitBlockEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&ApplyTransactionEvent) + Send + Sync + 'static| Some(Box::new(handler) as HandlerPtr<ApplyTransactionEvent>),
    doc = "Register a handler closure to be invoked after a transaction is staged in the open block. Optional."))]
    on_apply_transaction: Option<HandlerPtr<ApplyTransactionEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&RejectTransactionEvent) + Send + Sync + 'static| Some(Box::new(handler) as HandlerPtr<RejectTransactionEvent>),
    doc = "Register a handler closure to be invoked after a malformed transaction is rejected. Optional."))]
    on_reject_transaction: Option<HandlerPtr<RejectTransactionEvent>>,
}

impl<K: KVStore> KVStoreAppSpec<K> {
    /// Create the [KVStoreApp] described by this specification. The app starts with no open block.
    pub fn init(self) -> KVStoreApp<K> {
        let event_handlers = EventHandlers::new(
            self.configuration.log_events,
            self.on_begin_block,
            self.on_abandon_block,
            self.on_commit_block,
            self.on_apply_transaction,
            self.on_reject_transaction,
        );

        let state_machine = StateMachine::new(
            self.kv_store,
            self.configuration.compute_app_hash,
            self.configuration.begin_block_policy,
        );

        KVStoreApp {
            state_machine,
            configuration: self.configuration,
            event_handlers,
        }
    }
}

/// A replicated key-value store whose transactions have the form `key=value`.
pub struct KVStoreApp<K: KVStore> {
    state_machine: StateMachine<K>,
    configuration: Configuration,
    event_handlers: EventHandlers,
}

impl<K: KVStore> KVStoreApp<K> {
    /// Get the [`StateMachine`] this app delegates to, e.g., to inspect the open block.
    pub fn state_machine(&self) -> &StateMachine<K> {
        &self.state_machine
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    // Build and fire an event, but only if someone is listening.
    fn publish(&self, event: impl FnOnce() -> Event) {
        if !self.event_handlers.is_empty() {
            self.event_handlers.fire_handlers(event())
        }
    }

    fn halt(&self, err: StateMachineError) -> ! {
        log::error!("Fatal error, halting: {}", err);
        match self.configuration.fatal_error_policy {
            FatalErrorPolicy::Abort => std::process::abort(),
            FatalErrorPolicy::Panic => panic!("Fatal error, halting: {}", err),
        }
    }
}

impl<K: KVStore> App for KVStoreApp<K> {
    fn info(&self, _request: InfoRequest) -> InfoResponse {
        let last_commit = match self.state_machine.last_commit() {
            Ok(last_commit) => last_commit,
            Err(err) => self.halt(err),
        };

        InfoResponse {
            data: self.configuration.app_name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            app_version: self.configuration.app_version,
            last_block_height: last_commit.height,
            last_block_app_hash: last_commit.app_hash,
        }
    }

    fn query(&self, request: QueryRequest) -> QueryResponse {
        let (value, height) = match self.state_machine.query(&request.data) {
            Ok(result) => result,
            Err(err) => self.halt(err),
        };

        let log = if value.is_some() { EXISTS } else { KEY_DOES_NOT_EXIST };
        QueryResponse {
            key: request.data,
            value,
            log: log.to_string(),
            height,
        }
    }

    fn validate_transaction(
        &self,
        request: ValidateTransactionRequest,
    ) -> ValidateTransactionResponse {
        let code = StateMachine::<K>::validate_transaction(&request.tx);
        if !code.is_accepted() {
            self.publish(|| {
                Event::RejectTransaction(RejectTransactionEvent {
                    timestamp: SystemTime::now(),
                    stage: RejectionStage::Mempool,
                    tx: request.tx,
                })
            });
        }

        ValidateTransactionResponse { code }
    }

    fn init_chain(&self, request: InitChainRequest) -> InitChainResponse {
        log::info!(
            "Initializing chain {:?} at height {}",
            request.chain_id,
            request.initial_height
        );
        InitChainResponse::default()
    }

    fn prepare_proposal(&self, request: PrepareProposalRequest) -> PrepareProposalResponse {
        PrepareProposalResponse { txs: request.txs }
    }

    fn process_proposal(&self, _request: ProcessProposalRequest) -> ProcessProposalResponse {
        ProcessProposalResponse {
            status: ProposalStatus::Accept,
        }
    }

    fn begin_block(&self, request: BeginBlockRequest) -> BeginBlockResponse {
        let abandoned = match self.state_machine.begin_block(request.height) {
            Ok(abandoned) => abandoned,
            Err(err) => self.halt(err),
        };

        if let Some(abandoned) = abandoned {
            self.publish(|| {
                Event::AbandonBlock(AbandonBlockEvent {
                    timestamp: SystemTime::now(),
                    abandoned_height: abandoned.height,
                    abandoned_writes: abandoned.writes,
                    new_height: request.height,
                })
            });
        }

        self.publish(|| {
            Event::BeginBlock(BeginBlockEvent {
                timestamp: SystemTime::now(),
                height: request.height,
            })
        });

        BeginBlockResponse::default()
    }

    fn apply_transaction(&self, request: ApplyTransactionRequest) -> ApplyTransactionResponse {
        let outcome = match self.state_machine.apply_transaction(&request.tx) {
            Ok(outcome) => outcome,
            Err(err) => self.halt(err),
        };

        match outcome {
            ApplyOutcome::Staged { height } => self.publish(|| {
                let (key, value) = request.tx.key_value().unwrap_or_default();
                Event::ApplyTransaction(ApplyTransactionEvent {
                    timestamp: SystemTime::now(),
                    height,
                    key: key.to_vec(),
                    value: value.to_vec(),
                })
            }),
            ApplyOutcome::Rejected => self.publish(|| {
                Event::RejectTransaction(RejectTransactionEvent {
                    timestamp: SystemTime::now(),
                    stage: RejectionStage::Block,
                    tx: request.tx.clone(),
                })
            }),
        }

        ApplyTransactionResponse {
            code: outcome.code(),
        }
    }

    fn end_block(&self, _request: EndBlockRequest) -> EndBlockResponse {
        if let Err(err) = self.state_machine.end_block() {
            self.halt(err)
        }
        EndBlockResponse::default()
    }

    fn commit(&self) -> CommitResponse {
        let commit_info = match self.state_machine.commit() {
            Ok(commit_info) => commit_info,
            Err(err) => self.halt(err),
        };

        self.publish(|| {
            Event::CommitBlock(CommitBlockEvent {
                timestamp: SystemTime::now(),
                height: commit_info.height,
                writes: commit_info.writes,
                app_hash: commit_info.app_hash.clone(),
            })
        });

        CommitResponse {
            data: commit_info.app_hash,
            retain_height: Default::default(),
        }
    }
}
