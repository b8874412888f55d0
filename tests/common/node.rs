//! [`Node`], a thin driver that plays the part of the consensus engine for a single [`KVStoreApp`].

use kvstore_app::{
    app::App,
    config::{Configuration, FatalErrorPolicy},
    kvstore_app::{KVStoreApp, KVStoreAppSpec},
    messages::*,
    storage::pluggables::KVStore,
    types::{
        data_types::{AppHash, BlockHeight},
        transaction::Transaction,
    },
};

/// A replica of the key-value app, driven through the [`App`] trait the same way a consensus engine
/// drives it.
pub(crate) struct Node<K: KVStore> {
    pub(crate) app: KVStoreApp<K>,
}

impl<K: KVStore> Node<K> {
    /// Create a node over `kv_store` that panics, instead of aborting, on fatal errors.
    pub(crate) fn new(kv_store: K) -> Node<K> {
        Node::with_configuration(kv_store, test_configuration())
    }

    pub(crate) fn with_configuration(kv_store: K, configuration: Configuration) -> Node<K> {
        let app = KVStoreAppSpec::builder()
            .kv_store(kv_store)
            .configuration(configuration)
            .build()
            .init();
        Node { app }
    }

    pub(crate) fn begin(&self, height: u64) {
        self.app.begin_block(BeginBlockRequest {
            hash: height.to_le_bytes().to_vec(),
            height: BlockHeight::new(height),
        });
    }

    pub(crate) fn apply(&self, tx: impl AsRef<[u8]>) -> Code {
        self.app
            .apply_transaction(ApplyTransactionRequest {
                tx: Transaction::from(tx.as_ref()),
            })
            .code
    }

    pub(crate) fn end(&self, height: u64) {
        self.app.end_block(EndBlockRequest {
            height: BlockHeight::new(height),
        });
    }

    pub(crate) fn commit(&self) -> AppHash {
        self.app.commit().data
    }

    /// Run a whole block: begin, apply every transaction in order, end, and commit. Returns the
    /// codes of the transactions and the app hash after the commit.
    pub(crate) fn execute_block(&self, height: u64, txs: &[&str]) -> (Vec<Code>, AppHash) {
        self.begin(height);
        let codes = txs.iter().map(|tx| self.apply(tx)).collect();
        self.end(height);
        (codes, self.commit())
    }

    pub(crate) fn validate(&self, tx: impl AsRef<[u8]>) -> Code {
        self.app
            .validate_transaction(ValidateTransactionRequest {
                tx: Transaction::from(tx.as_ref()),
            })
            .code
    }

    /// Get the committed value of `key`.
    pub(crate) fn get(&self, key: impl AsRef<[u8]>) -> Option<Vec<u8>> {
        self.query(key).value
    }

    pub(crate) fn query(&self, key: impl AsRef<[u8]>) -> QueryResponse {
        self.app.query(QueryRequest {
            data: key.as_ref().to_vec(),
        })
    }

    pub(crate) fn info(&self) -> InfoResponse {
        self.app.info(InfoRequest::default())
    }

    /// Get the number of writes staged in the open block, or `None` if no block is open.
    pub(crate) fn staged_writes(&self) -> Option<usize> {
        self.app.state_machine().staged_writes().unwrap()
    }
}

/// The default configuration, except that fatal errors panic instead of aborting, so that halts can
/// be observed with `#[should_panic]`.
pub(crate) fn test_configuration() -> Configuration {
    Configuration {
        fatal_error_policy: FatalErrorPolicy::Panic,
        ..Configuration::default()
    }
}
