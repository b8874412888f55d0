//! [`GatedDB`], a [`KVStore`] that can hold a single read in place, used to interleave a query with
//! a commit.

use std::sync::{
    mpsc::{self, Receiver, Sender},
    Arc, Mutex,
};

use kvstore_app::storage::{
    mem_db::{MemDB, MemWriteBatch},
    pluggables::{KVGet, KVStore, KVStoreError},
};

/// A wrapper around [`MemDB`] whose next `get`, once [armed](GatedDB::arm), stops and waits to be
/// released before it reads.
#[derive(Clone)]
pub(crate) struct GatedDB {
    inner: MemDB,
    gate: Arc<Mutex<Option<Gate>>>,
}

struct Gate {
    held: Sender<()>,
    release: Receiver<()>,
}

/// The test's side of an armed [`GatedDB`].
pub(crate) struct GateHandle {
    held: Receiver<()>,
    release: Sender<()>,
}

impl GateHandle {
    /// Block until a `get` is being held at the gate.
    pub(crate) fn wait_until_held(&self) {
        self.held.recv().unwrap()
    }

    /// Let the held `get` continue.
    pub(crate) fn release(&self) {
        self.release.send(()).unwrap()
    }
}

impl GatedDB {
    pub(crate) fn new() -> GatedDB {
        GatedDB {
            inner: MemDB::new(),
            gate: Arc::new(Mutex::new(None)),
        }
    }

    /// Hold the next `get` until the returned handle releases it.
    pub(crate) fn arm(&self) -> GateHandle {
        let (held_sender, held_receiver) = mpsc::channel();
        let (release_sender, release_receiver) = mpsc::channel();
        *self.gate.lock().unwrap() = Some(Gate {
            held: held_sender,
            release: release_receiver,
        });
        GateHandle {
            held: held_receiver,
            release: release_sender,
        }
    }
}

impl KVStore for GatedDB {
    type WriteBatch = MemWriteBatch;

    fn begin(&self) -> MemWriteBatch {
        self.inner.begin()
    }

    fn write(&mut self, wb: MemWriteBatch) -> Result<(), KVStoreError> {
        self.inner.write(wb)
    }
}

impl KVGet for GatedDB {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.held.send(()).unwrap();
            gate.release.recv().unwrap();
        }
        self.inner.get(key)
    }
}
