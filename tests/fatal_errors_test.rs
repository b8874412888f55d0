//! Tests of the conditions under which the key-value app halts instead of answering.
//!
//! Every node in these tests is configured with [`FatalErrorPolicy::Panic`], so a halt shows up as
//! a panic whose message starts with "Fatal error, halting".

use kvstore_app::{
    config::{BeginBlockPolicy, Configuration, FatalErrorPolicy},
    messages::Code,
    state_machine::{BlockOperation, StateMachine, StateMachineError},
    storage::{mem_db::MemDB, pluggables::KVStoreError},
    types::{data_types::BlockHeight, transaction::Transaction},
};
use log::LevelFilter;

mod common;

use crate::common::{
    faulty_db::FaultyDB,
    logging::setup_logger,
    node::{test_configuration, Node},
};

#[test]
#[should_panic(expected = "Fatal error, halting: ApplyTransaction called while no block is open")]
fn apply_without_open_block_test() {
    setup_logger(LevelFilter::Trace);

    let node = Node::new(MemDB::new());
    node.apply("a=1");
}

#[test]
#[should_panic(expected = "Fatal error, halting: EndBlock called while no block is open")]
fn end_without_open_block_test() {
    setup_logger(LevelFilter::Trace);

    let node = Node::new(MemDB::new());
    node.end(1);
}

#[test]
#[should_panic(expected = "Fatal error, halting: Commit called while no block is open")]
fn commit_without_open_block_test() {
    setup_logger(LevelFilter::Trace);

    let node = Node::new(MemDB::new());
    node.commit();
}

#[test]
#[should_panic(expected = "Fatal error, halting: Commit called while no block is open")]
fn double_commit_test() {
    setup_logger(LevelFilter::Trace);

    let node = Node::new(MemDB::new());
    node.execute_block(1, &["a=1"]);
    node.commit();
}

#[test]
#[should_panic(expected = "Fatal error, halting: ApplyTransaction called while no block is open")]
fn apply_after_commit_test() {
    setup_logger(LevelFilter::Trace);

    let node = Node::new(MemDB::new());
    node.execute_block(1, &["a=1"]);
    node.apply("b=2");
}

#[test]
#[should_panic(
    expected = "Fatal error, halting: BeginBlock for height 2 called while block 1 is still open"
)]
fn strict_rebegin_test() {
    setup_logger(LevelFilter::Trace);

    let configuration = Configuration {
        begin_block_policy: BeginBlockPolicy::Halt,
        ..test_configuration()
    };
    let node = Node::with_configuration(MemDB::new(), configuration);
    node.begin(1);
    node.apply("a=1");
    node.begin(2);
}

#[test]
#[should_panic(expected = "Fatal error, halting: storage failure: failed to commit write batch")]
fn commit_failure_test() {
    setup_logger(LevelFilter::Trace);

    let kv_store = FaultyDB::new();
    let node = Node::new(kv_store.clone());
    node.begin(1);
    node.apply("a=1");
    node.end(1);

    kv_store.fail_commits();
    node.commit();
}

#[test]
#[should_panic(
    expected = "Fatal error, halting: storage failure: failed to stage write to key \"a\""
)]
fn write_failure_test() {
    setup_logger(LevelFilter::Trace);

    let kv_store = FaultyDB::new();
    let node = Node::new(kv_store.clone());
    node.begin(1);

    kv_store.fail_sets();
    node.apply("a=1");
}

#[test]
#[should_panic(expected = "Fatal error, halting: storage failure: failed to read key \"a\"")]
fn read_failure_test() {
    setup_logger(LevelFilter::Trace);

    let kv_store = FaultyDB::new();
    let node = Node::new(kv_store.clone());
    node.execute_block(1, &["a=1"]);

    kv_store.fail_reads();
    node.query("a");
}

/// Checks that validation, which never reads the store, keeps working while the store is failing,
/// and that a malformed transaction never reaches the store.
#[test]
fn validation_independent_of_store_test() {
    setup_logger(LevelFilter::Trace);

    let kv_store = FaultyDB::new();
    let node = Node::new(kv_store.clone());
    kv_store.fail_reads();
    kv_store.fail_sets();

    assert_eq!(node.validate("a=1"), Code::Accepted);
    assert_eq!(node.validate("a"), Code::Rejected);

    node.begin(1);
    assert_eq!(node.apply("a=b=c"), Code::Rejected);
    assert_eq!(node.staged_writes(), Some(0));
}

/// Checks the errors returned by [`StateMachine`] directly, without the halting layer on top.
#[test]
fn state_machine_errors_test() {
    setup_logger(LevelFilter::Trace);

    // 1. Lifecycle calls without an open block.
    let state_machine = StateMachine::new(MemDB::new(), true, BeginBlockPolicy::AbandonPrevious);
    assert!(matches!(
        state_machine.apply_transaction(&Transaction::from(b"a=1")),
        Err(StateMachineError::NoOpenBlock {
            operation: BlockOperation::ApplyTransaction
        })
    ));
    assert!(matches!(
        state_machine.end_block(),
        Err(StateMachineError::NoOpenBlock {
            operation: BlockOperation::EndBlock
        })
    ));
    assert!(matches!(
        state_machine.commit(),
        Err(StateMachineError::NoOpenBlock {
            operation: BlockOperation::Commit
        })
    ));

    // 2. Re-begin under the abandoning policy returns the abandoned block.
    state_machine.begin_block(BlockHeight::new(1)).unwrap();
    state_machine
        .apply_transaction(&Transaction::from(b"a=1"))
        .unwrap();
    let abandoned = state_machine.begin_block(BlockHeight::new(2)).unwrap().unwrap();
    assert_eq!(abandoned.height, BlockHeight::new(1));
    assert_eq!(abandoned.writes, 1);
    assert_eq!(state_machine.end_block().unwrap(), BlockHeight::new(2));

    // 3. Re-begin under the halting policy fails and leaves the open block in place.
    let state_machine = StateMachine::new(MemDB::new(), true, BeginBlockPolicy::Halt);
    state_machine.begin_block(BlockHeight::new(1)).unwrap();
    assert!(matches!(
        state_machine.begin_block(BlockHeight::new(2)),
        Err(StateMachineError::BlockAlreadyOpen { open_height, requested_height })
            if open_height == BlockHeight::new(1) && requested_height == BlockHeight::new(2)
    ));
    assert_eq!(state_machine.end_block().unwrap(), BlockHeight::new(1));

    // 4. Storage failures are wrapped.
    let kv_store = FaultyDB::new();
    let state_machine =
        StateMachine::new(kv_store.clone(), true, BeginBlockPolicy::AbandonPrevious);
    kv_store.fail_reads();
    assert!(matches!(
        state_machine.query(b"a"),
        Err(StateMachineError::KVStoreError(KVStoreError::ReadFailed { .. }))
    ));
}

/// Checks that a failed commit writes nothing.
#[test]
fn failed_commit_is_atomic_test() {
    setup_logger(LevelFilter::Trace);

    let kv_store = FaultyDB::new();
    let state_machine =
        StateMachine::new(kv_store.clone(), true, BeginBlockPolicy::AbandonPrevious);

    state_machine.begin_block(BlockHeight::new(1)).unwrap();
    for tx in [b"a=1", b"b=2", b"c=3"] {
        state_machine.apply_transaction(&Transaction::from(tx)).unwrap();
    }
    state_machine.end_block().unwrap();

    kv_store.fail_commits();
    assert!(matches!(
        state_machine.commit(),
        Err(StateMachineError::KVStoreError(KVStoreError::CommitFailed { .. }))
    ));
    assert!(kv_store.inner().is_empty().unwrap());
    assert_eq!(state_machine.last_commit().unwrap().height, BlockHeight::new(0));
}

#[test]
fn default_policy_is_abort_test() {
    let configuration = Configuration::default();
    assert_eq!(configuration.fatal_error_policy, FatalErrorPolicy::Abort);
    assert_eq!(configuration.begin_block_policy, BeginBlockPolicy::AbandonPrevious);
    assert!(configuration.compute_app_hash);
    assert!(configuration.log_events);
    assert_eq!(configuration.app_name, "kvstore");
}
