/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! A deterministic, replicated key-value state machine, driven by an external consensus engine.
//!
//! The consensus engine decides which transactions are committed and in which order. This crate
//! decides what they mean: every transaction has the form `key=value`, and committing a block
//! writes its transactions' keys and values into a pluggable [storage engine](storage) atomically.
//!
//! # Getting started
//!
//! 1. Provide a storage engine by implementing the traits in [`storage::pluggables`], or use the
//!    in-memory [`MemDB`](storage::mem_db::MemDB).
//! 2. Build a [`KVStoreApp`](kvstore_app::KVStoreApp) using
//!    [`KVStoreAppSpec::builder`](kvstore_app::KVStoreAppSpec::builder).
//! 3. Hand the app to the consensus engine's connection layer, which calls the methods of the
//!    [`App`](app::App) trait.

pub mod app;

pub mod config;

pub mod events;

pub(crate) mod event_handlers;

pub mod kvstore_app;

pub mod logging;

pub mod messages;

pub mod state_machine;

pub mod storage;

pub mod types;
