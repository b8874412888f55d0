/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The committed state of the key-value app.
//!
//! # Pluggable persistence
//!
//! - Committed state is kept in a storage engine chosen by the library user, most probably one that
//!   persists to the host's filesystem.
//! - The key-value app merely requires that the engine implements the abstract functionality of a
//!   key-value store with point reads and atomic, batched writes.
//! - This abstract functionality is made concrete by the traits defined in the [`pluggables`]
//! module.
//! - [`MemDB`](mem_db::MemDB) is a volatile implementation suitable for tests and development.

pub mod mem_db;

pub mod pluggables;
