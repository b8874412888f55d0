/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Types that exist only to store bytes or integers, and do not have any major "active" behavior.

use std::fmt::{self, Debug, Display, Formatter};

use borsh::{BorshDeserialize, BorshSerialize};

/// Height of a block, as assigned by the consensus engine.
///
/// The state machine never checks heights. It only records the height passed into
/// [`begin_block`](crate::app::App::begin_block) and reports the height of the last committed block
/// through [`info`](crate::app::App::info).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, BorshDeserialize, BorshSerialize,
)]
pub struct BlockHeight(u64);

impl BlockHeight {
    /// Create a new `BlockHeight` with an `int` inner value.
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    /// Get the inner `u64` value of this `BlockHeight`.
    pub const fn int(&self) -> u64 {
        self.0
    }
}

impl Display for BlockHeight {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Digest of the application state after a commit.
///
/// Either empty (no commit has happened yet, or app hashes are
/// [disabled](crate::config::Configuration::compute_app_hash)), or a 32-byte SHA256 digest.
#[derive(Clone, Default, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub struct AppHash(Vec<u8>);

impl AppHash {
    /// Create a new `AppHash` wrapping `bytes`.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The empty `AppHash`.
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Get a reference to the inner bytes of this `AppHash`.
    pub const fn bytes(&self) -> &Vec<u8> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for AppHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Version of the application logic.
///
/// Replicas that run different `AppVersion`s may apply the same transactions differently, so the
/// consensus engine uses this number during the [`info`](crate::app::App::info) handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct AppVersion(u64);

impl AppVersion {
    /// Create a new `AppVersion` with an `int` inner value.
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    /// Get the inner `u64` value of this `AppVersion`.
    pub const fn int(&self) -> u64 {
        self.0
    }
}

impl Display for AppVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
