/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The [`Transaction`] type and the rules that decide whether a transaction is well-formed.
//!
//! ## Well-formedness
//!
//! A transaction is an opaque byte sequence of the form `key=value`. It is well-formed iff
//! splitting it on every occurrence of [`SEPARATOR`] yields exactly two parts, i.e., iff it
//! contains the separator exactly once. Either part may be empty.
//!
//! ## Validation split vs. apply split
//!
//! [`is_valid`](Transaction::is_valid) splits on every occurrence of the separator, while
//! [`key_value`](Transaction::key_value) splits only on the first occurrence. `key_value` refuses
//! to split a transaction that `is_valid` rejects, so the two rules agree on every transaction that
//! is ever applied. They must be changed together.

use std::fmt::{self, Debug, Formatter};

use borsh::{BorshDeserialize, BorshSerialize};

/// The byte that separates the key from the value in a transaction.
pub const SEPARATOR: u8 = b'=';

/// A transaction submitted by a client, carried through mempool validation and block application
/// unchanged.
#[derive(Clone, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub struct Transaction(Vec<u8>);

impl Transaction {
    /// Create a new `Transaction` wrapping `bytes`.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Get a reference to the inner bytes of this `Transaction`.
    pub const fn bytes(&self) -> &Vec<u8> {
        &self.0
    }

    /// Check whether this transaction splits into exactly two parts around [`SEPARATOR`].
    ///
    /// This is a pure function of the transaction's bytes.
    pub fn is_valid(&self) -> bool {
        self.0.split(|byte| *byte == SEPARATOR).count() == 2
    }

    /// Split this transaction into its key and value on the first occurrence of [`SEPARATOR`].
    ///
    /// Returns `None` if the transaction is not [valid](Self::is_valid).
    pub fn key_value(&self) -> Option<(&[u8], &[u8])> {
        if !self.is_valid() {
            return None;
        }

        let mut parts = self.0.splitn(2, |byte| *byte == SEPARATOR);
        match (parts.next(), parts.next()) {
            (Some(key), Some(value)) => Some((key, value)),
            _ => None,
        }
    }
}

impl From<Vec<u8>> for Transaction {
    fn from(bytes: Vec<u8>) -> Self {
        Transaction::new(bytes)
    }
}

impl From<&[u8]> for Transaction {
    fn from(bytes: &[u8]) -> Self {
        Transaction::new(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Transaction {
    fn from(bytes: &[u8; N]) -> Self {
        Transaction::new(bytes.to_vec())
    }
}

impl Debug for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Transaction({:?})", String::from_utf8_lossy(&self.0))
    }
}
