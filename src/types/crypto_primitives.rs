/*
    Copyright © 2024, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Cryptographic primitives.
//!
//! The only primitive this crate needs is a cryptographic hash for
//! [`AppHash`](super::data_types::AppHash)es, provided by the [`sha2`] crate.

// re-exports below.
pub use sha2::Digest;
pub use sha2::Sha256 as CryptoHasher;
