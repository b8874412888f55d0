/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Types that are used across multiple components of the key-value app.

pub mod crypto_primitives;

pub mod data_types;

pub mod transaction;
