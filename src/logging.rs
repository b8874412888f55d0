/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Functions that log out events.
//!
//! The logs defined in this module are printed if the user enabled them via the app's
//! [configuration](crate::config::Configuration::log_events).
//!
//! The key-value app logs using the [log](https://docs.rs/log/latest/log/) crate. To get these
//! messages printed onto a terminal or to a file, set up a
//! [logging implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
//!
//! ## Log message format
//!
//! Log messages are CSVs (Comma Separated Values) with at least two values. The first two values
//! are always:
//! 1. The name of the [event](crate::events) in PascalCase (defined in this module as constants).
//! 2. The time the event was emitted (as number of seconds since the Unix Epoch).
//!
//! The rest of the values differ depending on the kind of event. For example, the following snippet
//! is how a [CommitBlock](crate::events::CommitBlockEvent) is printed:
//!
//! ```text
//! CommitBlock, 1701329264, 12, 3, fNGCJyk
//! ```
//!
//! In the snippet:
//! - The third value is the height of the committed block.
//! - The fourth value is the number of writes the block committed.
//! - The fifth value is the first seven characters of the Base64 encoding of the app hash.

use std::time::SystemTime;

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use log;

use crate::events::*;

// Names of each event in PascalCase for printing:
pub const BEGIN_BLOCK: &str = "BeginBlock";
pub const ABANDON_BLOCK: &str = "AbandonBlock";
pub const COMMIT_BLOCK: &str = "CommitBlock";
pub const APPLY_TRANSACTION: &str = "ApplyTransaction";
pub const REJECT_TRANSACTION: &str = "RejectTransaction";

/// Implemented by event types. Used to get a closure that logs the event.
pub(crate) trait Logger {
    /// Returns a pointer to the default logging handler for a given event type.
    fn get_logger() -> Box<dyn Fn(&Self) + Send + Sync>;
}

impl Logger for BeginBlockEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send + Sync> {
        let logger = |begin_block_event: &BeginBlockEvent| {
            log::debug!(
                "{}, {}, {}",
                BEGIN_BLOCK,
                secs_since_unix_epoch(begin_block_event.timestamp),
                begin_block_event.height
            )
        };
        Box::new(logger)
    }
}

impl Logger for AbandonBlockEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send + Sync> {
        let logger = |abandon_block_event: &AbandonBlockEvent| {
            log::warn!(
                "{}, {}, {}, {}, {}",
                ABANDON_BLOCK,
                secs_since_unix_epoch(abandon_block_event.timestamp),
                abandon_block_event.abandoned_height,
                abandon_block_event.abandoned_writes,
                abandon_block_event.new_height
            )
        };
        Box::new(logger)
    }
}

impl Logger for CommitBlockEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send + Sync> {
        let logger = |commit_block_event: &CommitBlockEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                COMMIT_BLOCK,
                secs_since_unix_epoch(commit_block_event.timestamp),
                commit_block_event.height,
                commit_block_event.writes,
                first_seven_base64_chars(commit_block_event.app_hash.bytes())
            )
        };
        Box::new(logger)
    }
}

impl Logger for ApplyTransactionEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send + Sync> {
        let logger = |apply_transaction_event: &ApplyTransactionEvent| {
            log::trace!(
                "{}, {}, {}, {}, {}",
                APPLY_TRANSACTION,
                secs_since_unix_epoch(apply_transaction_event.timestamp),
                apply_transaction_event.height,
                first_seven_base64_chars(&apply_transaction_event.key),
                apply_transaction_event.value.len()
            )
        };
        Box::new(logger)
    }
}

impl Logger for RejectTransactionEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send + Sync> {
        let logger = |reject_transaction_event: &RejectTransactionEvent| {
            log::debug!(
                "{}, {}, {:?}, {}",
                REJECT_TRANSACTION,
                secs_since_unix_epoch(reject_transaction_event.timestamp),
                reject_transaction_event.stage,
                first_seven_base64_chars(reject_transaction_event.tx.bytes())
            )
        };
        Box::new(logger)
    }
}

// Get a more readable representation of a bytesequence by base64-encoding it and taking the first 7
// characters.
pub(crate) fn first_seven_base64_chars(bytes: &[u8]) -> String {
    let encoded = STANDARD_NO_PAD.encode(bytes);
    if encoded.len() > 7 {
        encoded[0..7].to_string()
    } else {
        encoded
    }
}

fn secs_since_unix_epoch(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}
