/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! User-defined parameters of a [`KVStoreApp`](crate::kvstore_app::KVStoreApp).
//!
//! The configuration is defined using the builder pattern, for example:
//!
//! ```ignore
//! let configuration =
//!     Configuration::builder()
//!     .app_name("kvstore")
//!     .app_version(AppVersion::new(1))
//!     .compute_app_hash(true)
//!     .begin_block_policy(BeginBlockPolicy::AbandonPrevious)
//!     .fatal_error_policy(FatalErrorPolicy::Abort)
//!     .log_events(true)
//!     .build()
//! ```
//!
//! Every setter is optional.

use typed_builder::TypedBuilder;

use crate::types::data_types::AppVersion;

/// Stores the user-defined parameters of the key-value app, that is:
/// 1. The application's name, reported in
/// [`InfoResponse::data`](crate::messages::InfoResponse::data).
/// 2. The [application version](AppVersion), reported in the `info` handshake.
/// 3. The "Compute App Hash" flag. If set, `commit` returns a digest of the app state; otherwise it
///    returns an empty digest.
/// 4. The [policy](BeginBlockPolicy) for a `begin_block` that arrives while a block is still open.
/// 5. The [policy](FatalErrorPolicy) for stopping the process after a fatal error.
/// 6. The "Log Events" flag, if set to "true" then logs should be printed.
///
/// ## Compute App Hash
///
/// Every replica of the same chain must use the same value for this flag, since the consensus
/// engine compares the digests returned by `commit` across replicas.
///
/// ## Log Events
///
/// The key-value app logs using the [log](https://docs.rs/log/latest/log/) crate. To get these
/// messages printed onto a terminal or to a file, set up a [logging
/// implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
#[derive(Clone, Debug, TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building a [Configuration]. Every setter is optional:
    - `.app_name(...)`
    - `.app_version(...)`
    - `.compute_app_hash(...)`
    - `.begin_block_policy(...)`
    - `.fatal_error_policy(...)`
    - `.log_events(...)`
"))]
pub struct Configuration {
    #[builder(default = String::from("kvstore"), setter(into, doc = "Set the application's name. Defaults to \"kvstore\"."))]
    pub app_name: String,
    #[builder(default = AppVersion::new(1), setter(doc = "Set the application version. Defaults to 1."))]
    pub app_version: AppVersion,
    #[builder(default = true, setter(doc = "Compute an app hash on every commit? Defaults to true."))]
    pub compute_app_hash: bool,
    #[builder(default, setter(doc = "Set what happens when a block is begun while another is still open. Defaults to abandoning the open block."))]
    pub begin_block_policy: BeginBlockPolicy,
    #[builder(default, setter(doc = "Set how the process is stopped after a fatal error. Defaults to aborting."))]
    pub fatal_error_policy: FatalErrorPolicy,
    #[builder(default = true, setter(doc = "Enable logging? Defaults to true."))]
    pub log_events: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration::builder().build()
    }
}

/// What the state machine does with a `begin_block` that arrives while a block is still open.
///
/// The consensus engine should always commit a block before beginning the next one, but nothing
/// in the call contract prevents it from doing otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BeginBlockPolicy {
    /// Discard the writes staged in the open block, which never become durable, and open a fresh
    /// one. A warning is logged and an [`AbandonBlockEvent`](crate::events::AbandonBlockEvent) is
    /// emitted.
    #[default]
    AbandonPrevious,

    /// Treat the second `begin_block` as a fatal sequencing error.
    Halt,
}

/// How the process is stopped after a fatal error.
///
/// A fatal error is one after which this replica's state may have diverged from its peers': a
/// storage failure, or a call that arrives out of the required order. In either case the process
/// must stop instead of answering the consensus engine. Restarting and replaying blocks is left to
/// the supervising infrastructure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FatalErrorPolicy {
    /// Log the error and call [`std::process::abort`].
    #[default]
    Abort,

    /// Log the error and panic with its message. Useful in tests, and for hosts that install a
    /// panic hook which terminates the process.
    Panic,
}
