/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Registry of the handlers that are invoked when [events](crate::events) are emitted.

use crate::events::*;
use crate::logging::Logger;

pub(crate) type HandlerPtr<T> = Box<dyn Fn(&T) + Send + Sync>;

/// The handlers for each event type. If logging is enabled, the default logger of each event type
/// is registered first, followed by the user-defined handler, if any.
#[derive(Default)]
pub(crate) struct EventHandlers {
    pub(crate) begin_block_handlers: Vec<HandlerPtr<BeginBlockEvent>>,
    pub(crate) abandon_block_handlers: Vec<HandlerPtr<AbandonBlockEvent>>,
    pub(crate) commit_block_handlers: Vec<HandlerPtr<CommitBlockEvent>>,
    pub(crate) apply_transaction_handlers: Vec<HandlerPtr<ApplyTransactionEvent>>,
    pub(crate) reject_transaction_handlers: Vec<HandlerPtr<RejectTransactionEvent>>,
}

impl EventHandlers {
    pub(crate) fn new(
        log_events: bool,
        begin_block_handler: Option<HandlerPtr<BeginBlockEvent>>,
        abandon_block_handler: Option<HandlerPtr<AbandonBlockEvent>>,
        commit_block_handler: Option<HandlerPtr<CommitBlockEvent>>,
        apply_transaction_handler: Option<HandlerPtr<ApplyTransactionEvent>>,
        reject_transaction_handler: Option<HandlerPtr<RejectTransactionEvent>>,
    ) -> EventHandlers {
        EventHandlers {
            begin_block_handlers: handlers_for(log_events, begin_block_handler),
            abandon_block_handlers: handlers_for(log_events, abandon_block_handler),
            commit_block_handlers: handlers_for(log_events, commit_block_handler),
            apply_transaction_handlers: handlers_for(log_events, apply_transaction_handler),
            reject_transaction_handlers: handlers_for(log_events, reject_transaction_handler),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.begin_block_handlers.is_empty()
            && self.abandon_block_handlers.is_empty()
            && self.commit_block_handlers.is_empty()
            && self.apply_transaction_handlers.is_empty()
            && self.reject_transaction_handlers.is_empty()
    }

    pub(crate) fn fire_handlers(&self, event: Event) {
        match event {
            Event::BeginBlock(begin_block_event) => self
                .begin_block_handlers
                .iter()
                .for_each(|handler| handler(&begin_block_event)),

            Event::AbandonBlock(abandon_block_event) => self
                .abandon_block_handlers
                .iter()
                .for_each(|handler| handler(&abandon_block_event)),

            Event::CommitBlock(commit_block_event) => self
                .commit_block_handlers
                .iter()
                .for_each(|handler| handler(&commit_block_event)),

            Event::ApplyTransaction(apply_transaction_event) => self
                .apply_transaction_handlers
                .iter()
                .for_each(|handler| handler(&apply_transaction_event)),

            Event::RejectTransaction(reject_transaction_event) => self
                .reject_transaction_handlers
                .iter()
                .for_each(|handler| handler(&reject_transaction_event)),
        }
    }
}

fn handlers_for<T: Logger>(
    log_events: bool,
    user_handler: Option<HandlerPtr<T>>,
) -> Vec<HandlerPtr<T>> {
    let mut handlers = Vec::new();
    if log_events {
        handlers.push(T::get_logger());
    }
    if let Some(handler) = user_handler {
        handlers.push(handler);
    }
    handlers
}
