//! Fold a validated, hash-chained action log into a synced checkpoint.
//!
//! # Status
//!
//! `commonware-checkpoint` is **ALPHA** software and is not yet recommended for production use. Developers should
//! expect breaking changes and occasional instability.
//!
//! # Overview
//!
//! Producers submit [Message]s to a [Log]. Each submission is checked with [Message::validate] and, if it
//! passes, its sequence number is appended to the log. Every append extends a SHA-256 chain over the log's
//! contents: the resulting [Cursor] names the log position after the append, so any contiguous range of
//! entries can be requested as `(from, to)`.
//!
//! Some coordinator periodically calls [reducer::Reducer::reduce] with the next `(start, end)` pair. The
//! [reducer::Reducer] folds the entries in that range into its [reducer::Checkpoint] (the largest sequence
//! number seen so far), advances its processed cursor to `end`, and compares that cursor against the log's
//! live tip to decide whether the checkpoint is synced.
//!
//! ```text
//! producers -> Message::validate -> Log::append --(cursor chain)--> [e1, e2, ..., en]
//!                                                                        |
//!                        Reducer::reduce(start, end) <- Log::actions <---+
//!                               |
//!                               +-> Checkpoint { summary, processed, synced }
//! ```
//!
//! # Substrates
//!
//! [Log] is a trait so the ordering substrate can be swapped out. This crate ships two implementations:
//! [log::Journal], an in-memory log, and [ledger::Mailbox], a handle to a [ledger::Actor] that owns a
//! [log::Journal] and serializes appends from any number of concurrent producers.
//!
//! # Example
//!
//! ```rust
//! use commonware_checkpoint::{log::Journal, reducer::{Config, Reducer}, Log, Message};
//! use futures::executor::block_on;
//!
//! block_on(async {
//!     let mut journal = Journal::new(());
//!     let mut reducer = Reducer::new(Config::new(()));
//!
//!     // Submit a valid message and a sentinel
//!     let start = reducer.checkpoint().processed;
//!     journal.append(Message::new(7, 1, 100, 6000)).await.unwrap();
//!     let end = journal.append(Message::sentinel(3)).await.unwrap();
//!
//!     // Fold both entries
//!     let checkpoint = reducer.reduce(&mut journal, start, end).await.unwrap();
//!     assert_eq!(checkpoint.summary, 7);
//!     assert!(checkpoint.synced);
//! });
//! ```

use std::future::Future;
use thiserror::Error;

pub mod ledger;
pub mod log;
pub use log::{Cursor, Entry, Log};
pub mod message;
pub use message::Message;
pub mod reducer;

#[cfg(test)]
pub mod mocks;

/// Errors that can occur when submitting to, querying, or folding the log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("message rejected")]
    Rejected,
    #[error("cursor mismatch: expected {expected}, found {found}")]
    CursorMismatch { expected: Cursor, found: Cursor },
    #[error("capacity exceeded: {requested} > {max}")]
    CapacityExceeded { requested: usize, max: usize },
    #[error("unknown cursor: {0}")]
    UnknownCursor(Cursor),
    #[error("mailbox closed")]
    MailboxClosed,
}

/// Notifications emitted as the log grows and the checkpoint advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activity {
    /// A message with the given sequence number was appended to the log.
    Received(u64),
    /// A batch was folded and the checkpoint summary is now the given value.
    Processed(u64),
}

/// Reporter is the interface responsible for observing [Activity].
///
/// Reports are broadcast-style: nothing about them is retained by the log or reducer,
/// so a reporter that needs history must keep it.
pub trait Reporter: Clone + Send + 'static {
    /// Activity is specified by the implementation.
    type Activity;

    /// Report some activity.
    fn report(&mut self, activity: Self::Activity) -> impl Future<Output = ()> + Send;
}

/// Discards all activity.
impl Reporter for () {
    type Activity = Activity;

    async fn report(&mut self, _: Self::Activity) {}
}
