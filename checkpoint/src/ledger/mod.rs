//! Serialize appends from concurrent producers through a single actor.
//!
//! The [Actor] owns a [crate::log::Journal] and processes one request from its mailbox at a time,
//! which makes it the single point at which the log is ordered: the order of entries is the
//! order in which the actor dequeues [Mailbox] appends, regardless of the order in which any one
//! producer observed its calls complete.
//!
//! [Mailbox] implements [crate::Log], so producers, coordinators, and [crate::reducer::Reducer]s
//! can all share cloned handles to the same log.
//!
//! # Example
//!
//! ```rust
//! use commonware_checkpoint::{ledger::{Actor, Config}, reducer::{self, Reducer}, Log, Message};
//! use commonware_runtime::{deterministic, Metrics, Runner};
//!
//! let executor = deterministic::Runner::default();
//! executor.start(|context| async move {
//!     // Start the ledger
//!     let (actor, mut mailbox) = Actor::new(
//!         context.with_label("ledger"),
//!         Config { mailbox_size: 16, reporter: () },
//!     );
//!     actor.start();
//!
//!     // Submit and fold
//!     mailbox.append(Message::new(3, 1, 0, 5000)).await.unwrap();
//!     let mut reducer = Reducer::new(reducer::Config::new(()));
//!     reducer.catch_up(&mut mailbox).await.unwrap();
//!     assert_eq!(reducer.checkpoint().summary, 3);
//! });
//! ```

use crate::{Activity, Reporter};

mod actor;
pub use actor::Actor;
mod ingress;
pub use ingress::Mailbox;

/// Configuration for the [Actor].
pub struct Config<R: Reporter<Activity = Activity>> {
    /// Number of requests to buffer before producers block.
    pub mailbox_size: usize,

    /// Notified of every admitted message.
    pub reporter: R,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        log::genesis,
        mocks,
        reducer::{self, Reducer, BATCH_SIZE},
        Error, Log, Message,
    };
    use commonware_macros::test_traced;
    use commonware_runtime::{deterministic, Metrics, Runner, Spawner};
    use futures::future::join_all;

    const PRODUCERS: u64 = 4;
    const PER_PRODUCER: u64 = 40;

    #[test_traced]
    fn test_concurrent_producers() {
        let executor = deterministic::Runner::default();
        executor.start(|context| async move {
            let reporter = mocks::Collector::default();
            let (actor, mailbox) = Actor::new(
                context.with_label("ledger"),
                Config {
                    mailbox_size: 8,
                    reporter: reporter.clone(),
                },
            );
            actor.start();

            // Spawn producers that interleave their appends
            let mut handles = Vec::new();
            for producer in 0..PRODUCERS {
                let mut mailbox = mailbox.clone();
                let handle = context
                    .with_label(&format!("producer_{producer}"))
                    .spawn(move |_| async move {
                        for i in 0..PER_PRODUCER {
                            let sequence = producer * 1_000 + i;
                            mailbox.append(mocks::valid(sequence)).await.unwrap();
                        }
                    });
                handles.push(handle);
            }
            for result in join_all(handles).await {
                result.unwrap();
            }

            // Every append landed exactly once
            let mut mailbox = mailbox;
            let entries = mailbox.pending(genesis(), usize::MAX).await.unwrap();
            assert_eq!(entries.len() as u64, PRODUCERS * PER_PRODUCER);
            assert_eq!(reporter.received().len() as u64, PRODUCERS * PER_PRODUCER);

            // Each producer's appends keep their relative order
            for producer in 0..PRODUCERS {
                let own: Vec<u64> = entries
                    .iter()
                    .map(|entry| entry.sequence)
                    .filter(|sequence| sequence / 1_000 == producer)
                    .collect();
                let expected: Vec<u64> = (0..PER_PRODUCER).map(|i| producer * 1_000 + i).collect();
                assert_eq!(own, expected);
            }

            // Fold the whole log through the mailbox
            let mut reducer = Reducer::new(reducer::Config::new(reporter.clone()));
            let batches = reducer.catch_up(&mut mailbox).await.unwrap();
            let total = (PRODUCERS * PER_PRODUCER) as usize;
            assert_eq!(batches, total.div_ceil(BATCH_SIZE));
            assert_eq!(
                reducer.checkpoint().summary,
                (PRODUCERS - 1) * 1_000 + PER_PRODUCER - 1
            );
            assert!(reducer.checkpoint().synced);
            assert_eq!(
                reducer.checkpoint().processed,
                mailbox.tip().await.unwrap()
            );
        });
    }

    #[test_traced]
    fn test_append_during_fold_is_detected() {
        let executor = deterministic::Runner::default();
        executor.start(|context| async move {
            let (actor, mut mailbox) = Actor::new(
                context.with_label("ledger"),
                Config {
                    mailbox_size: 8,
                    reporter: (),
                },
            );
            actor.start();
            let mut reducer = Reducer::new(reducer::Config::new(()));

            // Coordinator picks its end cursor
            let start = reducer.checkpoint().processed;
            for sequence in 1..=5 {
                mailbox.append(mocks::valid(sequence)).await.unwrap();
            }
            let end = mailbox.tip().await.unwrap();

            // Another producer appends after the end cursor was chosen
            let mut producer = mailbox.clone();
            context
                .with_label("producer")
                .spawn(move |_| async move {
                    producer.append(mocks::valid(99)).await.unwrap();
                })
                .await
                .unwrap();

            // The fold covers only the requested range and is not synced
            let checkpoint = reducer.reduce(&mut mailbox, start, end).await.unwrap();
            assert_eq!(checkpoint.summary, 5);
            assert!(!checkpoint.synced);

            // A stale second attempt fails its precondition
            assert!(matches!(
                reducer.reduce(&mut mailbox, start, end).await,
                Err(Error::CursorMismatch { .. })
            ));

            // Catching up picks up the late append
            assert_eq!(reducer.catch_up(&mut mailbox).await.unwrap(), 1);
            assert_eq!(reducer.checkpoint().summary, 99);
            assert!(reducer.checkpoint().synced);
        });
    }

    #[test_traced]
    fn test_metrics() {
        let executor = deterministic::Runner::default();
        executor.start(|context| async move {
            let (actor, mut mailbox) = Actor::new(
                context.with_label("ledger"),
                Config {
                    mailbox_size: 8,
                    reporter: (),
                },
            );
            actor.start();

            // One accepted, one rejected
            mailbox.append(Message::sentinel(1)).await.unwrap();
            let rejected = Message::new(2, 5000, 100, 6000);
            assert_eq!(mailbox.append(rejected).await, Err(Error::Rejected));
            let tip = mailbox.tip().await.unwrap();
            let entries = mailbox.actions(genesis(), tip, 10).await.unwrap();
            assert_eq!(entries.len(), 1);

            let buffer = context.encode();
            assert!(buffer.contains("appended_total 1"));
            assert!(buffer.contains("rejected_total 1"));
            assert!(buffer.contains("queries_total 2"));
            assert!(buffer.contains("entries 1"));
        });
    }

    #[test_traced]
    fn test_mailbox_closed() {
        let executor = deterministic::Runner::default();
        executor.start(|context| async move {
            let (actor, mut mailbox) = Actor::new(
                context.with_label("ledger"),
                Config {
                    mailbox_size: 8,
                    reporter: (),
                },
            );

            // Dropping the actor without starting it closes the mailbox
            drop(actor);
            assert_eq!(
                mailbox.append(mocks::valid(1)).await,
                Err(Error::MailboxClosed)
            );
            assert_eq!(mailbox.tip().await, Err(Error::MailboxClosed));
        });
    }
}
