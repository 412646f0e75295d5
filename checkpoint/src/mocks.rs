//! Helpers for testing the log and reducer.

use crate::{Activity, Message, Reporter};
use rand::Rng;
use std::sync::{Arc, Mutex};

/// A [Reporter] that records every [Activity] it observes.
#[derive(Clone, Default)]
pub struct Collector {
    activities: Arc<Mutex<Vec<Activity>>>,
}

impl Collector {
    /// All activity, in the order it was reported.
    pub fn activities(&self) -> Vec<Activity> {
        self.activities.lock().unwrap().clone()
    }

    /// Sequence numbers from [Activity::Received].
    pub fn received(&self) -> Vec<u64> {
        self.activities()
            .into_iter()
            .filter_map(|activity| match activity {
                Activity::Received(sequence) => Some(sequence),
                _ => None,
            })
            .collect()
    }

    /// Summaries from [Activity::Processed].
    pub fn processed(&self) -> Vec<u64> {
        self.activities()
            .into_iter()
            .filter_map(|activity| match activity {
                Activity::Processed(summary) => Some(summary),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for Collector {
    type Activity = Activity;

    async fn report(&mut self, activity: Self::Activity) {
        self.activities.lock().unwrap().push(activity);
    }
}

/// A valid, non-sentinel message with the given sequence number.
pub fn valid(sequence: u64) -> Message {
    let agent = 1 + sequence % 3_000;
    let x = sequence % 15_000;
    Message::new(sequence, agent, x, 20_000)
}

/// Generate `count` messages with sequence numbers `1, 1, 3, 4, ...` (a duplicate and a gap)
/// and fields drawn slightly outside the valid ranges, so some fail validation.
pub fn messages<R: Rng>(rng: &mut R, count: usize) -> Vec<Message> {
    (0..count as u64)
        .map(|i| {
            let sequence = if i < 2 { 1 } else { i + 1 };
            let agent = rng.gen_range(0..4_000);
            let x = rng.gen_range(0..16_000);
            let y = rng.gen_range(4_000..21_000);
            let checksum = agent + x + y + rng.gen_bool(0.1) as u64;
            Message {
                sequence,
                agent,
                x,
                y,
                checksum,
            }
        })
        .collect()
}
