//! Fold bounded slices of the log into a checkpoint and track whether it is synced.
//!
//! # Protocol
//!
//! A [Reducer] owns a [Checkpoint]: the largest sequence number folded so far (`summary`),
//! the cursor up to which that summary is valid (`processed`), and whether `processed`
//! matched the log's tip when it was last evaluated (`synced`).
//!
//! [Reducer::reduce] advances the checkpoint by one batch:
//!
//! 1. `start` must equal `processed`, so a range can neither be skipped nor applied twice.
//! 2. The entries in `(start, end]` are read from the [Log], bounded by [Config::batch_size].
//! 3. The entries are folded into the summary with `max`, in log order.
//! 4. `summary` and `processed` are replaced together.
//! 5. `synced` is recomputed against the log's live tip (not `end`), so a caller that supplies
//!    a stale `end` cannot mark the checkpoint synced.
//! 6. [Activity::Processed] is reported with the new summary.
//!
//! Every fallible step runs before the checkpoint is replaced: a failed call leaves it untouched.
//!
//! A checkpoint that is not synced after a fold is not an error. It means entries were appended
//! beyond `end` and another call is required (see [Reducer::catch_up]).

use crate::{
    log::{genesis, Cursor, Entry, Log},
    Activity, Error, Reporter,
};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error as CodecError, FixedSize, Read, ReadExt, Write};
use commonware_utils::NZUsize;
use std::num::NonZeroUsize;
use tracing::{debug, info, warn};

/// Default maximum number of entries folded in a single [Reducer::reduce] call.
pub const BATCH_SIZE: usize = 50;

/// Configuration for the [Reducer].
pub struct Config<R: Reporter<Activity = Activity>> {
    /// Maximum number of entries folded per call.
    ///
    /// Larger batches mean fewer calls to catch up with a backlog at the cost of more
    /// work per call.
    pub batch_size: NonZeroUsize,

    /// Notified with the new summary after every successful fold.
    pub reporter: R,
}

impl<R: Reporter<Activity = Activity>> Config<R> {
    /// Create a configuration that folds at most [BATCH_SIZE] entries per call.
    pub fn new(reporter: R) -> Self {
        Self {
            batch_size: NZUsize!(BATCH_SIZE),
            reporter,
        }
    }
}

/// Whether a [Checkpoint] had caught up with the log when last evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Entries existed beyond the processed cursor.
    AheadOfCheckpoint,
    /// The processed cursor was the log's tip.
    Synced,
}

/// The reducer's running summary and the cursor it is valid up to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    /// Largest sequence number folded so far (0 if none).
    pub summary: u64,
    /// Cursor of the last entry folded into `summary`.
    pub processed: Cursor,
    /// Whether `processed` was the log's tip at the last evaluation.
    pub synced: bool,
}

impl Checkpoint {
    /// The checkpoint of a reducer created alongside an empty log.
    pub fn genesis() -> Self {
        Self {
            summary: 0,
            processed: genesis(),
            synced: true,
        }
    }

    /// Returns whether the checkpoint was synced at its last evaluation.
    pub fn state(&self) -> State {
        if self.synced {
            State::Synced
        } else {
            State::AheadOfCheckpoint
        }
    }
}

impl Write for Checkpoint {
    fn write(&self, buf: &mut impl BufMut) {
        self.summary.write(buf);
        self.processed.write(buf);
        self.synced.write(buf);
    }
}

impl EncodeSize for Checkpoint {
    fn encode_size(&self) -> usize {
        u64::SIZE + Cursor::SIZE + bool::SIZE
    }
}

impl Read for Checkpoint {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, CodecError> {
        let summary = u64::read(buf)?;
        let processed = Cursor::read(buf)?;
        let synced = bool::read(buf)?;
        Ok(Self {
            summary,
            processed,
            synced,
        })
    }
}

/// Fold `entries` into `summary`, keeping the largest sequence number.
pub fn fold(summary: u64, entries: &[Entry]) -> u64 {
    entries
        .iter()
        .fold(summary, |acc, entry| acc.max(entry.sequence))
}

/// Folds batches of the log into a [Checkpoint].
pub struct Reducer<R: Reporter<Activity = Activity>> {
    batch_size: NonZeroUsize,
    reporter: R,

    checkpoint: Checkpoint,
}

impl<R: Reporter<Activity = Activity>> Reducer<R> {
    /// Create a reducer at [Checkpoint::genesis].
    pub fn new(cfg: Config<R>) -> Self {
        Self::restore(cfg, Checkpoint::genesis())
    }

    /// Create a reducer that resumes from a previously persisted [Checkpoint].
    pub fn restore(cfg: Config<R>, checkpoint: Checkpoint) -> Self {
        Self {
            batch_size: cfg.batch_size,
            reporter: cfg.reporter,
            checkpoint,
        }
    }

    /// The current checkpoint.
    pub fn checkpoint(&self) -> &Checkpoint {
        &self.checkpoint
    }

    /// Maximum number of entries folded per call.
    pub fn batch_size(&self) -> usize {
        self.batch_size.get()
    }

    /// Fold the entries in `(start, end]` into the checkpoint.
    ///
    /// Fails with [Error::CursorMismatch] if `start` is not the processed cursor and with
    /// [Error::CapacityExceeded] if the range holds more than [Config::batch_size] entries.
    /// On failure the checkpoint is unchanged.
    pub async fn reduce<L: Log>(
        &mut self,
        log: &mut L,
        start: Cursor,
        end: Cursor,
    ) -> Result<Checkpoint, Error> {
        if start != self.checkpoint.processed {
            warn!(
                expected = %self.checkpoint.processed,
                found = %start,
                "cursor mismatch"
            );
            return Err(Error::CursorMismatch {
                expected: self.checkpoint.processed,
                found: start,
            });
        }

        // Read and fold the batch
        let entries = log.actions(start, end, self.batch_size.get()).await?;
        let summary = fold(self.checkpoint.summary, &entries);

        // Compare against the live tip, not the supplied end
        let tip = log.tip().await?;
        let checkpoint = Checkpoint {
            summary,
            processed: end,
            synced: end == tip,
        };

        // Commit
        self.checkpoint = checkpoint;
        if checkpoint.synced {
            info!(summary, entries = entries.len(), %end, "synced");
        } else {
            debug!(summary, entries = entries.len(), %end, %tip, "folded batch");
        }
        self.reporter.report(Activity::Processed(summary)).await;
        Ok(checkpoint)
    }

    /// Fold every pending entry, one batch at a time, until the checkpoint reaches the tip
    /// observed by the last batch.
    ///
    /// Returns the number of batches folded.
    pub async fn catch_up<L: Log>(&mut self, log: &mut L) -> Result<usize, Error> {
        let mut batches = 0;
        loop {
            let start = self.checkpoint.processed;
            let pending = log.pending(start, self.batch_size.get()).await?;
            let Some(last) = pending.last() else {
                // Nothing left to fold: refresh the synced flag if it is stale
                if !self.checkpoint.synced {
                    self.reduce(log, start, start).await?;
                    batches += 1;
                }
                return Ok(batches);
            };
            let end = last.cursor;
            self.reduce(log, start, end).await?;
            batches += 1;
        }
    }
}
