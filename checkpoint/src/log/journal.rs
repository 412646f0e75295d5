use super::{chain, genesis, Cursor, Entry, Log};
use crate::{Activity, Error, Message, Reporter};
use commonware_cryptography::{Hasher, Sha256};
use std::collections::HashMap;
use tracing::{debug, warn};

/// An in-memory [Log].
///
/// [Journal] is not shared: callers that append from multiple tasks should put it behind
/// a [crate::ledger::Actor].
pub struct Journal<R: Reporter<Activity = Activity>> {
    reporter: R,

    hasher: Sha256,
    genesis: Cursor,
    entries: Vec<Entry>,

    // Number of entries at or before each cursor (genesis maps to 0)
    positions: HashMap<Cursor, usize>,
}

impl<R: Reporter<Activity = Activity>> Journal<R> {
    /// Create an empty journal that reports appends to `reporter`.
    pub fn new(reporter: R) -> Self {
        let genesis = genesis();
        let mut positions = HashMap::new();
        positions.insert(genesis, 0);
        Self {
            reporter,
            hasher: Sha256::new(),
            genesis,
            entries: Vec::new(),
            positions,
        }
    }

    /// Number of admitted entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been admitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn current(&self) -> Cursor {
        self.entries
            .last()
            .map(|entry| entry.cursor)
            .unwrap_or(self.genesis)
    }

    fn position(&self, cursor: &Cursor) -> Result<usize, Error> {
        self.positions
            .get(cursor)
            .copied()
            .ok_or(Error::UnknownCursor(*cursor))
    }
}

impl<R: Reporter<Activity = Activity>> Log for Journal<R> {
    async fn append(&mut self, message: Message) -> Result<Cursor, Error> {
        if !message.validate() {
            warn!(
                sequence = message.sequence,
                agent = message.agent,
                "rejected message"
            );
            return Err(Error::Rejected);
        }

        // Extend the chain
        let current = self.current();
        let cursor = chain(&mut self.hasher, &current, message.sequence);
        self.entries.push(Entry {
            sequence: message.sequence,
            cursor,
        });
        self.positions.insert(cursor, self.entries.len());
        debug!(
            sequence = message.sequence,
            position = self.entries.len(),
            %cursor,
            "appended"
        );

        self.reporter
            .report(Activity::Received(message.sequence))
            .await;
        Ok(cursor)
    }

    async fn actions(&mut self, from: Cursor, to: Cursor, max: usize) -> Result<Vec<Entry>, Error> {
        let start = self.position(&from)?;
        let end = self.position(&to)?;
        if end < start {
            return Err(Error::UnknownCursor(to));
        }
        let requested = end - start;
        if requested > max {
            return Err(Error::CapacityExceeded { requested, max });
        }
        Ok(self.entries[start..end].to_vec())
    }

    async fn pending(&mut self, from: Cursor, max: usize) -> Result<Vec<Entry>, Error> {
        let start = self.position(&from)?;
        let end = self.entries.len().min(start.saturating_add(max));
        Ok(self.entries[start..end].to_vec())
    }

    async fn tip(&mut self) -> Result<Cursor, Error> {
        Ok(self.current())
    }
}
