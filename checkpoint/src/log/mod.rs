//! An append-only log of admitted sequence numbers, addressed by chained cursors.
//!
//! # Cursors
//!
//! Every position in the log is named by a [Cursor]: a SHA-256 digest chained over everything
//! appended so far.
//!
//! ```text
//! cursor_0     = SHA-256(GENESIS)
//! cursor_(n+1) = SHA-256(cursor_n || sequence_(n+1))
//! ```
//!
//! `sequence` is encoded as a big-endian `u64`. Because each cursor commits to the full history
//! before it, `(from, to)` names exactly one contiguous range of entries no matter how many
//! times (or by whom) it is requested.
//!
//! # Capacity
//!
//! Reads are bounded by the caller: [Log::actions] fails with [crate::Error::CapacityExceeded]
//! rather than return more than `max` entries, so a fold never has to truncate a range itself.

use crate::{Error, Message};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error as CodecError, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{sha256, Hasher, Sha256};
use std::future::Future;

mod journal;
pub use journal::Journal;

/// Domain separator hashed into the first cursor of every log.
pub const GENESIS: &[u8] = b"_COMMONWARE_CHECKPOINT_GENESIS";

/// Names a position in the log.
pub type Cursor = sha256::Digest;

/// Returns the cursor of an empty log.
pub fn genesis() -> Cursor {
    let mut hasher = Sha256::new();
    hasher.update(GENESIS);
    hasher.finalize()
}

/// Returns the cursor that follows `cursor` after `sequence` is appended.
pub fn chain(hasher: &mut Sha256, cursor: &Cursor, sequence: u64) -> Cursor {
    hasher.update(cursor.as_ref());
    hasher.update(&sequence.to_be_bytes());
    hasher.finalize()
}

/// An admitted sequence number and the cursor in effect after it was appended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Entry {
    pub sequence: u64,
    pub cursor: Cursor,
}

impl Write for Entry {
    fn write(&self, buf: &mut impl BufMut) {
        self.sequence.write(buf);
        self.cursor.write(buf);
    }
}

impl EncodeSize for Entry {
    fn encode_size(&self) -> usize {
        u64::SIZE + Cursor::SIZE
    }
}

impl Read for Entry {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, CodecError> {
        let sequence = u64::read(buf)?;
        let cursor = Cursor::read(buf)?;
        Ok(Self { sequence, cursor })
    }
}

/// An append-only, totally ordered log of admitted messages.
///
/// Implementations are responsible for linearizing concurrent appends. Nothing in this
/// crate assumes a particular storage engine.
pub trait Log {
    /// Validate `message` and, if it passes, append its sequence number.
    ///
    /// Returns the new tip cursor. A rejected message returns [Error::Rejected] and leaves
    /// the log unchanged.
    fn append(&mut self, message: Message) -> impl Future<Output = Result<Cursor, Error>> + Send;

    /// Return the entries appended after `from` up to and including `to`, in append order.
    ///
    /// Fails with [Error::UnknownCursor] if either cursor does not name a position in the log
    /// (or `to` precedes `from`) and with [Error::CapacityExceeded] if the range holds more
    /// than `max` entries.
    fn actions(
        &mut self,
        from: Cursor,
        to: Cursor,
        max: usize,
    ) -> impl Future<Output = Result<Vec<Entry>, Error>> + Send;

    /// Return at most `max` entries appended after `from`, in append order.
    fn pending(
        &mut self,
        from: Cursor,
        max: usize,
    ) -> impl Future<Output = Result<Vec<Entry>, Error>> + Send;

    /// Return the cursor of the most recent append (or [genesis] if the log is empty).
    fn tip(&mut self) -> impl Future<Output = Result<Cursor, Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_codec::{DecodeExt, Encode};

    #[test]
    fn test_genesis_is_stable() {
        assert_eq!(genesis(), genesis());
        let mut hasher = Sha256::new();
        assert_ne!(genesis(), chain(&mut hasher, &genesis(), 0));
    }

    #[test]
    fn test_chain_commits_to_history() {
        let mut hasher = Sha256::new();
        let root = genesis();

        // Same history, same cursor
        let a = chain(&mut hasher, &root, 1);
        let b = chain(&mut hasher, &a, 2);
        let a2 = chain(&mut hasher, &root, 1);
        let b2 = chain(&mut hasher, &a2, 2);
        assert_eq!(b, b2);

        // Reordering the history changes the cursor
        let c = chain(&mut hasher, &root, 2);
        let d = chain(&mut hasher, &c, 1);
        assert_ne!(b, d);

        // Duplicates still advance the cursor
        let e = chain(&mut hasher, &a, 1);
        assert_ne!(a, e);
    }

    #[test]
    fn test_entry_codec() {
        let mut hasher = Sha256::new();
        let entry = Entry {
            sequence: 11,
            cursor: chain(&mut hasher, &genesis(), 11),
        };
        let encoded = entry.encode();
        assert_eq!(encoded.len(), entry.encode_size());
        assert_eq!(Entry::decode(&encoded[..]).unwrap(), entry);
        assert!(Entry::decode(&encoded[..8]).is_err());
    }
}
