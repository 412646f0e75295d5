//! Submissions and the predicate that gates their admission to the log.

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error as CodecError, FixedSize, Read, ReadExt, Write};

/// Largest valid agent identifier.
pub const MAX_AGENT: u64 = 3_000;

/// Largest valid x coordinate.
pub const MAX_X: u64 = 15_000;

/// Smallest valid y coordinate.
pub const MIN_Y: u64 = 5_000;

/// Largest valid y coordinate.
pub const MAX_Y: u64 = 20_000;

/// A submission to the log.
///
/// Only `sequence` survives admission; the remaining fields exist to be checked by
/// [Message::validate].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    /// Producer-assigned number. Not required to be unique or contiguous.
    pub sequence: u64,
    /// Agent identifier. Zero marks a pass-through message that is always valid.
    pub agent: u64,
    /// Horizontal coordinate of the agent.
    pub x: u64,
    /// Vertical coordinate of the agent.
    pub y: u64,
    /// Must equal `agent + x + y`.
    pub checksum: u64,
}

impl Message {
    /// Create a message with a checksum computed from the provided fields.
    ///
    /// # Panics
    ///
    /// Panics if `agent + x + y` overflows.
    pub fn new(sequence: u64, agent: u64, x: u64, y: u64) -> Self {
        Self {
            sequence,
            agent,
            x,
            y,
            checksum: agent + x + y,
        }
    }

    /// Create a pass-through message (`agent == 0`).
    pub fn sentinel(sequence: u64) -> Self {
        Self {
            sequence,
            agent: 0,
            x: 0,
            y: 0,
            checksum: 0,
        }
    }

    /// Returns whether the message may be admitted to the log.
    ///
    /// Every sub-condition is evaluated and combined with non-short-circuiting `&` and `|`,
    /// so the result is a single boolean expression over the fields (no branch decides which
    /// comparisons run). The checksum is summed in 128 bits so it can neither overflow nor wrap
    /// into a match.
    pub fn validate(&self) -> bool {
        let sentinel = self.agent == 0;
        let agent = self.agent <= MAX_AGENT;
        let x = self.x <= MAX_X;
        let y_low = self.y >= MIN_Y;
        let y_high = self.y <= MAX_Y;
        let ordered = self.y > self.x;
        let sum = self.agent as u128 + self.x as u128 + self.y as u128;
        let checksum = sum == self.checksum as u128;
        sentinel | (agent & x & y_low & y_high & ordered & checksum)
    }
}

impl Write for Message {
    fn write(&self, buf: &mut impl BufMut) {
        self.sequence.write(buf);
        self.agent.write(buf);
        self.x.write(buf);
        self.y.write(buf);
        self.checksum.write(buf);
    }
}

impl EncodeSize for Message {
    fn encode_size(&self) -> usize {
        5 * u64::SIZE
    }
}

impl Read for Message {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, CodecError> {
        // Decoding does not validate: admission is decided by the log
        let sequence = u64::read(buf)?;
        let agent = u64::read(buf)?;
        let x = u64::read(buf)?;
        let y = u64::read(buf)?;
        let checksum = u64::read(buf)?;
        Ok(Self {
            sequence,
            agent,
            x,
            y,
            checksum,
        })
    }
}
