//! Buffer set for state machine operations.
//!
//! Bundles the three buffers a [`crate::state::StateMachine`] needs to drive
//! one connection: an inbound frame ([`BufferSet::read_buffer`]), an outbound
//! frame accumulator ([`BufferSet::write_buffer`]), and a stash for a
//! `RowDescription` payload that must outlive the message that delivered it
//! ([`BufferSet::column_buffer`]) so later `DataRow`s can still resolve column
//! names and formats.

/// Buffer set for state machine operations.
pub struct BufferSet {
    /// Read buffer for incoming messages. Holds exactly the payload of the
    /// most recently read message (type byte and length are stripped).
    pub read_buffer: Vec<u8>,
    /// Write buffer for outgoing messages. State machines clear and refill
    /// this on every `Action::Write*` request; the caller flushes it verbatim.
    pub write_buffer: Vec<u8>,
    /// Holds the last `RowDescription` payload so it stays addressable while
    /// `DataRow`s are being processed, independent of `read_buffer`'s churn.
    pub column_buffer: Vec<u8>,
    /// Type byte of the last message read
    pub type_byte: u8,
}

impl BufferSet {
    /// Create a new buffer set.
    pub fn new() -> Self {
        Self {
            read_buffer: Vec::with_capacity(8192),
            write_buffer: Vec::with_capacity(8192),
            column_buffer: Vec::new(),
            type_byte: 0,
        }
    }
}

impl Default for BufferSet {
    fn default() -> Self {
        Self::new()
    }
}
