//! Types for RFID operations

use std::fmt;
use std::time::Duration;

/// Identifier of a 125 kHz tag as reported by the reader (5 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TagId([u8; 5]);

impl TagId {
    /// Number of payload bytes in a tag identifier
    pub const LEN: usize = 5;

    pub const fn new(bytes: [u8; 5]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 5] {
        &self.0
    }

    /// Checksum the reader appends to this identifier (XOR of all payload bytes)
    pub fn checksum(&self) -> u8 {
        checksum(&self.0)
    }
}

impl From<[u8; 5]> for TagId {
    fn from(bytes: [u8; 5]) -> Self {
        Self(bytes)
    }
}

impl From<TagId> for [u8; 5] {
    fn from(tag: TagId) -> Self {
        tag.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bytes_to_hex(&self.0))
    }
}

/// Kind of event raised by the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagEvent {
    /// A tag was brought to the antenna
    Read,
    /// A previously read tag is no longer in range
    Remove,
}

/// Presence of a tag as tracked between poll cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresenceState {
    /// No tag known to be present
    #[default]
    Idle,
    /// A tag was read and there is no way to detect its removal (no reset pin)
    TagSettled,
    /// The reader was just reset and we wait to see whether the tag shows up again
    AwaitingRemovalConfirmation,
}

/// Reasons a frame from the reader was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Start marker received while a frame was still being captured
    Framing,
    /// Frame completed but the trailing checksum does not match the payload
    ChecksumMismatch { expected: u8, actual: u8 },
    /// Byte between the markers is not one of `0-9`, `A-F`
    InvalidHexCharacter(u8),
    /// More hex characters than fit into payload + checksum
    Overflow,
    /// End marker received before payload + checksum were complete
    Truncated { nibbles: usize },
}

/// Counters kept by the frame decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderStats {
    pub frames_decoded: u32,
    pub checksum_mismatches: u32,
    pub framing_errors: u32,
    pub invalid_characters: u32,
    pub overflows: u32,
    pub truncated_frames: u32,
}

impl DecoderStats {
    pub(crate) fn record(&mut self, error: &FrameError) {
        let counter = match error {
            FrameError::Framing => &mut self.framing_errors,
            FrameError::ChecksumMismatch { .. } => &mut self.checksum_mismatches,
            FrameError::InvalidHexCharacter(_) => &mut self.invalid_characters,
            FrameError::Overflow => &mut self.overflows,
            FrameError::Truncated { .. } => &mut self.truncated_frames,
        };
        *counter = counter.saturating_add(1);
    }

    /// Total number of discarded frames
    pub fn errors(&self) -> u32 {
        self.checksum_mismatches
            .saturating_add(self.framing_errors)
            .saturating_add(self.invalid_characters)
            .saturating_add(self.overflows)
            .saturating_add(self.truncated_frames)
    }
}

/// Reader configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Time to wait after a reset pulse before a silent reader means the tag was removed.
    ///
    /// Must exceed the reader's reset recovery time plus the interval between two
    /// calls to `update`, otherwise removals are reported while the tag is still there.
    pub removal_wait: Duration,
    /// Maximum number of bytes drained from the transport per `update`
    pub max_bytes_per_poll: usize,
}

impl ReaderConfig {
    pub const DEFAULT_REMOVAL_WAIT: Duration = Duration::from_millis(500);
    pub const DEFAULT_MAX_BYTES_PER_POLL: usize = 16;

    pub fn with_removal_wait(mut self, removal_wait: Duration) -> Self {
        self.removal_wait = removal_wait;
        self
    }

    pub fn with_max_bytes_per_poll(mut self, max_bytes_per_poll: usize) -> Self {
        self.max_bytes_per_poll = max_bytes_per_poll;
        self
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            removal_wait: Self::DEFAULT_REMOVAL_WAIT,
            max_bytes_per_poll: Self::DEFAULT_MAX_BYTES_PER_POLL,
        }
    }
}

/// Errors that can occur during RFID operations
#[derive(Debug)]
pub enum IdxError {
    /// Transport layer error (UART, serial, etc.)
    Transport(String),
    /// Driving the reset line failed
    Reset(String),
    /// Invalid parameter passed to a function
    InvalidParameter(String),
    /// Operation needs a reset pin but the reader was created without one
    NoResetPin,
}

/// XOR of all bytes
pub(crate) fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Convert bytes to uppercase hex string
pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
