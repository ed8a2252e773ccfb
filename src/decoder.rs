//! Decoder for the ASCII frames sent by ID-x readers
//!
//! A frame looks like `STX <10 hex chars payload> <2 hex chars checksum> CR LF ETX`,
//! where the checksum is the XOR of the five payload bytes.

use log::{debug, warn};

use crate::types::{checksum, DecoderStats, FrameError, TagId};

// Payload plus checksum byte
const BUFFER_LEN: usize = TagId::LEN + 1;
const FRAME_NIBBLES: usize = BUFFER_LEN * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    /// Waiting for a start marker
    Idle,
    /// Between start and end marker
    Frame,
    /// Frame was rejected, skip everything up to the next start marker
    Discard,
}

/// Byte-at-a-time frame decoder
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    buffer: [u8; BUFFER_LEN],
    nibbles: usize,
    high_nibble: u8,
    capture: Capture,
    stats: DecoderStats,
}

impl FrameDecoder {
    pub const STX: u8 = 0x02;
    pub const ETX: u8 = 0x03;
    pub const LF: u8 = 0x0A;
    pub const CR: u8 = 0x0D;

    pub fn new() -> Self {
        Self {
            buffer: [0; BUFFER_LEN],
            nibbles: 0,
            high_nibble: 0,
            capture: Capture::Idle,
            stats: DecoderStats::default(),
        }
    }

    /// Feed one byte from the reader.
    ///
    /// Returns the tag identifier on the byte that completes a frame with a valid
    /// checksum. Rejected frames are dropped silently; they are logged and counted
    /// in [`stats`](Self::stats).
    pub fn feed(&mut self, byte: u8) -> Option<TagId> {
        self.try_feed(byte).ok().flatten()
    }

    /// Same as [`feed`](Self::feed), but reports why a frame was rejected.
    ///
    /// The decoder is always ready for the next start marker afterwards, no error is fatal.
    pub fn try_feed(&mut self, byte: u8) -> Result<Option<TagId>, FrameError> {
        match self.step(byte) {
            Ok(Some(tag)) => {
                self.stats.frames_decoded = self.stats.frames_decoded.saturating_add(1);
                debug!("Decoded tag {}", tag);
                Ok(Some(tag))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                self.stats.record(&e);
                warn!("Discarding frame: {:?}", e);
                Err(e)
            }
        }
    }

    /// Whether a frame is currently being captured
    pub fn is_in_frame(&self) -> bool {
        self.capture == Capture::Frame
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = DecoderStats::default();
    }

    /// Drop any partially received frame
    pub fn reset(&mut self) {
        self.nibbles = 0;
        self.high_nibble = 0;
        self.capture = Capture::Idle;
    }

    fn step(&mut self, byte: u8) -> Result<Option<TagId>, FrameError> {
        match byte {
            Self::STX => {
                let interrupted = self.capture == Capture::Frame && self.nibbles > 0;
                self.nibbles = 0;
                self.capture = Capture::Frame;
                if interrupted {
                    Err(FrameError::Framing)
                } else {
                    Ok(None)
                }
            }
            Self::ETX => {
                let capture = std::mem::replace(&mut self.capture, Capture::Idle);
                if capture != Capture::Frame {
                    return Ok(None);
                }
                self.finish_frame().map(Some)
            }
            Self::LF | Self::CR => Ok(None),
            _ if self.capture != Capture::Frame => Ok(None),
            _ => {
                let value = match hex_value(byte) {
                    Some(value) => value,
                    None => {
                        self.capture = Capture::Discard;
                        return Err(FrameError::InvalidHexCharacter(byte));
                    }
                };

                if self.nibbles >= FRAME_NIBBLES {
                    self.capture = Capture::Discard;
                    return Err(FrameError::Overflow);
                }

                if self.nibbles % 2 == 1 {
                    self.buffer[self.nibbles / 2] = (self.high_nibble << 4) | value;
                } else {
                    self.high_nibble = value;
                }
                self.nibbles += 1;
                Ok(None)
            }
        }
    }

    fn finish_frame(&self) -> Result<TagId, FrameError> {
        if self.nibbles != FRAME_NIBBLES {
            return Err(FrameError::Truncated {
                nibbles: self.nibbles,
            });
        }

        let mut payload = [0u8; TagId::LEN];
        payload.copy_from_slice(&self.buffer[..TagId::LEN]);

        let expected = checksum(&payload);
        let actual = self.buffer[TagId::LEN];
        if expected != actual {
            return Err(FrameError::ChecksumMismatch { expected, actual });
        }

        Ok(TagId::new(payload))
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Value of an uppercase ASCII hex digit
fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Encode a tag identifier the way the reader puts it on the wire.
pub fn encode_frame(tag: &TagId) -> [u8; 16] {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut frame = [0u8; 16];
    frame[0] = FrameDecoder::STX;
    let bytes = tag.as_bytes().iter().copied().chain(std::iter::once(tag.checksum()));
    for (i, b) in bytes.enumerate() {
        frame[1 + i * 2] = HEX[(b >> 4) as usize];
        frame[2 + i * 2] = HEX[(b & 0x0F) as usize];
    }
    frame[13] = FrameDecoder::CR;
    frame[14] = FrameDecoder::LF;
    frame[15] = FrameDecoder::ETX;
    frame
}
