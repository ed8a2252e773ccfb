//! Driver for Innovations ID-x series 125 kHz RFID readers (ID-2, ID-12, ID-20)
//! with support for multiple transport backends.
//!
//! The reader sends the identifier of a tag over and over while it sits on the
//! antenna and has no way to tell when it is gone. When its reset line is wired
//! up, the driver resets the reader after each read and reports the tag as removed
//! once the reader stays silent for the configured removal wait.
//!
//! # Features
//!
//! - `uart-esp32` - UART transport for ESP32 using esp-idf-svc
//! - `serial` - Serial port transport for desktop using serialport crate
//!
//! # Example
//!
//! ```ignore
//! use idx_rfid::{IdxReader, SerialTransport, TagEvent};
//!
//! let transport = SerialTransport::new("/dev/ttyUSB0", SerialTransport::DEFAULT_BAUD_RATE)?;
//! let reset = transport.dtr_reset_pin()?;
//! let mut reader = IdxReader::with_reset_pin(transport, reset)?;
//!
//! reader.attach(TagEvent::Read, |tag| println!("Tag read: {}", tag));
//! reader.attach(TagEvent::Remove, |tag| println!("Tag removed: {}", tag));
//!
//! loop {
//!     reader.update()?;
//!     std::thread::sleep(std::time::Duration::from_millis(20));
//! }
//! ```

mod decoder;
mod dispatch;
mod presence;
mod reader;
mod transport;
mod types;

#[cfg(feature = "uart-esp32")]
mod uart;

#[cfg(feature = "serial")]
mod serial;

// Re-exports
pub use decoder::{encode_frame, FrameDecoder};
pub use dispatch::{EventDispatcher, TagHandler};
pub use reader::IdxReader;
pub use transport::{Clock, NoResetPin, ResetPin, RfidTransport, SystemClock};
pub use types::{
    DecoderStats, FrameError, IdxError, PresenceState, ReaderConfig, TagEvent, TagId,
};

#[cfg(feature = "uart-esp32")]
pub use uart::UartTransport;

#[cfg(feature = "serial")]
pub use serial::{DtrError, DtrResetPin, SerialTransport};
