use std::time::Instant;

/// Trait for RFID reader communication backends.
/// Implement this trait for different transports (UART, serial port, etc.)
pub trait RfidTransport {
    /// Error type for transport operations
    type Error: std::fmt::Debug;

    /// Number of bytes that can be read without blocking
    fn available(&mut self) -> Result<usize, Self::Error>;

    /// Read the next byte. Only called after `available` reported at least one byte.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;
}

/// The byte a single-byte read returned, `None` when the read came back empty
#[cfg(any(test, feature = "uart-esp32"))]
pub(crate) fn read_one(buf: &[u8], count: usize) -> Option<u8> {
    if count == 0 {
        return None;
    }
    buf.first().copied()
}

/// Output driving the reader's reset line.
///
/// Implemented for every `embedded-hal` output pin, so HAL pin drivers
/// (esp-idf `PinDriver`, rppal, linux-embedded-hal, ...) can be passed directly.
pub trait ResetPin {
    type Error: std::fmt::Debug;

    /// Pull the line low and release it again
    fn pulse(&mut self) -> Result<(), Self::Error>;

    /// Put the line in its idle (high) state
    fn release(&mut self) -> Result<(), Self::Error>;
}

impl<P: embedded_hal::digital::OutputPin> ResetPin for P {
    type Error = <P as embedded_hal::digital::ErrorType>::Error;

    fn pulse(&mut self) -> Result<(), Self::Error> {
        self.set_low()?;
        self.set_high()
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        self.set_high()
    }
}

/// Placeholder for readers wired without a reset line.
///
/// Cannot be constructed; a reader using it never pulses anything.
#[derive(Debug)]
pub enum NoResetPin {}

impl embedded_hal::digital::ErrorType for NoResetPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for NoResetPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        match *self {}
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        match *self {}
    }
}

/// Monotonic millisecond clock
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Clock counting from its creation, backed by `std::time::Instant`
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
