//! Serial port transport for desktop using serialport crate

use crate::transport::RfidTransport;
use std::time::Duration;

pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// ID-x readers talk 9600 baud, 8N1
    pub const DEFAULT_BAUD_RATE: u32 = 9600;

    pub fn new(port_name: &str, baud_rate: u32) -> Result<Self, serialport::Error> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(10))
            .open()?;
        port.clear(serialport::ClearBuffer::Input)?;

        Ok(Self { port })
    }

    /// Reset line driven by the adapter's DTR output.
    ///
    /// Many USB-serial boards for the ID-12 wire DTR to the reader's reset input.
    pub fn dtr_reset_pin(&self) -> Result<DtrResetPin, serialport::Error> {
        Ok(DtrResetPin {
            port: self.port.try_clone()?,
        })
    }
}

impl RfidTransport for SerialTransport {
    type Error = std::io::Error;

    fn available(&mut self) -> Result<usize, Self::Error> {
        self.port
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(|e| std::io::Error::other(e))
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        std::io::Read::read_exact(&mut self.port, &mut buf)?;
        Ok(buf[0])
    }
}

/// Reset output on the DTR modem line of a serial adapter
pub struct DtrResetPin {
    port: Box<dyn serialport::SerialPort>,
}

/// Error raised when the DTR line cannot be driven
#[derive(Debug)]
pub struct DtrError(pub serialport::Error);

impl embedded_hal::digital::Error for DtrError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl embedded_hal::digital::ErrorType for DtrResetPin {
    type Error = DtrError;
}

impl embedded_hal::digital::OutputPin for DtrResetPin {
    // RS-232 levels are inverted: asserting DTR drives the line low
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.port.write_data_terminal_ready(true).map_err(DtrError)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.port.write_data_terminal_ready(false).map_err(DtrError)
    }
}
