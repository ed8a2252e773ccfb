//! UART transport for ESP32 using esp-idf-hal
//!
//! The reset line can be any esp-idf `PinDriver` in output mode, it implements
//! the `embedded-hal` output pin trait and with that [`ResetPin`](crate::ResetPin).

use crate::transport::{read_one, RfidTransport};
use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::gpio::{self, InputPin, OutputPin};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::uart::{self, UartDriver};
use esp_idf_svc::sys::{EspError, ESP_ERR_TIMEOUT};

pub struct UartTransport<'a> {
    uart: UartDriver<'a>,
}

impl<'a> UartTransport<'a> {
    pub fn new(
        uart: impl Peripheral<P = impl uart::Uart> + 'a,
        tx: impl Peripheral<P = impl OutputPin> + 'a,
        rx: impl Peripheral<P = impl InputPin> + 'a,
        baud_rate: u32,
    ) -> Result<Self, EspError> {
        let config = uart::config::Config::default().baudrate(baud_rate.into());
        let uart = UartDriver::new(
            uart,
            tx,
            rx,
            Option::<gpio::Gpio0>::None,
            Option::<gpio::Gpio0>::None,
            &config,
        )?;

        uart.clear_rx()?;

        Ok(Self { uart })
    }
}

impl RfidTransport for UartTransport<'_> {
    type Error = EspError;

    fn available(&mut self) -> Result<usize, Self::Error> {
        self.uart.remaining_read()
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        let count = self.uart.read(&mut buf, NON_BLOCK)?;
        read_one(&buf, count)
            .ok_or_else(|| EspError::from_infallible::<{ ESP_ERR_TIMEOUT as i32 }>())
    }
}
