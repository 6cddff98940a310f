//! `embedded-hal` pin wrappers over the raw GPIO helpers in
//! [`hw_init`](super::hw_init).
//!
//! The pins must have been configured by `hw_init::init_peripherals()`.

use core::fmt;

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};

use super::hw_init;

/// The GPIO driver rejected a level write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioError {
    pub pin: i32,
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{} write rejected", self.pin)
    }
}

impl digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Push-pull output.
#[derive(Debug)]
pub struct GpioOut {
    pin: i32,
}

impl GpioOut {
    pub fn new(pin: i32) -> Self {
        Self { pin }
    }
}

impl ErrorType for GpioOut {
    type Error = GpioError;
}

impl OutputPin for GpioOut {
    fn set_low(&mut self) -> Result<(), GpioError> {
        if hw_init::gpio_write(self.pin, false) { Ok(()) } else { Err(GpioError { pin: self.pin }) }
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        if hw_init::gpio_write(self.pin, true) { Ok(()) } else { Err(GpioError { pin: self.pin }) }
    }
}

/// Floating input.
#[derive(Debug)]
pub struct GpioIn {
    pin: i32,
}

impl GpioIn {
    pub fn new(pin: i32) -> Self {
        Self { pin }
    }
}

impl ErrorType for GpioIn {
    type Error = core::convert::Infallible;
}

impl InputPin for GpioIn {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(hw_init::gpio_read(self.pin))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!hw_init::gpio_read(self.pin))
    }
}
