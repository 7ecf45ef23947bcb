//! Collaborator traits for a one-wire bus.
//!
//! The electrical side of the bus (reset and presence pulses, slot timing,
//! the ROM search itself) lives in whatever implements these traits: an RMT
//! peripheral driver, a bit-banged GPIO driver, a USB bridge or the
//! in-memory [`crate::sim::SimBus`].
use crate::Address;

/// Settings handed to a bus provider when it opens a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// GPIO number of the data line.
    pub pin: u8,
    /// Enable the internal pull-up on the data line.
    pub pull_up: bool,
    /// Largest single read the provider has to buffer.
    /// A ROM code plus a scratchpad fit in 10 bytes.
    pub max_rx_bytes: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            pin: 12,
            pull_up: true,
            max_rx_bytes: 10,
        }
    }
}

impl BusConfig {
    pub fn new(pin: u8) -> Self {
        Self {
            pin,
            ..Default::default()
        }
    }
    pub fn with_pull_up(mut self, enable: bool) -> Self {
        self.pull_up = enable;
        self
    }
    pub fn with_max_rx_bytes(mut self, len: usize) -> Self {
        self.max_rx_bytes = len;
        self
    }
}

/// Generic classification of bus failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// No device answered the reset pulse.
    NoPresence,
    /// A ROM code or data block failed its CRC check.
    Crc,
    /// The bus did not complete a transaction in time.
    Timeout,
    Other,
}

/// Bus error contract, in the shape of `embedded_hal::i2c::Error`.
pub trait Error: core::fmt::Debug {
    fn kind(&self) -> ErrorKind;
}

impl Error for core::convert::Infallible {
    fn kind(&self) -> ErrorKind {
        match *self {}
    }
}

pub trait ErrorType {
    type Error: Error;
}

/// An initialized one-wire bus that can start a device search.
pub trait OneWireBus: ErrorType {
    /// Iterator over the devices present on the bus.
    ///
    /// It holds the bus exclusively until it is released.
    type Search<'a>: DeviceSearch<Error = Self::Error>
    where
        Self: 'a;

    /// Allocate a device iterator positioned before the first device.
    fn search(&mut self) -> Result<Self::Search<'_>, Self::Error>;
}

/// One in-progress walk over the devices on a bus.
pub trait DeviceSearch: ErrorType {
    /// Next device address, or `Ok(None)` once every device was reported.
    fn next_device(&mut self) -> Result<Option<Address>, Self::Error>;

    /// Free the iterator and whatever bus resources it holds.
    fn release(self) -> Result<(), Self::Error>;
}
