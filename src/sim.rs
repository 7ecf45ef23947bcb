//! In-memory one-wire bus.
//!
//! Answers device searches and DS18B20 commands from a list of simulated
//! devices, counts iterator allocations and releases, and can be told to
//! fail at chosen points.
use crate::{
    Address,
    bus::{BusConfig, DeviceSearch, Error, ErrorKind, ErrorType, OneWireBus},
    ds18b20::{Ds18b20Bus, Resolution, Scratchpad},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    #[error("Bus config rejected: {0}")]
    Config(String),
    #[error("No device answered the reset pulse.")]
    NoPresence,
    #[error("Injected fault: {0}")]
    /// A failure requested through one of the `fail_*` methods.
    Injected(&'static str),
}

impl Error for SimError {
    fn kind(&self) -> ErrorKind {
        match self {
            SimError::NoPresence => ErrorKind::NoPresence,
            SimError::Injected(_) => ErrorKind::Timeout,
            SimError::Config(_) => ErrorKind::Other,
        }
    }
}

/// A device attached to a [`SimBus`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimDevice {
    pub address: Address,
    /// Temperature the device reports after its next conversion.
    pub celsius: f32,
    /// A detached device neither answers searches nor drives the data line.
    pub detached: bool,
    scratchpad: Scratchpad,
}

impl SimDevice {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            celsius: 20.0,
            detached: false,
            scratchpad: Scratchpad {
                raw_temperature: Scratchpad::POWER_ON_RAW,
                alarm_high: 75,
                alarm_low: 70,
                resolution: Resolution::Bits12,
            },
        }
    }
    pub fn with_celsius(mut self, celsius: f32) -> Self {
        self.celsius = celsius;
        self
    }
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.scratchpad.resolution = resolution;
        self
    }
    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }
    pub fn resolution(&self) -> Resolution {
        self.scratchpad.resolution
    }
    fn convert(&mut self) {
        self.scratchpad.raw_temperature = (self.celsius * 16.0).round() as i16;
    }
}

#[derive(Debug, Default)]
pub struct SimBus {
    config: BusConfig,
    devices: Vec<SimDevice>,
    searches_created: usize,
    searches_released: usize,
    fail_search: bool,
    fail_next_at: Option<usize>,
    fail_release: bool,
    conversions: usize,
}

impl SimBus {
    pub fn open(config: &BusConfig) -> Result<Self, SimError> {
        if config.max_rx_bytes < 9 {
            return Err(SimError::Config(format!(
                "max_rx_bytes {} cannot hold a scratchpad",
                config.max_rx_bytes
            )));
        }
        if !config.pull_up {
            log::warn!("GPIO{} pull-up disabled, an external resistor is required", config.pin);
        }
        log::info!("1-Wire bus on GPIO{} initiated", config.pin);
        Ok(Self {
            config: *config,
            ..Default::default()
        })
    }
    pub fn config(&self) -> &BusConfig {
        &self.config
    }
    pub fn attach(&mut self, device: SimDevice) -> &mut Self {
        self.devices.push(device);
        self
    }
    pub fn with_device(mut self, device: SimDevice) -> Self {
        self.devices.push(device);
        self
    }
    pub fn device_mut(&mut self, address: Address) -> Option<&mut SimDevice> {
        self.devices.iter_mut().find(|d| d.address == address)
    }
    pub fn device(&self, address: Address) -> Option<&SimDevice> {
        self.devices.iter().find(|d| d.address == address)
    }

    /// Make the next [`OneWireBus::search`] fail.
    pub fn fail_search(&mut self) {
        self.fail_search = true;
    }
    /// Make the `n`th `next_device` call of each search fail, counting from 1.
    pub fn fail_next_device_at(&mut self, n: usize) {
        self.fail_next_at = Some(n);
    }
    /// Make every search release fail. The search still counts as released.
    pub fn fail_release(&mut self) {
        self.fail_release = true;
    }

    pub fn searches_created(&self) -> usize {
        self.searches_created
    }
    pub fn searches_released(&self) -> usize {
        self.searches_released
    }
    /// Number of Convert T commands seen.
    pub fn conversions(&self) -> usize {
        self.conversions
    }

    fn responding(&self, address: Address) -> Option<&SimDevice> {
        self.device(address).filter(|d| !d.detached)
    }
}

impl ErrorType for SimBus {
    type Error = SimError;
}

impl OneWireBus for SimBus {
    type Search<'a> = SimSearch<'a>;

    fn search(&mut self) -> Result<SimSearch<'_>, SimError> {
        if std::mem::take(&mut self.fail_search) {
            return Err(SimError::Injected("iterator allocation"));
        }
        self.searches_created += 1;
        Ok(SimSearch {
            bus: self,
            position: 0,
            calls: 0,
        })
    }
}

/// Search over a [`SimBus`], yielding attached devices in insertion order.
#[derive(Debug)]
pub struct SimSearch<'a> {
    bus: &'a mut SimBus,
    position: usize,
    calls: usize,
}

impl ErrorType for SimSearch<'_> {
    type Error = SimError;
}

impl DeviceSearch for SimSearch<'_> {
    fn next_device(&mut self) -> Result<Option<Address>, SimError> {
        self.calls += 1;
        if self.bus.fail_next_at == Some(self.calls) {
            return Err(SimError::Injected("device search"));
        }
        while let Some(device) = self.bus.devices.get(self.position) {
            self.position += 1;
            if !device.detached {
                log::trace!("search hit {}", device.address);
                return Ok(Some(device.address));
            }
        }
        Ok(None)
    }

    fn release(self) -> Result<(), SimError> {
        self.bus.searches_released += 1;
        if self.bus.fail_release {
            Err(SimError::Injected("iterator release"))
        } else {
            Ok(())
        }
    }
}

impl Ds18b20Bus for SimBus {
    fn convert_all(&mut self) -> Result<(), SimError> {
        if !self.devices.iter().any(|d| !d.detached) {
            return Err(SimError::NoPresence);
        }
        self.conversions += 1;
        self.devices
            .iter_mut()
            .filter(|d| !d.detached)
            .for_each(SimDevice::convert);
        Ok(())
    }

    fn read_scratchpad(&mut self, address: Address) -> Result<[u8; 9], SimError> {
        // with nobody driving the line every bit reads as one
        Ok(self
            .responding(address)
            .map(|d| d.scratchpad.encode())
            .unwrap_or([0xFF; 9]))
    }

    fn write_scratchpad(&mut self, address: Address, data: [u8; 3]) -> Result<(), SimError> {
        if let Some(device) = self.device_mut(address).filter(|d| !d.detached) {
            device.scratchpad.alarm_high = data[0] as i8;
            device.scratchpad.alarm_low = data[1] as i8;
            device.scratchpad.resolution = Resolution::from_bits(data[2] >> 5);
        }
        Ok(())
    }
}
