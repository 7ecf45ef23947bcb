//! DS18B20 digital temperature probe, family code `0x28`.
//!
//! Bus transactions (ROM matching, function commands, slot timing) are
//! delegated to a [`Ds18b20Bus`]; this module only binds handles to
//! addresses and decodes what the probes send back.
use crate::{
    Address,
    bus::ErrorType,
    crc::{check_crc8, crc8},
    driver::{BindError, FamilyDriver},
};

/// Bus operations a DS18B20 handle needs.
pub trait Ds18b20Bus: ErrorType {
    /// Skip ROM + Convert T: every probe on the bus starts a conversion.
    fn convert_all(&mut self) -> Result<(), Self::Error>;
    /// Match ROM + Read Scratchpad, all nine bytes including the CRC.
    fn read_scratchpad(&mut self, address: Address) -> Result<[u8; 9], Self::Error>;
    /// Match ROM + Write Scratchpad: TH, TL and the configuration register.
    fn write_scratchpad(&mut self, address: Address, data: [u8; 3]) -> Result<(), Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError<E> {
    #[error("Bus error: {0:?}")]
    Bus(E),
    #[error("Scratchpad CRC mismatch, probe unreachable.")]
    /// Absent or disconnected probes read back as all ones.
    Unreachable,
    #[error("Conversion not completed.")]
    /// The scratchpad still holds the power-on value.
    NotReady,
}

impl<E> From<E> for ConversionError<E> {
    fn from(value: E) -> Self {
        ConversionError::Bus(value)
    }
}

/// Thermometer resolution, stored in bits R1:R0 of the configuration register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Resolution {
    Bits9 = 0,
    Bits10 = 1,
    Bits11 = 2,
    #[default]
    Bits12 = 3,
}

impl Resolution {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Resolution::Bits9,
            1 => Resolution::Bits10,
            2 => Resolution::Bits11,
            _ => Resolution::Bits12,
        }
    }
    pub const fn into_bits(self) -> u8 {
        self as u8
    }
    /// Worst-case conversion time in microseconds (93.75 ms to 750 ms).
    pub const fn conversion_time_us(self) -> u32 {
        750_000 >> (3 - self as u32)
    }
    /// Low bits of the raw reading that are undefined at this resolution.
    const fn raw_mask(self) -> i16 {
        !((1 << (3 - self as u32)) - 1)
    }
}

#[bitfield_struct::bitfield(u8, order = Lsb)]
struct ConfigRegister {
    #[bits(5, default = 0x1F)]
    _reserved_ones: u8,
    #[bits(2, default = Resolution::Bits12)]
    resolution: Resolution,
    #[bits(default = false)]
    _reserved_zero: bool,
}

/// Decoded scratchpad memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scratchpad {
    /// Temperature in 1/16 °C.
    pub raw_temperature: i16,
    pub alarm_high: i8,
    pub alarm_low: i8,
    pub resolution: Resolution,
}

impl Scratchpad {
    /// Raw temperature register after power-up, before any conversion.
    pub const POWER_ON_RAW: i16 = 0x0550;

    /// Returns `None` if the CRC byte does not match.
    pub fn decode(bytes: &[u8; 9]) -> Option<Self> {
        if !check_crc8(bytes) {
            return None;
        }
        let config = ConfigRegister::from(bytes[4]);
        Some(Self {
            raw_temperature: i16::from_le_bytes([bytes[0], bytes[1]]),
            alarm_high: bytes[2] as i8,
            alarm_low: bytes[3] as i8,
            resolution: config.resolution(),
        })
    }

    /// Encode the way a probe presents it on the bus, CRC included.
    pub fn encode(&self) -> [u8; 9] {
        let [lsb, msb] = self.raw_temperature.to_le_bytes();
        let config = ConfigRegister::new().with_resolution(self.resolution);
        let mut bytes = [
            lsb,
            msb,
            self.alarm_high as u8,
            self.alarm_low as u8,
            config.into(),
            0xFF,
            0x0C,
            0x10,
            0,
        ];
        bytes[8] = crc8(&bytes[..8]);
        bytes
    }

    /// Temperature in °C with the bits undefined at the configured
    /// resolution cleared.
    pub fn celsius(&self) -> f32 {
        (self.raw_temperature & self.resolution.raw_mask()) as f32 / 16.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ds18b20Config {
    /// Resolution the probe is expected to run at; sizes the conversion wait.
    pub resolution: Resolution,
}

impl Ds18b20Config {
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }
}

/// Handle to one DS18B20 bound during enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ds18b20 {
    address: Address,
    resolution: Resolution,
}

impl FamilyDriver for Ds18b20 {
    const FAMILY_CODE: u8 = 0x28;
    type Config = Ds18b20Config;

    fn bind(address: Address, config: &Ds18b20Config) -> Result<Self, BindError> {
        Self::check_family(address)?;
        Ok(Self {
            address,
            resolution: config.resolution,
        })
    }

    fn address(&self) -> Address {
        self.address
    }
}

impl Ds18b20 {
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Start a conversion on every probe of the bus with one command.
    pub fn trigger_conversion_all<B: Ds18b20Bus>(bus: &mut B) -> Result<(), B::Error> {
        log::trace!("convert T, skip ROM");
        bus.convert_all()
    }

    pub fn read_scratchpad<B: Ds18b20Bus>(
        &self,
        bus: &mut B,
    ) -> Result<Scratchpad, ConversionError<B::Error>> {
        let bytes = bus.read_scratchpad(self.address)?;
        Scratchpad::decode(&bytes).ok_or(ConversionError::Unreachable)
    }

    /// Read the result of the last conversion in °C.
    ///
    /// A genuine 85 °C reading cannot be told apart from a probe that has
    /// not converted since power-up, so both report [`ConversionError::NotReady`].
    pub fn read_temperature<B: Ds18b20Bus>(
        &self,
        bus: &mut B,
    ) -> Result<f32, ConversionError<B::Error>> {
        let scratchpad = self.read_scratchpad(bus)?;
        if scratchpad.raw_temperature == Scratchpad::POWER_ON_RAW {
            return Err(ConversionError::NotReady);
        }
        Ok(scratchpad.celsius())
    }

    /// Change the thermometer resolution, keeping the alarm thresholds.
    pub fn set_resolution<B: Ds18b20Bus>(
        &mut self,
        bus: &mut B,
        resolution: Resolution,
    ) -> Result<(), ConversionError<B::Error>> {
        let current = self.read_scratchpad(bus)?;
        let config = ConfigRegister::new().with_resolution(resolution);
        bus.write_scratchpad(
            self.address,
            [current.alarm_high as u8, current.alarm_low as u8, config.into()],
        )?;
        log::debug!("{} resolution set to {:?}", self.address, resolution);
        self.resolution = resolution;
        Ok(())
    }
}
