use std::fmt;

/// 64-bit ROM code of a one-wire device.
///
/// Stored with the family byte as the most-significant byte, so that
/// `{:016x}` prints the code in wire order: family, 48-bit serial, CRC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub u64);

impl Address {
    /// Build an address from the 8 ROM bytes in the order they are shifted
    /// out on the bus (family code first, CRC last).
    pub const fn from_rom(rom: [u8; 8]) -> Self {
        Address(u64::from_be_bytes(rom))
    }
    /// ROM bytes in bus order.
    pub const fn rom(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
    pub const fn family_code(self) -> u8 {
        (self.0 >> 56) as u8
    }
    /// 48-bit serial number.
    pub const fn serial(self) -> u64 {
        (self.0 >> 8) & 0xFFFF_FFFF_FFFF
    }
    pub const fn crc(self) -> u8 {
        self.0 as u8
    }
    /// Whether the trailing CRC byte matches the family code and serial.
    pub fn is_crc_valid(self) -> bool {
        crate::crc::check_crc8(&self.rom())
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Address(value)
    }
}

impl From<Address> for u64 {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}
