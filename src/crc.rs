/// Dallas/Maxim CRC-8 (x^8 + x^5 + x^4 + 1), processed LSB first.
///
/// Running it over a block that already ends with its CRC byte yields `0`.
pub fn crc8(data: &[u8]) -> u8 {
    const POLY_REFLECTED: u8 = 0x8C;
    let mut crc = 0u8;
    for &byte in data {
        let mut byte = byte;
        for _ in 0..8 {
            let mix = (crc ^ byte) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= POLY_REFLECTED;
            }
            byte >>= 1;
        }
    }
    crc
}

/// `true` when the last byte of `data` is the CRC-8 of the bytes before it.
pub fn check_crc8(data: &[u8]) -> bool {
    match data.split_last() {
        Some((&crc, payload)) => crc8(payload) == crc,
        None => false,
    }
}
