use core::fmt;

use super::registers::rah;

/// 48-bit link-layer address of the device
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StationAddress([u8; 6]);

impl StationAddress {
    pub const fn new(bytes: [u8; 6]) -> Self {
        StationAddress(bytes)
    }

    /// Assembles the address from EEPROM words 0..3, each holding two bytes low byte first.
    pub const fn from_eeprom_words(words: [u16; 3]) -> Self {
        let [a, b] = words[0].to_le_bytes();
        let [c, d] = words[1].to_le_bytes();
        let [e, f] = words[2].to_le_bytes();
        StationAddress([a, b, c, d, e, f])
    }

    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Value for the RAL register of the slot holding this address
    pub const fn receive_address_low(&self) -> u32 {
        u32::from_le_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Value for the RAH register of the slot holding this address, with Address Valid set
    pub const fn receive_address_high(&self) -> u32 {
        u16::from_le_bytes([self.0[4], self.0[5]]) as u32 | rah::AV
    }
}

impl From<[u8; 6]> for StationAddress {
    fn from(bytes: [u8; 6]) -> Self {
        StationAddress(bytes)
    }
}

impl fmt::Display for StationAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl defmt::Format for StationAddress {
    fn format(&self, f: defmt::Formatter) {
        let b = &self.0;
        defmt::write!(
            f,
            "{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}",
            b[0],
            b[1],
            b[2],
            b[3],
            b[4],
            b[5]
        )
    }
}
