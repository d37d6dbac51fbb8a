//! EEPROM access through the EERD register
//!
//! A read is started by writing the word address together with the start bit; the device sets
//! the done bit and places the word in the upper half of the register when it is finished.
//!
//! There is no timeout. A device that never sets the done bit keeps [`Eeprom::read_word`]
//! spinning forever, and nothing in the driver notices. Callers that cannot afford that can
//! drive [`Eeprom::start_read`] and [`Eeprom::poll`] themselves.

use core::fmt;
use embedded_hal::blocking::delay::DelayUs;
use embedded_storage::ReadStorage;
use fugit::MicrosDurationU32;
use void::Void;

use super::registers::{eerd, Register, RegisterWindow};

/// Number of 16-bit words in the EEPROM
pub const EEPROM_WORDS: usize = 64;

/// EEPROM word holding the first two bytes of the station address
const STATION_ADDRESS_WORD: u8 = 0;

/// Errors of the byte-oriented storage view
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum EepromError {
    /// The requested range runs past the end of the EEPROM
    OutOfBounds,
}

impl fmt::Display for EepromError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EepromError::OutOfBounds => f.write_str("read past the end of the EEPROM"),
        }
    }
}

pub struct Eeprom<'a, W: RegisterWindow> {
    registers: &'a mut W,
}

impl<'a, W: RegisterWindow> Eeprom<'a, W> {
    pub fn new(registers: &'a mut W) -> Self {
        Eeprom { registers }
    }

    /// Requests word `address`.
    pub fn start_read(&mut self, address: u8) {
        self.registers
            .write(Register::EERD, (address as u32) << eerd::ADDRESS_SHIFT | eerd::START);
    }

    /// Checks once whether the read started last has completed.
    pub fn poll(&mut self) -> nb::Result<u16, Void> {
        let value = self.registers.read(Register::EERD);
        if value & eerd::DONE == 0 {
            return Err(nb::Error::WouldBlock);
        }

        Ok((value >> eerd::DATA_SHIFT) as u16)
    }

    /// Reads word `address`, spinning on the done bit.
    pub fn read_word(&mut self, address: u8) -> u16 {
        self.start_read(address);
        match nb::block!(self.poll()) {
            Ok(word) => word,
            Err(e) => void::unreachable(e),
        }
    }

    /// Reads word `address`, waiting `interval` between polls of the done bit.
    pub fn read_word_with<D: DelayUs<u32>>(
        &mut self,
        address: u8,
        delay: &mut D,
        interval: MicrosDurationU32,
    ) -> u16 {
        self.start_read(address);
        loop {
            match self.poll() {
                Ok(word) => return word,
                Err(nb::Error::WouldBlock) => delay.delay_us(interval.ticks()),
                Err(nb::Error::Other(e)) => void::unreachable(e),
            }
        }
    }

    /// Reads the three words of the burned-in station address.
    pub fn read_station_address(&mut self) -> [u16; 3] {
        let mut words = [0; 3];
        for (offset, word) in words.iter_mut().enumerate() {
            *word = self.read_word(STATION_ADDRESS_WORD + offset as u8);
        }
        words
    }

    /// Same as [`Eeprom::read_station_address`], backing off between polls.
    pub fn read_station_address_with<D: DelayUs<u32>>(
        &mut self,
        delay: &mut D,
        interval: MicrosDurationU32,
    ) -> [u16; 3] {
        let mut words = [0; 3];
        for (offset, word) in words.iter_mut().enumerate() {
            *word = self.read_word_with(STATION_ADDRESS_WORD + offset as u8, delay, interval);
        }
        words
    }
}

impl<'a, W: RegisterWindow> ReadStorage for Eeprom<'a, W> {
    type Error = EepromError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let end = start.checked_add(bytes.len()).ok_or(EepromError::OutOfBounds)?;
        if end > self.capacity() {
            return Err(EepromError::OutOfBounds);
        }

        // Words hold their lower-addressed byte in the low half.
        let mut cached: Option<(usize, [u8; 2])> = None;
        for (position, byte) in (start..end).zip(bytes.iter_mut()) {
            let index = position / 2;
            let word = match cached {
                Some((cached_index, word)) if cached_index == index => word,
                _ => {
                    let word = self.read_word(index as u8).to_le_bytes();
                    cached = Some((index, word));
                    word
                }
            };
            *byte = word[position % 2];
        }

        Ok(())
    }

    fn capacity(&self) -> usize {
        EEPROM_WORDS * 2
    }
}
