use embedded_hal::blocking::delay::DelayUs;
use fugit::MicrosDurationU32;

use super::registers::RegisterWindow;
use super::{Controller, RxDescriptorTable, StationAddress, TxDescriptorTable};
use crate::dma::AddressTranslation;

/// Receive-address register pairs programmed by the driver: the station address plus three
/// alternates
pub const RECEIVE_ADDRESS_SLOTS: usize = 4;

const MAX_ALTERNATE_ADDRESSES: usize = RECEIVE_ADDRESS_SLOTS - 1;

pub struct Builder {
    station_address: Option<StationAddress>,
    alternate_addresses: [Option<StationAddress>; MAX_ALTERNATE_ADDRESSES],
    alternate_address_count: usize,
    disable_broadcast: bool,
    keep_crc: bool,
    eeprom_poll_interval: MicrosDurationU32,
}

impl Builder {
    pub const fn new() -> Self {
        Builder {
            station_address: None,
            alternate_addresses: [None; MAX_ALTERNATE_ADDRESSES],
            alternate_address_count: 0,
            disable_broadcast: false,
            keep_crc: false,
            eeprom_poll_interval: MicrosDurationU32::from_ticks(1),
        }
    }

    /// Uses `station_address` instead of the one burned into the EEPROM.
    pub fn set_station_address(mut self, station_address: StationAddress) -> Self {
        self.station_address = Some(station_address);
        self
    }

    pub fn station_address(&self) -> Option<StationAddress> {
        self.station_address
    }

    /// Accepts unicast frames for `station_address` too.
    ///
    /// # Panics
    ///
    /// When called more than three times, since there are only three spare receive-address
    /// slots.
    pub fn add_alternate_station_address(mut self, station_address: StationAddress) -> Self {
        if self.alternate_address_count == MAX_ALTERNATE_ADDRESSES {
            panic!("Attempted to add more than three alternate addresses");
        }

        self.alternate_addresses[self.alternate_address_count] = Some(station_address);
        self.alternate_address_count += 1;
        self
    }

    pub fn alternate_station_address_count(&self) -> usize {
        self.alternate_address_count
    }

    pub fn alternate_station_address(&self, index: usize) -> Option<StationAddress> {
        self.alternate_addresses.get(index).copied().flatten()
    }

    /// Stops accepting broadcast frames.
    pub fn disable_broadcast(mut self) -> Self {
        self.disable_broadcast = true;
        self
    }

    pub fn has_disable_broadcast(&self) -> bool {
        self.disable_broadcast
    }

    /// Leaves the Ethernet CRC at the end of received frames.
    pub fn keep_crc(mut self) -> Self {
        self.keep_crc = true;
        self
    }

    pub fn has_keep_crc(&self) -> bool {
        self.keep_crc
    }

    /// Time to wait between two polls of an EEPROM read.
    pub fn set_eeprom_poll_interval(mut self, interval: MicrosDurationU32) -> Self {
        self.eeprom_poll_interval = interval;
        self
    }

    pub fn eeprom_poll_interval(&self) -> MicrosDurationU32 {
        self.eeprom_poll_interval
    }

    /// Brings the device up and returns the driver owning it.
    ///
    /// Both tables are handed to the device by physical address, so they must stay where they
    /// are for as long as the returned controller (or the device) may use them.
    pub fn freeze<'rxtx, W, T, D, const TX: usize, const RX: usize>(
        self,
        registers: W,
        translation: &T,
        tx: &'rxtx mut TxDescriptorTable<TX>,
        rx: &'rxtx mut RxDescriptorTable<RX>,
        delay: &mut D,
    ) -> Controller<'rxtx, W, TX, RX>
    where
        W: RegisterWindow,
        T: AddressTranslation,
        D: DelayUs<u32>,
    {
        Controller::new(registers, translation, tx, rx, delay, self)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
