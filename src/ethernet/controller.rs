use embedded_hal::blocking::delay::DelayUs;
use paste::paste;

use super::{
    builder::Builder,
    eeprom::Eeprom,
    registers::{rctl, tctl, tipg, Register, RegisterWindow},
    PacketIo, ReceiveProgress, Receiver, RxDescriptorTable, RxError, StationAddress, Transmitter,
    TxDescriptorTable, TxError, RX_RING_SIZE, TX_RING_SIZE,
};
use crate::dma::AddressTranslation;

// Values recommended by the 8254x manual (sections 14.5 and 13.4.34) for full duplex copper.
const COLLISION_THRESHOLD: u32 = 0x10;
const COLLISION_DISTANCE: u32 = 0x40;
const IPG_TRANSMIT_TIME: u32 = 10;
const IPG_RECEIVE_TIME_1: u32 = 8;
const IPG_RECEIVE_TIME_2: u32 = 12;

macro_rules! define_receive_address_function {
    (
        $slot:expr
    ) => {
        paste! {
            fn [<set_receive_address $slot>](&mut self, station_address: &StationAddress) {
                self.registers.write(
                    Register::receive_address_low($slot),
                    station_address.receive_address_low(),
                );

                // NOTE: Writing RAH with Address Valid set enables the address in the hardware.
                self.registers.write(
                    Register::receive_address_high($slot),
                    station_address.receive_address_high(),
                );
            }
        }
    };
}

/// Polling driver for one e1000 device
///
/// Owns the register window and both descriptor rings. Every operation returns right away; a
/// full transmit ring or an empty receive ring is reported to the caller, which retries later.
pub struct Controller<'rxtx, W: RegisterWindow, const TX: usize = TX_RING_SIZE, const RX: usize = RX_RING_SIZE> {
    registers: W,
    station_address: StationAddress,
    tx: Transmitter<'rxtx, TX>,
    rx: Receiver<'rxtx, RX>,
}

impl<'rxtx, W: RegisterWindow, const TX: usize, const RX: usize> Controller<'rxtx, W, TX, RX> {
    pub(super) fn new<T: AddressTranslation, D: DelayUs<u32>>(
        registers: W,
        translation: &T,
        tx: &'rxtx mut TxDescriptorTable<TX>,
        rx: &'rxtx mut RxDescriptorTable<RX>,
        delay: &mut D,
        builder: Builder,
    ) -> Self {
        let mut registers = registers;

        // Polling only: mask every interrupt cause.
        registers.write(Register::IMS, 0);
        registers.write(Register::IMC, u32::MAX);

        // Transmit ring
        tx.initialize(translation);
        let tx_base = tx.base_address(translation);
        registers.write(Register::TDBAL, tx_base as u32);
        registers.write(Register::TDBAH, (tx_base >> 32) as u32);
        registers.write(Register::TDLEN, tx.byte_length());
        registers.write(Register::TDH, 0);
        registers.write(Register::TDT, 0);
        defmt::info!("tx ring: {} slots at {=u64:#x}", TX, tx_base);

        registers.write(
            Register::TCTL,
            tctl::EN | tctl::PSP | tctl::ct(COLLISION_THRESHOLD) | tctl::cold(COLLISION_DISTANCE),
        );
        registers.write(
            Register::TIPG,
            tipg::ipgt(IPG_TRANSMIT_TIME)
                | tipg::ipgr1(IPG_RECEIVE_TIME_1)
                | tipg::ipgr2(IPG_RECEIVE_TIME_2),
        );

        let station_address = match builder.station_address() {
            Some(station_address) => station_address,
            None => {
                let words = Eeprom::new(&mut registers)
                    .read_station_address_with(delay, builder.eeprom_poll_interval());
                StationAddress::from_eeprom_words(words)
            }
        };

        rx.initialize(translation);
        let rx_base = rx.base_address(translation);
        let rx_length = rx.byte_length();

        let mut e = Controller {
            registers,
            station_address,
            tx: Transmitter::new(tx),
            rx: Receiver::new(rx),
        };

        // Set the station addresses into the hardware.
        e.set_receive_address0(&station_address);
        for index in 0..builder.alternate_station_address_count() {
            if let Some(alternate_address) = builder.alternate_station_address(index) {
                match index {
                    0 => e.set_receive_address1(&alternate_address),
                    1 => e.set_receive_address2(&alternate_address),
                    2 => e.set_receive_address3(&alternate_address),
                    _ => panic!("unexpected alternate station address offset in 3 element array"),
                }
            }
        }
        defmt::info!("station address {}", station_address);

        // No multicast filtering
        for entry in 0..Register::MTA_ENTRIES {
            e.registers.write(Register::multicast_table(entry), 0);
        }

        // Receive ring
        e.registers.write(Register::RDBAL, rx_base as u32);
        e.registers.write(Register::RDBAH, (rx_base >> 32) as u32);
        e.registers.write(Register::RDLEN, rx_length);
        e.registers.write(Register::RDH, 0);
        e.registers.write(Register::RDT, RX as u32);
        defmt::info!("rx ring: {} slots at {=u64:#x}", RX, rx_base);

        let mut control = rctl::EN | rctl::BSIZE_2048;
        if !builder.has_disable_broadcast() {
            control |= rctl::BAM;
        }
        if !builder.has_keep_crc() {
            control |= rctl::SECRC;
        }
        e.registers.write(Register::RCTL, control);

        e
    }

    /// Queues `data` for transmission. See [`Transmitter::send`].
    pub fn send(&mut self, data: &[u8]) -> Result<usize, TxError> {
        self.tx.send(&mut self.registers, data)
    }

    /// Drains the current packet into `dst`. See [`Receiver::recv`].
    pub fn recv(&mut self, dst: &mut [u8], progress: &mut ReceiveProgress) -> Result<usize, RxError> {
        self.rx.recv(&mut self.registers, dst, progress)
    }

    /// The next transmit slot is free.
    pub fn can_send(&self) -> bool {
        self.tx.can_send(&self.registers)
    }

    /// The next receive slot holds data.
    pub fn can_receive(&self) -> bool {
        self.rx.can_receive(&self.registers)
    }

    pub fn station_address(&self) -> StationAddress {
        self.station_address
    }

    /// Direct access to the EEPROM, e.g. through its [`embedded_storage::ReadStorage`] view.
    pub fn eeprom(&mut self) -> Eeprom<'_, W> {
        Eeprom::new(&mut self.registers)
    }

    /// Stops the device and hands back the register window.
    ///
    /// The descriptor tables are released as well, so once this returns the device no longer
    /// touches them.
    pub fn free(mut self) -> W {
        self.disable_transmit();
        self.disable_receive();
        self.registers.write(Register::IMC, u32::MAX);
        defmt::debug!("device stopped");
        self.registers
    }

    fn disable_transmit(&mut self) {
        self.registers.modify(Register::TCTL, |value| value & !tctl::EN)
    }

    fn disable_receive(&mut self) {
        self.registers.modify(Register::RCTL, |value| value & !rctl::EN)
    }

    // Station address manipulation
    define_receive_address_function!(0);
    define_receive_address_function!(1);
    define_receive_address_function!(2);
    define_receive_address_function!(3);
}

impl<'rxtx, W: RegisterWindow, const TX: usize, const RX: usize> PacketIo
    for Controller<'rxtx, W, TX, RX>
{
    fn send(&mut self, data: &[u8]) -> Result<usize, TxError> {
        Controller::send(self, data)
    }

    fn recv(&mut self, dst: &mut [u8], progress: &mut ReceiveProgress) -> Result<usize, RxError> {
        Controller::recv(self, dst, progress)
    }
}
