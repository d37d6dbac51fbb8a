//! e1000 transmit/receive engine
//!
//! The device exchanges packets with software through two descriptor rings in host memory. Each
//! descriptor points at one fixed-size DMA buffer and carries a DD (descriptor done) bit telling
//! which side owns the slot. [`Builder::freeze`] programs the device and returns a
//! [`Controller`], which fragments outgoing packets over the transmit ring and reassembles
//! incoming ones from the receive ring.

pub mod registers;
pub use registers::{AttachError, Mmio, Register, RegisterWindow};

mod volatile_read_write;
use volatile_read_write::VolatileReadWrite;

mod station_address;
pub use station_address::StationAddress;

mod eeprom;
pub use eeprom::{Eeprom, EepromError, EEPROM_WORDS};

mod tx;
pub use tx::{Transmitter, TxDescriptorTable, TxError, TX_RING_SIZE, TX_SLOT_SIZE};

mod rx;
pub use rx::{ReceiveProgress, Receiver, RxDescriptorTable, RxError, RX_RING_SIZE, RX_SLOT_SIZE};

mod builder;
pub use builder::{Builder, RECEIVE_ADDRESS_SLOTS};

mod controller;
pub use controller::Controller;

pub mod server;
pub mod syscall;

#[cfg(test)]
pub(crate) mod mock;

/// Packet-level access to a device
///
/// [`Controller`] is the implementation; the syscall and server layers only depend on this
/// trait.
pub trait PacketIo {
    /// Queues one packet. See [`Transmitter::send`].
    fn send(&mut self, data: &[u8]) -> Result<usize, TxError>;

    /// Drains the current packet into `dst`. See [`Receiver::recv`].
    fn recv(&mut self, dst: &mut [u8], progress: &mut ReceiveProgress) -> Result<usize, RxError>;
}

impl<P: PacketIo + ?Sized> PacketIo for &mut P {
    fn send(&mut self, data: &[u8]) -> Result<usize, TxError> {
        (**self).send(data)
    }

    fn recv(&mut self, dst: &mut [u8], progress: &mut ReceiveProgress) -> Result<usize, RxError> {
        (**self).recv(dst, progress)
    }
}
