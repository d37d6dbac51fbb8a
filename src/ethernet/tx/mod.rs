use core::fmt;

use super::VolatileReadWrite;

/// Number of transmit descriptors
pub const TX_RING_SIZE: usize = 32;
/// Capacity of one transmit slot buffer
pub const TX_SLOT_SIZE: usize = 1528;

mod descriptor;
pub(crate) use descriptor::TxDescriptor;

mod descriptor_table;
pub use descriptor_table::TxDescriptorTable;

mod transmitter;
pub use transmitter::Transmitter;

/// Transmit errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum TxError {
    /// The next slot is still owned by the device. The first `queued` bytes of the packet were
    /// already placed in earlier slots and will be transmitted; only the rest was refused.
    QueueFull {
        /// Bytes accepted before the ring filled up
        queued: usize,
    },
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxError::QueueFull { queued } => {
                write!(f, "transmit queue full after {} bytes", queued)
            }
        }
    }
}
