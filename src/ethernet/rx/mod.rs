use core::fmt;

use super::VolatileReadWrite;

/// Number of receive descriptors
pub const RX_RING_SIZE: usize = 256;
/// Capacity of one receive slot buffer, matching RCTL.BSIZE = 2048
pub const RX_SLOT_SIZE: usize = 2048;

mod descriptor;
pub(crate) use descriptor::RxDescriptor;

mod descriptor_table;
pub use descriptor_table::RxDescriptorTable;

mod receiver;
pub use receiver::{ReceiveProgress, Receiver};

/// Receive errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum RxError {
    /// The slot at the tail holds no data yet. Nothing was copied and the receive progress was
    /// left as it was.
    QueueEmpty,
}

impl fmt::Display for RxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RxError::QueueEmpty => f.write_str("receive queue empty"),
        }
    }
}
