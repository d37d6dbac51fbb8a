use super::{TxDescriptor, TX_RING_SIZE, TX_SLOT_SIZE};
use crate::dma::AddressTranslation;

/// Transmit descriptor ring together with the DMA buffer of every slot
///
/// The table must stay at the same address from `initialize` until the device is stopped,
/// since the device is given physical addresses inside it. Place it in a `static` (see
/// [`TxDescriptorTable::const_default`]) or in memory leaked for the life of the driver.
#[repr(C)]
pub struct TxDescriptorTable<const COUNT: usize = TX_RING_SIZE> {
    descriptors: [TxDescriptor; COUNT],
    buffers: [[u8; TX_SLOT_SIZE]; COUNT],
}

impl<const COUNT: usize> TxDescriptorTable<COUNT> {
    // TDLEN has to be a multiple of 128 bytes, i.e. eight descriptors.
    const VALID_LENGTH: () = assert!(COUNT > 0 && COUNT % 8 == 0);

    pub const fn const_default() -> Self {
        TxDescriptorTable {
            descriptors: [TxDescriptor::const_default(); COUNT],
            buffers: [[0; TX_SLOT_SIZE]; COUNT],
        }
    }

    /// Number of slots in the ring
    pub const fn len(&self) -> usize {
        COUNT
    }

    /// Marks every slot free and points it at its buffer.
    pub fn initialize<T: AddressTranslation>(&mut self, translation: &T) {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_LENGTH;

        for (descriptor, buffer) in self.descriptors.iter_mut().zip(self.buffers.iter()) {
            descriptor.initialize(translation.physical_address(buffer.as_ptr()));
        }
    }

    /// Physical address of the first descriptor, for TDBAL/TDBAH
    pub fn base_address<T: AddressTranslation>(&self, translation: &T) -> u64 {
        let address: *const TxDescriptor = &self.descriptors[0];
        let physical = translation.physical_address(address.cast());
        debug_assert_eq!(
            translation.virtual_address(physical) as *const u8,
            address.cast::<u8>(),
            "address translation does not map the ring back to itself"
        );
        physical
    }

    /// Size of the descriptor ring in bytes, for TDLEN
    pub fn byte_length(&self) -> u32 {
        core::mem::size_of::<[TxDescriptor; COUNT]>() as u32
    }

    pub(crate) fn descriptor(&self, index: usize) -> &TxDescriptor {
        &self.descriptors[index]
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> (&mut TxDescriptor, &mut [u8; TX_SLOT_SIZE]) {
        (&mut self.descriptors[index], &mut self.buffers[index])
    }
}

impl Default for TxDescriptorTable {
    fn default() -> Self {
        Self::const_default()
    }
}
