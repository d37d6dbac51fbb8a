use super::{RxDescriptor, RX_RING_SIZE, RX_SLOT_SIZE};
use crate::dma::AddressTranslation;

/// Receive descriptor ring together with the DMA buffer of every slot
///
/// Same placement rules as the transmit table: it must not move while the device can see it.
#[repr(C)]
pub struct RxDescriptorTable<const COUNT: usize = RX_RING_SIZE> {
    descriptors: [RxDescriptor; COUNT],
    buffers: [[u8; RX_SLOT_SIZE]; COUNT],
}

impl<const COUNT: usize> RxDescriptorTable<COUNT> {
    // RDLEN has to be a multiple of 128 bytes, i.e. eight descriptors.
    const VALID_LENGTH: () = assert!(COUNT > 0 && COUNT % 8 == 0);

    pub const fn const_default() -> Self {
        RxDescriptorTable {
            descriptors: [RxDescriptor::const_default(); COUNT],
            buffers: [[0; RX_SLOT_SIZE]; COUNT],
        }
    }

    /// Number of slots in the ring
    pub const fn len(&self) -> usize {
        COUNT
    }

    /// Empties every slot and points it at its buffer.
    pub fn initialize<T: AddressTranslation>(&mut self, translation: &T) {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_LENGTH;

        for (descriptor, buffer) in self.descriptors.iter_mut().zip(self.buffers.iter()) {
            descriptor.initialize(translation.physical_address(buffer.as_ptr()));
        }
    }

    /// Physical address of the first descriptor, for RDBAL/RDBAH
    pub fn base_address<T: AddressTranslation>(&self, translation: &T) -> u64 {
        let address: *const RxDescriptor = &self.descriptors[0];
        let physical = translation.physical_address(address.cast());
        debug_assert_eq!(
            translation.virtual_address(physical) as *const u8,
            address.cast::<u8>(),
            "address translation does not map the ring back to itself"
        );
        physical
    }

    /// Size of the descriptor ring in bytes, for RDLEN
    pub fn byte_length(&self) -> u32 {
        core::mem::size_of::<[RxDescriptor; COUNT]>() as u32
    }

    pub(crate) fn descriptor(&self, index: usize) -> &RxDescriptor {
        &self.descriptors[index]
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> (&mut RxDescriptor, &[u8; RX_SLOT_SIZE]) {
        (&mut self.descriptors[index], &self.buffers[index])
    }
}

impl Default for RxDescriptorTable {
    fn default() -> Self {
        Self::const_default()
    }
}

#[cfg(test)]
mod tests {
    use super::RxDescriptorTable;
    use crate::dma::{AddressTranslation, IdentityMapped, LinearOffset};
    use crate::ethernet::mock;

    #[test]
    fn initialized_slots_are_empty() {
        let mut table = mock::zeroed::<RxDescriptorTable>();
        table.initialize(&IdentityMapped);

        assert_eq!(table.len(), 256);
        assert_eq!(table.byte_length(), 4096);
        assert_eq!(table.base_address(&IdentityMapped) % 16, 0);
        for index in 0..table.len() {
            let r = table.descriptor(index).read();
            assert!(!r.is_done());
            assert_eq!(r.buffer_address(), table.buffers[index].as_ptr() as u64);
        }
    }

    #[test]
    fn base_address_through_offset_mapping() {
        let table = mock::zeroed::<RxDescriptorTable>();
        let virtual_base = (&*table as *const RxDescriptorTable as usize) & !0xFFFF;
        let mapping = LinearOffset::new(virtual_base);

        let physical = table.base_address(&mapping);
        assert_eq!(physical, table.base_address(&IdentityMapped) - virtual_base as u64);
        assert_eq!(
            mapping.virtual_address(physical) as usize,
            table.base_address(&IdentityMapped) as usize
        );
    }
}
