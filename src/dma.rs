//! Address translation for DMA
//!
//! The device only understands physical addresses, while the driver works on virtual ones. The
//! memory manager owns the mapping between the two and exposes it through
//! [`AddressTranslation`]; the driver never assumes a particular layout on its own.

/// Physical/virtual address translation supplied by the memory manager
pub trait AddressTranslation {
    /// Physical address backing the virtual address `address`
    fn physical_address(&self, address: *const u8) -> u64;

    /// Virtual address at which the physical address `address` is mapped
    fn virtual_address(&self, address: u64) -> *mut u8;
}

/// Identity mapping, physical addresses equal virtual ones
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityMapped;

impl AddressTranslation for IdentityMapped {
    fn physical_address(&self, address: *const u8) -> u64 {
        address as usize as u64
    }

    fn virtual_address(&self, address: u64) -> *mut u8 {
        address as usize as *mut u8
    }
}

/// Physical memory mapped linearly above a fixed virtual base
///
/// This is the classic higher-half kernel layout, where physical address `p` lives at virtual
/// address `virtual_base + p`.
#[derive(Clone, Copy, Debug)]
pub struct LinearOffset {
    virtual_base: usize,
}

impl LinearOffset {
    /// Mapping with physical address zero at `virtual_base`
    pub const fn new(virtual_base: usize) -> Self {
        LinearOffset { virtual_base }
    }
}

impl AddressTranslation for LinearOffset {
    fn physical_address(&self, address: *const u8) -> u64 {
        (address as usize).wrapping_sub(self.virtual_base) as u64
    }

    fn virtual_address(&self, address: u64) -> *mut u8 {
        (address as usize).wrapping_add(self.virtual_base) as *mut u8
    }
}

#[cfg(test)]
mod tests {
    use crate::dma::*;

    #[test]
    fn identity_mapping_round_trips() {
        let buffer = [0u8; 4];
        let physical = IdentityMapped.physical_address(buffer.as_ptr());
        assert_eq!(physical, buffer.as_ptr() as usize as u64);
        assert_eq!(IdentityMapped.virtual_address(physical), buffer.as_ptr() as *mut u8);
    }

    #[test]
    fn linear_offset_subtracts_kernel_base() {
        let mapping = LinearOffset::new(0xF000_0000);
        assert_eq!(mapping.physical_address(0xF012_3000 as *const u8), 0x0012_3000);
        assert_eq!(mapping.virtual_address(0x0012_3000) as usize, 0xF012_3000);
    }
}
