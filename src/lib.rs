//! HAL for the Intel 82540EM (e1000) Ethernet controller
//!
//! This is a polling driver for the legacy descriptor interface of the e1000 family, the NIC
//! emulated by QEMU, Bochs and VirtualBox. It owns a 32 entry transmit ring and a 256 entry
//! receive ring, programs the device registers and moves packets between caller buffers and the
//! DMA slots of those rings.
//!
//! # Requirements
//!
//! The attachment layer (PCI enumeration) maps BAR 0 of the device and hands the driver its base
//! address and size. The memory manager supplies an [`dma::AddressTranslation`] so the rings can
//! be given to the device by physical address.
//!
//! # Usage
//!
//! ```ignore
//! static mut TX: TxDescriptorTable = TxDescriptorTable::const_default();
//! static mut RX: RxDescriptorTable = RxDescriptorTable::const_default();
//!
//! let registers = unsafe { Mmio::new(bar0_base, bar0_size)? };
//! let mut nic = Builder::new().freeze(
//!     registers,
//!     &IdentityMapped,
//!     unsafe { &mut TX },
//!     unsafe { &mut RX },
//!     &mut SpinDelay::new(100),
//! );
//!
//! nic.send(&frame)?;
//!
//! let mut progress = ReceiveProgress::new();
//! let n = nic.recv(&mut buffer, &mut progress)?;
//! ```
//!
//! Nothing in the driver blocks: a full transmit ring or an empty receive ring is reported
//! straight back to the caller, which decides how to back off and retry.

#![cfg_attr(not(test), no_std)]

pub mod delay;
pub mod dma;
pub mod ethernet;

pub use ethernet::{
    AttachError, Builder, Controller, Mmio, ReceiveProgress, RxDescriptorTable, RxError,
    StationAddress, TxDescriptorTable, TxError,
};
