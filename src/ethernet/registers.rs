//! e1000 register window
//!
//! Offsets are from the 8254x Software Developer's Manual, section 13. They are stored as word
//! indices (byte offset / 4) since every register the driver touches is 32 bits wide.

use core::fmt;
use core::ptr::NonNull;

/// Word index of a device register
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct Register(usize);

impl Register {
    /// EEPROM Read
    pub const EERD: Register = Register::at(0x00014);
    /// Interrupt Mask Set/Read
    pub const IMS: Register = Register::at(0x000D0);
    /// Interrupt Mask Clear
    pub const IMC: Register = Register::at(0x000D8);
    /// Receive Control
    pub const RCTL: Register = Register::at(0x00100);
    /// Transmit Control
    pub const TCTL: Register = Register::at(0x00400);
    /// Transmit Inter Packet Gap
    pub const TIPG: Register = Register::at(0x00410);
    /// Receive Descriptor Base Address Low
    pub const RDBAL: Register = Register::at(0x02800);
    /// Receive Descriptor Base Address High
    pub const RDBAH: Register = Register::at(0x02804);
    /// Receive Descriptor Length
    pub const RDLEN: Register = Register::at(0x02808);
    /// Receive Descriptor Head
    pub const RDH: Register = Register::at(0x02810);
    /// Receive Descriptor Tail
    pub const RDT: Register = Register::at(0x02818);
    /// Transmit Descriptor Base Address Low
    pub const TDBAL: Register = Register::at(0x03800);
    /// Transmit Descriptor Base Address High
    pub const TDBAH: Register = Register::at(0x03804);
    /// Transmit Descriptor Length
    pub const TDLEN: Register = Register::at(0x03808);
    /// Transmit Descriptor Head
    pub const TDH: Register = Register::at(0x03810);
    /// Transmit Descriptor Tail
    pub const TDT: Register = Register::at(0x03818);

    const MTA_BASE: usize = 0x05200;
    const RAL_BASE: usize = 0x05400;
    const RAH_BASE: usize = 0x05404;

    /// Number of 32-bit entries in the Multicast Table Array
    pub const MTA_ENTRIES: usize = 128;

    const fn at(offset: usize) -> Self {
        Register(offset / 4)
    }

    /// Multicast Table Array entry `entry`
    pub const fn multicast_table(entry: usize) -> Self {
        Register::at(Self::MTA_BASE + 4 * entry)
    }

    /// Receive Address Low for address slot `slot`
    pub const fn receive_address_low(slot: usize) -> Self {
        Register::at(Self::RAL_BASE + 8 * slot)
    }

    /// Receive Address High for address slot `slot`
    pub const fn receive_address_high(slot: usize) -> Self {
        Register::at(Self::RAH_BASE + 8 * slot)
    }

    /// Word index of the register inside the window
    pub const fn index(self) -> usize {
        self.0
    }

    /// Byte offset of the register inside the window
    pub const fn offset(self) -> usize {
        self.0 * 4
    }
}

/// Transmit Control register fields
pub mod tctl {
    /// Transmit Enable
    pub const EN: u32 = 1 << 1;
    /// Pad Short Packets
    pub const PSP: u32 = 1 << 3;

    /// Collision Threshold
    pub const fn ct(value: u32) -> u32 {
        value << 4
    }

    /// Collision Distance
    pub const fn cold(value: u32) -> u32 {
        value << 12
    }
}

/// Transmit IPG register fields
pub mod tipg {
    /// IPG Transmit Time
    pub const fn ipgt(value: u32) -> u32 {
        value
    }

    /// IPG Receive Time 1
    pub const fn ipgr1(value: u32) -> u32 {
        value << 10
    }

    /// IPG Receive Time 2
    pub const fn ipgr2(value: u32) -> u32 {
        value << 20
    }
}

/// Receive Control register fields
pub mod rctl {
    /// Receiver Enable
    pub const EN: u32 = 1 << 1;
    /// Broadcast Accept Mode
    pub const BAM: u32 = 1 << 15;
    /// Receive buffers of 2048 bytes (BSIZE = 00b with BSEX clear)
    pub const BSIZE_2048: u32 = 0 << 16;
    /// Strip Ethernet CRC from incoming packets
    pub const SECRC: u32 = 1 << 26;
}

/// EEPROM Read register fields
pub mod eerd {
    /// Start Read
    pub const START: u32 = 1 << 0;
    /// Read Done
    pub const DONE: u32 = 1 << 4;
    /// Position of the word address
    pub const ADDRESS_SHIFT: u32 = 8;
    /// Position of the data read back
    pub const DATA_SHIFT: u32 = 16;
}

/// Receive Address High register fields
pub mod rah {
    /// Address Valid
    pub const AV: u32 = 1 << 31;
}

/// Word-indexed access to the device register window
///
/// Implementations must perform every access exactly once and in program order, which for
/// memory-mapped registers means volatile reads and writes.
pub trait RegisterWindow {
    /// Reads the 32-bit word at `index`
    fn read_word(&self, index: usize) -> u32;

    /// Writes the 32-bit word at `index`
    fn write_word(&mut self, index: usize, value: u32);

    /// Reads `register`
    fn read(&self, register: Register) -> u32 {
        self.read_word(register.index())
    }

    /// Writes `value` into `register`
    fn write(&mut self, register: Register, value: u32) {
        self.write_word(register.index(), value)
    }

    /// Read-modify-write of `register`
    fn modify<F: FnOnce(u32) -> u32>(&mut self, register: Register, f: F) {
        let value = self.read(register);
        self.write(register, f(value));
    }
}

impl<W: RegisterWindow + ?Sized> RegisterWindow for &mut W {
    fn read_word(&self, index: usize) -> u32 {
        (**self).read_word(index)
    }

    fn write_word(&mut self, index: usize, value: u32) {
        (**self).write_word(index, value)
    }
}

/// Failure to attach to the register window handed over by the bus layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum AttachError {
    /// The window base address is null
    NullWindow,
    /// The window base address is not 32-bit aligned
    MisalignedWindow,
    /// The window does not reach the highest register the driver uses
    WindowTooSmall {
        /// Size of the rejected window in bytes
        size: usize,
    },
}

impl fmt::Display for AttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachError::NullWindow => f.write_str("register window base is null"),
            AttachError::MisalignedWindow => f.write_str("register window base is not 32-bit aligned"),
            AttachError::WindowTooSmall { size } => write!(
                f,
                "register window of {} bytes is smaller than the required {} bytes",
                size,
                Mmio::MINIMUM_SIZE
            ),
        }
    }
}

/// Memory-mapped register window of a physical device
pub struct Mmio {
    base: NonNull<u32>,
    size: usize,
}

impl Mmio {
    /// Smallest window covering every register the driver programs
    pub const MINIMUM_SIZE: usize =
        Register::receive_address_high(super::builder::RECEIVE_ADDRESS_SLOTS - 1).offset() + 4;

    /// Wraps the register window mapped at `base` spanning `size` bytes.
    ///
    /// # Safety
    ///
    /// `base` must be the virtual address of the device's BAR 0 mapping, uncached, valid for
    /// `size` bytes and not accessed through any other path while the returned value lives.
    pub unsafe fn new(base: *mut u8, size: usize) -> Result<Self, AttachError> {
        let base = NonNull::new(base).ok_or(AttachError::NullWindow)?;
        if base.as_ptr() as usize & 0x3 != 0 {
            return Err(AttachError::MisalignedWindow);
        }
        if size < Self::MINIMUM_SIZE {
            return Err(AttachError::WindowTooSmall { size });
        }

        Ok(Mmio {
            base: base.cast(),
            size,
        })
    }

    /// Size of the window in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    fn word(&self, index: usize) -> *mut u32 {
        assert!(index * 4 < self.size, "register index outside of the mapped window");
        // SAFETY: the index is inside the window validated in `new`.
        unsafe { self.base.as_ptr().add(index) }
    }
}

impl RegisterWindow for Mmio {
    fn read_word(&self, index: usize) -> u32 {
        // SAFETY: `word` only hands out pointers inside the mapped window.
        unsafe { core::ptr::read_volatile(self.word(index)) }
    }

    fn write_word(&mut self, index: usize, value: u32) {
        // SAFETY: as above.
        unsafe { core::ptr::write_volatile(self.word(index), value) }
    }
}
