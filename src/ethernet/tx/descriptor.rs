use super::VolatileReadWrite;

/// Command bits
const COMMAND_END_OF_PACKET: u8 = 1 << 0;
const COMMAND_REPORT_STATUS: u8 = 1 << 3;

/// Status bits
const STATUS_DESCRIPTOR_DONE: u8 = 1 << 0;

// Legacy transmit descriptor (8254x manual, section 3.3.3):
//
// 63            48 47   40 39   32 31   24 23   16 15             0
// +---------------------------------------------------------------+
// |                         Buffer address                        |
// +---------------+-------+-------+-------+-------+---------------+
// |    Special    |  CSS  | Status|  Cmd  |  CSO  |    Length     |
// +---------------+-------+-------+-------+-------+---------------+
#[repr(C, align(16))]
#[derive(Clone, Copy, Default)]
pub struct TxDescriptor {
    // NOTE: Only read or write these fields using volatile operations
    buffer_address: u64,
    length: u16,
    checksum_offset: u8,
    command: u8,
    status: u8,
    checksum_start: u8,
    special: u16,
}

const _: () = assert!(core::mem::size_of::<TxDescriptor>() == 16);

impl TxDescriptor {
    pub const fn const_default() -> Self {
        TxDescriptor {
            buffer_address: 0,
            length: 0,
            checksum_offset: 0,
            command: 0,
            status: 0,
            checksum_start: 0,
            special: 0,
        }
    }

    /// Points the descriptor at its slot buffer and hands the slot to software.
    pub fn initialize(&mut self, buffer_address: u64) {
        self.write(|w| w.set_buffer_address(buffer_address).set_done())
    }

    pub fn read(&self) -> TxDescriptorReader {
        TxDescriptorReader {
            buffer_address: self.buffer_address.read_volatile(),
            length: self.length.read_volatile(),
            command: self.command.read_volatile(),
            status: self.status.read_volatile(),
        }
    }

    pub fn modify<F: FnOnce(TxDescriptorWriter) -> TxDescriptorWriter>(&mut self, f: F) {
        let r = self.read();
        let w = TxDescriptorWriter {
            buffer_address: r.buffer_address,
            length: r.length,
            command: r.command,
            status: r.status,
        };
        self.store(f(w));
    }

    pub fn write<F: FnOnce(TxDescriptorWriter) -> TxDescriptorWriter>(&mut self, f: F) {
        self.store(f(TxDescriptorWriter::default()));
    }

    // The status byte goes last: the device may pick the slot up as soon as it changes.
    fn store(&mut self, w: TxDescriptorWriter) {
        self.buffer_address.write_volatile(w.buffer_address);
        self.length.write_volatile(w.length);
        self.checksum_offset.write_volatile(0);
        self.command.write_volatile(w.command);
        self.checksum_start.write_volatile(0);
        self.special.write_volatile(0);
        self.status.write_volatile(w.status);
    }
}

pub struct TxDescriptorReader {
    buffer_address: u64,
    length: u16,
    command: u8,
    status: u8,
}

impl TxDescriptorReader {
    #[cfg(test)]
    pub fn buffer_address(&self) -> u64 {
        self.buffer_address
    }

    #[cfg(test)]
    pub fn length(&self) -> u16 {
        self.length
    }

    /// Slot is free: either never used or the device finished sending it.
    pub fn is_done(&self) -> bool {
        self.status & STATUS_DESCRIPTOR_DONE != 0
    }

    #[cfg(test)]
    pub fn is_end_of_packet(&self) -> bool {
        self.command & COMMAND_END_OF_PACKET != 0
    }

    #[cfg(test)]
    pub fn reports_status(&self) -> bool {
        self.command & COMMAND_REPORT_STATUS != 0
    }
}

#[derive(Default)]
pub struct TxDescriptorWriter {
    buffer_address: u64,
    length: u16,
    command: u8,
    status: u8,
}

impl TxDescriptorWriter {
    pub fn set_buffer_address(mut self, address: u64) -> Self {
        self.buffer_address = address;
        self
    }

    pub fn set_length(mut self, length: u16) -> Self {
        self.length = length;
        self
    }

    pub fn set_end_of_packet(mut self) -> Self {
        self.command |= COMMAND_END_OF_PACKET;
        self
    }

    pub fn clear_end_of_packet(mut self) -> Self {
        self.command &= !COMMAND_END_OF_PACKET;
        self
    }

    pub fn set_report_status(mut self) -> Self {
        self.command |= COMMAND_REPORT_STATUS;
        self
    }

    pub fn set_done(mut self) -> Self {
        self.status |= STATUS_DESCRIPTOR_DONE;
        self
    }

    pub fn clear_done(mut self) -> Self {
        self.status &= !STATUS_DESCRIPTOR_DONE;
        self
    }
}
