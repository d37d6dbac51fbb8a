use super::VolatileReadWrite;

/// Status bits
const STATUS_DESCRIPTOR_DONE: u8 = 1 << 0;
const STATUS_END_OF_PACKET: u8 = 1 << 1;

// Receive descriptor (8254x manual, section 3.2.3):
//
// 63            48 47   40 39   32 31           16 15             0
// +---------------------------------------------------------------+
// |                         Buffer address                        |
// +---------------+-------+-------+---------------+---------------+
// |    Special    | Errors| Status|Packet Checksum|    Length     |
// +---------------+-------+-------+---------------+---------------+
#[repr(C, align(16))]
#[derive(Clone, Copy, Default)]
pub struct RxDescriptor {
    // NOTE: Only read or write these fields using volatile operations
    buffer_address: u64,
    length: u16,
    checksum: u16,
    status: u8,
    errors: u8,
    special: u16,
}

const _: () = assert!(core::mem::size_of::<RxDescriptor>() == 16);

impl RxDescriptor {
    pub const fn const_default() -> Self {
        RxDescriptor {
            buffer_address: 0,
            length: 0,
            checksum: 0,
            status: 0,
            errors: 0,
            special: 0,
        }
    }

    /// Points the descriptor at its slot buffer, empty and owned by the device.
    pub fn initialize(&mut self, buffer_address: u64) {
        self.buffer_address.write_volatile(buffer_address);
        self.length.write_volatile(0);
        self.checksum.write_volatile(0);
        self.errors.write_volatile(0);
        self.special.write_volatile(0);
        self.status.write_volatile(0);
    }

    pub fn read(&self) -> RxDescriptorReader {
        RxDescriptorReader {
            #[cfg(test)]
            buffer_address: self.buffer_address.read_volatile(),
            length: self.length.read_volatile(),
            status: self.status.read_volatile(),
        }
    }

    pub fn modify<F: FnOnce(RxDescriptorWriter) -> RxDescriptorWriter>(&mut self, f: F) {
        let r = self.read();
        let w = f(RxDescriptorWriter {
            length: r.length,
            status: r.status,
        });
        self.length.write_volatile(w.length);
        self.status.write_volatile(w.status);
    }
}

pub struct RxDescriptorReader {
    #[cfg(test)]
    buffer_address: u64,
    length: u16,
    status: u8,
}

impl RxDescriptorReader {
    #[cfg(test)]
    pub fn buffer_address(&self) -> u64 {
        self.buffer_address
    }

    pub fn length(&self) -> u16 {
        self.length
    }

    /// The device wrote data into the slot that software has not consumed yet.
    pub fn is_done(&self) -> bool {
        self.status & STATUS_DESCRIPTOR_DONE != 0
    }

    pub fn is_end_of_packet(&self) -> bool {
        self.status & STATUS_END_OF_PACKET != 0
    }
}

pub struct RxDescriptorWriter {
    length: u16,
    status: u8,
}

impl RxDescriptorWriter {
    pub fn set_length(mut self, length: u16) -> Self {
        self.length = length;
        self
    }

    #[cfg(test)]
    pub fn set_done(mut self) -> Self {
        self.status |= STATUS_DESCRIPTOR_DONE;
        self
    }

    #[cfg(test)]
    pub fn set_end_of_packet(mut self) -> Self {
        self.status |= STATUS_END_OF_PACKET;
        self
    }

    /// Returns the slot to the device.
    pub fn clear_status(mut self) -> Self {
        self.status = 0;
        self
    }
}
