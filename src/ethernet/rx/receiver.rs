use core::sync::atomic::{fence, Ordering};
use void::Void;

use super::{RxDescriptorTable, RxError, RX_SLOT_SIZE};
use crate::ethernet::registers::{Register, RegisterWindow};

/// Position inside the packet currently being drained
///
/// A packet may be larger than the caller's buffer, so draining it can take several calls to
/// [`Receiver::recv`]. The caller keeps one `ReceiveProgress` per packet and passes it to every
/// call until [`ReceiveProgress::is_end_of_packet`] turns true.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, defmt::Format)]
pub struct ReceiveProgress {
    delivered: usize,
    offset: usize,
    end_of_packet: bool,
}

impl ReceiveProgress {
    pub const fn new() -> Self {
        ReceiveProgress {
            delivered: 0,
            offset: 0,
            end_of_packet: false,
        }
    }

    /// Starts over with the next packet.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Bytes of the packet handed out so far
    pub fn bytes_delivered(&self) -> usize {
        self.delivered
    }

    /// Bytes of the current slot already copied out
    pub fn slot_offset(&self) -> usize {
        self.offset
    }

    /// The last slot of the packet has been consumed.
    pub fn is_end_of_packet(&self) -> bool {
        self.end_of_packet
    }
}

/// Receive engine
///
/// The device fills slots and sets DD on them; software drains them in ring order from the tail
/// register, clears their status and moves the tail past them to give them back.
pub struct Receiver<'rx, const COUNT: usize> {
    descriptors: &'rx mut RxDescriptorTable<COUNT>,
}

impl<'rx, const COUNT: usize> Receiver<'rx, COUNT> {
    pub(crate) fn new(descriptors: &'rx mut RxDescriptorTable<COUNT>) -> Self {
        Receiver { descriptors }
    }

    /// Slot software will drain next
    pub fn tail<W: RegisterWindow>(&self, registers: &W) -> usize {
        registers.read(Register::RDT) as usize % COUNT
    }

    /// Whether the slot at the tail holds data.
    pub fn can_receive<W: RegisterWindow>(&self, registers: &W) -> bool {
        self.descriptors.descriptor(self.tail(registers)).read().is_done()
    }

    /// Copies as much of the current packet into `dst` as fits.
    ///
    /// Stops at the end of the packet, when `dst` is full, or when the next slot has not been
    /// filled yet. Returns the number of bytes copied by this call. `QueueEmpty` is only returned
    /// when nothing at all could be copied, in which case `progress` is untouched.
    pub fn recv<W: RegisterWindow>(
        &mut self,
        registers: &mut W,
        dst: &mut [u8],
        progress: &mut ReceiveProgress,
    ) -> Result<usize, RxError> {
        let mut copied = 0;
        while copied < dst.len() && !progress.end_of_packet {
            match self.receive_fragment(registers, &mut dst[copied..], progress) {
                Ok(count) => copied += count,
                Err(nb::Error::WouldBlock) if copied == 0 => return Err(RxError::QueueEmpty),
                Err(nb::Error::WouldBlock) => {
                    defmt::trace!("rx ring drained mid-packet after {} bytes", progress.delivered);
                    break;
                }
                Err(nb::Error::Other(e)) => void::unreachable(e),
            }
        }

        Ok(copied)
    }

    /// Copies from the slot at the tail, releasing the slot once it is fully consumed.
    pub fn receive_fragment<W: RegisterWindow>(
        &mut self,
        registers: &mut W,
        dst: &mut [u8],
        progress: &mut ReceiveProgress,
    ) -> nb::Result<usize, Void> {
        let next = self.tail(registers);
        let (descriptor, buffer) = self.descriptors.slot_mut(next);
        let properties = descriptor.read();
        if !properties.is_done() {
            return Err(nb::Error::WouldBlock);
        }

        // The buffer contents are only valid once DD has been observed.
        fence(Ordering::SeqCst);

        let length = (properties.length() as usize).min(RX_SLOT_SIZE);
        let offset = progress.offset.min(length);
        let count = (length - offset).min(dst.len());
        dst[..count].copy_from_slice(&buffer[offset..offset + count]);
        progress.delivered += count;
        progress.offset = offset + count;

        if progress.offset == length {
            progress.end_of_packet = properties.is_end_of_packet();
            progress.offset = 0;

            descriptor.modify(|w| w.clear_status().set_length(0));
            fence(Ordering::SeqCst);
            registers.write(Register::RDT, ((next + 1) % COUNT) as u32);
        }

        Ok(count)
    }
}
