use core::sync::atomic::{fence, Ordering};
use void::Void;

use super::{TxDescriptorTable, TxError, TX_SLOT_SIZE};
use crate::ethernet::registers::{Register, RegisterWindow};

/// Transmit engine
///
/// Software owns every slot whose DD bit is set. Sending claims slots strictly in ring order,
/// starting at the tail register, and the device gives them back by setting DD again once the
/// fragment is on the wire.
pub struct Transmitter<'tx, const COUNT: usize> {
    descriptors: &'tx mut TxDescriptorTable<COUNT>,
}

impl<'tx, const COUNT: usize> Transmitter<'tx, COUNT> {
    pub(crate) fn new(descriptors: &'tx mut TxDescriptorTable<COUNT>) -> Self {
        Transmitter { descriptors }
    }

    /// Slot software will claim next
    pub fn tail<W: RegisterWindow>(&self, registers: &W) -> usize {
        registers.read(Register::TDT) as usize % COUNT
    }

    /// Whether the slot at the tail is free.
    pub fn can_send<W: RegisterWindow>(&self, registers: &W) -> bool {
        self.descriptors.descriptor(self.tail(registers)).read().is_done()
    }

    /// Queues `data` as one packet, split over as many slots as it needs.
    ///
    /// The call is not atomic: if the ring fills up halfway through, the fragments already
    /// queued stay queued and the error says how many bytes they hold.
    pub fn send<W: RegisterWindow>(&mut self, registers: &mut W, data: &[u8]) -> Result<usize, TxError> {
        if data.is_empty() {
            return Ok(0);
        }

        let mut queued = 0;
        for fragment in data.chunks(TX_SLOT_SIZE) {
            let end_of_packet = queued + fragment.len() == data.len();
            match self.send_fragment(registers, fragment, end_of_packet) {
                Ok(()) => queued += fragment.len(),
                Err(nb::Error::WouldBlock) => {
                    defmt::trace!("tx ring full, {}/{} bytes queued", queued, data.len());
                    return Err(TxError::QueueFull { queued });
                }
                Err(nb::Error::Other(e)) => void::unreachable(e),
            }
        }

        Ok(queued)
    }

    /// Places one fragment in the slot at the tail.
    pub fn send_fragment<W: RegisterWindow>(
        &mut self,
        registers: &mut W,
        fragment: &[u8],
        end_of_packet: bool,
    ) -> nb::Result<(), Void> {
        debug_assert!(fragment.len() <= TX_SLOT_SIZE);

        // Check if the next entry is still being used by the device...if so, indicate there's
        // no more entries and the client has to wait for one to become available.
        let next = self.tail(registers);
        let (descriptor, buffer) = self.descriptors.slot_mut(next);
        if !descriptor.read().is_done() {
            return Err(nb::Error::WouldBlock);
        }

        buffer[..fragment.len()].copy_from_slice(fragment);

        descriptor.modify(|w| {
            let w = w.set_length(fragment.len() as u16).set_report_status();
            let w = if end_of_packet {
                w.set_end_of_packet()
            } else {
                w.clear_end_of_packet()
            };
            w.clear_done()
        });

        // Buffer and descriptor have to be visible before the device sees the new tail.
        fence(Ordering::SeqCst);
        registers.write(Register::TDT, ((next + 1) % COUNT) as u32);

        Ok(())
    }
}
