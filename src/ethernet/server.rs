//! Loops for the network server's input and output helpers
//!
//! The input helper drains one packet at a time into a page-sized buffer and forwards every
//! full page, then the remainder, to the network stack. The output helper takes one message
//! and pushes all of it into the transmit ring. Both back off through a caller-supplied closure
//! (typically a yield to the scheduler) instead of spinning inside the driver.

use super::{PacketIo, ReceiveProgress, RxError, TxError};

/// Drains one whole packet through `page`.
///
/// `forward` receives each full page as it fills up and finally whatever is left once the end
/// of the packet is reached. `backoff` runs whenever the receive ring is empty. Returns the size
/// of the packet.
///
/// # Panics
///
/// If `page` is empty.
pub fn receive_packet<D, F, B>(device: &mut D, page: &mut [u8], mut forward: F, mut backoff: B) -> usize
where
    D: PacketIo,
    F: FnMut(&[u8]),
    B: FnMut(),
{
    assert!(!page.is_empty(), "receive page must not be empty");

    let mut progress = ReceiveProgress::new();
    let mut filled = 0;
    while !progress.is_end_of_packet() {
        match device.recv(&mut page[filled..], &mut progress) {
            Ok(received) => filled += received,
            Err(RxError::QueueEmpty) => backoff(),
        }

        if filled == page.len() {
            forward(&page[..]);
            filled = 0;
        }
    }

    if filled > 0 {
        forward(&page[..filled]);
    }

    defmt::trace!("received {} byte packet", progress.bytes_delivered());
    progress.bytes_delivered()
}

/// Sends all of `data` as one packet.
///
/// After a full ring only the part that was not queued yet is retried, following `backoff`.
pub fn transmit_packet<D, B>(device: &mut D, data: &[u8], mut backoff: B) -> usize
where
    D: PacketIo,
    B: FnMut(),
{
    let mut remaining = data;
    while !remaining.is_empty() {
        match device.send(remaining) {
            Ok(sent) => remaining = &remaining[sent..],
            Err(TxError::QueueFull { queued }) => {
                remaining = &remaining[queued..];
                backoff();
            }
        }
    }

    data.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::SpinDelay;
    use crate::dma::IdentityMapped;
    use crate::ethernet::mock::{self, MockDevice};
    use crate::ethernet::{Builder, Controller, RxDescriptorTable, TxDescriptorTable, TX_SLOT_SIZE};
    use std::vec::Vec;

    const PAGE_SIZE: usize = 4096;

    fn bring_up() -> (MockDevice, Controller<'static, MockDevice>) {
        let device = MockDevice::new();
        let tx = std::boxed::Box::leak(mock::zeroed::<TxDescriptorTable>());
        let rx = std::boxed::Box::leak(mock::zeroed::<RxDescriptorTable>());
        let nic = Builder::new().freeze(device.clone(), &IdentityMapped, tx, rx, &mut SpinDelay::new(0));
        (device, nic)
    }

    #[test]
    fn small_packet_is_forwarded_once() {
        let (device, mut nic) = bring_up();
        device.deliver(&[9; 60]);

        let mut page = [0; PAGE_SIZE];
        let mut messages: Vec<Vec<u8>> = Vec::new();
        let size = receive_packet(&mut nic, &mut page, |m| messages.push(m.to_vec()), || {
            panic!("packet was already there")
        });

        assert_eq!(size, 60);
        assert_eq!(messages, [std::vec![9u8; 60]]);
    }

    #[test]
    fn large_packet_is_forwarded_page_by_page() {
        let (device, mut nic) = bring_up();
        let packet: Vec<u8> = (0..PAGE_SIZE * 2 + 100).map(|i| (i % 199) as u8).collect();
        device.deliver(&packet);

        let mut page = [0; PAGE_SIZE];
        let mut messages: Vec<Vec<u8>> = Vec::new();
        let size = receive_packet(&mut nic, &mut page, |m| messages.push(m.to_vec()), || {});

        assert_eq!(size, packet.len());
        let lengths: Vec<_> = messages.iter().map(Vec::len).collect();
        assert_eq!(lengths, [PAGE_SIZE, PAGE_SIZE, 100]);
        assert_eq!(messages.concat(), packet);
    }

    #[test]
    fn empty_ring_backs_off_until_data_arrives() {
        let (device, mut nic) = bring_up();
        let mut page = [0; PAGE_SIZE];
        let mut backoffs = 0;
        let mut messages: Vec<Vec<u8>> = Vec::new();

        let size = receive_packet(&mut nic, &mut page, |m| messages.push(m.to_vec()), || {
            backoffs += 1;
            if backoffs == 3 {
                device.deliver(&[1; 10]);
            }
        });

        assert_eq!(backoffs, 3);
        assert_eq!(size, 10);
        assert_eq!(messages, [std::vec![1u8; 10]]);
    }

    #[test]
    fn transmit_retries_only_the_remainder() {
        let (device, mut nic) = bring_up();
        for _ in 0..30 {
            nic.send(&[0; 10]).unwrap();
        }

        let packet: Vec<u8> = (0..TX_SLOT_SIZE * 3).map(|i| (i % 97) as u8).collect();
        let mut backoffs = 0;
        let mut sent = Vec::new();
        let size = transmit_packet(&mut nic, &packet, || {
            backoffs += 1;
            sent.extend(device.transmit());
        });

        assert_eq!(size, packet.len());
        assert_eq!(backoffs, 1);
        sent.extend(device.transmit());
        assert_eq!(sent.len(), 31);
        assert_eq!(sent[30], packet);
    }
}
