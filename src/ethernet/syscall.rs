//! Raw-pointer entry points for a kernel system-call layer
//!
//! Results follow the kernel convention: a non-negative byte count on success, or a negated
//! error code.

use core::slice;

use super::{PacketIo, ReceiveProgress, RxError, TxError};

/// The transmit ring had no free slot
pub const E_QUEUE_FULL: isize = 17;
/// The receive ring had no filled slot
pub const E_QUEUE_EMPTY: isize = 18;

/// Queues the `len` bytes at `data` as one packet.
///
/// A null pointer or zero length does nothing and returns 0. When the ring fills up halfway
/// through, the fragments already queued stay queued and `-E_QUEUE_FULL` is returned.
///
/// # Safety
///
/// Unless null, `data` must be valid for reads of `len` bytes.
pub unsafe fn send_data_at<D: PacketIo>(device: &mut D, data: *const u8, len: usize) -> isize {
    if data.is_null() || len == 0 {
        return 0;
    }

    let data = slice::from_raw_parts(data, len);
    match device.send(data) {
        Ok(sent) => sent as isize,
        Err(TxError::QueueFull { queued }) => {
            defmt::trace!("send_data_at: queue full, {} of {} bytes queued", queued, len);
            -E_QUEUE_FULL
        }
    }
}

/// Copies up to `len` bytes of the current packet to `dst`, continuing from `progress`.
///
/// A null pointer or zero length does nothing and returns 0.
///
/// # Safety
///
/// Unless null, `dst` must be valid for writes of `len` bytes and `progress` must point to a
/// valid [`ReceiveProgress`] not aliased by `dst`.
pub unsafe fn recv_data_at<D: PacketIo>(
    device: &mut D,
    dst: *mut u8,
    len: usize,
    progress: *mut ReceiveProgress,
) -> isize {
    if dst.is_null() || len == 0 || progress.is_null() {
        return 0;
    }

    let dst = slice::from_raw_parts_mut(dst, len);
    match device.recv(dst, &mut *progress) {
        Ok(received) => received as isize,
        Err(RxError::QueueEmpty) => -E_QUEUE_EMPTY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::SpinDelay;
    use crate::dma::IdentityMapped;
    use crate::ethernet::mock::{self, MockDevice};
    use crate::ethernet::{Builder, Controller, RxDescriptorTable, TxDescriptorTable};
    use core::ptr;

    fn bring_up() -> (MockDevice, Controller<'static, MockDevice>) {
        let device = MockDevice::new();
        let tx = std::boxed::Box::leak(mock::zeroed::<TxDescriptorTable>());
        let rx = std::boxed::Box::leak(mock::zeroed::<RxDescriptorTable>());
        let nic = Builder::new().freeze(device.clone(), &IdentityMapped, tx, rx, &mut SpinDelay::new(0));
        (device, nic)
    }

    #[test]
    fn invalid_arguments_are_no_ops() {
        let (device, mut nic) = bring_up();
        let mut buffer = [0u8; 16];
        let mut progress = ReceiveProgress::new();

        unsafe {
            assert_eq!(send_data_at(&mut nic, ptr::null(), 10), 0);
            assert_eq!(send_data_at(&mut nic, buffer.as_ptr(), 0), 0);
            assert_eq!(recv_data_at(&mut nic, ptr::null_mut(), 16, &mut progress), 0);
            assert_eq!(recv_data_at(&mut nic, buffer.as_mut_ptr(), 0, &mut progress), 0);
            assert_eq!(recv_data_at(&mut nic, buffer.as_mut_ptr(), 16, ptr::null_mut()), 0);
        }
        assert!(device.transmit().is_empty());
    }

    #[test]
    fn backpressure_is_negated() {
        let (_device, mut nic) = bring_up();
        let packet = [0x42u8; 64];
        let mut buffer = [0u8; 64];
        let mut progress = ReceiveProgress::new();

        unsafe {
            for _ in 0..32 {
                assert_eq!(send_data_at(&mut nic, packet.as_ptr(), packet.len()), 64);
            }
            assert_eq!(send_data_at(&mut nic, packet.as_ptr(), packet.len()), -E_QUEUE_FULL);
            assert_eq!(
                recv_data_at(&mut nic, buffer.as_mut_ptr(), buffer.len(), &mut progress),
                -E_QUEUE_EMPTY
            );
        }
        assert_eq!(progress, ReceiveProgress::new());
    }

    #[test]
    fn received_bytes_are_counted() {
        let (device, mut nic) = bring_up();
        device.deliver(&[7; 100]);
        let mut buffer = [0u8; 64];
        let mut progress = ReceiveProgress::new();

        unsafe {
            assert_eq!(recv_data_at(&mut nic, buffer.as_mut_ptr(), 64, &mut progress), 64);
            assert!(!progress.is_end_of_packet());
            assert_eq!(recv_data_at(&mut nic, buffer.as_mut_ptr(), 64, &mut progress), 36);
        }
        assert!(progress.is_end_of_packet());
        assert_eq!(&buffer[..36], &[7; 36]);
    }
}
