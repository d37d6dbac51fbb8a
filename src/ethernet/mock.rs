//! Simulated e1000 for host tests
//!
//! Registers live in plain memory. The device side of the protocol is driven explicitly by the
//! test: EEPROM reads are answered after a configurable number of polls, transmit descriptors
//! are completed by [`MockDevice::transmit`] and receive slots are filled by
//! [`MockDevice::deliver`], all through the identity-mapped addresses programmed into the ring
//! base registers.

use std::alloc::{alloc_zeroed, handle_alloc_error, Layout};
use std::boxed::Box;
use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use super::registers::{eerd, Register, RegisterWindow};
use super::rx::RX_SLOT_SIZE;
use super::Mmio;

const DESCRIPTOR_SIZE: usize = 16;
const TX_COMMAND_EOP: u8 = 1 << 0;
const DD: u8 = 1 << 0;
const RX_STATUS_EOP: u8 = 1 << 1;

/// Heap allocation of an all-zero `T`, for descriptor tables too large for the test stack
pub fn zeroed<T>() -> Box<T> {
    let layout = Layout::new::<T>();
    unsafe {
        let pointer = alloc_zeroed(layout) as *mut T;
        if pointer.is_null() {
            handle_alloc_error(layout);
        }
        Box::from_raw(pointer)
    }
}

struct State {
    registers: Vec<u32>,
    eeprom: [u16; 64],
    eeprom_latency: u32,
    eeprom_countdown: u32,
    eeprom_reads: usize,
    partial_packet: Vec<u8>,
}

/// Handle to a simulated device; clones share the same device
#[derive(Clone)]
pub struct MockDevice(Rc<RefCell<State>>);

impl MockDevice {
    /// Device with QEMU's default station address in its EEPROM
    pub fn new() -> Self {
        let mut eeprom = [0xFFFF; 64];
        eeprom[..3].copy_from_slice(&[0x5452, 0x1200, 0x5634]);
        MockDevice(Rc::new(RefCell::new(State {
            registers: std::vec![0; Mmio::MINIMUM_SIZE / 4],
            eeprom,
            eeprom_latency: 0,
            eeprom_countdown: 0,
            eeprom_reads: 0,
            partial_packet: Vec::new(),
        })))
    }

    pub fn register(&self, register: Register) -> u32 {
        self.0.borrow().registers[register.index()]
    }

    pub fn set_eeprom_word(&self, address: usize, value: u16) {
        self.0.borrow_mut().eeprom[address] = value;
    }

    /// Number of EERD polls that still see the read in progress
    pub fn set_eeprom_latency(&self, polls: u32) {
        self.0.borrow_mut().eeprom_latency = polls;
    }

    /// Number of EEPROM reads started so far
    pub fn eeprom_reads(&self) -> usize {
        self.0.borrow().eeprom_reads
    }

    /// Sends every queued transmit fragment and returns the packets completed by them.
    pub fn transmit(&self) -> Vec<Vec<u8>> {
        self.complete_transmit(usize::MAX)
    }

    /// Sends at most `count` queued fragments, discarding what goes out.
    pub fn complete_transmit_slots(&self, count: usize) {
        self.complete_transmit(count);
    }

    fn complete_transmit(&self, limit: usize) -> Vec<Vec<u8>> {
        let mut state = self.0.borrow_mut();
        let (base, count) = state.ring(Register::TDBAL, Register::TDBAH, Register::TDLEN);
        let mut head = state.registers[Register::TDH.index()] as usize;
        let mut packets = Vec::new();

        for _ in 0..count.min(limit) {
            let descriptor = base + (head * DESCRIPTOR_SIZE) as u64;
            unsafe {
                let status = read::<u8>(descriptor + 12);
                if status & DD != 0 {
                    break;
                }
                let buffer = read::<u64>(descriptor);
                let length = read::<u16>(descriptor + 8) as usize;
                let command = read::<u8>(descriptor + 11);

                let data = core::slice::from_raw_parts(buffer as usize as *const u8, length);
                state.partial_packet.extend_from_slice(data);
                if command & TX_COMMAND_EOP != 0 {
                    packets.push(core::mem::take(&mut state.partial_packet));
                }
                write::<u8>(descriptor + 12, status | DD);
            }
            head = (head + 1) % count;
        }

        state.registers[Register::TDH.index()] = head as u32;
        packets
    }

    /// Writes `packet` into as many receive slots as it needs. Returns the number of slots.
    pub fn deliver(&self, packet: &[u8]) -> usize {
        let fragments = packet.chunks(RX_SLOT_SIZE).count();
        for (index, fragment) in packet.chunks(RX_SLOT_SIZE).enumerate() {
            self.deliver_fragment(fragment, index + 1 == fragments);
        }
        fragments
    }

    /// Writes one fragment into the slot at the receive head.
    pub fn deliver_fragment(&self, fragment: &[u8], end_of_packet: bool) {
        assert!(fragment.len() <= RX_SLOT_SIZE);
        let mut state = self.0.borrow_mut();
        let (base, count) = state.ring(Register::RDBAL, Register::RDBAH, Register::RDLEN);
        let head = state.registers[Register::RDH.index()] as usize;
        let descriptor = base + (head * DESCRIPTOR_SIZE) as u64;

        unsafe {
            assert_eq!(read::<u8>(descriptor + 12) & DD, 0, "receive ring overrun at slot {}", head);
            let buffer = read::<u64>(descriptor);
            core::ptr::copy_nonoverlapping(
                fragment.as_ptr(),
                buffer as usize as *mut u8,
                fragment.len(),
            );
            write::<u16>(descriptor + 8, fragment.len() as u16);
            let eop = if end_of_packet { RX_STATUS_EOP } else { 0 };
            write::<u8>(descriptor + 12, DD | eop);
        }

        state.registers[Register::RDH.index()] = ((head + 1) % count) as u32;
    }
}

impl State {
    fn ring(&self, low: Register, high: Register, length: Register) -> (u64, usize) {
        let base = self.registers[low.index()] as u64 | (self.registers[high.index()] as u64) << 32;
        let count = self.registers[length.index()] as usize / DESCRIPTOR_SIZE;
        assert!(base != 0 && count != 0, "descriptor ring not programmed");
        (base, count)
    }
}

unsafe fn read<T: Copy>(address: u64) -> T {
    core::ptr::read_volatile(address as usize as *const T)
}

unsafe fn write<T: Copy>(address: u64, value: T) {
    core::ptr::write_volatile(address as usize as *mut T, value)
}

impl RegisterWindow for MockDevice {
    fn read_word(&self, index: usize) -> u32 {
        let mut state = self.0.borrow_mut();
        let value = state.registers[index];
        if index == Register::EERD.index() && state.eeprom_countdown > 0 {
            state.eeprom_countdown -= 1;
            if state.eeprom_countdown == 0 {
                state.complete_eeprom_read();
            }
        }
        value
    }

    fn write_word(&mut self, index: usize, value: u32) {
        let mut state = self.0.borrow_mut();
        state.registers[index] = value;
        if index == Register::EERD.index() && value & eerd::START != 0 {
            state.eeprom_reads += 1;
            state.eeprom_countdown = state.eeprom_latency;
            if state.eeprom_countdown == 0 {
                state.complete_eeprom_read();
            }
        }
    }
}

impl State {
    fn complete_eeprom_read(&mut self) {
        let request = self.registers[Register::EERD.index()];
        let address = (request >> eerd::ADDRESS_SHIFT) & 0xFF;
        let data = self.eeprom[address as usize % self.eeprom.len()] as u32;
        self.registers[Register::EERD.index()] =
            (data << eerd::DATA_SHIFT) | (address << eerd::ADDRESS_SHIFT) | eerd::DONE;
    }
}
