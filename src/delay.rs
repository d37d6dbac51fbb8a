//! Delays
pub use embedded_hal::blocking::delay::{DelayMs, DelayUs};

/// Busy-wait delay provider for environments without a calibrated timer
///
/// The driver only needs short pauses between EEPROM polls, so a spin loop calibrated by the
/// caller is good enough. `loops_per_us` is the number of `spin_loop` hints that take roughly
/// one microsecond on the running core; zero turns every delay into a no-op.
pub struct SpinDelay {
    loops_per_us: u32,
}

impl SpinDelay {
    /// Creates a delay provider spinning `loops_per_us` times per microsecond
    pub const fn new(loops_per_us: u32) -> Self {
        SpinDelay { loops_per_us }
    }

    /// Spin iterations per microsecond
    pub fn loops_per_us(&self) -> u32 {
        self.loops_per_us
    }

    fn spin(&self, us: u64) {
        let total = us.saturating_mul(self.loops_per_us as u64);
        for _ in 0..total {
            core::hint::spin_loop();
        }
    }
}

impl DelayUs<u32> for SpinDelay {
    fn delay_us(&mut self, us: u32) {
        self.spin(us as u64);
    }
}

impl DelayUs<u16> for SpinDelay {
    fn delay_us(&mut self, us: u16) {
        self.delay_us(us as u32);
    }
}

impl DelayUs<u8> for SpinDelay {
    fn delay_us(&mut self, us: u8) {
        self.delay_us(us as u32);
    }
}

impl DelayMs<u32> for SpinDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.spin(ms as u64 * 1_000);
    }
}

impl DelayMs<u16> for SpinDelay {
    fn delay_ms(&mut self, ms: u16) {
        self.delay_ms(ms as u32);
    }
}

impl DelayMs<u8> for SpinDelay {
    fn delay_ms(&mut self, ms: u8) {
        self.delay_ms(ms as u32);
    }
}

#[cfg(test)]
mod tests {
    use crate::delay::*;

    #[test]
    fn zero_calibration_returns_immediately() {
        let mut delay = SpinDelay::new(0);
        delay.delay_ms(u32::MAX);
        delay.delay_us(u32::MAX);
    }

    #[test]
    fn keeps_calibration() {
        let mut delay = SpinDelay::new(3);
        delay.delay_us(2_u8);
        assert_eq!(delay.loops_per_us(), 3);
    }
}
