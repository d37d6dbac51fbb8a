/// Volatile access to a field of a structure shared with the device
pub trait VolatileReadWrite<T> {
    fn read_volatile(&self) -> T;
    fn write_volatile(&mut self, new_value: T);
}

macro_rules! volatile_read_write {
    ($($type:ty),+) => {
        $(
            impl VolatileReadWrite<$type> for $type {
                fn read_volatile(&self) -> $type {
                    unsafe { core::ptr::read_volatile(self) }
                }

                fn write_volatile(&mut self, new_value: $type) {
                    unsafe {
                        core::ptr::write_volatile(self, new_value);
                    }
                }
            }
        )+
    };
}

volatile_read_write!(u8, u16, u64);
