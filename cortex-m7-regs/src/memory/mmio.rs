use super::{MemoryInterface, MemoryNotAlignedError};
use crate::error::Error;

/// Direct access to memory-mapped registers with volatile loads and stores.
///
/// This is the backend for code running on the Cortex-M7 itself. Accesses are
/// never cached or merged, every call is a single load or store instruction.
#[derive(Debug)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Creates a new volatile memory backend.
    ///
    /// # Safety
    ///
    /// Every address later passed to this backend must point to device memory
    /// or to memory that is valid for reads and writes of the access width for
    /// as long as the backend is used. Nothing else may hold a Rust reference to
    /// that memory while it is accessed through this backend.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }

    fn pointer<T>(address: u64) -> Result<*mut T, Error> {
        MemoryNotAlignedError::check(address, std::mem::align_of::<T>())?;
        let address = usize::try_from(address).map_err(|_| Error::AccessFault { address })?;
        Ok(address as *mut T)
    }
}

impl MemoryInterface for Mmio {
    fn read_word_32(&mut self, address: u64) -> Result<u32, Error> {
        let pointer = Self::pointer::<u32>(address)?;
        // SAFETY: the caller of `Mmio::new` guarantees the address is valid,
        // alignment was checked above.
        Ok(unsafe { pointer.read_volatile() })
    }

    fn read_word_8(&mut self, address: u64) -> Result<u8, Error> {
        let pointer = Self::pointer::<u8>(address)?;
        // SAFETY: see `read_word_32`.
        Ok(unsafe { pointer.read_volatile() })
    }

    fn write_word_32(&mut self, address: u64, data: u32) -> Result<(), Error> {
        let pointer = Self::pointer::<u32>(address)?;
        // SAFETY: see `read_word_32`.
        unsafe { pointer.write_volatile(data) };
        Ok(())
    }

    fn write_word_8(&mut self, address: u64, data: u8) -> Result<(), Error> {
        let pointer = Self::pointer::<u8>(address)?;
        // SAFETY: see `read_word_32`.
        unsafe { pointer.write_volatile(data) };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Mmio;
    use crate::architecture::arm::scs::scb;
    use crate::memory::MemoryInterface;
    use crate::Error;

    #[test]
    fn volatile_round_trip_on_host_buffer() {
        let mut block = Box::new([0u32; 4]);
        let base = block.as_mut_ptr() as u64;
        // SAFETY: the buffer outlives the backend and is only accessed through it.
        let mut mmio = unsafe { Mmio::new() };

        mmio.write_word_32(base + 4, 0x0000_0002).unwrap();
        assert_eq!(mmio.read_word_32(base + 4).unwrap(), 0x0000_0002);

        mmio.write_word_8(base + 9, 0xA5).unwrap();
        assert_eq!(mmio.read_word_8(base + 9).unwrap(), 0xA5);

        drop(block);
    }

    #[test]
    fn field_write_through_volatile_backend() {
        // Stands in for the first four SCB words, AIRCR is at offset 0x0C.
        let mut scb = Box::new([0u32; 4]);
        let base = scb.as_mut_ptr() as u64;
        // SAFETY: the buffer outlives the backend and is only accessed through it.
        let mut mmio = unsafe { Mmio::new() };

        mmio.write_word_32(base + 0x0C, 0x0000_0002).unwrap();
        scb::aircr::VECTKEY.write_at(&mut mmio, base, 0x05FA).unwrap();

        assert_eq!(mmio.read_word_32(base + 0x0C).unwrap(), 0x05FA_0002);
        drop(scb);
    }

    #[test]
    fn misaligned_word_access_is_rejected() {
        let mut block = Box::new([0u32; 2]);
        let base = block.as_mut_ptr() as u64;
        // SAFETY: the buffer outlives the backend and is only accessed through it.
        let mut mmio = unsafe { Mmio::new() };

        let error = mmio.read_word_32(base + 2).unwrap_err();
        assert!(matches!(error, Error::MemoryNotAligned(_)));
        drop(block);
    }
}
