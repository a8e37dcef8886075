//! The memory seam the register access layer runs on.
//!
//! On the target, registers are reached with volatile loads and stores through
//! [`Mmio`]. A debug probe host implements [`MemoryInterface`] on top of its
//! MEM-AP transfers instead, and tests use the instrumented mock memory.
mod mmio;

pub use mmio::Mmio;

use crate::error::Error;

/// Memory access to an address that was not aligned to the access width.
#[derive(Debug, thiserror::Error)]
#[error("Memory access to address {address:#010x} was not aligned to {alignment} bytes")]
pub struct MemoryNotAlignedError {
    /// The address of the access.
    pub address: u64,
    /// The required alignment in bytes.
    pub alignment: usize,
}

impl MemoryNotAlignedError {
    /// Returns an error if `address` is not a multiple of `alignment`.
    pub fn check(address: u64, alignment: usize) -> Result<(), Self> {
        if address % alignment as u64 == 0 {
            Ok(())
        } else {
            Err(Self { address, alignment })
        }
    }
}

/// An interface to be implemented for anything that gives access to
/// peripheral registers.
///
/// Every call is exactly one bus transaction. The register access layer relies
/// on that to guarantee a single load and a single store per read-modify-write.
pub trait MemoryInterface {
    /// Read a 32bit word at `address`.
    ///
    /// The address has to be a multiple of 4.
    /// Returns [`Error::MemoryNotAligned`] if this does not hold true.
    fn read_word_32(&mut self, address: u64) -> Result<u32, Error>;

    /// Read an 8bit word at `address`.
    fn read_word_8(&mut self, address: u64) -> Result<u8, Error>;

    /// Write a 32bit word at `address`.
    ///
    /// The address has to be a multiple of 4.
    /// Returns [`Error::MemoryNotAligned`] if this does not hold true.
    fn write_word_32(&mut self, address: u64, data: u32) -> Result<(), Error>;

    /// Write an 8bit word at `address`.
    fn write_word_8(&mut self, address: u64, data: u8) -> Result<(), Error>;
}

impl<T> MemoryInterface for &mut T
where
    T: MemoryInterface + ?Sized,
{
    fn read_word_32(&mut self, address: u64) -> Result<u32, Error> {
        (**self).read_word_32(address)
    }

    fn read_word_8(&mut self, address: u64) -> Result<u8, Error> {
        (**self).read_word_8(address)
    }

    fn write_word_32(&mut self, address: u64, data: u32) -> Result<(), Error> {
        (**self).write_word_32(address, data)
    }

    fn write_word_8(&mut self, address: u64, data: u8) -> Result<(), Error> {
        (**self).write_word_8(address, data)
    }
}
