use crate::memory::MemoryNotAlignedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Field {name} ({bit_width} bits at bit {bit_offset}) does not fit a {register_bits}-bit register")]
    InvalidField {
        name: &'static str,
        bit_offset: u32,
        bit_width: u32,
        register_bits: u32,
    },
    #[error("{name} is read-only")]
    NotWritable { name: &'static str },
    #[error("{name} is write-only and must not be read")]
    NotReadable { name: &'static str },
    #[error("{0}")]
    MemoryNotAligned(#[from] MemoryNotAlignedError),
    #[error("Memory at {address:#010x} could not be accessed")]
    AccessFault { address: u64 },
    #[error("Value {value:#x} is not a known value of {name}")]
    UnknownValue { name: &'static str, value: u32 },
    #[error("Index {index} is out of range for {name}, which has {count} elements")]
    IndexOutOfRange {
        name: &'static str,
        index: u64,
        count: u64,
    },
    #[error("A hardware breakpoint can not be set at {0:#010x}")]
    UnsupportedBreakpointAddress(u32),
    #[error("The memory backend reported an error")]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn backend(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(e))
    }
}
