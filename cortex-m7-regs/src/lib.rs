//! # Register access for the Cortex-M7 system and debug peripherals
//!
//! Typed descriptors for the System Control Block, the Debug Control Block,
//! the CoreSight components DWT, FPB and ETM, and the register windows of the
//! JTAG Debug Port and the MEM-AP.
//!
//! # Examples
//!
//! ## Identifying the core
//!
//! ```no_run
//! # use cortex_m7_regs::Error;
//! use cortex_m7_regs::architecture::arm::scs::scb::CoreInfo;
//! use cortex_m7_regs::memory::Mmio;
//!
//! // SAFETY: runs on the Cortex-M7, the SCB is always mapped.
//! let mut memory = unsafe { Mmio::new() };
//!
//! let core = CoreInfo::read(&mut memory)?;
//! println!("{core}");
//! # Ok::<(), Error>(())
//! ```
//!
//! ## Writing a field
//!
//! ```no_run
//! # use cortex_m7_regs::Error;
//! use cortex_m7_regs::architecture::arm::scs::scb;
//! use cortex_m7_regs::memory::Mmio;
//!
//! let mut memory = unsafe { Mmio::new() };
//!
//! // Trap on divide by zero. The other CCR bits are kept.
//! scb::ccr::DIV_0_TRP.write(&mut memory, 1)?;
//!
//! // Clear a latched bus fault.
//! scb::cfsr::PRECISERR.write(&mut memory, 1)?;
//! # Ok::<(), Error>(())
//! ```
//!
//! Every register access goes through [`MemoryInterface`], so the same
//! descriptors drive a debug probe when implemented on top of MEM-AP transfers.

#[macro_use]
pub mod register;

/// All the interface bits for the different architectures.
pub mod architecture;
mod error;
pub mod memory;


pub use crate::error::Error;
pub use crate::memory::MemoryInterface;
pub use crate::register::{
    AccessMode, Field, FieldDescriptor, MemoryMappedRegister, Peripheral, Register, RegisterInfo,
    RegisterWidth,
};
