//! Memory Access Port registers (see ADIv5.2 section C2.6).
//!
//! The Cortex-M7 has an AHB-AP as access port 0. The window of any other
//! MEM-AP is reached through the `_at` accessors with
//! [`ap_window_base`](super::ap_window_base).
use crate::memory::MemoryInterface;
use crate::register::{MemoryMappedRegister, Peripheral, RegisterInfo};
use crate::Error;
use enum_primitive_derive::Primitive;
use num_traits::FromPrimitive;

/// The register window of a MEM-AP.
#[derive(Debug)]
pub struct MemAp;

/// Byte layout of the MEM-AP register window.
#[repr(C)]
pub struct MemApRegisterBlock {
    pub csw: u32,
    pub tar: u32,
    _reserved0: u32,
    pub drw: u32,
    pub bd: [u32; 4],
    pub mbt: u32,
    _reserved1: [u32; 52],
    pub cfg: u32,
    pub base: u32,
    pub idr: u32,
}

impl Peripheral for MemAp {
    const NAME: &'static str = "MEM-AP";
    const BASE: u64 = 0x0;
    const SIZE: u64 = std::mem::size_of::<MemApRegisterBlock>() as u64;
    const REGISTERS: &'static [RegisterInfo] = &[
        csw::REGISTER.info(),
        tar::REGISTER.info(),
        drw::REGISTER.info(),
        bd::REGISTER.info(),
        mbt::REGISTER.info(),
        cfg::REGISTER.info(),
        base::REGISTER.info(),
        idr::REGISTER.info(),
    ];
}

assert_layout!(MemApRegisterBlock: csw, tar, drw, bd, mbt, cfg, base, idr);

define_register! {
    /// Control/Status Word Register
    pub mod csw: MemAp, "CSW" @ 0x00, U32, ReadWrite;

    /// Debug software access enable.
    DBGSWENABLE: ReadWrite = 31, 31;
    /// Bus access protection, for the AHB-AP the HPROT signals.
    PROT: ReadWrite = 30, 24;
    /// Secure debug is enabled.
    SPIDEN: ReadOnly = 23, 23;
    /// Mode of operation, `0b0000` for basic mode.
    MODE: ReadWrite = 11, 8;
    /// A transfer is in progress.
    TRINPROG: ReadOnly = 7, 7;
    /// Transfers can be issued.
    DEVICEEN: ReadOnly = 6, 6;
    /// Auto-increment of TAR after a DRW access, see [`AddressIncrement`](super::AddressIncrement).
    ADDRINC: ReadWrite = 5, 4;
    /// Access size, see [`DataSize`](super::DataSize).
    SIZE: ReadWrite = 2, 0;
}

define_register! {
    /// Transfer Address Register
    pub mod tar: MemAp, "TAR" @ 0x04, U32, ReadWrite;

    ADDRESS: ReadWrite = 31, 0;
}

define_register! {
    /// Data Read/Write Register
    ///
    /// Each access makes a bus transfer at the address in TAR.
    pub mod drw: MemAp, "DRW" @ 0x0C, U32, ReadWrite, volatile_read;

    DATA: ReadWrite = 31, 0;
}

define_register! {
    /// Banked Data Registers
    ///
    /// `BD[n]` accesses `TAR[31:4] + 4 * n` without changing TAR.
    pub mod bd: MemAp, "BD" @ 0x10, U32, ReadWrite, [4; 4], volatile_read;

    DATA: ReadWrite = 31, 0;
}

define_register! {
    /// Memory Barrier Transfer Register
    pub mod mbt: MemAp, "MBT" @ 0x20, U32, ReadWrite, volatile_read;

    DATA: ReadWrite = 31, 0;
}

define_register! {
    /// Configuration Register
    pub mod cfg: MemAp, "CFG" @ 0xF4, U32, ReadOnly;

    /// Large data extension.
    LD: ReadOnly = 2, 2;
    /// Large physical address extension.
    LA: ReadOnly = 1, 1;
    /// Big-endian memory system.
    BE: ReadOnly = 0, 0;
}

define_register! {
    /// Debug Base Address Register
    pub mod base: MemAp, "BASE" @ 0xF8, U32, ReadOnly;

    /// Bits 31:12 of the address of the first ROM table.
    BASEADDR: ReadOnly = 31, 12;
    /// `1` for the ADIv5 format, see [`BaseAddrFormat`](super::BaseAddrFormat).
    FORMAT: ReadOnly = 1, 1;
    /// A debug entry is present.
    P: ReadOnly = 0, 0;
}

define_register! {
    /// Identification Register
    pub mod idr: MemAp, "IDR" @ 0xFC, U32, ReadOnly;

    REVISION: ReadOnly = 31, 28;
    DESIGNER: ReadOnly = 27, 17;
    CLASS: ReadOnly = 16, 13;
    VARIANT: ReadOnly = 7, 4;
    TYPE: ReadOnly = 3, 0;
}

/// Values of `CSW.SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum DataSize {
    U8 = 0b000,
    U16 = 0b001,
    U32 = 0b010,
    /// Large data extension only.
    U64 = 0b011,
    U128 = 0b100,
    U256 = 0b101,
}

impl DataSize {
    /// Number of bytes of one transfer.
    pub fn to_byte_count(self) -> usize {
        match self {
            DataSize::U8 => 1,
            DataSize::U16 => 2,
            DataSize::U32 => 4,
            DataSize::U64 => 8,
            DataSize::U128 => 16,
            DataSize::U256 => 32,
        }
    }
}

/// Values of `CSW.ADDRINC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum AddressIncrement {
    /// No increments are happening after the DRW access. TAR always stays the same.
    Off = 0b00,
    /// Increments the TAR by the size of the access after each DRW access.
    Single = 0b01,
    /// Packed transfers, several bytes or halfwords per DRW access.
    Packed = 0b10,
}

/// The format of the BASE register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum BaseAddrFormat {
    /// The legacy format of very old cores.
    Legacy = 0,
    /// The format all newer MCUs use.
    ADIv5 = 1,
}

memory_mapped_bitfield_register! {
    /// Control/Status Word Register, CSW
    pub struct Csw(u32);
    csw::REGISTER: MemAp, ReadWrite;
    impl From;
    pub dbg_sw_enable, set_dbg_sw_enable: 31;
    pub u8, prot, set_prot: 30, 24;
    pub spiden, _: 23;
    pub u8, mode, set_mode: 11, 8;
    pub tr_in_prog, _: 7;
    pub device_en, _: 6;
    pub u8, addr_inc, set_addr_inc: 5, 4;
    pub u8, size, set_size: 2, 0;
}

impl Csw {
    /// The access size, or `None` for a reserved encoding.
    pub fn data_size(&self) -> Option<DataSize> {
        DataSize::from_u8(self.size())
    }

    /// The address increment, or `None` for a reserved encoding.
    pub fn address_increment(&self) -> Option<AddressIncrement> {
        AddressIncrement::from_u8(self.addr_inc())
    }

    /// Replaces size and increment, keeping the other bits.
    pub fn with_transfer(mut self, size: DataSize, increment: AddressIncrement) -> Self {
        self.set_size(size as u8);
        self.set_addr_inc(increment as u8);
        self
    }
}

memory_mapped_bitfield_register! {
    /// Debug Base Address Register, BASE
    pub struct Base(u32);
    base::REGISTER: MemAp, ReadOnly;
    impl From;
    pub baseaddr, _: 31, 12;
    pub format, _: 1;
    pub present, _: 0;
}

impl Base {
    /// Address of the first ROM table, `None` if no debug entry is present.
    ///
    /// The legacy format marks a missing entry with `0xFFFF_FFFF`.
    pub fn rom_table_address(&self) -> Option<u64> {
        if self.0 == 0xFFFF_FFFF {
            None
        } else if self.format() {
            self.present().then_some(u64::from(self.baseaddr()) << 12)
        } else {
            Some(u64::from(self.0 & 0xFFFF_F000))
        }
    }
}

/// Reads the access size configured in CSW of the MEM-AP at `base`.
pub fn data_size_at<M>(memory: &mut M, base: u64) -> Result<DataSize, Error>
where
    M: MemoryInterface + ?Sized,
{
    let csw = Csw::load_at(memory, base)?;
    csw.data_size().ok_or(Error::UnknownValue {
        name: "CSW.SIZE",
        value: csw.size() as u32,
    })
}
