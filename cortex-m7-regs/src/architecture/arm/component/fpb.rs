//! Flash Patch and Breakpoint unit (see armv7-M Architecture Reference Manual C1.11).
use super::{CoreSightComponent, CoreSightManagement};
use crate::memory::MemoryInterface;
use crate::register::{MemoryMappedRegister, Peripheral, RegisterInfo};
use crate::Error;

/// The FPB at `0xE000_2000`.
#[derive(Debug)]
pub struct Fpb;

/// Number of FP_COMP registers of the Cortex-M7 FPB.
pub const NUM_COMPARATORS: u64 = 8;

/// Byte layout of the FPB.
#[repr(C)]
pub struct FpbRegisterBlock {
    pub fp_ctrl: u32,
    pub fp_remap: u32,
    pub fp_comp: [u32; NUM_COMPARATORS as usize],
    _reserved0: [u32; 994],
    pub management: CoreSightManagement,
}

impl Peripheral for Fpb {
    const NAME: &'static str = "FPB";
    const BASE: u64 = 0xE000_2000;
    const SIZE: u64 = std::mem::size_of::<FpbRegisterBlock>() as u64;
    const REGISTERS: &'static [RegisterInfo] = coresight_registers!(Fpb:
        fp_ctrl::REGISTER,
        fp_remap::REGISTER,
        fp_comp::REGISTER,
    );
}

impl CoreSightComponent for Fpb {}

assert_layout!(FpbRegisterBlock: fp_ctrl, fp_remap, fp_comp);
static_assertions::const_assert_eq!(
    std::mem::offset_of!(FpbRegisterBlock, management),
    super::MANAGEMENT_OFFSET
);

define_register! {
    /// FlashPatch Control Register
    ///
    /// A write is ignored unless `KEY` is set in the same store, see
    /// [`FpCtrl::store_with_key`](super::FpCtrl::store_with_key).
    pub mod fp_ctrl: Fpb, "FP_CTRL" @ 0x00, U32, ReadWrite;

    /// `0` for version 1, `1` for version 2.
    REV: ReadOnly = 31, 28;
    NUM_CODE_HI: ReadOnly = 14, 12;
    /// Number of literal comparators.
    NUM_LIT: ReadOnly = 11, 8;
    NUM_CODE_LO: ReadOnly = 7, 4;
    KEY: WriteOnly = 1, 1;
    ENABLE: ReadWrite = 0, 0;
}

define_register! {
    /// FlashPatch Remap Register
    pub mod fp_remap: Fpb, "FP_REMAP" @ 0x04, U32, ReadWrite;

    /// Remapping is supported.
    RMPSPT: ReadOnly = 29, 29;
    /// Bits 28:5 of the remap table address in SRAM.
    REMAP: ReadWrite = 28, 5;
}

define_register! {
    /// FlashPatch Comparator Registers, in the version 2 layout.
    pub mod fp_comp: Fpb, "FP_COMP" @ 0x08, U32, ReadWrite, [8; 4];

    /// Bits 31:1 of the breakpoint address.
    BPADDR: ReadWrite = 31, 1;
    /// Breakpoint enable.
    BE: ReadWrite = 0, 0;
}

memory_mapped_bitfield_register! {
    /// Flash Patch Control Register, FP_CTRL (see armv7-M Architecture Reference Manual C1.11.3)
    pub struct FpCtrl(u32);
    fp_ctrl::REGISTER: Fpb, ReadWrite;
    impl From;
    /// Flash Patch breakpoint architecture revision:
    ///
    /// `0b0000` Flash Patch breakpoint version 1.\
    /// `0b0001` Flash Patch breakpoint version 2. Supports breakpoints on any location in the 4GB address range.
    pub rev, _: 31, 28;
    num_code_1, _: 14, 12;
    /// The number of literal address comparators supported, starting from NUM_CODE upwards.
    pub num_lit, _: 11, 8;
    num_code_0, _: 7, 4;
    /// On any write to FP_CTRL, this bit must be `1`.
    pub _, set_key: 1;
    pub enable, set_enable: 0;
}

impl FpCtrl {
    /// The number of instruction address comparators.
    pub fn num_code(&self) -> u32 {
        (self.num_code_1() << 4) | self.num_code_0()
    }

    /// Stores the register with `KEY` set, so that the write takes effect.
    pub fn store_with_key<M>(mut self, memory: &mut M) -> Result<(), Error>
    where
        M: MemoryInterface + ?Sized,
    {
        self.set_key(true);
        self.store(memory)
    }
}

bitfield::bitfield! {
    /// Flash Patch Comparator register for FPB version 1, FP_COMPn (see armv7-M Architecture Reference Manual C1.11.5)
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct FpRev1Comp(u32);
    impl Debug;
    /// `01` breaks on the lower halfword, `10` on the upper one.
    pub replace, set_replace: 31, 30;
    /// Bits 28:2 of the compared address.
    pub comp, set_comp: 28, 2;
    pub enable, set_enable: 0;
}

impl FpRev1Comp {
    /// The comparator value for a breakpoint at `address`.
    ///
    /// Version 1 only covers the Code region, below `0x2000_0000`.
    pub fn breakpoint_configuration(address: u32) -> Result<Self, Error> {
        if address >= 0x2000_0000 {
            return Err(Error::UnsupportedBreakpointAddress(address));
        }

        let mut reg = FpRev1Comp(0);
        reg.set_comp((address & 0x1fff_fffc) >> 2);
        reg.set_replace(if address & 0x3 == 0 { 0b01 } else { 0b10 });
        reg.set_enable(true);

        Ok(reg)
    }
}

bitfield::bitfield! {
    /// Flash Patch Comparator register for FPB version 2, FP_COMPn
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct FpRev2Comp(u32);
    impl Debug;
    pub bpaddr, set_bpaddr: 31, 1;
    pub enable, set_enable: 0;
}

impl FpRev2Comp {
    /// The comparator value for a breakpoint at `address`.
    pub fn breakpoint_configuration(address: u32) -> Self {
        let mut reg = FpRev2Comp(0);
        reg.set_bpaddr(address >> 1);
        reg.set_enable(true);
        reg
    }
}

/// Enables the FPB and returns the number of instruction comparators.
pub fn enable<M>(memory: &mut M) -> Result<u32, Error>
where
    M: MemoryInterface + ?Sized,
{
    let mut ctrl = FpCtrl::load(memory)?;
    ctrl.set_enable(true);
    ctrl.store_with_key(memory)?;

    Ok(ctrl.num_code())
}

/// Programs comparator `index` with a breakpoint at `address`, in the layout
/// matching the FPB revision.
pub fn set_breakpoint<M>(memory: &mut M, index: u64, address: u32) -> Result<(), Error>
where
    M: MemoryInterface + ?Sized,
{
    let comparator = fp_comp::REGISTER.get(index)?;

    let value = match fp_ctrl::REV.read(memory)? {
        0 => FpRev1Comp::breakpoint_configuration(address)?.0,
        1 => FpRev2Comp::breakpoint_configuration(address).0,
        rev => {
            return Err(Error::UnknownValue {
                name: "FP_CTRL.REV",
                value: rev,
            })
        }
    };

    tracing::debug!("FPB comparator {}: breakpoint at {:#010x}", index, address);

    comparator.write(memory, value)
}

/// Disables comparator `index`.
pub fn clear_breakpoint<M>(memory: &mut M, index: u64) -> Result<(), Error>
where
    M: MemoryInterface + ?Sized,
{
    fp_comp::REGISTER.get(index)?.write(memory, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::RegisterWidth;
    use crate::test::{MockMemory, Transaction};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn fpb_memory(ctrl: u32) -> MockMemory {
        let mut memory = MockMemory::new();
        memory.add_word_range(Fpb::BASE, &[ctrl, 0]);
        memory.add_word_range(Fpb::BASE + 0x08, &[0; 8]);
        memory
    }

    #[test]
    fn block_layout() {
        assert_eq!(Fpb::SIZE, 0x1000);
        assert_eq!(
            fp_comp::REGISTER.at(7).info().address(Fpb::BASE),
            0xE000_2024
        );
    }

    #[test]
    fn registers_in_address_order() {
        let names: Vec<_> = Fpb::REGISTERS.iter().map(|r| r.name()).collect();

        assert_eq!(&names[..4], &["FP_CTRL", "FP_REMAP", "FP_COMP", "LAR"]);
        assert_eq!(names.len(), 3 + 14);
    }

    #[test]
    fn num_code_spans_both_fields() {
        let ctrl = FpCtrl::from(0x1000_1260);
        assert_eq!(ctrl.num_code(), 0x16);
        assert_eq!(ctrl.num_lit(), 2);
        assert_eq!(ctrl.rev(), 1);
    }

    #[test]
    fn enable_writes_key() {
        let mut memory = fpb_memory(0x1000_0260);

        assert_eq!(enable(&mut memory).unwrap(), 6);
        assert_eq!(
            memory.transactions(),
            &[
                Transaction::Read {
                    address: 0xE000_2000,
                    width: RegisterWidth::U32
                },
                Transaction::Write {
                    address: 0xE000_2000,
                    width: RegisterWidth::U32,
                    value: 0x1000_0263
                },
            ]
        );
    }

    #[test_case(0x0000_0000, 0x1000_0000, 0x5000_0001 ; "v1 lower halfword")]
    #[test_case(0x0000_0000, 0x0000_0802, 0x8000_0801 ; "v1 upper halfword")]
    #[test_case(0x1000_0000, 0x2000_0100, 0x2000_0101 ; "v2 anywhere")]
    fn breakpoint_layout(ctrl: u32, address: u32, expected: u32) {
        let mut memory = fpb_memory(ctrl);

        set_breakpoint(&mut memory, 3, address).unwrap();

        assert_eq!(memory.read_u32(Fpb::BASE + 0x14), expected);
    }

    #[test]
    fn v1_rejects_addresses_outside_code_region() {
        let mut memory = fpb_memory(0);

        assert!(matches!(
            set_breakpoint(&mut memory, 0, 0x2000_0000),
            Err(Error::UnsupportedBreakpointAddress(0x2000_0000))
        ));
    }

    #[test]
    fn comparator_index_is_checked() {
        let mut memory = fpb_memory(0x1000_0000);

        assert!(matches!(
            set_breakpoint(&mut memory, 8, 0x100),
            Err(Error::IndexOutOfRange { count: 8, .. })
        ));
        assert!(memory.transactions().is_empty());
    }

    #[test]
    fn clear_breakpoint_writes_zero() {
        let mut memory = fpb_memory(0x1000_0000);
        memory.write_u32(Fpb::BASE + 0x08, 0x2000_0101);

        clear_breakpoint(&mut memory, 0).unwrap();

        assert_eq!(fp_comp::BE.at(0).read(&mut memory).unwrap(), 0);
    }
}
