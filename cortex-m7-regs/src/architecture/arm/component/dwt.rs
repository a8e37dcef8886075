//! Data Watchpoint and Trace unit (see armv7-M Architecture Reference Manual C1.8).
use super::{CoreSightComponent, CoreSightManagement};
use crate::memory::MemoryInterface;
use crate::register::{MemoryMappedRegister, Peripheral, RegisterInfo};
use crate::Error;
use enum_primitive_derive::Primitive;

/// The DWT at `0xE000_1000`.
#[derive(Debug)]
pub struct Dwt;

/// Number of comparators of the Cortex-M7 DWT.
pub const NUM_COMPARATORS: u64 = 4;

/// One comparator of [`DwtRegisterBlock`].
#[repr(C)]
pub struct DwtComparator {
    pub comp: u32,
    pub mask: u32,
    pub function: u32,
    _reserved: u32,
}

/// Byte layout of the DWT.
#[repr(C)]
pub struct DwtRegisterBlock {
    pub ctrl: u32,
    pub cyccnt: u32,
    pub cpicnt: u32,
    pub exccnt: u32,
    pub sleepcnt: u32,
    pub lsucnt: u32,
    pub foldcnt: u32,
    pub pcsr: u32,
    pub comparators: [DwtComparator; NUM_COMPARATORS as usize],
    _reserved0: [u32; 980],
    pub management: CoreSightManagement,
}

impl Peripheral for Dwt {
    const NAME: &'static str = "DWT";
    const BASE: u64 = 0xE000_1000;
    const SIZE: u64 = std::mem::size_of::<DwtRegisterBlock>() as u64;
    const REGISTERS: &'static [RegisterInfo] = coresight_registers!(Dwt:
        ctrl::REGISTER,
        cyccnt::REGISTER,
        cpicnt::REGISTER,
        exccnt::REGISTER,
        sleepcnt::REGISTER,
        lsucnt::REGISTER,
        foldcnt::REGISTER,
        pcsr::REGISTER,
        comp::REGISTER,
        mask::REGISTER,
        function::REGISTER,
    );
}

impl CoreSightComponent for Dwt {}

assert_layout!(DwtRegisterBlock: ctrl, cyccnt, cpicnt, exccnt, sleepcnt, lsucnt, foldcnt, pcsr);
assert_layout!(DwtRegisterBlock.comparators: DwtComparator => comp, mask, function);
static_assertions::const_assert_eq!(
    std::mem::offset_of!(DwtRegisterBlock, management),
    super::MANAGEMENT_OFFSET
);

define_register! {
    /// Control Register
    pub mod ctrl: Dwt, "CTRL" @ 0x00, U32, ReadWrite;

    /// Number of comparators.
    NUMCOMP: ReadOnly = 31, 28;
    /// Trace sampling and exception tracing are not supported.
    NOTRCPKT: ReadOnly = 27, 27;
    /// External match signals are not supported.
    NOEXTTRIG: ReadOnly = 26, 26;
    /// CYCCNT is not supported.
    NOCYCCNT: ReadOnly = 25, 25;
    /// The profiling counters are not supported.
    NOPRFCNT: ReadOnly = 24, 24;
    CYCEVTENA: ReadWrite = 22, 22;
    FOLDEVTENA: ReadWrite = 21, 21;
    LSUEVTENA: ReadWrite = 20, 20;
    SLEEPEVTENA: ReadWrite = 19, 19;
    EXCEVTENA: ReadWrite = 18, 18;
    CPIEVTENA: ReadWrite = 17, 17;
    /// Exception trace enable.
    EXCTRCENA: ReadWrite = 16, 16;
    /// Periodic PC sample packets enable.
    PCSAMPLENA: ReadWrite = 12, 12;
    /// CYCCNT tap for synchronization packets.
    SYNCTAP: ReadWrite = 11, 10;
    /// CYCCNT tap for the POSTCNT timer.
    CYCTAP: ReadWrite = 9, 9;
    POSTINIT: ReadWrite = 8, 5;
    POSTPRESET: ReadWrite = 4, 1;
    /// Cycle counter enable.
    CYCCNTENA: ReadWrite = 0, 0;
}

define_register! {
    /// Cycle Count Register
    pub mod cyccnt: Dwt, "CYCCNT" @ 0x04, U32, ReadWrite;

    CYCCNT: ReadWrite = 31, 0;
}

define_register! {
    /// CPI Count Register
    pub mod cpicnt: Dwt, "CPICNT" @ 0x08, U32, ReadWrite;

    CPICNT: ReadWrite = 7, 0;
}

define_register! {
    /// Exception Overhead Count Register
    pub mod exccnt: Dwt, "EXCCNT" @ 0x0C, U32, ReadWrite;

    EXCCNT: ReadWrite = 7, 0;
}

define_register! {
    /// Sleep Count Register
    pub mod sleepcnt: Dwt, "SLEEPCNT" @ 0x10, U32, ReadWrite;

    SLEEPCNT: ReadWrite = 7, 0;
}

define_register! {
    /// LSU Count Register
    pub mod lsucnt: Dwt, "LSUCNT" @ 0x14, U32, ReadWrite;

    LSUCNT: ReadWrite = 7, 0;
}

define_register! {
    /// Folded-instruction Count Register
    pub mod foldcnt: Dwt, "FOLDCNT" @ 0x18, U32, ReadWrite;

    FOLDCNT: ReadWrite = 7, 0;
}

define_register! {
    /// Program Counter Sample Register
    pub mod pcsr: Dwt, "PCSR" @ 0x1C, U32, ReadOnly;

    EIASAMPLE: ReadOnly = 31, 0;
}

define_register! {
    /// Comparator Registers
    pub mod comp: Dwt, "COMP" @ 0x20, U32, ReadWrite, [4; 0x10];

    COMP: ReadWrite = 31, 0;
}

define_register! {
    /// Comparator Mask Registers
    pub mod mask: Dwt, "MASK" @ 0x24, U32, ReadWrite, [4; 0x10];

    /// Number of low address bits ignored by the comparison.
    MASK: ReadWrite = 4, 0;
}

define_register! {
    /// Comparator Function Registers
    pub mod function: Dwt, "FUNCTION" @ 0x28, U32, ReadWrite, [4; 0x10], volatile_read;

    /// The comparator matched since the last read. Clears on read.
    MATCHED: ReadOnly = 24, 24;
    DATAVADDR1: ReadWrite = 19, 16;
    DATAVADDR0: ReadWrite = 15, 12;
    DATAVSIZE: ReadWrite = 11, 10;
    /// Linked data value matching is supported.
    LNK1ENA: ReadOnly = 9, 9;
    DATAVMATCH: ReadWrite = 8, 8;
    CYCMATCH: ReadWrite = 7, 7;
    EMITRANGE: ReadWrite = 5, 5;
    /// What the comparator matches and what happens on a match, see [`WatchKind`](super::WatchKind).
    FUNCTION: ReadWrite = 3, 0;
}

memory_mapped_bitfield_register! {
    /// DWT Control Register, DWT_CTRL (see armv7-M Architecture Reference Manual C1.8.7)
    pub struct Ctrl(u32);
    ctrl::REGISTER: Dwt, ReadWrite;
    impl From;

    pub u8, numcomp, _: 31, 28;
    pub notrcpkt, _: 27;
    pub noexttrig, _: 26;
    pub nocyccnt, _: 25;
    pub noprfcnt, _: 24;
    pub cycevtena, set_cycevtena: 22;
    pub foldevtena, set_foldevtena: 21;
    pub lsuevtena, set_lsuevtena: 20;
    pub sleepevtena, set_sleepevtena: 19;
    pub excevtena, set_excevtena: 18;
    pub cpievtena, set_cpievtena: 17;
    pub exctrcena, set_exctrcena: 16;
    pub pcsamplena, set_pcsamplena: 12;
    pub u8, synctap, set_synctap: 11, 10;
    pub cyctap, set_cyctap: 9;
    pub u8, postinit, set_postinit: 8, 5;
    pub u8, postpreset, set_postpreset: 4, 1;
    pub cyccntena, set_cyccntena: 0;
}

memory_mapped_bitfield_register! {
    /// DWT Comparator Function Register, DWT_FUNCTIONn (see armv7-M Architecture Reference Manual C1.8.17)
    pub struct Function(u32);
    function::REGISTER: Dwt, ReadWrite;
    impl From;

    pub matched, _: 24;
    pub u8, datavaddr1, set_datavaddr1: 19, 16;
    pub u8, datavaddr0, set_datavaddr0: 15, 12;
    pub u8, datavsize, set_datavsize: 11, 10;
    pub lnk1ena, _: 9;
    pub datavmatch, set_datavmatch: 8;
    pub cycmatch, set_cycmatch: 7;
    pub emitrange, set_emitrange: 5;
    pub u8, function, set_function: 3, 0;
}

/// Values of `FUNCTION.FUNCTION` for data address comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum WatchKind {
    Disabled = 0b0000,
    /// Halt or raise a DebugMonitor exception on an instruction fetch.
    InstructionFetch = 0b0100,
    /// Halt or raise a DebugMonitor exception on a data read.
    Read = 0b0101,
    /// Halt or raise a DebugMonitor exception on a data write.
    Write = 0b0110,
    /// Halt or raise a DebugMonitor exception on any data access.
    ReadWrite = 0b0111,
}

/// Number of comparators reported by `CTRL.NUMCOMP`.
pub fn num_comparators<M>(memory: &mut M) -> Result<u32, Error>
where
    M: MemoryInterface + ?Sized,
{
    ctrl::NUMCOMP.read(memory)
}

/// Starts the cycle counter from zero.
///
/// Requires `DEMCR.TRCENA` to be set.
pub fn start_cycle_counter<M>(memory: &mut M) -> Result<(), Error>
where
    M: MemoryInterface + ?Sized,
{
    cyccnt::REGISTER.write(memory, 0)?;
    Ctrl::modify(memory, |ctrl| ctrl.set_cyccntena(true))?;
    Ok(())
}

/// Sets up comparator `index` to watch `address` for the accesses selected by `kind`.
///
/// `ignore_bits` low address bits are excluded from the comparison.
pub fn set_watchpoint<M>(
    memory: &mut M,
    index: u64,
    address: u32,
    ignore_bits: u32,
    kind: WatchKind,
) -> Result<(), Error>
where
    M: MemoryInterface + ?Sized,
{
    tracing::debug!(
        "DWT comparator {}: {:?} at {:#010x}, mask {}",
        index,
        kind,
        address,
        ignore_bits
    );

    comp::REGISTER.get(index)?.write(memory, address)?;
    mask::MASK.get(index)?.write(memory, ignore_bits)?;

    let mut function = Function(0);
    function.set_function(kind as u8);
    Function::store_at_index(memory, index, function)
}

impl Function {
    /// Stores the function of comparator `index`.
    fn store_at_index<M>(memory: &mut M, index: u64, value: Self) -> Result<(), Error>
    where
        M: MemoryInterface + ?Sized,
    {
        function::REGISTER.get(index)?.write(memory, value.into())
    }

    /// Loads the function of comparator `index`.
    pub fn load_index<M>(memory: &mut M, index: u64) -> Result<Self, Error>
    where
        M: MemoryInterface + ?Sized,
    {
        Ok(Function(function::REGISTER.get(index)?.read(memory)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::RegisterWidth;
    use crate::test::{MockMemory, Transaction};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn dwt_memory(ctrl: u32) -> MockMemory {
        let mut memory = MockMemory::new();
        let mut words = vec![0u32; 0x60 / 4];
        words[0] = ctrl;
        memory.add_word_range(Dwt::BASE, &words);
        memory
    }

    #[test]
    fn block_layout() {
        assert_eq!(Dwt::SIZE, 0x1000);
        assert_eq!(pcsr::REGISTER.info().address(Dwt::BASE), 0xE000_101C);
        assert_eq!(Dwt::REGISTERS.len(), 11 + 14);
        assert_eq!(Dwt::REGISTERS[8].count(), NUM_COMPARATORS);
    }

    #[test_case(0, 0xE000_1028)]
    #[test_case(1, 0xE000_1038)]
    #[test_case(3, 0xE000_1058)]
    fn comparator_function_address(index: u64, address: u64) {
        assert_eq!(
            function::REGISTER.at(index).info().address(Dwt::BASE),
            address
        );
    }

    #[test]
    fn comparator_out_of_range() {
        assert!(matches!(
            comp::REGISTER.get(4),
            Err(Error::IndexOutOfRange {
                index: 4,
                count: 4,
                ..
            })
        ));
    }

    #[test]
    fn ctrl_decode() {
        let mut memory = dwt_memory(0x4000_0001);
        let ctrl = Ctrl::load(&mut memory).unwrap();

        assert_eq!(ctrl.numcomp(), 4);
        assert!(ctrl.cyccntena());
        assert!(!ctrl.nocyccnt());
        assert_eq!(num_comparators(&mut memory).unwrap(), 4);
    }

    #[test]
    fn cycle_counter_is_reset_then_enabled() {
        let mut memory = dwt_memory(0x4000_0000);
        memory.write_u32(Dwt::BASE + 0x04, 1234);

        start_cycle_counter(&mut memory).unwrap();

        assert_eq!(memory.read_u32(Dwt::BASE + 0x04), 0);
        assert_eq!(memory.read_u32(Dwt::BASE), 0x4000_0001);
    }

    #[test]
    fn watchpoint_setup() {
        let mut memory = dwt_memory(0x4000_0000);

        set_watchpoint(&mut memory, 2, 0x2000_0100, 2, WatchKind::Write).unwrap();

        assert_eq!(memory.read_u32(Dwt::BASE + 0x40), 0x2000_0100);
        assert_eq!(memory.read_u32(Dwt::BASE + 0x44), 2);
        assert_eq!(memory.read_u32(Dwt::BASE + 0x48), 0b0110);

        let function = Function::load_index(&mut memory, 2).unwrap();
        assert_eq!(function.function(), WatchKind::Write as u8);
        assert_eq!(
            function::FUNCTION
                .at(2)
                .read_as::<WatchKind, _>(&mut memory)
                .unwrap(),
            WatchKind::Write
        );
    }

    #[test]
    fn watchpoint_writes_do_not_touch_other_comparators() {
        let mut memory = dwt_memory(0);

        set_watchpoint(&mut memory, 0, 0x1000, 0, WatchKind::Read).unwrap();

        assert!(memory.transactions().iter().all(|t| match t {
            Transaction::Read { address, .. } | Transaction::Write { address, .. } =>
                (0xE000_1020..0xE000_1030).contains(address),
        }));
        assert!(memory.transactions().iter().all(|t| match t {
            Transaction::Read { width, .. } | Transaction::Write { width, .. } =>
                *width == RegisterWidth::U32,
        }));
    }

    #[test]
    fn matched_is_read_only() {
        let matched = function::MATCHED.descriptor();
        assert_eq!(matched.access(), crate::AccessMode::ReadOnly);
        assert_eq!(matched.shifted_mask(), 1 << 24);
    }
}
