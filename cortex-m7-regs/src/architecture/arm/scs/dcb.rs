//! Debug Control Block (see armv7-M Architecture Reference Manual C1.6).
use crate::memory::MemoryInterface;
use crate::register::{MemoryMappedRegister, Peripheral, RegisterInfo};
use crate::Error;
use enum_primitive_derive::Primitive;

/// The Debug Control Block at `0xE000_EDF0`.
#[derive(Debug)]
pub struct Dcb;

/// Byte layout of the DCB.
#[repr(C)]
pub struct DcbRegisterBlock {
    pub dhcsr: u32,
    pub dcrsr: u32,
    pub dcrdr: u32,
    pub demcr: u32,
}

impl Peripheral for Dcb {
    const NAME: &'static str = "DCB";
    const BASE: u64 = 0xE000_EDF0;
    const SIZE: u64 = std::mem::size_of::<DcbRegisterBlock>() as u64;
    const REGISTERS: &'static [RegisterInfo] = &[
        dhcsr::REGISTER.info(),
        dcrsr::REGISTER.info(),
        dcrdr::REGISTER.info(),
        demcr::REGISTER.info(),
    ];
}

assert_layout!(DcbRegisterBlock: dhcsr, dcrsr, dcrdr, demcr);

/// The value `DBGKEY` has to be written as for a DHCSR write to take effect.
pub const DBGKEY_VALUE: u32 = 0xA05F;

define_register! {
    /// Debug Halting Control and Status Register
    ///
    /// A write is ignored unless `DBGKEY` is written in the same store, which a
    /// field write through read-modify-write does not do. Use
    /// [`Dhcsr::store_with_key`](super::Dhcsr::store_with_key).
    pub mod dhcsr: Dcb, "DHCSR" @ 0x0, U32, ReadWrite, volatile_read;

    /// Debug key, must be written as `0xA05F`.
    DBGKEY: WriteOnly = 31, 16;
    /// At least one reset since the last DHCSR read. Clears on read.
    S_RESET_ST: ReadOnly = 25, 25;
    /// At least one instruction retired since the last DHCSR read. Clears on read.
    S_RETIRE_ST: ReadOnly = 24, 24;
    /// The processor is locked up.
    S_LOCKUP: ReadOnly = 19, 19;
    /// The processor is sleeping.
    S_SLEEP: ReadOnly = 18, 18;
    /// The processor is in debug state.
    S_HALT: ReadOnly = 17, 17;
    /// A DCRDR transfer has completed.
    S_REGRDY: ReadOnly = 16, 16;
    /// Allow imprecise entry to debug state.
    C_SNAPSTALL: ReadOnly = 5, 5;
    /// Mask PendSV, SysTick and external interrupts while stepping.
    C_MASKINTS: ReadOnly = 3, 3;
    /// Single step.
    C_STEP: ReadOnly = 2, 2;
    /// Halt request.
    C_HALT: ReadOnly = 1, 1;
    /// Halting debug enable. Only writable from the DAP.
    ///
    /// The `C_*` bits are written through [`Dhcsr::store_with_key`](super::Dhcsr::store_with_key).
    C_DEBUGEN: ReadOnly = 0, 0;
}

define_register! {
    /// Debug Core Register Selector Register
    pub mod dcrsr: Dcb, "DCRSR" @ 0x4, U32, WriteOnly;

    /// `1` writes DCRDR to the selected register, `0` reads it into DCRDR.
    REGWNR: WriteOnly = 16, 16;
    /// The core register to transfer, see [`CoreRegisterSelector`](super::CoreRegisterSelector).
    REGSEL: WriteOnly = 6, 0;
}

define_register! {
    /// Debug Core Register Data Register
    pub mod dcrdr: Dcb, "DCRDR" @ 0x8, U32, ReadWrite;

    DBGTMP: ReadWrite = 31, 0;
}

define_register! {
    /// Debug Exception and Monitor Control Register
    pub mod demcr: Dcb, "DEMCR" @ 0xC, U32, ReadWrite;

    /// Global enable for the DWT, ITM, ETM and TPIU.
    TRCENA: ReadWrite = 24, 24;
    /// DebugMonitor semaphore bit.
    MON_REQ: ReadWrite = 19, 19;
    /// Step the processor from the DebugMonitor.
    MON_STEP: ReadWrite = 18, 18;
    /// DebugMonitor pending state.
    MON_PEND: ReadWrite = 17, 17;
    /// DebugMonitor enable.
    MON_EN: ReadWrite = 16, 16;
    VC_HARDERR: ReadWrite = 10, 10;
    VC_INTERR: ReadWrite = 9, 9;
    VC_BUSERR: ReadWrite = 8, 8;
    VC_STATERR: ReadWrite = 7, 7;
    VC_CHKERR: ReadWrite = 6, 6;
    VC_NOCPERR: ReadWrite = 5, 5;
    VC_MMERR: ReadWrite = 4, 4;
    VC_CORERESET: ReadWrite = 0, 0;
}

/// Values of `DCRSR.REGSEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum CoreRegisterSelector {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
    R8 = 8,
    R9 = 9,
    R10 = 10,
    R11 = 11,
    R12 = 12,
    /// The current stack pointer.
    Sp = 13,
    Lr = 14,
    /// The address of the first instruction to execute on leaving debug state.
    DebugReturnAddress = 15,
    Xpsr = 16,
    Msp = 17,
    Psp = 18,
    /// CONTROL, FAULTMASK, BASEPRI and PRIMASK in bits 31:24, 23:16, 15:8 and 7:0.
    Special = 20,
    Fpscr = 33,
    S0 = 64,
    S1 = 65,
    S2 = 66,
    S3 = 67,
    S4 = 68,
    S5 = 69,
    S6 = 70,
    S7 = 71,
    S8 = 72,
    S9 = 73,
    S10 = 74,
    S11 = 75,
    S12 = 76,
    S13 = 77,
    S14 = 78,
    S15 = 79,
    S16 = 80,
    S17 = 81,
    S18 = 82,
    S19 = 83,
    S20 = 84,
    S21 = 85,
    S22 = 86,
    S23 = 87,
    S24 = 88,
    S25 = 89,
    S26 = 90,
    S27 = 91,
    S28 = 92,
    S29 = 93,
    S30 = 94,
    S31 = 95,
}

memory_mapped_bitfield_register! {
    /// Debug Halting Control and Status Register, DHCSR (see armv7-M Architecture Reference Manual C1.6.2)
    ///
    /// To write this register successfully, use [`Dhcsr::store_with_key`] or
    /// call [`Dhcsr::enable_write`] first!
    pub struct Dhcsr(u32);
    dhcsr::REGISTER: Dcb, ReadWrite;
    impl From;
    /// At least one reset since the last read of DHCSR. Sticky, clears on read.
    pub s_reset_st, _: 25;
    /// At least one instruction retired since the last read of DHCSR. Sticky,
    /// clears on read.
    pub s_retire_st, _: 24;
    /// The processor is locked up because of an unrecoverable exception.
    pub s_lockup, _: 19;
    /// The processor is sleeping.
    pub s_sleep, _: 18;
    /// The processor is in debug state.
    pub s_halt, _: 17;
    /// The last DCRDR transfer has completed.
    pub s_regrdy, _: 16;
    pub c_snapstall, set_c_snapstall: 5;
    pub c_maskints, set_c_maskints: 3;
    pub c_step, set_c_step: 2;
    pub c_halt, set_c_halt: 1;
    pub c_debugen, set_c_debugen: 0;
}

impl Dhcsr {
    /// This function sets the bit to enable writes to this register.
    ///
    /// The status bits read in the upper half are replaced by the key.
    pub fn enable_write(&mut self) {
        self.0 &= !(0xffff << 16);
        self.0 |= DBGKEY_VALUE << 16;
    }

    /// Stores the control bits with `DBGKEY` in a single store, without reading DHCSR.
    pub fn store_with_key<M>(mut self, memory: &mut M) -> Result<(), Error>
    where
        M: MemoryInterface + ?Sized,
    {
        self.enable_write();
        self.store(memory)
    }
}

memory_mapped_bitfield_register! {
    /// Debug Core Register Selector Register, DCRSR (see armv7-M Architecture Reference Manual C1.6.3)
    pub struct Dcrsr(u32);
    dcrsr::REGISTER: Dcb, WriteOnly;
    impl From;
    pub _, set_regwnr: 16;
    pub u8, _, set_regsel: 6, 0;
}

impl Dcrsr {
    /// A transfer of `register` into DCRDR.
    pub fn read(register: CoreRegisterSelector) -> Self {
        let mut dcrsr = Dcrsr(0);
        dcrsr.set_regsel(register as u8);
        dcrsr
    }

    /// A transfer of DCRDR into `register`.
    pub fn write(register: CoreRegisterSelector) -> Self {
        let mut dcrsr = Self::read(register);
        dcrsr.set_regwnr(true);
        dcrsr
    }
}

memory_mapped_bitfield_register! {
    /// Debug Exception and Monitor Control Register, DEMCR (see armv7-M Architecture Reference Manual C1.6.5)
    pub struct Demcr(u32);
    demcr::REGISTER: Dcb, ReadWrite;
    impl From;
    /// Global enable for DWT and ITM features
    pub trcena, set_trcena: 24;
    /// DebugMonitor semaphore bit
    pub mon_req, set_mon_req: 19;
    /// Step the processor?
    pub mon_step, set_mon_step: 18;
    /// Sets or clears the pending state of the DebugMonitor exception
    pub mon_pend, set_mon_pend: 17;
    /// Enable the DebugMonitor exception
    pub mon_en, set_mon_en: 16;
    /// Halt on a HardFault exception
    pub vc_harderr, set_vc_harderr: 10;
    /// Halt on a fault during exception entry or return
    pub vc_interr, set_vc_interr: 9;
    /// Halt on a BusFault exception
    pub vc_buserr, set_vc_buserr: 8;
    /// Halt on a UsageFault caused by a state information error
    pub vc_staterr, set_vc_staterr: 7;
    /// Halt on a UsageFault caused by a checking error
    pub vc_chkerr, set_vc_chkerr: 6;
    /// Halt on a UsageFault caused by a coprocessor access
    pub vc_nocperr, set_vc_nocperr: 5;
    /// Halt on a MemManage exception
    pub vc_mmerr, set_vc_mmerr: 4;
    /// Halt on a local reset
    pub vc_corereset, set_vc_corereset: 0;
}
