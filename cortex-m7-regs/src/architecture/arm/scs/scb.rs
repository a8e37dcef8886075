//! System Control Block, SCB (see armv7-M Architecture Reference Manual B3.2 and
//! the Cortex-M7 Technical Reference Manual 3.3).
use crate::memory::MemoryInterface;
use crate::register::{MemoryMappedRegister, Peripheral, RegisterInfo};
use crate::Error;
use enum_primitive_derive::Primitive;
use serde::Serialize;

/// The System Control Block at `0xE000_ED00`.
#[derive(Debug)]
pub struct Scb;

/// Byte layout of the SCB.
///
/// Only used to size the block and to check the register descriptors against
/// it. Registers are accessed through the descriptors, never through this type.
#[repr(C)]
pub struct ScbRegisterBlock {
    pub cpuid: u32,
    pub icsr: u32,
    pub vtor: u32,
    pub aircr: u32,
    pub scr: u32,
    pub ccr: u32,
    pub shpr1: u32,
    pub shpr2: u32,
    pub shpr3: u32,
    pub shcsr: u32,
    pub cfsr: u32,
    pub hfsr: u32,
    pub dfsr: u32,
    pub mmfar: u32,
    pub bfar: u32,
    pub afsr: u32,
    pub id_pfr0: u32,
    pub id_pfr1: u32,
    pub id_dfr0: u32,
    pub id_afr0: u32,
    pub id_mmfr: [u32; 4],
    pub id_isar: [u32; 5],
    _reserved0: u32,
    pub clidr: u32,
    pub ctr: u32,
    pub ccsidr: u32,
    pub csselr: u32,
    pub cpacr: u32,
    _reserved1: [u32; 113],
    pub iciallu: u32,
    _reserved2: u32,
    pub icimvau: u32,
    pub dcimvac: u32,
    pub dcisw: u32,
    pub dccmvau: u32,
    pub dccmvac: u32,
    pub dccsw: u32,
    pub dccimvac: u32,
    pub dccisw: u32,
    pub bpiall: u32,
    _reserved3: [u32; 5],
    pub itcmcr: u32,
    pub dtcmcr: u32,
    pub ahbpcr: u32,
    pub cacr: u32,
    pub ahbscr: u32,
    _reserved4: u32,
    pub abfsr: u32,
}

impl Peripheral for Scb {
    const NAME: &'static str = "SCB";
    const BASE: u64 = 0xE000_ED00;
    const SIZE: u64 = std::mem::size_of::<ScbRegisterBlock>() as u64;
    const REGISTERS: &'static [RegisterInfo] = &[
        cpuid::REGISTER.info(),
        icsr::REGISTER.info(),
        vtor::REGISTER.info(),
        aircr::REGISTER.info(),
        scr::REGISTER.info(),
        ccr::REGISTER.info(),
        shpr1::REGISTER.info(),
        shpr2::REGISTER.info(),
        shpr3::REGISTER.info(),
        shcsr::REGISTER.info(),
        cfsr::REGISTER.info(),
        hfsr::REGISTER.info(),
        dfsr::REGISTER.info(),
        mmfar::REGISTER.info(),
        bfar::REGISTER.info(),
        afsr::REGISTER.info(),
        id_pfr0::REGISTER.info(),
        id_pfr1::REGISTER.info(),
        id_dfr0::REGISTER.info(),
        id_afr0::REGISTER.info(),
        id_mmfr::REGISTER.info(),
        id_isar::REGISTER.info(),
        clidr::REGISTER.info(),
        ctr::REGISTER.info(),
        ccsidr::REGISTER.info(),
        csselr::REGISTER.info(),
        cpacr::REGISTER.info(),
        iciallu::REGISTER.info(),
        icimvau::REGISTER.info(),
        dcimvac::REGISTER.info(),
        dcisw::REGISTER.info(),
        dccmvau::REGISTER.info(),
        dccmvac::REGISTER.info(),
        dccsw::REGISTER.info(),
        dccimvac::REGISTER.info(),
        dccisw::REGISTER.info(),
        bpiall::REGISTER.info(),
        itcmcr::REGISTER.info(),
        dtcmcr::REGISTER.info(),
        ahbpcr::REGISTER.info(),
        cacr::REGISTER.info(),
        ahbscr::REGISTER.info(),
        abfsr::REGISTER.info(),
    ];
}

assert_layout!(
    ScbRegisterBlock: cpuid,
    icsr,
    vtor,
    aircr,
    scr,
    ccr,
    shpr1,
    shpr2,
    shpr3,
    shcsr,
    cfsr,
    hfsr,
    dfsr,
    mmfar,
    bfar,
    afsr,
    id_pfr0,
    id_pfr1,
    id_dfr0,
    id_afr0,
    id_mmfr,
    id_isar,
    clidr,
    ctr,
    ccsidr,
    csselr,
    cpacr,
    iciallu,
    icimvau,
    dcimvac,
    dcisw,
    dccmvau,
    dccmvac,
    dccsw,
    dccimvac,
    dccisw,
    bpiall,
    itcmcr,
    dtcmcr,
    ahbpcr,
    cacr,
    ahbscr,
    abfsr,
);

define_register! {
    /// CPUID Base Register
    pub mod cpuid: Scb, "CPUID" @ 0x00, U32, ReadOnly;

    /// Implementer code, `0x41` for ARM.
    IMPLEMENTER: ReadOnly = 31, 24;
    /// The `r` value in the `rnpn` product revision identifier.
    VARIANT: ReadOnly = 23, 20;
    /// Reads as `0xF` on ARMv7-M.
    ARCHITECTURE: ReadOnly = 19, 16;
    /// `0xC27` for the Cortex-M7.
    PARTNO: ReadOnly = 15, 4;
    /// The `p` value in the `rnpn` product revision identifier.
    REVISION: ReadOnly = 3, 0;
}

define_register! {
    /// Interrupt Control and State Register
    pub mod icsr: Scb, "ICSR" @ 0x04, U32, ReadWrite;

    /// Make the NMI exception pending.
    NMIPENDSET: ReadWrite = 31, 31;
    /// Make PendSV pending. Reads as the PendSV pending state.
    PENDSVSET: ReadWrite = 28, 28;
    /// Remove the pending state from PendSV.
    PENDSVCLR: WriteOnly = 27, 27;
    /// Make SysTick pending. Reads as the SysTick pending state.
    PENDSTSET: ReadWrite = 26, 26;
    /// Remove the pending state from SysTick.
    PENDSTCLR: WriteOnly = 25, 25;
    /// The pending exception will be serviced on exit from debug halt.
    ISRPREEMPT: ReadOnly = 23, 23;
    /// An external interrupt, generated by the NVIC, is pending.
    ISRPENDING: ReadOnly = 22, 22;
    /// Highest priority pending enabled exception, `0` for none.
    VECTPENDING: ReadOnly = 20, 12;
    /// No active exceptions besides the one in `VECTACTIVE`.
    RETTOBASE: ReadOnly = 11, 11;
    /// The active exception number, `0` in thread mode.
    VECTACTIVE: ReadOnly = 8, 0;
}

define_register! {
    /// Vector Table Offset Register
    pub mod vtor: Scb, "VTOR" @ 0x08, U32, ReadWrite;

    /// Bits 31:7 of the vector table address.
    TBLOFF: ReadWrite = 31, 7;
}

define_register! {
    /// Application Interrupt and Reset Control Register
    ///
    /// A write is ignored unless `VECTKEY` is written as `0x05FA` in the same
    /// store. Use [`Aircr`](super::Aircr) to compose such a write.
    pub mod aircr: Scb, "AIRCR" @ 0x0C, U32, ReadWrite;

    /// Vector key. Reads as `0xFA05`.
    VECTKEY: ReadWrite = 31, 16;
    /// Data endianness, `0` for little endian.
    ENDIANNESS: ReadOnly = 15, 15;
    /// Priority grouping, the binary point position in priority values.
    ///
    /// Written through [`set_priority_grouping`](super::set_priority_grouping),
    /// which carries the vector key.
    PRIGROUP: ReadOnly = 10, 8;
    /// Request a system reset.
    ///
    /// A field write stores a zero key and is ignored. Use
    /// [`request_system_reset`](super::request_system_reset).
    SYSRESETREQ: WriteOnly = 2, 2;
    /// Clear all active state information for fixed and configurable exceptions.
    /// Only valid in debug state, and only with the key set through [`Aircr`](super::Aircr).
    VECTCLRACTIVE: WriteOnly = 1, 1;
    /// Local system reset. Only valid in debug state, and only with the key set
    /// through [`Aircr`](super::Aircr).
    VECTRESET: WriteOnly = 0, 0;
}

/// The value `VECTKEY` has to be written as for an AIRCR write to take effect.
pub const VECTKEY_VALUE: u32 = 0x05FA;

/// The value `VECTKEY` reads as.
pub const VECTKEYSTAT_VALUE: u32 = 0xFA05;

define_register! {
    /// System Control Register
    pub mod scr: Scb, "SCR" @ 0x10, U32, ReadWrite;

    /// Interrupt transitions from inactive to pending are wakeup events.
    SEVONPEND: ReadWrite = 4, 4;
    /// Use deep sleep as the low power mode.
    SLEEPDEEP: ReadWrite = 2, 2;
    /// Enter sleep on return from handler to thread mode.
    SLEEPONEXIT: ReadWrite = 1, 1;
}

define_register! {
    /// Configuration and Control Register
    pub mod ccr: Scb, "CCR" @ 0x14, U32, ReadWrite;

    /// Branch prediction enable.
    BP: ReadWrite = 18, 18;
    /// Instruction cache enable.
    IC: ReadWrite = 17, 17;
    /// Data cache enable.
    DC: ReadWrite = 16, 16;
    /// 8-byte stack alignment on exception entry.
    STKALIGN: ReadWrite = 9, 9;
    /// Handlers at priority -1 and -2 ignore data bus faults.
    BFHFNMIGN: ReadWrite = 8, 8;
    /// Trap divide by zero.
    DIV_0_TRP: ReadWrite = 4, 4;
    /// Trap unaligned halfword and word accesses.
    UNALIGN_TRP: ReadWrite = 3, 3;
    /// Allow unprivileged software to access STIR.
    USERSETMPEND: ReadWrite = 1, 1;
    /// Allow entering thread mode with exceptions active.
    NONBASETHRDENA: ReadWrite = 0, 0;
}

define_register! {
    /// System Handler Priority Registers viewed as one byte per exception.
    ///
    /// Element `n` holds the priority of exception `n + 4`. Elements 3 to 6,
    /// 8 and 9 are reserved.
    pub mod shpr: Scb, "SHPR" @ 0x18, U8, ReadWrite, [12; 1];

    /// Priority of the exception.
    PRI: ReadWrite = 7, 0;
}

define_register! {
    /// System Handler Priority Register 1
    pub mod shpr1: Scb, "SHPR1" @ 0x18, U32, ReadWrite;

    /// Priority of MemManage.
    PRI_4: ReadWrite = 7, 0;
    /// Priority of BusFault.
    PRI_5: ReadWrite = 15, 8;
    /// Priority of UsageFault.
    PRI_6: ReadWrite = 23, 16;
}

define_register! {
    /// System Handler Priority Register 2
    pub mod shpr2: Scb, "SHPR2" @ 0x1C, U32, ReadWrite;

    /// Priority of SVCall.
    PRI_11: ReadWrite = 31, 24;
}

define_register! {
    /// System Handler Priority Register 3
    pub mod shpr3: Scb, "SHPR3" @ 0x20, U32, ReadWrite;

    /// Priority of DebugMonitor.
    PRI_12: ReadWrite = 7, 0;
    /// Priority of PendSV.
    PRI_14: ReadWrite = 23, 16;
    /// Priority of SysTick.
    PRI_15: ReadWrite = 31, 24;
}

define_register! {
    /// System Handler Control and State Register
    pub mod shcsr: Scb, "SHCSR" @ 0x24, U32, ReadWrite;

    USGFAULTENA: ReadWrite = 18, 18;
    BUSFAULTENA: ReadWrite = 17, 17;
    MEMFAULTENA: ReadWrite = 16, 16;
    SVCALLPENDED: ReadWrite = 15, 15;
    BUSFAULTPENDED: ReadWrite = 14, 14;
    MEMFAULTPENDED: ReadWrite = 13, 13;
    USGFAULTPENDED: ReadWrite = 12, 12;
    SYSTICKACT: ReadWrite = 11, 11;
    PENDSVACT: ReadWrite = 10, 10;
    MONITORACT: ReadWrite = 8, 8;
    SVCALLACT: ReadWrite = 7, 7;
    USGFAULTACT: ReadWrite = 3, 3;
    BUSFAULTACT: ReadWrite = 1, 1;
    MEMFAULTACT: ReadWrite = 0, 0;
}

define_register! {
    /// Configurable Fault Status Register
    ///
    /// All bits are sticky. Writing `1` to a bit clears it.
    pub mod cfsr: Scb, "CFSR" @ 0x28, U32, WriteOneToClear;

    /// The MemManage Fault Status Register in bits 7:0.
    MMFSR: WriteOneToClear = 7, 0;
    /// The BusFault Status Register in bits 15:8.
    BFSR: WriteOneToClear = 15, 8;
    /// The UsageFault Status Register in bits 31:16.
    UFSR: WriteOneToClear = 31, 16;

    /// Instruction fetch from a location the MPU does not permit.
    IACCVIOL: WriteOneToClear = 0, 0;
    /// Data access to a location the MPU does not permit. MMFAR holds the address.
    DACCVIOL: WriteOneToClear = 1, 1;
    /// MemManage fault on unstacking for an exception return.
    MUNSTKERR: WriteOneToClear = 3, 3;
    /// MemManage fault on stacking for exception entry.
    MSTKERR: WriteOneToClear = 4, 4;
    /// MemManage fault during lazy floating-point state preservation.
    MLSPERR: WriteOneToClear = 5, 5;
    /// MMFAR holds a valid fault address.
    MMARVALID: WriteOneToClear = 7, 7;

    /// Bus fault on instruction prefetch.
    IBUSERR: WriteOneToClear = 8, 8;
    /// Precise data bus error. BFAR holds the address.
    PRECISERR: WriteOneToClear = 9, 9;
    /// Imprecise data bus error.
    IMPRECISERR: WriteOneToClear = 10, 10;
    /// Bus fault on unstacking for an exception return.
    UNSTKERR: WriteOneToClear = 11, 11;
    /// Bus fault on stacking for exception entry.
    STKERR: WriteOneToClear = 12, 12;
    /// Bus fault during lazy floating-point state preservation.
    LSPERR: WriteOneToClear = 13, 13;
    /// BFAR holds a valid fault address.
    BFARVALID: WriteOneToClear = 15, 15;

    /// Undefined instruction.
    UNDEFINSTR: WriteOneToClear = 16, 16;
    /// Invalid EPSR state, for example an attempt to execute in ARM state.
    INVSTATE: WriteOneToClear = 17, 17;
    /// Invalid EXC_RETURN value on exception return.
    INVPC: WriteOneToClear = 18, 18;
    /// Access to a coprocessor that is not present or not enabled.
    NOCP: WriteOneToClear = 19, 19;
    /// Unaligned access with `UNALIGN_TRP` set.
    UNALIGNED: WriteOneToClear = 24, 24;
    /// Division by zero with `DIV_0_TRP` set.
    DIVBYZERO: WriteOneToClear = 25, 25;
}

define_register! {
    /// MemManage Fault Status Register, the lowest byte of CFSR.
    pub mod mmfsr: Scb, "MMFSR" @ 0x28, U8, WriteOneToClear;

    IACCVIOL: WriteOneToClear = 0, 0;
    DACCVIOL: WriteOneToClear = 1, 1;
    MUNSTKERR: WriteOneToClear = 3, 3;
    MSTKERR: WriteOneToClear = 4, 4;
    MLSPERR: WriteOneToClear = 5, 5;
    MMARVALID: WriteOneToClear = 7, 7;
}

define_register! {
    /// BusFault Status Register, the second byte of CFSR.
    pub mod bfsr: Scb, "BFSR" @ 0x29, U8, WriteOneToClear;

    IBUSERR: WriteOneToClear = 0, 0;
    PRECISERR: WriteOneToClear = 1, 1;
    IMPRECISERR: WriteOneToClear = 2, 2;
    UNSTKERR: WriteOneToClear = 3, 3;
    STKERR: WriteOneToClear = 4, 4;
    LSPERR: WriteOneToClear = 5, 5;
    BFARVALID: WriteOneToClear = 7, 7;
}

define_register! {
    /// HardFault Status Register
    pub mod hfsr: Scb, "HFSR" @ 0x2C, U32, WriteOneToClear;

    /// A debug event occurred while halting debug was disabled.
    DEBUGEVT: WriteOneToClear = 31, 31;
    /// A configurable fault was escalated to HardFault.
    FORCED: WriteOneToClear = 30, 30;
    /// Bus fault on a vector table read.
    VECTTBL: WriteOneToClear = 1, 1;
}

define_register! {
    /// Debug Fault Status Register
    pub mod dfsr: Scb, "DFSR" @ 0x30, U32, WriteOneToClear;

    /// The EDBGRQ signal was asserted.
    EXTERNAL: WriteOneToClear = 4, 4;
    /// Vector catch.
    VCATCH: WriteOneToClear = 3, 3;
    /// DWT debug event.
    DWTTRAP: WriteOneToClear = 2, 2;
    /// Breakpoint.
    BKPT: WriteOneToClear = 1, 1;
    /// Halt request or step.
    HALTED: WriteOneToClear = 0, 0;
}

define_register! {
    /// MemManage Fault Address Register
    pub mod mmfar: Scb, "MMFAR" @ 0x34, U32, ReadWrite;

    ADDRESS: ReadWrite = 31, 0;
}

define_register! {
    /// BusFault Address Register
    pub mod bfar: Scb, "BFAR" @ 0x38, U32, ReadWrite;

    ADDRESS: ReadWrite = 31, 0;
}

define_register! {
    /// Auxiliary Fault Status Register
    pub mod afsr: Scb, "AFSR" @ 0x3C, U32, ReadWrite;
}

define_register! {
    /// Processor Feature Register 0
    pub mod id_pfr0: Scb, "ID_PFR0" @ 0x40, U32, ReadOnly;

    /// Thumb instruction set support, `0b0011` on ARMv7-M.
    STATE1: ReadOnly = 7, 4;
    /// ARM instruction set support, `0b0000` on ARMv7-M.
    STATE0: ReadOnly = 3, 0;
}

define_register! {
    /// Processor Feature Register 1
    pub mod id_pfr1: Scb, "ID_PFR1" @ 0x44, U32, ReadOnly;

    /// M profile programmers' model, `0b0010` for the two-stack model.
    PROGRAMMERS_MODEL: ReadOnly = 11, 8;
}

define_register! {
    /// Debug Feature Register 0
    pub mod id_dfr0: Scb, "ID_DFR0" @ 0x48, U32, ReadOnly;

    /// M profile debug model, `0b0001` for ARMv6-M / ARMv7-M debug.
    DEBUG_MODEL: ReadOnly = 23, 20;
}

define_register! {
    /// Auxiliary Feature Register 0
    pub mod id_afr0: Scb, "ID_AFR0" @ 0x4C, U32, ReadOnly;
}

define_register! {
    /// Memory Model Feature Registers 0 to 3
    pub mod id_mmfr: Scb, "ID_MMFR" @ 0x50, U32, ReadOnly, [4; 4];
}

define_register! {
    /// Instruction Set Attribute Registers 0 to 4
    pub mod id_isar: Scb, "ID_ISAR" @ 0x60, U32, ReadOnly, [5; 4];
}

define_register! {
    /// Cache Level ID Register
    pub mod clidr: Scb, "CLIDR" @ 0x78, U32, ReadOnly;

    /// Level of unification uniprocessor.
    LOUU: ReadOnly = 29, 27;
    /// Level of coherency.
    LOC: ReadOnly = 26, 24;
    /// Level of unification inner shareable.
    LOUIS: ReadOnly = 23, 21;
    /// Level 2 cache type, see [`CacheType`](super::CacheType).
    CTYPE2: ReadOnly = 5, 3;
    /// Level 1 cache type, see [`CacheType`](super::CacheType).
    CTYPE1: ReadOnly = 2, 0;
}

define_register! {
    /// Cache Type Register
    pub mod ctr: Scb, "CTR" @ 0x7C, U32, ReadOnly;

    /// `0b100` for the ARMv7 register format.
    FORMAT: ReadOnly = 31, 29;
    /// Cache writeback granule, log2 of the number of words.
    CWG: ReadOnly = 27, 24;
    /// Exclusives reservation granule, log2 of the number of words.
    ERG: ReadOnly = 23, 20;
    /// Smallest data cache line, log2 of the number of words.
    DMINLINE: ReadOnly = 19, 16;
    /// Smallest instruction cache line, log2 of the number of words.
    IMINLINE: ReadOnly = 3, 0;
}

define_register! {
    /// Cache Size ID Register, for the cache selected by CSSELR.
    pub mod ccsidr: Scb, "CCSIDR" @ 0x80, U32, ReadOnly;

    /// Write-through support.
    WT: ReadOnly = 31, 31;
    /// Write-back support.
    WB: ReadOnly = 30, 30;
    /// Read-allocation support.
    RA: ReadOnly = 29, 29;
    /// Write-allocation support.
    WA: ReadOnly = 28, 28;
    /// Number of sets minus one.
    NUMSETS: ReadOnly = 27, 13;
    /// Number of ways minus one.
    ASSOCIATIVITY: ReadOnly = 12, 3;
    /// log2 of the number of words in a line, minus two.
    LINESIZE: ReadOnly = 2, 0;
}

define_register! {
    /// Cache Size Selection Register
    pub mod csselr: Scb, "CSSELR" @ 0x84, U32, ReadWrite;

    /// Cache level, minus one.
    LEVEL: ReadWrite = 3, 1;
    /// `1` selects the instruction cache, `0` the data or unified cache.
    IND: ReadWrite = 0, 0;
}

define_register! {
    /// Coprocessor Access Control Register
    pub mod cpacr: Scb, "CPACR" @ 0x88, U32, ReadWrite;

    /// Access to the floating-point extension, see [`CoprocessorAccess`](super::CoprocessorAccess).
    CP11: ReadWrite = 23, 22;
    /// Access to the floating-point extension, see [`CoprocessorAccess`](super::CoprocessorAccess).
    /// Must be programmed to the same value as `CP11`.
    CP10: ReadWrite = 21, 20;
}

define_register! {
    /// Instruction cache invalidate all to the point of unification.
    /// The written value is ignored.
    pub mod iciallu: Scb, "ICIALLU" @ 0x250, U32, WriteOnly;
}

define_register! {
    /// Instruction cache invalidate by address to the point of unification.
    pub mod icimvau: Scb, "ICIMVAU" @ 0x258, U32, WriteOnly;

    ADDRESS: WriteOnly = 31, 0;
}

define_register! {
    /// Data cache invalidate by address to the point of coherency.
    pub mod dcimvac: Scb, "DCIMVAC" @ 0x25C, U32, WriteOnly;

    ADDRESS: WriteOnly = 31, 0;
}

define_register! {
    /// Data cache invalidate by set and way.
    pub mod dcisw: Scb, "DCISW" @ 0x260, U32, WriteOnly;

    WAY: WriteOnly = 31, 30;
    SET: WriteOnly = 13, 5;
}

define_register! {
    /// Data cache clean by address to the point of unification.
    pub mod dccmvau: Scb, "DCCMVAU" @ 0x264, U32, WriteOnly;

    ADDRESS: WriteOnly = 31, 0;
}

define_register! {
    /// Data cache clean by address to the point of coherency.
    pub mod dccmvac: Scb, "DCCMVAC" @ 0x268, U32, WriteOnly;

    ADDRESS: WriteOnly = 31, 0;
}

define_register! {
    /// Data cache clean by set and way.
    pub mod dccsw: Scb, "DCCSW" @ 0x26C, U32, WriteOnly;

    WAY: WriteOnly = 31, 30;
    SET: WriteOnly = 13, 5;
}

define_register! {
    /// Data cache clean and invalidate by address to the point of coherency.
    pub mod dccimvac: Scb, "DCCIMVAC" @ 0x270, U32, WriteOnly;

    ADDRESS: WriteOnly = 31, 0;
}

define_register! {
    /// Data cache clean and invalidate by set and way.
    pub mod dccisw: Scb, "DCCISW" @ 0x274, U32, WriteOnly;

    WAY: WriteOnly = 31, 30;
    SET: WriteOnly = 13, 5;
}

define_register! {
    /// Branch predictor invalidate all. The written value is ignored.
    pub mod bpiall: Scb, "BPIALL" @ 0x278, U32, WriteOnly;
}

define_register! {
    /// Instruction TCM Control Register
    pub mod itcmcr: Scb, "ITCMCR" @ 0x290, U32, ReadWrite;

    /// TCM size, see [`TcmSize`](super::TcmSize).
    SZ: ReadOnly = 6, 3;
    /// Retry phase enable.
    RETEN: ReadWrite = 2, 2;
    /// Read-modify-write enable.
    RMW: ReadWrite = 1, 1;
    /// TCM enable.
    EN: ReadWrite = 0, 0;
}

define_register! {
    /// Data TCM Control Register
    pub mod dtcmcr: Scb, "DTCMCR" @ 0x294, U32, ReadWrite;

    /// TCM size, see [`TcmSize`](super::TcmSize).
    SZ: ReadOnly = 6, 3;
    RETEN: ReadWrite = 2, 2;
    RMW: ReadWrite = 1, 1;
    EN: ReadWrite = 0, 0;
}

define_register! {
    /// AHBP Control Register
    pub mod ahbpcr: Scb, "AHBPCR" @ 0x298, U32, ReadWrite;

    /// AHBP size, `0b001` for 64MB up to `0b100` for 512MB.
    SZ: ReadOnly = 3, 1;
    /// AHBP enable.
    EN: ReadWrite = 0, 0;
}

define_register! {
    /// L1 Cache Control Register
    pub mod cacr: Scb, "CACR" @ 0x29C, U32, ReadWrite;

    /// Force write-through in the data cache.
    FORCEWT: ReadWrite = 2, 2;
    /// ECC enable in the caches.
    ECCEN: ReadWrite = 1, 1;
    /// Shared cacheable-is-write-through.
    SIWT: ReadWrite = 0, 0;
}

define_register! {
    /// AHB Slave Control Register
    pub mod ahbscr: Scb, "AHBSCR" @ 0x2A0, U32, ReadWrite;

    /// Fairness counter initialization value.
    INITCOUNT: ReadWrite = 15, 11;
    /// Threshold execution priority for AHBS traffic demotion.
    TPRI: ReadWrite = 10, 2;
    /// AHBS prioritization control.
    CTL: ReadWrite = 1, 0;
}

define_register! {
    /// Auxiliary Bus Fault Status Register
    pub mod abfsr: Scb, "ABFSR" @ 0x2A8, U32, ReadWrite;

    /// Type of the AXIM response, only valid with `AXIM` set.
    AXIMTYPE: ReadWrite = 9, 8;
    EPPB: ReadWrite = 4, 4;
    AXIM: ReadWrite = 3, 3;
    AHBP: ReadWrite = 2, 2;
    DTCM: ReadWrite = 1, 1;
    ITCM: ReadWrite = 0, 0;
}

/// Implementer code of ARM in CPUID.
pub const IMPLEMENTER_ARM: u32 = 0x41;

/// Architecture code of ARMv7-M in CPUID.
pub const ARCHITECTURE_ARMV7M: u32 = 0xF;

/// Part number of the Cortex-M7 in CPUID.
pub const PARTNO_CORTEX_M7: u32 = 0xC27;

/// Access rights of a coprocessor in CPACR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum CoprocessorAccess {
    /// Any access generates a NOCP UsageFault.
    Denied = 0b00,
    /// Privileged access only.
    Privileged = 0b01,
    /// Full access.
    Full = 0b11,
}

/// Cache type of one level in CLIDR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum CacheType {
    None = 0b000,
    InstructionOnly = 0b001,
    DataOnly = 0b010,
    Separate = 0b011,
    Unified = 0b100,
}

/// Size of a TCM in ITCMCR and DTCMCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum TcmSize {
    None = 0b0000,
    Kb4 = 0b0011,
    Kb8 = 0b0100,
    Kb16 = 0b0101,
    Kb32 = 0b0110,
    Kb64 = 0b0111,
    Kb128 = 0b1000,
    Kb256 = 0b1001,
    Kb512 = 0b1010,
    Kb1024 = 0b1011,
    Kb2048 = 0b1100,
    Kb4096 = 0b1101,
    Kb8192 = 0b1110,
    Kb16384 = 0b1111,
}

impl TcmSize {
    /// The size in bytes.
    pub fn bytes(self) -> u32 {
        match self {
            TcmSize::None => 0,
            // 0b0011 is 4KB, every step doubles.
            size => 1024 << (size as u32 - 1),
        }
    }
}

memory_mapped_bitfield_register! {
    /// CPUID Base Register, CPUID (see armv7-M Architecture Reference Manual B3.2.3)
    pub struct Cpuid(u32);
    cpuid::REGISTER: Scb, ReadOnly;
    impl From;
    pub u8, implementer, _: 31, 24;
    pub u8, variant, _: 23, 20;
    pub u8, architecture, _: 19, 16;
    pub u16, partno, _: 15, 4;
    pub u8, revision, _: 3, 0;
}

memory_mapped_bitfield_register! {
    /// Application Interrupt and Reset Control Register, AIRCR (see armv7-M Architecture Reference Manual B3.2.6)
    ///
    /// [`Aircr::vectkey`] must be called before this register can effectively be written!
    pub struct Aircr(u32);
    aircr::REGISTER: Scb, ReadWrite;
    impl From;
    u32, get_vectkeystat, set_vectkey: 31, 16;
    /// Data endianness, `false` for little endian.
    pub endianness, _: 15;
    /// Priority grouping, indicates the binary point position.
    pub u8, prigroup, set_prigroup: 10, 8;
    /// Request a system reset. The reset is IMPLEMENTATION DEFINED in scope but
    /// always includes a local reset of the processor.
    pub _, set_sysresetreq: 2;
    /// Clear all active state information. Only valid in debug state.
    pub _, set_vectclractive: 1;
    /// Local system reset. Only valid in debug state.
    pub _, set_vectreset: 0;
}

impl Aircr {
    /// Set the vector key so that a store of this value takes effect.
    pub fn vectkey(&mut self) {
        self.set_vectkey(VECTKEY_VALUE);
    }

    /// Whether the vector key reads back with its documented value.
    pub fn vectkeystat(&self) -> bool {
        self.get_vectkeystat() == VECTKEYSTAT_VALUE
    }
}

/// Request a system reset through AIRCR.
///
/// The priority grouping is kept. AIRCR is loaded once and stored once, with
/// the vector key in the same store.
pub fn request_system_reset<M>(memory: &mut M) -> Result<(), Error>
where
    M: MemoryInterface + ?Sized,
{
    tracing::debug!("Requesting system reset");

    Aircr::modify(memory, |aircr| {
        aircr.vectkey();
        aircr.set_sysresetreq(true);
    })?;

    Ok(())
}

/// Set the priority grouping in AIRCR, keeping the other settings.
pub fn set_priority_grouping<M>(memory: &mut M, prigroup: u8) -> Result<(), Error>
where
    M: MemoryInterface + ?Sized,
{
    Aircr::modify(memory, |aircr| {
        aircr.vectkey();
        aircr.set_prigroup(prigroup);
    })?;

    Ok(())
}

/// Identification of the processor, decoded from CPUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoreInfo {
    pub implementer: u8,
    pub variant: u8,
    pub architecture: u8,
    pub part: u16,
    pub revision: u8,
}

impl CoreInfo {
    /// Reads and decodes CPUID.
    pub fn read<M>(memory: &mut M) -> Result<Self, Error>
    where
        M: MemoryInterface + ?Sized,
    {
        let info = Self::from(Cpuid::load(memory)?);
        tracing::debug!("Core: {}", info);
        Ok(info)
    }

    /// Whether this is an ARM Cortex-M7.
    pub fn is_cortex_m7(&self) -> bool {
        u32::from(self.implementer) == IMPLEMENTER_ARM && u32::from(self.part) == PARTNO_CORTEX_M7
    }
}

impl From<Cpuid> for CoreInfo {
    fn from(cpuid: Cpuid) -> Self {
        CoreInfo {
            implementer: cpuid.implementer(),
            variant: cpuid.variant(),
            architecture: cpuid.architecture(),
            part: cpuid.partno(),
            revision: cpuid.revision(),
        }
    }
}

impl std::fmt::Display for CoreInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if u32::from(self.implementer) == IMPLEMENTER_ARM {
            write!(f, "ARM ")?;
        } else {
            write!(f, "implementer {:#04x} ", self.implementer)?;
        }

        if self.is_cortex_m7() {
            write!(f, "Cortex-M7")?;
        } else {
            write!(f, "part {:#05x}", self.part)?;
        }

        write!(f, " r{}p{}", self.variant, self.revision)
    }
}

/// A fault reported by CFSR or HFSR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Fault {
    InstructionAccessViolation,
    DataAccessViolation,
    MemManageUnstacking,
    MemManageStacking,
    MemManageLazyFpStacking,
    InstructionBusError,
    PreciseDataBusError,
    ImpreciseDataBusError,
    BusFaultUnstacking,
    BusFaultStacking,
    BusFaultLazyFpStacking,
    UndefinedInstruction,
    InvalidState,
    InvalidPc,
    NoCoprocessor,
    Unaligned,
    DivideByZero,
    DebugEvent,
    Forced,
    VectorTableRead,
}

type FaultBit = crate::register::Field<Scb, crate::register::WriteOneToClear>;

const CFSR_FAULTS: [(FaultBit, Fault); 17] = [
    (cfsr::IACCVIOL, Fault::InstructionAccessViolation),
    (cfsr::DACCVIOL, Fault::DataAccessViolation),
    (cfsr::MUNSTKERR, Fault::MemManageUnstacking),
    (cfsr::MSTKERR, Fault::MemManageStacking),
    (cfsr::MLSPERR, Fault::MemManageLazyFpStacking),
    (cfsr::IBUSERR, Fault::InstructionBusError),
    (cfsr::PRECISERR, Fault::PreciseDataBusError),
    (cfsr::IMPRECISERR, Fault::ImpreciseDataBusError),
    (cfsr::UNSTKERR, Fault::BusFaultUnstacking),
    (cfsr::STKERR, Fault::BusFaultStacking),
    (cfsr::LSPERR, Fault::BusFaultLazyFpStacking),
    (cfsr::UNDEFINSTR, Fault::UndefinedInstruction),
    (cfsr::INVSTATE, Fault::InvalidState),
    (cfsr::INVPC, Fault::InvalidPc),
    (cfsr::NOCP, Fault::NoCoprocessor),
    (cfsr::UNALIGNED, Fault::Unaligned),
    (cfsr::DIVBYZERO, Fault::DivideByZero),
];

const HFSR_FAULTS: [(FaultBit, Fault); 3] = [
    (hfsr::DEBUGEVT, Fault::DebugEvent),
    (hfsr::FORCED, Fault::Forced),
    (hfsr::VECTTBL, Fault::VectorTableRead),
];

/// The latched fault status of the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultStatus {
    /// The raw CFSR value.
    pub cfsr: u32,
    /// The raw HFSR value.
    pub hfsr: u32,
    /// The MemManage fault address, if MMFAR is valid.
    pub mmfar: Option<u32>,
    /// The bus fault address, if BFAR is valid.
    pub bfar: Option<u32>,
}

impl FaultStatus {
    /// Reads CFSR and HFSR once each. The fault address registers are only read
    /// when CFSR marks them valid.
    pub fn read<M>(memory: &mut M) -> Result<Self, Error>
    where
        M: MemoryInterface + ?Sized,
    {
        let cfsr = cfsr::REGISTER.read(memory)?;
        let hfsr = hfsr::REGISTER.read(memory)?;

        let mmfar = match cfsr::MMARVALID.extract(cfsr) {
            0 => None,
            _ => Some(mmfar::REGISTER.read(memory)?),
        };
        let bfar = match cfsr::BFARVALID.extract(cfsr) {
            0 => None,
            _ => Some(bfar::REGISTER.read(memory)?),
        };

        let status = FaultStatus {
            cfsr,
            hfsr,
            mmfar,
            bfar,
        };

        if status.is_faulted() {
            tracing::debug!("Latched faults: {:?}", status.faults());
        }

        Ok(status)
    }

    /// Whether any fault bit is set.
    pub fn is_faulted(&self) -> bool {
        !self.faults().is_empty()
    }

    /// The faults with their status bit set.
    pub fn faults(&self) -> Vec<Fault> {
        let cfsr = CFSR_FAULTS
            .iter()
            .filter(|(bit, _)| bit.extract(self.cfsr) != 0);
        let hfsr = HFSR_FAULTS
            .iter()
            .filter(|(bit, _)| bit.extract(self.hfsr) != 0);

        cfsr.chain(hfsr).map(|(_, fault)| *fault).collect()
    }

    /// Clears exactly the bits that were set when the status was read.
    ///
    /// Bits that became set after [`FaultStatus::read`] stay latched.
    pub fn clear<M>(&self, memory: &mut M) -> Result<(), Error>
    where
        M: MemoryInterface + ?Sized,
    {
        if self.cfsr != 0 {
            cfsr::REGISTER.write(memory, self.cfsr)?;
        }
        if self.hfsr != 0 {
            hfsr::REGISTER.write(memory, self.hfsr)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::RegisterWidth;
    use crate::test::{MockMemory, Transaction};
    use num_traits::FromPrimitive;
    use pretty_assertions::assert_eq;

    fn scb_memory() -> MockMemory {
        let mut memory = MockMemory::new();
        memory.add_word_range(Scb::BASE, &[0; 0x2AC / 4]);
        memory
    }

    #[test]
    fn block_size_matches_layout() {
        assert_eq!(Scb::SIZE, 0x2AC);
        assert_eq!(aircr::REGISTER.info().address(Scb::BASE), 0xE000_ED0C);
        assert_eq!(iciallu::REGISTER.info().address(Scb::BASE), 0xE000_EF50);
        assert_eq!(abfsr::REGISTER.info().address(Scb::BASE), 0xE000_EFA8);
    }

    #[test]
    fn registers_do_not_overlap() {
        let mut registers = Scb::REGISTERS.to_vec();
        registers.sort_by_key(|r| r.offset());

        for pair in registers.windows(2) {
            let end = pair[0].offset()
                + (pair[0].count() - 1) * pair[0].stride()
                + pair[0].width().bytes();
            assert!(
                end <= pair[1].offset(),
                "{} overlaps {}",
                pair[0].name(),
                pair[1].name()
            );
        }
    }

    #[test]
    fn vectkey_write_keeps_low_half() {
        let mut memory = scb_memory();
        memory.write_u32(Scb::BASE + 0x0C, 0x0000_0002);

        aircr::VECTKEY.write(&mut memory, VECTKEY_VALUE).unwrap();

        assert_eq!(memory.read_u32(Scb::BASE + 0x0C), 0x05FA_0002);
    }

    #[test]
    fn system_reset_request_carries_key_and_priority_grouping() {
        let mut memory = scb_memory();
        memory.write_u32(Scb::BASE + 0x0C, 0xFA05_0300);

        request_system_reset(&mut memory).unwrap();

        assert_eq!(
            memory.transactions(),
            &[
                Transaction::Read {
                    address: 0xE000_ED0C,
                    width: RegisterWidth::U32
                },
                Transaction::Write {
                    address: 0xE000_ED0C,
                    width: RegisterWidth::U32,
                    value: 0x05FA_0304
                },
            ]
        );
    }

    #[test]
    fn priority_grouping() {
        let mut memory = scb_memory();
        memory.write_u32(Scb::BASE + 0x0C, 0xFA05_0000);

        set_priority_grouping(&mut memory, 5).unwrap();

        let aircr = Aircr::from(memory.read_u32(Scb::BASE + 0x0C));
        assert_eq!(aircr.prigroup(), 5);
        assert_eq!(aircr.get_vectkeystat(), VECTKEY_VALUE);
        assert!(Aircr::from(0xFA05_0000).vectkeystat());
    }

    #[test]
    fn priority_grouping_field_has_no_unkeyed_write_path() {
        let mut memory = scb_memory();
        memory.write_u32(Scb::BASE + 0x0C, 0xFA05_0300);

        assert_eq!(aircr::PRIGROUP.read(&mut memory).unwrap(), 3);
        assert!(matches!(
            crate::register::write_field(&mut memory, Scb::BASE, &aircr::PRIGROUP.descriptor(), 5),
            Err(Error::NotWritable { name: "PRIGROUP" })
        ));
        assert_eq!(memory.transactions().len(), 1);
    }

    #[test]
    fn cortex_m7_cpuid() {
        let mut memory = MockMemory::new();
        memory.add_word_range(Scb::BASE, &[0x411F_C272]);

        let info = CoreInfo::read(&mut memory).unwrap();

        assert_eq!(
            info,
            CoreInfo {
                implementer: 0x41,
                variant: 1,
                architecture: 0xF,
                part: 0xC27,
                revision: 2,
            }
        );
        assert!(info.is_cortex_m7());
        assert_eq!(info.to_string(), "ARM Cortex-M7 r1p2");

        assert_eq!(cpuid::PARTNO.read(&mut memory).unwrap(), PARTNO_CORTEX_M7);
        assert_eq!(cpuid::ARCHITECTURE.read(&mut memory).unwrap(), ARCHITECTURE_ARMV7M);
    }

    #[test]
    fn unknown_core_display() {
        let info = CoreInfo::from(Cpuid::from(0x410F_C241));
        assert!(!info.is_cortex_m7());
        assert_eq!(info.to_string(), "ARM part 0xc24 r0p1");
    }

    #[test]
    fn byte_views_of_cfsr() {
        assert_eq!(mmfsr::REGISTER.info().offset(), 0x28);
        assert_eq!(bfsr::REGISTER.info().offset(), 0x29);

        // STKERR is bit 4 of BFSR, bit 12 of CFSR.
        assert_eq!(bfsr::STKERR.descriptor().bit_offset(), 4);
        assert_eq!(cfsr::STKERR.descriptor().bit_offset(), 12);

        // UFSR bits are absolute CFSR positions.
        assert_eq!(cfsr::UNDEFINSTR.descriptor().bit_offset(), 16);
        assert_eq!(cfsr::DIVBYZERO.descriptor().bit_offset(), 25);
    }

    #[test]
    fn clearing_one_fault_bit_does_not_read() {
        let mut memory = scb_memory();
        memory.write_u32(Scb::BASE + 0x28, 0x0200_8200);

        cfsr::PRECISERR.write(&mut memory, 1).unwrap();

        assert_eq!(
            memory.transactions(),
            &[Transaction::Write {
                address: 0xE000_ED28,
                width: RegisterWidth::U32,
                value: 0x0000_0200
            }]
        );
    }

    #[test]
    fn clearing_through_byte_view() {
        let mut memory = scb_memory();
        bfsr::STKERR.write(&mut memory, 1).unwrap();

        assert_eq!(
            memory.transactions(),
            &[Transaction::Write {
                address: 0xE000_ED29,
                width: RegisterWidth::U8,
                value: 0x10
            }]
        );
    }

    #[test]
    fn fault_status_decode_and_clear() {
        let mut memory = scb_memory();
        // PRECISERR, BFARVALID, DIVBYZERO and FORCED.
        memory.write_u32(Scb::BASE + 0x28, 0x0200_8200);
        memory.write_u32(Scb::BASE + 0x2C, 0x4000_0000);
        memory.write_u32(Scb::BASE + 0x38, 0x2001_0000);

        let status = FaultStatus::read(&mut memory).unwrap();

        assert_eq!(
            status.faults(),
            vec![
                Fault::PreciseDataBusError,
                Fault::DivideByZero,
                Fault::Forced
            ]
        );
        assert_eq!(status.bfar, Some(0x2001_0000));
        assert_eq!(status.mmfar, None);

        memory.clear_transactions();
        status.clear(&mut memory).unwrap();

        assert_eq!(
            memory.transactions(),
            &[
                Transaction::Write {
                    address: 0xE000_ED28,
                    width: RegisterWidth::U32,
                    value: 0x0200_8200
                },
                Transaction::Write {
                    address: 0xE000_ED2C,
                    width: RegisterWidth::U32,
                    value: 0x4000_0000
                },
            ]
        );
    }

    #[test]
    fn no_faults() {
        let mut memory = scb_memory();
        let status = FaultStatus::read(&mut memory).unwrap();

        assert!(!status.is_faulted());
        // MMFAR and BFAR are not read without their valid bits.
        assert_eq!(memory.transactions().len(), 2);
    }

    #[test]
    fn system_handler_priority_bytes() {
        let mut memory = scb_memory();

        // PendSV is exception 14.
        shpr::PRI.at(14 - 4).write(&mut memory, 0xF0).unwrap();
        shpr1::PRI_5.write(&mut memory, 0x20).unwrap();

        assert_eq!(shpr3::PRI_14.read(&mut memory).unwrap(), 0xF0);
        assert_eq!(shpr::PRI.at(1).read(&mut memory).unwrap(), 0x20);
        assert_eq!(memory.read_u32(Scb::BASE + 0x20), 0x00F0_0000);
    }

    #[test]
    fn coprocessor_access_enum() {
        let mut memory = scb_memory();
        memory.write_u32(Scb::BASE + 0x88, 0x00F0_0000);

        assert_eq!(
            cpacr::CP10.read_as::<CoprocessorAccess, _>(&mut memory).unwrap(),
            CoprocessorAccess::Full
        );

        cpacr::CP11.write(&mut memory, 0b10).unwrap();
        let error = cpacr::CP11
            .read_as::<CoprocessorAccess, _>(&mut memory)
            .unwrap_err();
        assert!(matches!(
            error,
            Error::UnknownValue {
                name: "CP11",
                value: 0b10
            }
        ));
    }

    #[test]
    fn tcm_sizes() {
        assert_eq!(TcmSize::from_u32(0b0011).map(TcmSize::bytes), Some(4 * 1024));
        assert_eq!(TcmSize::Kb128.bytes(), 128 * 1024);
        assert_eq!(TcmSize::Kb16384.bytes(), 16 * 1024 * 1024);
        assert_eq!(TcmSize::None.bytes(), 0);
    }
}
