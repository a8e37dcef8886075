//! Embedded Trace Macrocell of the Cortex-M7, an ETMv4.0 implementation.
//!
//! For the register descriptions see the Arm Embedded Trace Macrocell
//! Architecture Specification ETMv4.0 to ETMv4.6, chapter 7.
use super::{CoreSightComponent, CoreSightManagement};
use crate::memory::MemoryInterface;
use crate::register::{MemoryMappedRegister, Peripheral, RegisterInfo};
use crate::Error;
use enum_primitive_derive::Primitive;

/// The ETM at `0xE004_1000`.
#[derive(Debug)]
pub struct Etm;

/// Byte layout of the ETM.
#[repr(C)]
pub struct EtmRegisterBlock {
    _reserved0: u32,
    pub prgctlr: u32,
    _reserved1: u32,
    pub statr: u32,
    pub configr: u32,
    _reserved2: [u32; 3],
    pub eventctl0r: u32,
    pub eventctl1r: u32,
    _reserved3: u32,
    pub stallctlr: u32,
    pub tsctlr: u32,
    pub syncpr: u32,
    pub ccctlr: u32,
    _reserved4: u32,
    pub traceidr: u32,
    _reserved5: [u32; 15],
    pub victlr: u32,
    pub viiectlr: u32,
    pub vissctlr: u32,
    pub vipcssctlr: u32,
    _reserved6: [u32; 44],
    pub cntrldvr0: u32,
    _reserved7: [u32; 15],
    pub idr8: u32,
    pub idr9: u32,
    pub idr10: u32,
    pub idr11: u32,
    pub idr12: u32,
    pub idr13: u32,
    _reserved8: [u32; 10],
    pub imspec0: u32,
    _reserved9: [u32; 7],
    pub idr0: u32,
    pub idr1: u32,
    pub idr2: u32,
    pub idr3: u32,
    pub idr4: u32,
    pub idr5: u32,
    _reserved10: [u32; 4],
    pub rsctlr2: u32,
    pub rsctlr3: u32,
    _reserved11: [u32; 28],
    pub ssccr0: u32,
    _reserved12: [u32; 7],
    pub sscsr0: u32,
    _reserved13: [u32; 7],
    pub sspcicr0: u32,
    _reserved14: [u32; 19],
    pub pdcr: u32,
    pub pdsr: u32,
    _reserved15: [u32; 802],
    pub claimset: u32,
    pub claimclr: u32,
    _reserved16: [u32; 2],
    pub management: CoreSightManagement,
}

impl Peripheral for Etm {
    const NAME: &'static str = "ETM";
    const BASE: u64 = 0xE004_1000;
    const SIZE: u64 = std::mem::size_of::<EtmRegisterBlock>() as u64;
    const REGISTERS: &'static [RegisterInfo] = &[
        prgctlr::REGISTER.info(),
        statr::REGISTER.info(),
        configr::REGISTER.info(),
        eventctl0r::REGISTER.info(),
        eventctl1r::REGISTER.info(),
        stallctlr::REGISTER.info(),
        tsctlr::REGISTER.info(),
        syncpr::REGISTER.info(),
        ccctlr::REGISTER.info(),
        traceidr::REGISTER.info(),
        victlr::REGISTER.info(),
        viiectlr::REGISTER.info(),
        vissctlr::REGISTER.info(),
        vipcssctlr::REGISTER.info(),
        cntrldvr0::REGISTER.info(),
        idr8::REGISTER.info(),
        idr9::REGISTER.info(),
        idr10::REGISTER.info(),
        idr11::REGISTER.info(),
        idr12::REGISTER.info(),
        idr13::REGISTER.info(),
        imspec0::REGISTER.info(),
        idr0::REGISTER.info(),
        idr1::REGISTER.info(),
        idr2::REGISTER.info(),
        idr3::REGISTER.info(),
        idr4::REGISTER.info(),
        idr5::REGISTER.info(),
        rsctlr2::REGISTER.info(),
        rsctlr3::REGISTER.info(),
        ssccr0::REGISTER.info(),
        sscsr0::REGISTER.info(),
        sspcicr0::REGISTER.info(),
        pdcr::REGISTER.info(),
        pdsr::REGISTER.info(),
        claimset::REGISTER.info(),
        claimclr::REGISTER.info(),
        super::CoreSightRegisters::<Etm>::LAR.info(),
        super::CoreSightRegisters::<Etm>::LSR.info(),
        authstatus::REGISTER.info(),
        devarch::REGISTER.info(),
        devid::REGISTER.info(),
        devtype::REGISTER.info(),
        super::CoreSightRegisters::<Etm>::PIDR[4].info(),
        super::CoreSightRegisters::<Etm>::PIDR[5].info(),
        super::CoreSightRegisters::<Etm>::PIDR[6].info(),
        super::CoreSightRegisters::<Etm>::PIDR[7].info(),
        super::CoreSightRegisters::<Etm>::PIDR[0].info(),
        super::CoreSightRegisters::<Etm>::PIDR[1].info(),
        super::CoreSightRegisters::<Etm>::PIDR[2].info(),
        super::CoreSightRegisters::<Etm>::PIDR[3].info(),
        super::CoreSightRegisters::<Etm>::CIDR[0].info(),
        super::CoreSightRegisters::<Etm>::CIDR[1].info(),
        super::CoreSightRegisters::<Etm>::CIDR[2].info(),
        super::CoreSightRegisters::<Etm>::CIDR[3].info(),
    ];
}

impl CoreSightComponent for Etm {}

assert_layout!(EtmRegisterBlock:
    prgctlr, statr, configr, eventctl0r, eventctl1r, stallctlr, tsctlr, syncpr, ccctlr,
    traceidr, victlr, viiectlr, vissctlr, vipcssctlr, cntrldvr0, idr8, idr9, idr10, idr11,
    idr12, idr13, imspec0, idr0, idr1, idr2, idr3, idr4, idr5, rsctlr2, rsctlr3, ssccr0,
    sscsr0, sspcicr0, pdcr, pdsr, claimset, claimclr,
);
assert_layout!(EtmRegisterBlock.management: CoreSightManagement =>
    authstatus, devarch, devid, devtype
);
static_assertions::const_assert_eq!(
    std::mem::offset_of!(EtmRegisterBlock, management),
    super::MANAGEMENT_OFFSET
);

define_register! {
    /// Programming Control Register
    pub mod prgctlr: Etm, "TRCPRGCTLR" @ 0x004, U32, ReadWrite;

    /// Trace unit enable. Only program the other registers while this is `0`
    /// and `TRCSTATR.IDLE` is `1`.
    EN: ReadWrite = 0, 0;
}

define_register! {
    /// Status Register
    pub mod statr: Etm, "TRCSTATR" @ 0x00C, U32, ReadOnly;

    /// The programmers' model is stable.
    PMSTABLE: ReadOnly = 1, 1;
    /// The trace unit is idle.
    IDLE: ReadOnly = 0, 0;
}

define_register! {
    /// Trace Configuration Register
    pub mod configr: Etm, "TRCCONFIGR" @ 0x010, U32, ReadWrite;

    /// Return stack enable.
    RS: ReadWrite = 12, 12;
    /// Global timestamp tracing.
    TS: ReadWrite = 11, 11;
    /// Conditional instruction tracing, see [`ConditionalTracing`](super::ConditionalTracing).
    COND: ReadWrite = 10, 8;
    /// Cycle counting in the instruction trace.
    CCI: ReadWrite = 4, 4;
    /// Branch broadcast mode.
    BB: ReadWrite = 3, 3;
}

define_register! {
    /// Event Control 0 Register
    pub mod eventctl0r: Etm, "TRCEVENTCTL0R" @ 0x020, U32, ReadWrite;

    EVENT1_TYPE: ReadWrite = 15, 15;
    EVENT1_SEL: ReadWrite = 11, 8;
    EVENT0_TYPE: ReadWrite = 7, 7;
    EVENT0_SEL: ReadWrite = 3, 0;
}

define_register! {
    /// Event Control 1 Register
    pub mod eventctl1r: Etm, "TRCEVENTCTL1R" @ 0x024, U32, ReadWrite;

    /// Low-power state behavior override.
    LPOVERRIDE: ReadWrite = 12, 12;
    /// ATB trigger enable.
    ATB: ReadWrite = 11, 11;
    /// Event element enable, one bit per event.
    INSTEN: ReadWrite = 3, 0;
}

define_register! {
    /// Stall Control Register
    pub mod stallctlr: Etm, "TRCSTALLCTLR" @ 0x02C, U32, ReadWrite;

    /// Stall the processor to avoid instruction trace overflow.
    ISTALL: ReadWrite = 8, 8;
    /// Threshold level for stalling, higher values stall more.
    LEVEL: ReadWrite = 3, 2;
}

define_register! {
    /// Global Timestamp Control Register
    pub mod tsctlr: Etm, "TRCTSCTLR" @ 0x030, U32, ReadWrite;

    EVENT_TYPE: ReadWrite = 7, 7;
    EVENT_SEL: ReadWrite = 3, 0;
}

define_register! {
    /// Synchronization Period Register
    pub mod syncpr: Etm, "TRCSYNCPR" @ 0x034, U32, ReadWrite;

    /// Trace synchronization every `2^PERIOD` bytes of trace.
    PERIOD: ReadWrite = 4, 0;
}

define_register! {
    /// Cycle Count Control Register
    pub mod ccctlr: Etm, "TRCCCCTLR" @ 0x038, U32, ReadWrite;

    /// Minimum cycle count in a cycle count packet.
    THRESHOLD: ReadWrite = 11, 0;
}

define_register! {
    /// Trace ID Register
    pub mod traceidr: Etm, "TRCTRACEIDR" @ 0x040, U32, ReadWrite;

    /// Trace ID driven on the ATB bus. `0x00` and `0x70` to `0x7F` are reserved.
    TRACEID: ReadWrite = 6, 0;
}

define_register! {
    /// ViewInst Main Control Register
    pub mod victlr: Etm, "TRCVICTLR" @ 0x080, U32, ReadWrite;

    EXLEVEL_S3: ReadWrite = 19, 19;
    EXLEVEL_S0: ReadWrite = 16, 16;
    /// Always trace exceptions or resets that make the trace unit lose trace.
    TRCERR: ReadWrite = 11, 11;
    /// Always trace a reset exception.
    TRCRESET: ReadWrite = 10, 10;
    /// State of the start/stop logic.
    SSSTATUS: ReadWrite = 9, 9;
    /// Resource type of the ViewInst event.
    TYPE: ReadWrite = 7, 7;
    /// Resource selector of the ViewInst event.
    SEL: ReadWrite = 3, 0;
}

define_register! {
    /// ViewInst Include/Exclude Control Register
    pub mod viiectlr: Etm, "TRCVIIECTLR" @ 0x084, U32, ReadWrite;

    EXCLUDE: ReadWrite = 23, 16;
    INCLUDE: ReadWrite = 7, 0;
}

define_register! {
    /// ViewInst Start/Stop Control Register
    pub mod vissctlr: Etm, "TRCVISSCTLR" @ 0x088, U32, ReadWrite;

    STOP: ReadWrite = 23, 16;
    START: ReadWrite = 7, 0;
}

define_register! {
    /// ViewInst Start/Stop PE Comparator Control Register
    ///
    /// Selects DWT comparators as start and stop points.
    pub mod vipcssctlr: Etm, "TRCVIPCSSCTLR" @ 0x08C, U32, ReadWrite;

    STOP: ReadWrite = 19, 16;
    START: ReadWrite = 3, 0;
}

define_register! {
    /// Counter Reload Value Register 0
    pub mod cntrldvr0: Etm, "TRCCNTRLDVR0" @ 0x140, U32, ReadWrite;

    VALUE: ReadWrite = 15, 0;
}

define_register! {
    /// ID Register 8
    pub mod idr8: Etm, "TRCIDR8" @ 0x180, U32, ReadOnly;

    /// Maximum speculation depth.
    MAXSPEC: ReadOnly = 31, 0;
}

define_register! {
    /// ID Register 9
    pub mod idr9: Etm, "TRCIDR9" @ 0x184, U32, ReadOnly;

    NUMP0KEY: ReadOnly = 31, 0;
}

define_register! {
    /// ID Register 10
    pub mod idr10: Etm, "TRCIDR10" @ 0x188, U32, ReadOnly;

    NUMP1KEY: ReadOnly = 31, 0;
}

define_register! {
    /// ID Register 11
    pub mod idr11: Etm, "TRCIDR11" @ 0x18C, U32, ReadOnly;

    NUMP1SPC: ReadOnly = 31, 0;
}

define_register! {
    /// ID Register 12
    pub mod idr12: Etm, "TRCIDR12" @ 0x190, U32, ReadOnly;

    NUMCONDKEY: ReadOnly = 31, 0;
}

define_register! {
    /// ID Register 13
    pub mod idr13: Etm, "TRCIDR13" @ 0x194, U32, ReadOnly;

    NUMCONDSPC: ReadOnly = 31, 0;
}

define_register! {
    /// Implementation Specific Register 0
    pub mod imspec0: Etm, "TRCIMSPEC0" @ 0x1C0, U32, ReadOnly;

    SUPPORT: ReadOnly = 3, 0;
}

define_register! {
    /// ID Register 0
    pub mod idr0: Etm, "TRCIDR0" @ 0x1E0, U32, ReadOnly;

    COMMOPT: ReadOnly = 29, 29;
    /// Global timestamp size, `0b00110` for 48 bits and `0b01000` for 64 bits.
    TSSIZE: ReadOnly = 28, 24;
    TRCEXDATA: ReadOnly = 17, 17;
    QSUPP: ReadOnly = 16, 15;
    QFILT: ReadOnly = 14, 14;
    CONDTYPE: ReadOnly = 13, 12;
    NUMEVENT: ReadOnly = 11, 10;
    RETSTACK: ReadOnly = 9, 9;
    TRCCCI: ReadOnly = 7, 7;
    TRCCOND: ReadOnly = 6, 6;
    TRCBB: ReadOnly = 5, 5;
    TRCDATA: ReadOnly = 4, 3;
    INSTP0: ReadOnly = 2, 1;
}

define_register! {
    /// ID Register 1
    pub mod idr1: Etm, "TRCIDR1" @ 0x1E4, U32, ReadOnly;

    /// Implementer code of the trace unit designer, `0x41` for ARM.
    DESIGNER: ReadOnly = 31, 24;
    TRCARCHMAJ: ReadOnly = 11, 8;
    TRCARCHMIN: ReadOnly = 7, 4;
    REVISION: ReadOnly = 3, 0;
}

define_register! {
    /// ID Register 2
    pub mod idr2: Etm, "TRCIDR2" @ 0x1E8, U32, ReadOnly;

    VMIDSIZE: ReadOnly = 14, 10;
    CIDSIZE: ReadOnly = 9, 5;
    /// Maximum instruction address size, `0x04` for 32 bits.
    IASIZE: ReadOnly = 4, 0;
}

define_register! {
    /// ID Register 3
    pub mod idr3: Etm, "TRCIDR3" @ 0x1EC, U32, ReadOnly;

    NOOVERFLOW: ReadOnly = 31, 31;
    NUMPROC: ReadOnly = 30, 28;
    SYSSTALL: ReadOnly = 27, 27;
    STALLCTL: ReadOnly = 26, 26;
    SYNCPR: ReadOnly = 25, 25;
    TRCERR: ReadOnly = 24, 24;
    EXLEVEL_S: ReadOnly = 19, 16;
    CCITMIN: ReadOnly = 11, 0;
}

define_register! {
    /// ID Register 4
    pub mod idr4: Etm, "TRCIDR4" @ 0x1F0, U32, ReadOnly;

    NUMVMIDC: ReadOnly = 31, 28;
    NUMCIDC: ReadOnly = 27, 24;
    NUMSSCC: ReadOnly = 23, 20;
    NUMRSPAIR: ReadOnly = 19, 16;
    NUMPC: ReadOnly = 15, 12;
    SUPPDAC: ReadOnly = 8, 8;
    NUMDVC: ReadOnly = 7, 4;
    NUMACPAIRS: ReadOnly = 3, 0;
}

define_register! {
    /// ID Register 5
    pub mod idr5: Etm, "TRCIDR5" @ 0x1F4, U32, ReadOnly;

    REDFUNCNTR: ReadOnly = 31, 31;
    NUMCNTR: ReadOnly = 30, 28;
    NUMSEQSTATE: ReadOnly = 27, 25;
    LPOVERRIDE: ReadOnly = 23, 23;
    ATBTRIG: ReadOnly = 22, 22;
    TRACEIDSIZE: ReadOnly = 21, 16;
    NUMEXTINSEL: ReadOnly = 11, 9;
    NUMEXTIN: ReadOnly = 8, 0;
}

define_register! {
    /// Resource Selection Control Register 2
    pub mod rsctlr2: Etm, "TRCRSCTLR2" @ 0x208, U32, ReadWrite;

    PAIRINV: ReadWrite = 21, 21;
    INV: ReadWrite = 20, 20;
    GROUP: ReadWrite = 18, 16;
    SELECT: ReadWrite = 7, 0;
}

define_register! {
    /// Resource Selection Control Register 3
    pub mod rsctlr3: Etm, "TRCRSCTLR3" @ 0x20C, U32, ReadWrite;

    PAIRINV: ReadWrite = 21, 21;
    INV: ReadWrite = 20, 20;
    GROUP: ReadWrite = 18, 16;
    SELECT: ReadWrite = 7, 0;
}

define_register! {
    /// Single-shot Comparator Control Register 0
    pub mod ssccr0: Etm, "TRCSSCCR0" @ 0x280, U32, ReadWrite;

    /// Re-arm the comparator after each match.
    RST: ReadWrite = 24, 24;
    ARC: ReadWrite = 23, 16;
    SAC: ReadWrite = 15, 0;
}

define_register! {
    /// Single-shot Comparator Status Register 0
    pub mod sscsr0: Etm, "TRCSSCSR0" @ 0x2A0, U32, ReadWrite;

    /// The comparator matched. Write `0` to re-arm.
    STATUS: ReadWrite = 31, 31;
    PC: ReadOnly = 3, 3;
    DV: ReadOnly = 2, 2;
    DA: ReadOnly = 1, 1;
    INST: ReadOnly = 0, 0;
}

define_register! {
    /// Single-shot PE Comparator Input Control Register 0
    pub mod sspcicr0: Etm, "TRCSSPCICR0" @ 0x2C0, U32, ReadWrite;

    PC: ReadWrite = 3, 0;
}

define_register! {
    /// Power Down Control Register
    pub mod pdcr: Etm, "TRCPDCR" @ 0x310, U32, ReadWrite;

    /// Keep the trace unit powered up.
    PU: ReadWrite = 3, 3;
}

define_register! {
    /// Power Down Status Register
    pub mod pdsr: Etm, "TRCPDSR" @ 0x314, U32, ReadOnly, volatile_read;

    /// The trace unit registers lost their state since the last read.
    STICKYPD: ReadOnly = 1, 1;
    /// The trace unit core power domain is powered up.
    POWER: ReadOnly = 0, 0;
}

define_register! {
    /// Claim Tag Set Register
    ///
    /// Reads return the implemented claim bits, so the field is written
    /// without reading the register.
    pub mod claimset: Etm, "TRCCLAIMSET" @ 0xFA0, U32, ReadWrite;

    SET: WriteOnly = 3, 0;
}

define_register! {
    /// Claim Tag Clear Register
    ///
    /// Reads return the current claim tag.
    pub mod claimclr: Etm, "TRCCLAIMCLR" @ 0xFA4, U32, WriteOneToClear;

    CLR: WriteOneToClear = 3, 0;
}

define_register! {
    /// Authentication Status Register
    pub mod authstatus: Etm, "TRCAUTHSTATUS" @ 0xFB8, U32, ReadOnly;

    SNID: ReadOnly = 7, 6;
    SID: ReadOnly = 5, 4;
    NSNID: ReadOnly = 3, 2;
    NSID: ReadOnly = 1, 0;
}

define_register! {
    /// Device Architecture Register
    pub mod devarch: Etm, "TRCDEVARCH" @ 0xFBC, U32, ReadOnly;

    ARCHITECT: ReadOnly = 31, 21;
    PRESENT: ReadOnly = 20, 20;
    REVISION: ReadOnly = 19, 16;
    ARCHID: ReadOnly = 15, 0;
}

define_register! {
    /// Device Configuration Register
    pub mod devid: Etm, "TRCDEVID" @ 0xFC8, U32, ReadOnly;
}

define_register! {
    /// Device Type Register
    pub mod devtype: Etm, "TRCDEVTYPE" @ 0xFCC, U32, ReadOnly;

    SUB: ReadOnly = 7, 4;
    MAJOR: ReadOnly = 3, 0;
}

/// Values of `TRCCONFIGR.COND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum ConditionalTracing {
    Disabled = 0b000,
    Loads = 0b001,
    Stores = 0b010,
    LoadsAndStores = 0b011,
    All = 0b111,
}

memory_mapped_bitfield_register! {
    /// Programming Control Register, TRCPRGCTLR
    pub struct PrgCtlr(u32);
    prgctlr::REGISTER: Etm, ReadWrite;
    impl From;
    pub en, set_en: 0;
}

memory_mapped_bitfield_register! {
    /// Status Register, TRCSTATR
    pub struct Statr(u32);
    statr::REGISTER: Etm, ReadOnly;
    impl From;
    pub pmstable, _: 1;
    pub idle, _: 0;
}

memory_mapped_bitfield_register! {
    /// Trace Configuration Register, TRCCONFIGR
    pub struct Configr(u32);
    configr::REGISTER: Etm, ReadWrite;
    impl From;
    // Return stack enable
    pub rs, set_rs: 12;
    // Global timestamping
    pub ts, set_ts: 11;
    // Conditional instruction tracing
    pub u8, cond, set_cond: 10, 8;
    // Cycle counting in instruction trace
    pub cci, set_cci: 4;
    // Branch broadcasting mode
    pub bb, set_bb: 3;
}

memory_mapped_bitfield_register! {
    /// Stall Control Register, TRCSTALLCTLR
    pub struct StallCtlr(u32);
    stallctlr::REGISTER: Etm, ReadWrite;
    impl From;
    pub istall, set_istall: 8;
    // Higher the level the more stall we get
    pub u8, level, set_level: 3, 2;
}

memory_mapped_bitfield_register! {
    /// Trace ID Register, TRCTRACEIDR
    pub struct TraceIdr(u32);
    traceidr::REGISTER: Etm, ReadWrite;
    impl From;
    pub u8, traceid, set_traceid: 6, 0;
}

memory_mapped_bitfield_register! {
    /// ID Register 1, TRCIDR1
    pub struct Idr1(u32);
    idr1::REGISTER: Etm, ReadOnly;
    impl From;
    pub u8, designer, _: 31, 24;
    pub u8, trcarchmaj, _: 11, 8;
    pub u8, trcarchmin, _: 7, 4;
    pub u8, revision, _: 3, 0;
}

/// Architecture version of the trace unit, from TRCIDR1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct EtmVersion {
    /// Implementer code, `0x41` for ARM.
    pub designer: u8,
    pub major: u8,
    pub minor: u8,
    /// Implementation revision.
    pub revision: u8,
}

impl EtmVersion {
    /// Reads TRCIDR1 once.
    pub fn read<M>(memory: &mut M) -> Result<Self, Error>
    where
        M: MemoryInterface + ?Sized,
    {
        let version = Self::from(Idr1::load(memory)?);
        tracing::debug!("{}", version);
        Ok(version)
    }
}

impl From<Idr1> for EtmVersion {
    fn from(idr1: Idr1) -> Self {
        EtmVersion {
            designer: idr1.designer(),
            major: idr1.trcarchmaj(),
            minor: idr1.trcarchmin(),
            revision: idr1.revision(),
        }
    }
}

impl std::fmt::Display for EtmVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ETMv{}.{} rev {}", self.major, self.minor, self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::arm::component::{ComponentClass, ARM_JEP106};
    use crate::register::{dump, RegisterWidth};
    use crate::test::{MockMemory, Transaction};
    use pretty_assertions::assert_eq;

    fn etm_memory() -> MockMemory {
        let mut memory = MockMemory::new();
        memory.add_word_range(Etm::BASE, &[0; 0x320 / 4]);
        memory.add_word_range(Etm::BASE + 0xFA0, &[0; 0x60 / 4]);
        memory
    }

    #[test]
    fn block_layout() {
        assert_eq!(Etm::SIZE, 0x1000);
        assert_eq!(
            std::mem::offset_of!(EtmRegisterBlock, claimclr),
            0xFA4
        );
        assert_eq!(devtype::REGISTER.info().address(Etm::BASE), 0xE004_1FCC);
    }

    #[test]
    fn registers_are_sorted_by_offset() {
        let offsets: Vec<_> = Etm::REGISTERS.iter().map(|r| r.offset()).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();

        assert_eq!(offsets, sorted);
    }

    #[test]
    fn etm_version() {
        let mut memory = etm_memory();
        memory.write_u32(Etm::BASE + 0x1E4, 0x4100_0400);

        let version = EtmVersion::read(&mut memory).unwrap();

        assert_eq!(
            version,
            EtmVersion {
                designer: 0x41,
                major: 4,
                minor: 0,
                revision: 0
            }
        );
        assert_eq!(version.to_string(), "ETMv4.0 rev 0");
    }

    #[test]
    fn configure_for_instruction_trace() {
        let mut memory = etm_memory();
        memory.write_u32(Etm::BASE + 0x00C, 0x3);

        assert!(Statr::load(&mut memory).unwrap().idle());

        Configr::modify(&mut memory, |config| {
            config.set_bb(true);
            config.set_cci(true);
            config.set_cond(ConditionalTracing::Disabled as u8);
        })
        .unwrap();
        traceidr::TRACEID.write(&mut memory, 0x3E).unwrap();
        prgctlr::EN.write(&mut memory, 1).unwrap();

        assert_eq!(memory.read_u32(Etm::BASE + 0x010), 0x18);
        assert_eq!(TraceIdr::load(&mut memory).unwrap().traceid(), 0x3E);
        assert!(PrgCtlr::load(&mut memory).unwrap().en());
    }

    #[test]
    fn trace_id_is_masked() {
        let mut memory = etm_memory();

        traceidr::TRACEID.write(&mut memory, 0xFF).unwrap();

        assert_eq!(memory.read_u32(Etm::BASE + 0x040), 0x7F);
    }

    #[test]
    fn claim_tags_are_written_without_reading() {
        let mut memory = etm_memory();

        claimset::SET.write(&mut memory, 0b0010).unwrap();
        claimclr::CLR.write(&mut memory, 0b0010).unwrap();

        assert_eq!(
            memory.transactions(),
            &[
                Transaction::Write {
                    address: 0xE004_1FA0,
                    width: RegisterWidth::U32,
                    value: 0b0010
                },
                Transaction::Write {
                    address: 0xE004_1FA4,
                    width: RegisterWidth::U32,
                    value: 0b0010
                },
            ]
        );
    }

    #[test]
    fn identification() {
        let mut memory = MockMemory::new();
        memory.add_word_range(Etm::BASE + 0xFD0, &[0x04, 0, 0, 0]);
        memory.add_word_range(Etm::BASE + 0xFE0, &[0x75, 0xB9, 0x4B, 0x00]);
        memory.add_word_range(Etm::BASE + 0xFF0, &[0x0D, 0x90, 0x05, 0xB1]);

        let id = Etm::component_id(&mut memory).unwrap();

        assert_eq!(id.class, ComponentClass::CoreSightComponent);
        assert_eq!(id.peripheral_id.part, 0x975);
        assert_eq!(id.peripheral_id.revision, 4);
        assert_eq!(id.peripheral_id.designer, Some(ARM_JEP106));
    }

    #[test]
    fn dump_skips_lar() {
        let mut memory = etm_memory();
        memory.add_word_range(Etm::BASE + 0x320, &[0; (0xFA0 - 0x320) / 4]);

        let snapshots = dump::<Etm, _>(&mut memory).unwrap();

        // LAR is write-only, reading TRCPDSR clears STICKYPD.
        assert_eq!(snapshots.len(), Etm::REGISTERS.len() - 2);
        assert!(snapshots.iter().all(|s| s.name != "LAR" && s.name != "TRCPDSR"));
    }
}
