//! Debug Port register window of the JTAG-DP (see ADIv5.2 section B2).
//!
//! The registers are not memory mapped. A debugger reaches them through DPACC
//! scans, with the register offset as the `A[3:2]` address bits. A
//! [`MemoryInterface`] implemented on top of those scans drives the
//! descriptors below. The window base is `0` unless the debugger maps several
//! debug ports side by side, in which case the `_at` accessors take the base
//! of the selected port.
use crate::memory::MemoryInterface;
use crate::register::{MemoryMappedRegister, Peripheral, RegisterInfo};
use crate::Error;
use enum_primitive_derive::Primitive;
use jep106::JEP106Code;
use serde::Serialize;

/// The register window of a JTAG Debug Port.
#[derive(Debug)]
pub struct JtagDp;

/// Byte layout of the DP register window.
///
/// DPIDR and ABORT share offset `0`: reads see DPIDR and writes go to ABORT.
#[repr(C)]
pub struct JtagDpRegisterBlock {
    pub dpidr: u32,
    pub ctrl_stat: u32,
    pub select: u32,
    pub rdbuff: u32,
}

impl Peripheral for JtagDp {
    const NAME: &'static str = "JTAG-DP";
    const BASE: u64 = 0x0;
    const SIZE: u64 = std::mem::size_of::<JtagDpRegisterBlock>() as u64;
    const REGISTERS: &'static [RegisterInfo] = &[
        dpidr::REGISTER.info(),
        abort::REGISTER.info(),
        ctrl_stat::REGISTER.info(),
        select::REGISTER.info(),
        rdbuff::REGISTER.info(),
    ];
}

assert_layout!(JtagDpRegisterBlock: dpidr, ctrl_stat, select, rdbuff);
static_assertions::const_assert_eq!(
    std::mem::offset_of!(JtagDpRegisterBlock, dpidr) as u64,
    abort::REGISTER.info().offset()
);

/// JTAG instruction register values of the JTAG-DP. The IR is 4 bits long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum JtagInstruction {
    /// Selects the 35-bit ABORT scan chain.
    Abort = 0b1000,
    /// Selects the DP access scan chain.
    Dpacc = 0b1010,
    /// Selects the AP access scan chain.
    Apacc = 0b1011,
    /// Selects the 32-bit IDCODE scan chain.
    Idcode = 0b1110,
    /// Selects the 1-bit bypass register.
    Bypass = 0b1111,
}

/// Length of the JTAG-DP instruction register in bits.
pub const IR_LENGTH: u32 = 4;

define_register! {
    /// Debug Port Identification Register
    pub mod dpidr: JtagDp, "DPIDR" @ 0x0, U32, ReadOnly;

    REVISION: ReadOnly = 31, 28;
    PARTNO: ReadOnly = 27, 20;
    /// The transaction counter, pushed operations and pushed verify are not implemented.
    MIN: ReadOnly = 16, 16;
    /// Debug port architecture version, see [`DebugPortVersion`](super::DebugPortVersion).
    VERSION: ReadOnly = 15, 12;
    /// JEP106 continuation code and identity code of the designer.
    DESIGNER: ReadOnly = 11, 1;
    /// Reads as one.
    RAO: ReadOnly = 0, 0;
}

define_register! {
    /// AP Abort Register
    pub mod abort: JtagDp, "ABORT" @ 0x0, U32, WriteOnly;

    /// Clear `CTRL/STAT.STICKYORUN`.
    ORUNERRCLR: WriteOnly = 4, 4;
    /// Clear `CTRL/STAT.WDATAERR`. Reserved on JTAG-DP.
    WDERRCLR: WriteOnly = 3, 3;
    /// Clear `CTRL/STAT.STICKYERR`.
    STKERRCLR: WriteOnly = 2, 2;
    /// Clear `CTRL/STAT.STICKYCMP`.
    STKCMPCLR: WriteOnly = 1, 1;
    /// Abort the current AP transaction.
    DAPABORT: WriteOnly = 0, 0;
}

define_register! {
    /// Control/Status Register
    pub mod ctrl_stat: JtagDp, "CTRL/STAT" @ 0x4, U32, ReadWrite;

    CSYSPWRUPACK: ReadOnly = 31, 31;
    CSYSPWRUPREQ: ReadWrite = 30, 30;
    CDBGPWRUPACK: ReadOnly = 29, 29;
    CDBGPWRUPREQ: ReadWrite = 28, 28;
    CDBGRSTACK: ReadOnly = 27, 27;
    CDBGRSTREQ: ReadWrite = 26, 26;
    /// Transaction counter for pushed operations.
    TRNCNT: ReadWrite = 23, 12;
    /// Byte lanes compared in pushed-compare operations.
    MASKLANE: ReadWrite = 11, 8;
    /// Write data error. Reserved on JTAG-DP.
    WDATAERR: ReadOnly = 7, 7;
    READOK: ReadOnly = 6, 6;
    /// Sticky error flag. Cleared by writing `1`, or through `ABORT.STKERRCLR`.
    STICKYERR: WriteOneToClear = 5, 5;
    STICKYCMP: WriteOneToClear = 4, 4;
    /// Transfer mode, see [`TransferMode`](super::TransferMode).
    TRNMODE: ReadWrite = 3, 2;
    STICKYORUN: WriteOneToClear = 1, 1;
    ORUNDETECT: ReadWrite = 0, 0;
}

define_register! {
    /// AP Select Register
    pub mod select: JtagDp, "SELECT" @ 0x8, U32, ReadWrite;

    /// The access port addressed by APACC.
    APSEL: ReadWrite = 31, 24;
    /// Bits 7:4 of the AP register address.
    APBANKSEL: ReadWrite = 7, 4;
    /// DP register bank at offset `0x4`, DPv1 and later.
    DPBANKSEL: ReadWrite = 3, 0;
}

define_register! {
    /// Read Buffer
    ///
    /// Holds the result of the previous AP read. Reading it starts no new transfer.
    pub mod rdbuff: JtagDp, "RDBUFF" @ 0xC, U32, ReadOnly;

    DATA: ReadOnly = 31, 0;
}

/// Values of `CTRL/STAT.TRNMODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum TransferMode {
    Normal = 0b00,
    PushedVerify = 0b01,
    PushedCompare = 0b10,
}

memory_mapped_bitfield_register! {
    /// Debug Port Identification Register, DPIDR
    pub struct Dpidr(u32);
    dpidr::REGISTER: JtagDp, ReadOnly;
    impl From;
    pub u8, revision, _: 31, 28;
    pub u8, part_no, _: 27, 20;
    pub min, _: 16;
    pub u8, version, _: 15, 12;
    pub u16, designer, _: 11, 1;
    u8, jep_cc, _: 11, 8;
    u8, jep_id, _: 7, 1;
}

memory_mapped_bitfield_register! {
    /// AP Abort Register, ABORT
    pub struct Abort(u32);
    abort::REGISTER: JtagDp, WriteOnly;
    impl From;
    pub _, set_orunerrclr: 4;
    pub _, set_wderrclr: 3;
    pub _, set_stkerrclr: 2;
    pub _, set_stkcmpclr: 1;
    pub _, set_dapabort: 0;
}

impl Abort {
    /// An ABORT value clearing all sticky error flags of CTRL/STAT.
    pub fn clear_sticky_errors() -> Self {
        let mut abort = Abort(0);
        abort.set_orunerrclr(true);
        abort.set_wderrclr(true);
        abort.set_stkerrclr(true);
        abort.set_stkcmpclr(true);
        abort
    }
}

memory_mapped_bitfield_register! {
    /// Control/Status Register, CTRL/STAT
    pub struct Ctrl(u32);
    ctrl_stat::REGISTER: JtagDp, ReadWrite;
    impl From;
    pub csyspwrupack, _: 31;
    pub csyspwrupreq, set_csyspwrupreq: 30;
    pub cdbgpwrupack, _: 29;
    pub cdbgpwrupreq, set_cdbgpwrupreq: 28;
    pub cdbgrstack, _: 27;
    pub c_dbg_rst_req, set_c_dbg_rst_req: 26;
    pub u16, trn_cnt, set_trn_cnt: 23, 12;
    pub u8, mask_lane, set_mask_lane: 11, 8;
    pub w_data_err, _ : 7;
    pub read_ok, _ : 6;
    pub sticky_err, _: 5;
    pub stick_cmp, _: 4;
    pub u8, trn_mode, _: 3, 2;
    pub sticky_orun, _: 1;
    pub orun_detect, set_orun_detect: 0;
}

impl Ctrl {
    /// A CTRL/STAT value requesting power-up of the system and debug domains.
    pub fn power_up_request() -> Self {
        let mut ctrl = Ctrl(0);
        ctrl.set_csyspwrupreq(true);
        ctrl.set_cdbgpwrupreq(true);
        ctrl.set_mask_lane(0b1111);
        ctrl
    }

    /// Both power domains acknowledged their power-up request.
    pub fn is_powered_up(&self) -> bool {
        self.csyspwrupack() && self.cdbgpwrupack()
    }

    /// Any of the sticky error flags is set.
    pub fn has_sticky_errors(&self) -> bool {
        self.sticky_err() || self.sticky_orun() || self.w_data_err()
    }
}

memory_mapped_bitfield_register! {
    /// AP Select Register, SELECT
    pub struct Select(u32);
    select::REGISTER: JtagDp, ReadWrite;
    impl From;
    pub u8, ap_sel, set_ap_sel: 31, 24;
    pub u8, ap_bank_sel, set_ap_bank_sel: 7, 4;
    pub u8, dp_bank_sel, set_dp_bank_sel: 3, 0;
}

impl Select {
    /// The SELECT value addressing the register at `offset` of access port `ap`.
    ///
    /// The remaining address bits 3:2 go into the APACC scan.
    pub fn for_ap_register(ap: u8, offset: u64) -> Self {
        let mut select = Select(0);
        select.set_ap_sel(ap);
        select.set_ap_bank_sel(((offset >> 4) & 0xF) as u8);
        select
    }
}

/// Debug port architecture version, from `DPIDR.VERSION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DebugPortVersion {
    DPv0,
    DPv1,
    DPv2,
    DPv3,
    Unsupported(u8),
}

impl From<u8> for DebugPortVersion {
    fn from(value: u8) -> Self {
        match value {
            0 => DebugPortVersion::DPv0,
            1 => DebugPortVersion::DPv1,
            2 => DebugPortVersion::DPv2,
            3 => DebugPortVersion::DPv3,
            value => DebugPortVersion::Unsupported(value),
        }
    }
}

/// The decoded DPIDR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugPortId {
    pub revision: u8,
    pub part_no: u8,
    pub version: DebugPortVersion,
    /// Minimal debug port functions only.
    pub min_dp_support: bool,
    pub designer: JEP106Code,
}

impl DebugPortId {
    /// Reads DPIDR of the debug port whose register window starts at `base`.
    pub fn read_at<M>(memory: &mut M, base: u64) -> Result<Self, Error>
    where
        M: MemoryInterface + ?Sized,
    {
        let dpidr = Dpidr::load_at(memory, base)?;
        let id = DebugPortId::from(dpidr);

        tracing::debug!(
            "Debug port {:?} r{} part {:#04x}, designer {:?}",
            id.version,
            id.revision,
            id.part_no,
            id.designer
        );

        Ok(id)
    }
}

impl From<Dpidr> for DebugPortId {
    fn from(dpidr: Dpidr) -> DebugPortId {
        DebugPortId {
            revision: dpidr.revision(),
            part_no: dpidr.part_no(),
            version: dpidr.version().into(),
            min_dp_support: dpidr.min(),
            designer: JEP106Code::new(dpidr.jep_cc(), dpidr.jep_id()),
        }
    }
}
