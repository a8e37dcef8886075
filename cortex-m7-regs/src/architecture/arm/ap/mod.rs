//! Access ports, as seen through the APACC scan chain of the debug port.
//!
//! Access port `n` is mapped at [`ap_window_base`]`(n)`, so a
//! [`MemoryInterface`] driving APACC can split an address into the SELECT
//! fields and the `A[3:2]` bits of the scan.
pub mod memory_ap;

use crate::memory::MemoryInterface;
use crate::Error;
use enum_primitive_derive::Primitive;
use jep106::JEP106Code;
use num_traits::FromPrimitive;

/// Base of the register window of access port `apsel`.
///
/// The access port number sits at the position of `SELECT.APSEL`.
pub const fn ap_window_base(apsel: u8) -> u64 {
    (apsel as u64) << 24
}

/// The class of an access port, from `IDR.CLASS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum ApClass {
    /// This describes a custom AP that is vendor defined and not defined by ARM
    Undefined = 0b0000,
    /// The standard ARM COM-AP defined in ADIv5.2.
    ComAp = 0b0001,
    /// The standard ARM MEM-AP defined in ADIv5.2.
    MemAp = 0b1000,
}

/// The bus an access port connects to, from `IDR.TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum ApType {
    /// This is the most basic AP that is included in most MCUs and uses SWD or JTAG as a link-layer.
    JtagComAp = 0x0,
    /// A MEM-AP for the AMBA AHB3 bus, as used on Cortex-M7.
    AmbaAhb3 = 0x1,
    AmbaApb2Apb3 = 0x2,
    AmbaAxi3Axi4 = 0x4,
    AmbaAhb5 = 0x5,
    AmbaApb4Apb5 = 0x6,
    AmbaAxi5 = 0x7,
    AmbaAhb5Hprot = 0x8,
}

bitfield::bitfield! {
    /// Identification Register, IDR (see ADIv5.2 section C1.2.5)
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct Idr(u32);
    impl Debug;
    pub u8, revision, _: 31, 28;
    pub u16, designer, _: 27, 17;
    u8, jep_cc, _: 27, 24;
    u8, jep_id, _: 23, 17;
    pub u8, class, _: 16, 13;
    pub u8, variant, _: 7, 4;
    pub u8, ap_type, _: 3, 0;
}

impl From<u32> for Idr {
    fn from(value: u32) -> Self {
        Idr(value)
    }
}

impl From<Idr> for u32 {
    fn from(value: Idr) -> Self {
        value.0
    }
}

/// The decoded IDR of an access port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPortId {
    pub revision: u8,
    pub designer: JEP106Code,
    pub class: ApClass,
    pub variant: u8,
    /// Only meaningful for MEM-APs and the JTAG-AP.
    pub ap_type: Option<ApType>,
}

impl AccessPortId {
    /// Reads IDR of the access port whose window starts at `base`.
    ///
    /// An IDR of zero means no access port is present at this position.
    pub fn read_at<M>(memory: &mut M, base: u64) -> Result<Option<Self>, Error>
    where
        M: MemoryInterface + ?Sized,
    {
        let idr = memory_ap::idr::REGISTER.read_at(memory, base)?;

        if idr == 0 {
            tracing::debug!("No access port at {:#010x}", base);
            return Ok(None);
        }

        let id = Self::try_from(Idr(idr))?;
        tracing::debug!("Access port at {:#010x}: {:x?}", base, id);

        Ok(Some(id))
    }

    /// The access port is a MEM-AP.
    pub fn is_memory_ap(&self) -> bool {
        self.class == ApClass::MemAp
    }
}

impl TryFrom<Idr> for AccessPortId {
    type Error = Error;

    fn try_from(idr: Idr) -> Result<Self, Error> {
        let class = ApClass::from_u8(idr.class()).ok_or(Error::UnknownValue {
            name: "IDR.CLASS",
            value: idr.class() as u32,
        })?;

        Ok(AccessPortId {
            revision: idr.revision(),
            designer: JEP106Code::new(idr.jep_cc(), idr.jep_id()),
            class,
            variant: idr.variant(),
            ap_type: ApType::from_u8(idr.ap_type()),
        })
    }
}
