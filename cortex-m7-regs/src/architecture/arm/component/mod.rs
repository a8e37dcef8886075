//! CoreSight components of the Cortex-M7 debug and trace infrastructure.
//!
//! Every component occupies a 4KB block that ends with the same management and
//! identification registers, described by [`CoreSightRegisters`].

/// Lists the registers of a component followed by the management and
/// identification registers every component has, in address order.
macro_rules! coresight_registers {
    ($peripheral:ident: $($register:path),* $(,)?) => {
        &[
            $($register.info(),)*
            super::CoreSightRegisters::<$peripheral>::LAR.info(),
            super::CoreSightRegisters::<$peripheral>::LSR.info(),
            super::CoreSightRegisters::<$peripheral>::PIDR[4].info(),
            super::CoreSightRegisters::<$peripheral>::PIDR[5].info(),
            super::CoreSightRegisters::<$peripheral>::PIDR[6].info(),
            super::CoreSightRegisters::<$peripheral>::PIDR[7].info(),
            super::CoreSightRegisters::<$peripheral>::PIDR[0].info(),
            super::CoreSightRegisters::<$peripheral>::PIDR[1].info(),
            super::CoreSightRegisters::<$peripheral>::PIDR[2].info(),
            super::CoreSightRegisters::<$peripheral>::PIDR[3].info(),
            super::CoreSightRegisters::<$peripheral>::CIDR[0].info(),
            super::CoreSightRegisters::<$peripheral>::CIDR[1].info(),
            super::CoreSightRegisters::<$peripheral>::CIDR[2].info(),
            super::CoreSightRegisters::<$peripheral>::CIDR[3].info(),
        ]
    };
}

pub mod dwt;
pub mod etm;
pub mod fpb;

use crate::memory::MemoryInterface;
use crate::register::{Field, Peripheral, ReadOnly, Register, RegisterWidth, WriteOnly};
use crate::Error;
use enum_primitive_derive::Primitive;
use num_traits::FromPrimitive;
use std::marker::PhantomData;

/// Writing this value to LAR unlocks write access to a component.
pub const LAR_KEY: u32 = 0xC5AC_CE55;

/// Offset of [`CoreSightManagement`] in a component block.
pub const MANAGEMENT_OFFSET: usize = 0xFB0;

/// Byte layout of the last 80 bytes of a component block.
///
/// Registers a component does not implement read as zero.
#[repr(C)]
pub struct CoreSightManagement {
    pub lar: u32,
    pub lsr: u32,
    pub authstatus: u32,
    pub devarch: u32,
    _reserved0: [u32; 2],
    pub devid: u32,
    pub devtype: u32,
    pub pidr4: [u32; 4],
    pub pidr0: [u32; 4],
    pub cidr: [u32; 4],
}

static_assertions::const_assert_eq!(
    MANAGEMENT_OFFSET + std::mem::size_of::<CoreSightManagement>(),
    0x1000
);
static_assertions::const_assert_eq!(std::mem::offset_of!(CoreSightManagement, pidr4), 0x20);
static_assertions::const_assert_eq!(std::mem::offset_of!(CoreSightManagement, cidr), 0x40);

/// Management and identification registers shared by all components of type `P`.
#[derive(Debug)]
pub struct CoreSightRegisters<P>(PhantomData<P>);

impl<P: Peripheral> CoreSightRegisters<P> {
    /// Lock Access Register. Write [`LAR_KEY`] to unlock.
    pub const LAR: Register<P, WriteOnly> = Register::new("LAR", 0xFB0, RegisterWidth::U32);
    /// Lock Status Register.
    pub const LSR: Register<P, ReadOnly> = Register::new("LSR", 0xFB4, RegisterWidth::U32);

    /// The lock mechanism is implemented for this access path.
    pub const SLI: Field<P, ReadOnly> = Field::new(Self::LSR, "SLI", 0, 0);
    /// The component is locked, writes other than to LAR are ignored.
    pub const SLK: Field<P, ReadOnly> = Field::new(Self::LSR, "SLK", 1, 1);

    /// Peripheral ID registers, indexed by their number.
    pub const PIDR: [Register<P, ReadOnly>; 8] = [
        Register::new("PIDR0", 0xFE0, RegisterWidth::U32),
        Register::new("PIDR1", 0xFE4, RegisterWidth::U32),
        Register::new("PIDR2", 0xFE8, RegisterWidth::U32),
        Register::new("PIDR3", 0xFEC, RegisterWidth::U32),
        Register::new("PIDR4", 0xFD0, RegisterWidth::U32),
        Register::new("PIDR5", 0xFD4, RegisterWidth::U32),
        Register::new("PIDR6", 0xFD8, RegisterWidth::U32),
        Register::new("PIDR7", 0xFDC, RegisterWidth::U32),
    ];

    /// Component ID registers.
    pub const CIDR: [Register<P, ReadOnly>; 4] = [
        Register::new("CIDR0", 0xFF0, RegisterWidth::U32),
        Register::new("CIDR1", 0xFF4, RegisterWidth::U32),
        Register::new("CIDR2", 0xFF8, RegisterWidth::U32),
        Register::new("CIDR3", 0xFFC, RegisterWidth::U32),
    ];
}

/// Lock state of a component, read from LSR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockStatus {
    /// A lock mechanism exists.
    pub implemented: bool,
    /// The component is currently locked.
    pub locked: bool,
}

/// A peripheral following the CoreSight component layout.
pub trait CoreSightComponent: Peripheral + Sized {
    /// Unlocks write access by writing [`LAR_KEY`] to LAR. LAR is never read.
    fn unlock<M>(memory: &mut M) -> Result<(), Error>
    where
        M: MemoryInterface + ?Sized,
    {
        tracing::debug!("Unlocking {}", Self::NAME);
        CoreSightRegisters::<Self>::LAR.write(memory, LAR_KEY)
    }

    /// Reads the lock state from LSR.
    fn lock_status<M>(memory: &mut M) -> Result<LockStatus, Error>
    where
        M: MemoryInterface + ?Sized,
    {
        let lsr = CoreSightRegisters::<Self>::LSR.read(memory)?;

        Ok(LockStatus {
            implemented: CoreSightRegisters::<Self>::SLI.extract(lsr) != 0,
            locked: CoreSightRegisters::<Self>::SLK.extract(lsr) != 0,
        })
    }

    /// Reads and decodes the identification registers.
    fn component_id<M>(memory: &mut M) -> Result<ComponentId, Error>
    where
        M: MemoryInterface + ?Sized,
    {
        ComponentId::read_at::<Self, M>(memory, Self::BASE)
    }
}

/// This enum describes the class of a CoreSight component.
///
/// Described in table D1-2 in ADIv5.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum ComponentClass {
    GenericVerificationComponent = 0,
    RomTable = 1,
    CoreSightComponent = 9,
    PeripheralTestBlock = 0xB,
    GenericIPComponent = 0xE,
    CoreLinkOrPrimeCellOrSystemComponent = 0xF,
}

/// Peripheral ID information for a CoreSight component.
///
/// Described in section D1.2.2 of ADIv5.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeripheralId {
    /// Minor errata fixes by the component designer.
    pub revand: u8,
    /// Component modifications by the implementer, `0` for none.
    pub cmod: u8,
    /// Major component revisions by the component designer.
    pub revision: u8,
    /// The component designer, `None` for legacy components without a JEP106 code.
    pub designer: Option<jep106::JEP106Code>,
    /// The part number, unique per designer.
    pub part: u16,
    /// The number of 4KB blocks the component occupies.
    pub size: u32,
}

impl PeripheralId {
    /// Decodes PIDR0 to PIDR7, indexed by register number.
    pub fn from_raw(data: &[u32; 8]) -> Self {
        let jep106id = (((data[2] & 0x07) << 4) | ((data[1] >> 4) & 0x0F)) as u8;
        let jep106 = jep106::JEP106Code::new((data[4] & 0x0F) as u8, jep106id);
        let uses_jep106 = data[2] & 0x08 != 0;

        PeripheralId {
            revand: ((data[3] >> 4) & 0x0F) as u8,
            cmod: (data[3] & 0x0F) as u8,
            revision: ((data[2] >> 4) & 0x0F) as u8,
            designer: uses_jep106.then_some(jep106),
            part: (((data[1] & 0x0F) << 8) | (data[0] & 0xFF)) as u16,
            size: 1 << ((data[4] >> 4) & 0x0F),
        }
    }

    /// Whether the component was designed by ARM.
    pub fn is_arm(&self) -> bool {
        self.designer == Some(ARM_JEP106)
    }
}

/// The JEP106 code of ARM Ltd.
pub const ARM_JEP106: jep106::JEP106Code = jep106::JEP106Code { id: 0x3B, cc: 0x04 };

/// Component Identification information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentId {
    /// The base address the registers were read from.
    pub address: u64,
    pub class: ComponentClass,
    pub peripheral_id: PeripheralId,
}

impl ComponentId {
    /// Reads PIDR0 to PIDR7 and CIDR0 to CIDR3 of the component of type `P`
    /// located at `base`, each once.
    ///
    /// A CIDR preamble that does not match the CoreSight value is logged, not rejected.
    pub fn read_at<P, M>(memory: &mut M, base: u64) -> Result<Self, Error>
    where
        P: Peripheral,
        M: MemoryInterface + ?Sized,
    {
        let mut pidr = [0u32; 8];
        for (value, register) in pidr.iter_mut().zip(CoreSightRegisters::<P>::PIDR) {
            *value = register.read_at(memory, base)?;
        }

        let mut cidr = [0u32; 4];
        for (value, register) in cidr.iter_mut().zip(CoreSightRegisters::<P>::CIDR) {
            *value = register.read_at(memory, base)?;
        }

        tracing::debug!("Component at {:#010x}: PIDR {:x?}, CIDR {:x?}", base, pidr, cidr);

        check_preamble(base, &cidr);

        let class_value = (cidr[1] >> 4) & 0x0F;
        let class = ComponentClass::from_u32(class_value).ok_or(Error::UnknownValue {
            name: "CIDR1.CLASS",
            value: class_value,
        })?;

        Ok(ComponentId {
            address: base,
            class,
            peripheral_id: PeripheralId::from_raw(&pidr),
        })
    }
}

fn check_preamble(base: u64, cidr: &[u32; 4]) {
    let preambles = [
        cidr[0] & 0xff,
        cidr[1] & 0x0f,
        cidr[2] & 0xff,
        cidr[3] & 0xff,
    ];

    let expected = [0x0D, 0x0, 0x05, 0xB1];

    for (i, (found, expected)) in preambles.iter().zip(expected).enumerate() {
        if *found != expected {
            tracing::warn!(
                "Component at {:#010x}: CIDR{} has invalid preamble (expected {:#x}, got {:#x})",
                base,
                i,
                expected,
                found,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::dwt::Dwt;
    use super::*;
    use crate::register::RegisterWidth;
    use crate::test::{MockMemory, Transaction};
    use pretty_assertions::assert_eq;

    fn dwt_identification() -> MockMemory {
        let mut memory = MockMemory::new();
        memory.add_word_range(Dwt::BASE + 0xFB0, &[0, 0x3]);
        memory.add_word_range(Dwt::BASE + 0xFD0, &[0x04, 0, 0, 0]);
        memory.add_word_range(Dwt::BASE + 0xFE0, &[0x02, 0xB0, 0x3B, 0x00]);
        memory.add_word_range(Dwt::BASE + 0xFF0, &[0x0D, 0xE0, 0x05, 0xB1]);
        memory
    }

    #[test]
    fn decode_dwt_identification() {
        let mut memory = dwt_identification();

        let id = Dwt::component_id(&mut memory).unwrap();

        assert_eq!(id.address, 0xE000_1000);
        assert_eq!(id.class, ComponentClass::GenericIPComponent);
        assert_eq!(
            id.peripheral_id,
            PeripheralId {
                revand: 0,
                cmod: 0,
                revision: 3,
                designer: Some(ARM_JEP106),
                part: 0x002,
                size: 1,
            }
        );
        assert!(id.peripheral_id.is_arm());
        assert_eq!(memory.transactions().len(), 12);
    }

    #[test]
    fn invalid_preamble_is_tolerated() {
        let mut memory = dwt_identification();
        memory.write_u32(Dwt::BASE + 0xFFC, 0xB2);

        assert!(Dwt::component_id(&mut memory).is_ok());
    }

    #[test]
    fn unknown_component_class() {
        let mut memory = dwt_identification();
        memory.write_u32(Dwt::BASE + 0xFF4, 0x20);

        let error = Dwt::component_id(&mut memory).unwrap_err();
        assert!(matches!(
            error,
            Error::UnknownValue {
                name: "CIDR1.CLASS",
                value: 2
            }
        ));
    }

    #[test]
    fn legacy_component_has_no_designer() {
        let id = PeripheralId::from_raw(&[0x02, 0xB0, 0x03, 0, 0x04, 0, 0, 0]);
        assert_eq!(id.designer, None);
        assert_eq!(id.part, 0x002);
    }

    #[test]
    fn unlock_writes_key_without_reading() {
        let mut memory = dwt_identification();

        Dwt::unlock(&mut memory).unwrap();

        assert_eq!(
            memory.transactions(),
            &[Transaction::Write {
                address: 0xE000_1FB0,
                width: RegisterWidth::U32,
                value: 0xC5AC_CE55
            }]
        );
    }

    #[test]
    fn lock_status() {
        let mut memory = dwt_identification();

        assert_eq!(
            Dwt::lock_status(&mut memory).unwrap(),
            LockStatus {
                implemented: true,
                locked: true
            }
        );
    }

    #[test]
    fn identification_offsets_match_layout() {
        let base = MANAGEMENT_OFFSET as u64;
        let registers = CoreSightRegisters::<Dwt>::PIDR;

        assert_eq!(
            CoreSightRegisters::<Dwt>::LSR.info().offset(),
            base + std::mem::offset_of!(CoreSightManagement, lsr) as u64
        );
        assert_eq!(
            registers[4].info().offset(),
            base + std::mem::offset_of!(CoreSightManagement, pidr4) as u64
        );
        assert_eq!(
            registers[0].info().offset(),
            base + std::mem::offset_of!(CoreSightManagement, pidr0) as u64
        );
        assert_eq!(
            CoreSightRegisters::<Dwt>::CIDR[0].info().offset(),
            base + std::mem::offset_of!(CoreSightManagement, cidr) as u64
        );
    }
}
