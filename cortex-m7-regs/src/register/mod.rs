//! Register and field descriptors and the typed access layer built on them.
//!
//! A peripheral is a marker type implementing [`Peripheral`]. Its registers are
//! `const` [`Register`] descriptors and the bitfields inside them are `const`
//! [`Field`] descriptors. Both carry their access mode as a type parameter, so
//! writing a read-only field or reading a write-only one does not compile:
//!
//! ```compile_fail
//! use cortex_m7_regs::architecture::arm::scs::scb;
//! use cortex_m7_regs::memory::Mmio;
//!
//! let mut memory = unsafe { Mmio::new() };
//! // CPUID is read-only.
//! scb::cpuid::PARTNO.write(&mut memory, 0xC27).unwrap();
//! ```
//!
//! ```compile_fail
//! use cortex_m7_regs::architecture::arm::scs::dcb;
//! use cortex_m7_regs::memory::Mmio;
//!
//! let mut memory = unsafe { Mmio::new() };
//! // DCRSR is write-only.
//! dcb::dcrsr::REGSEL.read(&mut memory).unwrap();
//! ```
//!
//! Descriptors are validated when they are built. A field that does not fit
//! its register, a register outside of its peripheral block or a misaligned
//! register offset is a compile error for `const` descriptors.
#[macro_use]
mod register_generation;
mod access;
mod dump;

pub use access::{modify_register, read_field, read_register, write_field, write_register};
pub use dump::{dump, dump_at, RegisterSnapshot};

use crate::error::Error;
use crate::memory::MemoryInterface;
use num_traits::FromPrimitive;
use serde::Serialize;
use std::marker::PhantomData;

/// How a register or a field may be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AccessMode {
    /// Reads return the field, writes are ignored by the hardware.
    ReadOnly,
    /// Writes have an effect, reads are undefined or have side effects.
    WriteOnly,
    /// Reads return the last written value or hardware state.
    ReadWrite,
    /// Reads return sticky status bits, writing `1` clears a bit and writing
    /// `0` leaves it untouched.
    WriteOneToClear,
}

impl AccessMode {
    /// Whether the register may be read.
    pub const fn is_readable(self) -> bool {
        !matches!(self, AccessMode::WriteOnly)
    }

    /// Whether the register may be written.
    pub const fn is_writable(self) -> bool {
        !matches!(self, AccessMode::ReadOnly)
    }

    /// Whether a field write has to merge with the current register contents.
    ///
    /// Only read-write fields do. Write-only registers must not be read, and
    /// writing back sticky write-one-to-clear bits would clear them.
    pub const fn reads_before_write(self) -> bool {
        matches!(self, AccessMode::ReadWrite)
    }

    /// Whether a register with this access mode may contain a field with the
    /// access mode `field`.
    ///
    /// Read-write registers may mix fields of every mode (ICSR and AIRCR do).
    pub const fn permits(self, field: AccessMode) -> bool {
        match self {
            AccessMode::ReadWrite => true,
            AccessMode::WriteOneToClear => matches!(
                field,
                AccessMode::WriteOneToClear | AccessMode::ReadOnly
            ),
            AccessMode::ReadOnly => matches!(field, AccessMode::ReadOnly),
            AccessMode::WriteOnly => matches!(field, AccessMode::WriteOnly),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Type level access mode of a register or field.
pub trait Access: sealed::Sealed + 'static {
    /// The runtime value of the access mode.
    const MODE: AccessMode;
}

/// Access modes that allow reading.
pub trait Readable: Access {}

/// Access modes that allow writing.
pub trait Writable: Access {}

/// Access modes that allow a read-modify-write of the whole register.
pub trait Modifiable: Readable + Writable {}

/// Type level [`AccessMode::ReadOnly`].
#[derive(Debug)]
pub enum ReadOnly {}

/// Type level [`AccessMode::WriteOnly`].
#[derive(Debug)]
pub enum WriteOnly {}

/// Type level [`AccessMode::ReadWrite`].
#[derive(Debug)]
pub enum ReadWrite {}

/// Type level [`AccessMode::WriteOneToClear`].
#[derive(Debug)]
pub enum WriteOneToClear {}

impl sealed::Sealed for ReadOnly {}
impl sealed::Sealed for WriteOnly {}
impl sealed::Sealed for ReadWrite {}
impl sealed::Sealed for WriteOneToClear {}

impl Access for ReadOnly {
    const MODE: AccessMode = AccessMode::ReadOnly;
}

impl Access for WriteOnly {
    const MODE: AccessMode = AccessMode::WriteOnly;
}

impl Access for ReadWrite {
    const MODE: AccessMode = AccessMode::ReadWrite;
}

impl Access for WriteOneToClear {
    const MODE: AccessMode = AccessMode::WriteOneToClear;
}

impl Readable for ReadOnly {}
impl Readable for ReadWrite {}
impl Readable for WriteOneToClear {}
impl Writable for WriteOnly {}
impl Writable for ReadWrite {}
impl Writable for WriteOneToClear {}
impl Modifiable for ReadWrite {}

/// The width of a single register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegisterWidth {
    /// Byte register.
    U8,
    /// Word register.
    U32,
}

impl RegisterWidth {
    /// The number of bits in the register.
    pub const fn bits(self) -> u32 {
        match self {
            RegisterWidth::U8 => 8,
            RegisterWidth::U32 => 32,
        }
    }

    /// The number of bytes in the register, which is also its alignment.
    pub const fn bytes(self) -> u64 {
        match self {
            RegisterWidth::U8 => 1,
            RegisterWidth::U32 => 4,
        }
    }
}

/// A block of registers at a fixed location in the memory map.
pub trait Peripheral: 'static {
    /// The name of the block.
    const NAME: &'static str;
    /// The default base address of the block.
    const BASE: u64;
    /// The size of the block in bytes.
    const SIZE: u64;
    /// All registers of the block, reserved regions excluded.
    const REGISTERS: &'static [RegisterInfo];
}

/// Untyped description of a register, or of an array of registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegisterInfo {
    name: &'static str,
    offset: u64,
    width: RegisterWidth,
    access: AccessMode,
    count: u64,
    stride: u64,
    w1c_mask: u32,
    read_side_effects: bool,
}

impl RegisterInfo {
    /// The register name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Byte offset of the register from the base of its block.
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// The register width.
    pub const fn width(&self) -> RegisterWidth {
        self.width
    }

    /// The access mode of the register.
    pub const fn access(&self) -> AccessMode {
        self.access
    }

    /// Number of registers in the array, `1` for a plain register.
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Distance in bytes between two elements of the array.
    pub const fn stride(&self) -> u64 {
        self.stride
    }

    /// The bits of write-one-to-clear fields inside a register that is
    /// otherwise read-write. A read-modify-write stores them as `0`.
    pub const fn w1c_mask(&self) -> u32 {
        self.w1c_mask
    }

    /// Whether reading the register changes device state, e.g. starts a bus
    /// transfer or clears status bits. Such registers are left out of dumps.
    pub const fn has_read_side_effects(&self) -> bool {
        self.read_side_effects
    }

    /// The absolute address of the register in a block located at `base`.
    pub const fn address(&self, base: u64) -> u64 {
        base + self.offset
    }

    /// Selects element `index` of a register array.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. In a `const` this is a compile error.
    pub const fn at(self, index: u64) -> Self {
        assert!(index < self.count, "register array index out of range");
        RegisterInfo {
            offset: self.offset + index * self.stride,
            count: 1,
            ..self
        }
    }

    /// Selects element `index` of a register array, for indices only known at runtime.
    pub fn get(self, index: u64) -> Result<Self, Error> {
        if index < self.count {
            Ok(self.at(index))
        } else {
            Err(Error::IndexOutOfRange {
                name: self.name,
                index,
                count: self.count,
            })
        }
    }

    /// The register elements, one per array index.
    pub fn elements(self) -> impl Iterator<Item = RegisterInfo> {
        (0..self.count).map(move |index| self.at(index))
    }
}

/// The bits `msb..=lsb` if a field with access `F` is write-one-to-clear inside
/// a read-write register with access `R`, `0` otherwise.
#[doc(hidden)]
pub const fn w1c_bits<R: Access, F: Access>(msb: u32, lsb: u32) -> u32 {
    assert!(msb < 32 && msb >= lsb, "field bits must be given as msb, lsb");
    match (R::MODE, F::MODE) {
        (AccessMode::ReadWrite, AccessMode::WriteOneToClear) => {
            (u32::MAX >> (31 - msb)) & (u32::MAX << lsb)
        }
        _ => 0,
    }
}

/// A register of peripheral `P` with access mode `A`.
pub struct Register<P, A> {
    info: RegisterInfo,
    _marker: PhantomData<fn() -> (P, A)>,
}

impl<P, A> Clone for Register<P, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, A> Copy for Register<P, A> {}

impl<P, A> std::fmt::Debug for Register<P, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.info.fmt(f)
    }
}

impl<P: Peripheral, A: Access> Register<P, A> {
    /// Describes a single register at `offset` in the block.
    pub const fn new(name: &'static str, offset: u64, width: RegisterWidth) -> Self {
        Self::array(name, offset, width, 1, 0)
    }

    /// Describes `count` registers, the first at `offset`, `stride` bytes apart.
    pub const fn array(
        name: &'static str,
        offset: u64,
        width: RegisterWidth,
        count: u64,
        stride: u64,
    ) -> Self {
        assert!(count > 0, "register array must not be empty");
        assert!(
            offset % width.bytes() == 0,
            "register offset is not aligned to the register width"
        );
        assert!(
            stride % width.bytes() == 0,
            "register array stride is not aligned to the register width"
        );
        assert!(
            offset + (count - 1) * stride + width.bytes() <= P::SIZE,
            "register lies outside of its peripheral block"
        );

        Register {
            info: RegisterInfo {
                name,
                offset,
                width,
                access: A::MODE,
                count,
                stride,
                w1c_mask: 0,
                read_side_effects: false,
            },
            _marker: PhantomData,
        }
    }

    /// Marks `mask` as write-one-to-clear bits of a read-write register.
    pub const fn with_w1c_mask(self, mask: u32) -> Self {
        assert!(
            matches!(A::MODE, AccessMode::ReadWrite) || mask == 0,
            "write-one-to-clear bits need a read-write register"
        );
        assert!(
            self.info.width.bits() == 32 || mask >> self.info.width.bits() == 0,
            "write-one-to-clear bits outside of the register"
        );
        Register {
            info: RegisterInfo {
                w1c_mask: mask,
                ..self.info
            },
            _marker: PhantomData,
        }
    }

    /// Marks the register as one whose reads change device state.
    pub const fn volatile_read(self) -> Self {
        Register {
            info: RegisterInfo {
                read_side_effects: true,
                ..self.info
            },
            _marker: PhantomData,
        }
    }

    /// The untyped description of this register.
    pub const fn info(&self) -> RegisterInfo {
        self.info
    }

    /// Selects element `index` of a register array.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. In a `const` this is a compile error.
    pub const fn at(self, index: u64) -> Self {
        Register {
            info: self.info.at(index),
            _marker: PhantomData,
        }
    }

    /// Selects element `index` of a register array, for indices only known at runtime.
    pub fn get(self, index: u64) -> Result<Self, Error> {
        Ok(Register {
            info: self.info.get(index)?,
            _marker: PhantomData,
        })
    }

    /// Reads the register of the block at its default base address.
    pub fn read<M>(&self, memory: &mut M) -> Result<u32, Error>
    where
        M: MemoryInterface + ?Sized,
        A: Readable,
    {
        self.read_at(memory, P::BASE)
    }

    /// Reads the register of the block located at `base`.
    pub fn read_at<M>(&self, memory: &mut M, base: u64) -> Result<u32, Error>
    where
        M: MemoryInterface + ?Sized,
        A: Readable,
    {
        read_register(memory, base, &self.info)
    }

    /// Stores `value` as the whole register, without reading it first.
    pub fn write<M>(&self, memory: &mut M, value: u32) -> Result<(), Error>
    where
        M: MemoryInterface + ?Sized,
        A: Writable,
    {
        self.write_at(memory, P::BASE, value)
    }

    /// Stores `value` as the whole register of the block located at `base`.
    pub fn write_at<M>(&self, memory: &mut M, base: u64, value: u32) -> Result<(), Error>
    where
        M: MemoryInterface + ?Sized,
        A: Writable,
    {
        write_register(memory, base, &self.info, value)
    }

    /// Reads the register once, passes the value to `f` and stores the result once.
    ///
    /// Returns the stored value.
    pub fn modify<M, F>(&self, memory: &mut M, f: F) -> Result<u32, Error>
    where
        M: MemoryInterface + ?Sized,
        A: Modifiable,
        F: FnOnce(u32) -> u32,
    {
        self.modify_at(memory, P::BASE, f)
    }

    /// Like [`Register::modify`], for the block located at `base`.
    pub fn modify_at<M, F>(&self, memory: &mut M, base: u64, f: F) -> Result<u32, Error>
    where
        M: MemoryInterface + ?Sized,
        A: Modifiable,
        F: FnOnce(u32) -> u32,
    {
        modify_register(memory, base, &self.info, f)
    }
}

/// Untyped description of a bitfield: the register it lives in, its bit
/// position and width, and its access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: &'static str,
    register_offset: u64,
    register_width: RegisterWidth,
    bit_offset: u32,
    bit_width: u32,
    access: AccessMode,
    register_w1c_mask: u32,
}

impl FieldDescriptor {
    /// Builds a descriptor from values only known at runtime.
    ///
    /// Returns [`Error::InvalidField`] if the field does not fit the register.
    pub fn checked(
        name: &'static str,
        register_offset: u64,
        register_width: RegisterWidth,
        bit_offset: u32,
        bit_width: u32,
        access: AccessMode,
    ) -> Result<Self, Error> {
        let fits = bit_width > 0
            && bit_offset
                .checked_add(bit_width)
                .is_some_and(|end| end <= register_width.bits());

        if !fits {
            return Err(Error::InvalidField {
                name,
                bit_offset,
                bit_width,
                register_bits: register_width.bits(),
            });
        }

        Ok(Self {
            name,
            register_offset,
            register_width,
            bit_offset,
            bit_width,
            access,
            register_w1c_mask: 0,
        })
    }

    /// Sets the write-one-to-clear bits of the register holding the field.
    ///
    /// A read-write field write stores those bits as `0`, so latched status
    /// bits next to the field are not cleared by accident.
    pub const fn with_register_w1c_mask(self, mask: u32) -> Self {
        Self {
            register_w1c_mask: mask,
            ..self
        }
    }

    /// The field name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Byte offset of the register holding the field.
    pub const fn register_offset(&self) -> u64 {
        self.register_offset
    }

    /// Width of the register holding the field.
    pub const fn register_width(&self) -> RegisterWidth {
        self.register_width
    }

    /// Position of the least significant bit of the field.
    pub const fn bit_offset(&self) -> u32 {
        self.bit_offset
    }

    /// Number of bits in the field.
    pub const fn bit_width(&self) -> u32 {
        self.bit_width
    }

    /// The field access mode.
    pub const fn access(&self) -> AccessMode {
        self.access
    }

    /// The write-one-to-clear bits of the register holding the field.
    pub const fn register_w1c_mask(&self) -> u32 {
        self.register_w1c_mask
    }

    /// The largest value of the field, `(1 << bit_width) - 1`.
    pub const fn mask(&self) -> u32 {
        if self.bit_width >= 32 {
            u32::MAX
        } else {
            (1 << self.bit_width) - 1
        }
    }

    /// The bits of the register occupied by the field.
    pub const fn shifted_mask(&self) -> u32 {
        self.mask() << self.bit_offset
    }

    /// Extracts the field from a raw register value.
    pub const fn extract(&self, register: u32) -> u32 {
        (register >> self.bit_offset) & self.mask()
    }

    /// Replaces the field in a raw register value, leaving all other bits as they are.
    ///
    /// `value` is truncated to the field width.
    pub const fn insert(&self, register: u32, value: u32) -> u32 {
        (register & !self.shifted_mask()) | ((value & self.mask()) << self.bit_offset)
    }
}

/// A bitfield with access mode `A` in a register of peripheral `P`.
pub struct Field<P, A> {
    register: RegisterInfo,
    name: &'static str,
    bit_offset: u32,
    bit_width: u32,
    _marker: PhantomData<fn() -> (P, A)>,
}

impl<P, A> Clone for Field<P, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, A> Copy for Field<P, A> {}

impl<P, A> std::fmt::Debug for Field<P, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("register", &self.register.name)
            .field("name", &self.name)
            .field("bit_offset", &self.bit_offset)
            .field("bit_width", &self.bit_width)
            .finish()
    }
}

impl<P: Peripheral, A: Access> Field<P, A> {
    /// Describes bits `msb` down to `lsb` (both inclusive) of `register`.
    pub const fn new<R: Access>(
        register: Register<P, R>,
        name: &'static str,
        msb: u32,
        lsb: u32,
    ) -> Self {
        let info = register.info;
        assert!(msb >= lsb, "field bits must be given as msb, lsb");
        assert!(msb < info.width.bits(), "field does not fit its register");
        assert!(
            info.access.permits(A::MODE),
            "field access mode is not permitted by its register"
        );

        Field {
            register: info,
            name,
            bit_offset: lsb,
            bit_width: msb - lsb + 1,
            _marker: PhantomData,
        }
    }

    /// The field name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The register holding the field.
    pub const fn register(&self) -> RegisterInfo {
        self.register
    }

    /// The untyped description of this field.
    pub const fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.name,
            register_offset: self.register.offset,
            register_width: self.register.width,
            bit_offset: self.bit_offset,
            bit_width: self.bit_width,
            access: A::MODE,
            register_w1c_mask: self.register.w1c_mask,
        }
    }

    /// The largest value of the field.
    pub const fn mask(&self) -> u32 {
        self.descriptor().mask()
    }

    /// Extracts the field from a raw register value.
    pub const fn extract(&self, register: u32) -> u32 {
        self.descriptor().extract(register)
    }

    /// Replaces the field in a raw register value.
    ///
    /// Use this to compose several fields into one value for
    /// [`Register::write`] or [`Register::modify`].
    pub const fn insert(&self, register: u32, value: u32) -> u32 {
        self.descriptor().insert(register, value)
    }

    /// Selects the field in element `index` of a register array.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. In a `const` this is a compile error.
    pub const fn at(self, index: u64) -> Self {
        Field {
            register: self.register.at(index),
            ..self
        }
    }

    /// Selects the field in element `index` of a register array, for indices
    /// only known at runtime.
    pub fn get(self, index: u64) -> Result<Self, Error> {
        Ok(Field {
            register: self.register.get(index)?,
            ..self
        })
    }

    /// Reads the field of the block at its default base address.
    pub fn read<M>(&self, memory: &mut M) -> Result<u32, Error>
    where
        M: MemoryInterface + ?Sized,
        A: Readable,
    {
        self.read_at(memory, P::BASE)
    }

    /// Reads the field of the block located at `base`.
    pub fn read_at<M>(&self, memory: &mut M, base: u64) -> Result<u32, Error>
    where
        M: MemoryInterface + ?Sized,
        A: Readable,
    {
        read_field(memory, base, &self.descriptor())
    }

    /// Reads the field and converts it to one of its enumerated values.
    ///
    /// Returns [`Error::UnknownValue`] if the field holds a value outside of `T`.
    pub fn read_as<T, M>(&self, memory: &mut M) -> Result<T, Error>
    where
        T: FromPrimitive,
        M: MemoryInterface + ?Sized,
        A: Readable,
    {
        let value = self.read(memory)?;
        T::from_u32(value).ok_or(Error::UnknownValue {
            name: self.name,
            value,
        })
    }

    /// Writes the field of the block at its default base address.
    ///
    /// `value` is truncated to the field width. Other fields of a read-write
    /// register keep their value, write-only and write-one-to-clear fields are
    /// written without reading the register.
    pub fn write<M>(&self, memory: &mut M, value: u32) -> Result<(), Error>
    where
        M: MemoryInterface + ?Sized,
        A: Writable,
    {
        self.write_at(memory, P::BASE, value)
    }

    /// Writes the field of the block located at `base`.
    pub fn write_at<M>(&self, memory: &mut M, base: u64, value: u32) -> Result<(), Error>
    where
        M: MemoryInterface + ?Sized,
        A: Writable,
    {
        write_field(memory, base, &self.descriptor(), value)
    }
}

/// A register value type with named bitfields, bound to its register descriptor.
pub trait MemoryMappedRegister: Copy + From<u32> + Into<u32> + std::fmt::Debug {
    /// The block the register lives in.
    type Peripheral: Peripheral;
    /// The register access mode.
    type Access: Access;
    /// The register descriptor.
    const REGISTER: Register<Self::Peripheral, Self::Access>;

    /// Loads the register of the block at its default base address.
    fn load<M>(memory: &mut M) -> Result<Self, Error>
    where
        M: MemoryInterface + ?Sized,
        Self::Access: Readable,
    {
        Self::load_at(memory, <Self::Peripheral as Peripheral>::BASE)
    }

    /// Loads the register of the block located at `base`.
    fn load_at<M>(memory: &mut M, base: u64) -> Result<Self, Error>
    where
        M: MemoryInterface + ?Sized,
        Self::Access: Readable,
    {
        Ok(Self::from(Self::REGISTER.read_at(memory, base)?))
    }

    /// Stores the value as the whole register, without reading it first.
    fn store<M>(self, memory: &mut M) -> Result<(), Error>
    where
        M: MemoryInterface + ?Sized,
        Self::Access: Writable,
    {
        self.store_at(memory, <Self::Peripheral as Peripheral>::BASE)
    }

    /// Stores the value in the block located at `base`.
    fn store_at<M>(self, memory: &mut M, base: u64) -> Result<(), Error>
    where
        M: MemoryInterface + ?Sized,
        Self::Access: Writable,
    {
        Self::REGISTER.write_at(memory, base, self.into())
    }

    /// Loads the register once, lets `f` change any number of fields and stores
    /// the result once.
    ///
    /// Write-one-to-clear bits are handed to `f` as `0`, set them to clear them.
    fn modify<M, F>(memory: &mut M, f: F) -> Result<Self, Error>
    where
        M: MemoryInterface + ?Sized,
        Self::Access: Modifiable,
        F: FnOnce(&mut Self),
    {
        let loaded: u32 = Self::load(memory)?.into();
        let mut value = Self::from(loaded & !Self::REGISTER.info().w1c_mask());
        f(&mut value);
        value.store(memory)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AccessMode, Field, FieldDescriptor, Peripheral, ReadOnly, ReadWrite, Register,
        RegisterInfo, RegisterWidth, WriteOneToClear,
    };
    use crate::Error;
    use pretty_assertions::assert_eq;

    struct Block;

    impl Peripheral for Block {
        const NAME: &'static str = "BLOCK";
        const BASE: u64 = 0x4000_0000;
        const SIZE: u64 = 0x40;
        const REGISTERS: &'static [RegisterInfo] = &[CTRL.info(), BYTES.info()];
    }

    const CTRL: Register<Block, ReadWrite> = Register::new("CTRL", 0x04, RegisterWidth::U32);
    const BYTES: Register<Block, ReadWrite> =
        Register::array("BYTES", 0x10, RegisterWidth::U8, 12, 1);
    const STATUS: Register<Block, WriteOneToClear> =
        Register::new("STATUS", 0x3C, RegisterWidth::U32);

    const MODE: Field<Block, ReadWrite> = Field::new(CTRL, "MODE", 10, 8);
    const ID: Field<Block, ReadOnly> = Field::new(CTRL, "ID", 31, 24);
    const PRIORITY: Field<Block, ReadWrite> = Field::new(BYTES, "PRIORITY", 7, 4);
    const ERROR: Field<Block, WriteOneToClear> = Field::new(STATUS, "ERROR", 3, 3);

    #[test]
    fn field_geometry() {
        let mode = MODE.descriptor();
        assert_eq!(mode.bit_offset(), 8);
        assert_eq!(mode.bit_width(), 3);
        assert_eq!(mode.mask(), 0b111);
        assert_eq!(mode.shifted_mask(), 0x0000_0700);
        assert_eq!(mode.register_offset(), 0x04);
        assert_eq!(mode.access(), AccessMode::ReadWrite);

        assert_eq!(ID.descriptor().shifted_mask(), 0xFF00_0000);
        assert_eq!(ERROR.descriptor().access(), AccessMode::WriteOneToClear);
    }

    #[test]
    fn extract_and_insert() {
        assert_eq!(MODE.extract(0xFFFF_F5FF), 0b101);
        assert_eq!(MODE.insert(0xFFFF_FFFF, 0b010), 0xFFFF_FAFF);
        // Values wider than the field are truncated.
        assert_eq!(MODE.insert(0, 0b1_1010), 0x0000_0200);
    }

    #[test]
    fn full_width_field() {
        let descriptor =
            FieldDescriptor::checked("ALL", 0, RegisterWidth::U32, 0, 32, AccessMode::ReadOnly)
                .unwrap();
        assert_eq!(descriptor.mask(), u32::MAX);
        assert_eq!(descriptor.extract(0xDEAD_BEEF), 0xDEAD_BEEF);
    }

    #[test]
    fn register_array_elements() {
        assert_eq!(BYTES.at(0).info().offset(), 0x10);
        assert_eq!(BYTES.at(11).info().offset(), 0x1B);
        assert_eq!(PRIORITY.at(3).register().offset(), 0x13);
        assert_eq!(BYTES.info().elements().count(), 12);
        assert_eq!(BYTES.info().address(Block::BASE), 0x4000_0010);
    }

    #[test]
    fn register_array_index_out_of_range() {
        let error = BYTES.get(12).unwrap_err();
        assert!(matches!(
            error,
            Error::IndexOutOfRange {
                name: "BYTES",
                index: 12,
                count: 12
            }
        ));
    }

    #[test]
    fn checked_descriptor_rejects_oversized_fields() {
        let error =
            FieldDescriptor::checked("WIDE", 0, RegisterWidth::U8, 4, 5, AccessMode::ReadWrite)
                .unwrap_err();
        assert!(matches!(
            error,
            Error::InvalidField {
                name: "WIDE",
                register_bits: 8,
                ..
            }
        ));

        assert!(
            FieldDescriptor::checked("EMPTY", 0, RegisterWidth::U32, 0, 0, AccessMode::ReadWrite)
                .is_err()
        );
        assert!(FieldDescriptor::checked(
            "OVERFLOW",
            0,
            RegisterWidth::U32,
            u32::MAX,
            2,
            AccessMode::ReadWrite
        )
        .is_err());
    }

    #[test]
    fn write_one_to_clear_bits_of_read_write_registers() {
        assert_eq!(super::w1c_bits::<ReadWrite, WriteOneToClear>(5, 4), 0x30);
        assert_eq!(super::w1c_bits::<ReadWrite, WriteOneToClear>(31, 0), u32::MAX);
        assert_eq!(super::w1c_bits::<ReadWrite, ReadWrite>(5, 4), 0);
        assert_eq!(super::w1c_bits::<WriteOneToClear, WriteOneToClear>(5, 4), 0);

        let ctrl = CTRL.with_w1c_mask(0x30).volatile_read();
        assert_eq!(ctrl.info().w1c_mask(), 0x30);
        assert!(ctrl.info().has_read_side_effects());
        assert!(!CTRL.info().has_read_side_effects());

        let field = Field::<Block, ReadWrite>::new(ctrl, "MODE", 10, 8);
        assert_eq!(field.descriptor().register_w1c_mask(), 0x30);
    }

    #[test]
    fn access_mode_compatibility() {
        assert!(AccessMode::ReadWrite.permits(AccessMode::WriteOnly));
        assert!(AccessMode::WriteOneToClear.permits(AccessMode::ReadOnly));
        assert!(!AccessMode::WriteOneToClear.permits(AccessMode::ReadWrite));
        assert!(!AccessMode::ReadOnly.permits(AccessMode::ReadWrite));
        assert!(!AccessMode::WriteOnly.permits(AccessMode::ReadOnly));

        assert!(AccessMode::ReadWrite.reads_before_write());
        assert!(!AccessMode::WriteOneToClear.reads_before_write());
        assert!(!AccessMode::WriteOnly.is_readable());
        assert!(!AccessMode::ReadOnly.is_writable());
    }
}
