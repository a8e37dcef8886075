//! The raw access primitives. Each call is at most one load and one store.
use super::{AccessMode, FieldDescriptor, RegisterInfo, RegisterWidth};
use crate::error::Error;
use crate::memory::MemoryInterface;

fn load<M>(memory: &mut M, address: u64, width: RegisterWidth) -> Result<u32, Error>
where
    M: MemoryInterface + ?Sized,
{
    match width {
        RegisterWidth::U8 => memory.read_word_8(address).map(u32::from),
        RegisterWidth::U32 => memory.read_word_32(address),
    }
}

fn store<M>(memory: &mut M, address: u64, width: RegisterWidth, value: u32) -> Result<(), Error>
where
    M: MemoryInterface + ?Sized,
{
    match width {
        // Byte registers only carry the low eight bits.
        RegisterWidth::U8 => memory.write_word_8(address, value as u8),
        RegisterWidth::U32 => memory.write_word_32(address, value),
    }
}

/// Reads the field `field` of the block located at `base`.
///
/// Returns [`Error::NotReadable`] for write-only fields without touching memory.
pub fn read_field<M>(memory: &mut M, base: u64, field: &FieldDescriptor) -> Result<u32, Error>
where
    M: MemoryInterface + ?Sized,
{
    if !field.access().is_readable() {
        return Err(Error::NotReadable { name: field.name() });
    }

    let address = base + field.register_offset();
    let register = load(memory, address, field.register_width())?;
    let value = field.extract(register);

    tracing::trace!("{} @ {:#010x} -> {:#x}", field.name(), address, value);

    Ok(value)
}

/// Writes `value` into the field `field` of the block located at `base`.
///
/// `value` is truncated to the field width. Read-write fields are merged into
/// the current register contents with one load and one store, except for the
/// register's write-one-to-clear bits, which are stored as `0`. Write-only and
/// write-one-to-clear fields are stored directly, with all other bits zero.
///
/// Returns [`Error::NotWritable`] for read-only fields without touching memory.
pub fn write_field<M>(
    memory: &mut M,
    base: u64,
    field: &FieldDescriptor,
    value: u32,
) -> Result<(), Error>
where
    M: MemoryInterface + ?Sized,
{
    let address = base + field.register_offset();
    let width = field.register_width();

    let access = field.access();
    if !access.is_writable() {
        return Err(Error::NotWritable { name: field.name() });
    }

    let register = if access.reads_before_write() {
        let current = load(memory, address, width)?;
        field.insert(current & !field.register_w1c_mask(), value)
    } else {
        field.insert(0, value)
    };

    tracing::trace!("{} @ {:#010x} <- {:#x}", field.name(), address, value);

    store(memory, address, width, register)
}

/// Reads the whole register `register` of the block located at `base`.
pub fn read_register<M>(memory: &mut M, base: u64, register: &RegisterInfo) -> Result<u32, Error>
where
    M: MemoryInterface + ?Sized,
{
    if !register.access().is_readable() {
        return Err(Error::NotReadable {
            name: register.name(),
        });
    }

    let address = register.address(base);
    let value = load(memory, address, register.width())?;

    tracing::trace!("{} @ {:#010x} -> {:#010x}", register.name(), address, value);

    Ok(value)
}

/// Stores `value` as the whole register `register`, without reading it first.
pub fn write_register<M>(
    memory: &mut M,
    base: u64,
    register: &RegisterInfo,
    value: u32,
) -> Result<(), Error>
where
    M: MemoryInterface + ?Sized,
{
    if !register.access().is_writable() {
        return Err(Error::NotWritable {
            name: register.name(),
        });
    }

    let address = register.address(base);

    tracing::trace!("{} @ {:#010x} <- {:#010x}", register.name(), address, value);

    store(memory, address, register.width(), value)
}

/// Reads `register` once, passes the value to `f` and stores the result once.
///
/// Write-one-to-clear bits of the register are passed to `f` as `0`. Only
/// read-write registers can be modified. Returns the stored value.
pub fn modify_register<M, F>(
    memory: &mut M,
    base: u64,
    register: &RegisterInfo,
    f: F,
) -> Result<u32, Error>
where
    M: MemoryInterface + ?Sized,
    F: FnOnce(u32) -> u32,
{
    match register.access() {
        AccessMode::ReadWrite => {}
        AccessMode::WriteOnly => {
            return Err(Error::NotReadable {
                name: register.name(),
            })
        }
        AccessMode::ReadOnly | AccessMode::WriteOneToClear => {
            return Err(Error::NotWritable {
                name: register.name(),
            })
        }
    }

    let address = register.address(base);
    let width = register.width();
    let old = load(memory, address, width)?;
    let new = f(old & !register.w1c_mask());

    tracing::trace!(
        "{} @ {:#010x}: {:#010x} -> {:#010x}",
        register.name(),
        address,
        old,
        new
    );

    store(memory, address, width, new)?;
    Ok(new)
}
