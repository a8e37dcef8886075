/// Defines a register descriptor and its field descriptors in a module named
/// after the register.
///
/// ```ignore
/// define_register! {
///     /// Application Interrupt and Reset Control Register
///     pub mod aircr: Scb, "AIRCR" @ 0x0C, U32, ReadWrite;
///
///     /// Reset the whole system.
///     SYSRESETREQ: WriteOnly = 2, 2;
/// }
/// ```
///
/// An array of registers takes `[count; stride]` after the access mode. A
/// trailing `volatile_read` marks registers whose reads change device state.
///
/// Write-one-to-clear fields of a read-write register are collected into the
/// register's [`w1c_mask`](crate::register::RegisterInfo::w1c_mask).
macro_rules! define_register {
    (@register $name:literal, $offset:expr, $width:ident) => {
        $crate::register::Register::new($name, $offset, $crate::register::RegisterWidth::$width)
    };
    (@register $name:literal, $offset:expr, $width:ident, $count:expr, $stride:expr) => {
        $crate::register::Register::array(
            $name,
            $offset,
            $crate::register::RegisterWidth::$width,
            $count,
            $stride,
        )
    };
    (
        $(#[$outer:meta])*
        pub mod $module:ident: $peripheral:ident, $name:literal @ $offset:expr, $width:ident, $access:ident
            $(, [$count:expr; $stride:expr])? $(, $flag:ident)?;
        $(
            $(#[$inner:meta])*
            $field:ident: $field_access:ident = $msb:literal, $lsb:literal;
        )*
    ) => {
        $(#[$outer])*
        pub mod $module {
            /// The register descriptor.
            pub const REGISTER: $crate::register::Register<
                super::$peripheral,
                $crate::register::$access,
            > = define_register!(@register $name, $offset, $width $(, $count, $stride)?)
                .with_w1c_mask(
                    0 $(| $crate::register::w1c_bits::<
                        $crate::register::$access,
                        $crate::register::$field_access,
                    >($msb, $lsb))*
                )
                $(.$flag())?;

            $(
                $(#[$inner])*
                pub const $field: $crate::register::Field<
                    super::$peripheral,
                    $crate::register::$field_access,
                > = $crate::register::Field::new(REGISTER, stringify!($field), $msb, $lsb);
            )*
        }
    };
}

/// Defines a register value type with named bitfields and binds it to a
/// register descriptor.
///
/// The bitfield syntax is the one of the [`bitfield`] crate.
macro_rules! memory_mapped_bitfield_register {
    (
        $(#[$outer:meta])*
        pub struct $name:ident(u32);
        $register:path: $peripheral:ident, $access:ident;
        impl From;
        $($rest:tt)*
    ) => {
        bitfield::bitfield! {
            $(#[$outer])*
            #[derive(Copy, Clone, PartialEq, Eq)]
            pub struct $name(u32);
            impl Debug;
            $($rest)*
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl $crate::register::MemoryMappedRegister for $name {
            type Peripheral = $peripheral;
            type Access = $crate::register::$access;
            const REGISTER: $crate::register::Register<$peripheral, $crate::register::$access> =
                $register;
        }
    };
}

/// Checks at compile time that each register descriptor sits at the offset of
/// the layout struct field with the same name.
///
/// `Layout.nested: Inner => ...` checks registers of a nested layout struct.
macro_rules! assert_layout {
    ($layout:ident.$nested:ident: $inner:ident => $($field:ident),* $(,)?) => {
        $(
            static_assertions::const_assert_eq!(
                (::core::mem::offset_of!($layout, $nested) + ::core::mem::offset_of!($inner, $field))
                    as u64,
                $field::REGISTER.info().offset()
            );
        )*
    };
    ($layout:ident: $($field:ident),* $(,)?) => {
        $(
            static_assertions::const_assert_eq!(
                ::core::mem::offset_of!($layout, $field) as u64,
                $field::REGISTER.info().offset()
            );
        )*
    };
}
