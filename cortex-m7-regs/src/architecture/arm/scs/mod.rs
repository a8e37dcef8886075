//! Blocks of the ARMv7-M System Control Space at `0xE000_E000`.

pub mod dcb;
pub mod scb;
