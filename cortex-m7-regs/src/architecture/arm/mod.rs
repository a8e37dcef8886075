//! All the interface bits for ARM.

pub mod ap;
pub mod component;
pub mod dp;
pub mod scs;
