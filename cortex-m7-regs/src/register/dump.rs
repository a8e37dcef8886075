//! Register dumps of a whole peripheral block.
use super::{read_register, Peripheral, RegisterInfo};
use crate::error::Error;
use crate::memory::MemoryInterface;
use serde::Serialize;

/// The value of one register at the time of the dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterSnapshot {
    /// The register name. Array elements carry their index, e.g. `COMP[2]`.
    pub name: String,
    /// The absolute address the register was read from.
    pub address: u64,
    /// The register value.
    pub value: u32,
}

/// Reads every readable register of `P` at its default base address once.
///
/// Write-only registers and registers whose reads change device state are
/// skipped, so the dump leaves the peripheral as it was.
pub fn dump<P, M>(memory: &mut M) -> Result<Vec<RegisterSnapshot>, Error>
where
    P: Peripheral,
    M: MemoryInterface + ?Sized,
{
    dump_at::<P, M>(memory, P::BASE)
}

/// Like [`dump`], for a block located at `base`.
pub fn dump_at<P, M>(memory: &mut M, base: u64) -> Result<Vec<RegisterSnapshot>, Error>
where
    P: Peripheral,
    M: MemoryInterface + ?Sized,
{
    tracing::debug!("Dumping {} registers at {:#010x}", P::NAME, base);

    let mut snapshots = Vec::new();

    let registers = P::REGISTERS
        .iter()
        .filter(|r| r.access().is_readable() && !r.has_read_side_effects());

    for register in registers {
        for (index, element) in register.elements().enumerate() {
            snapshots.push(RegisterSnapshot {
                name: element_name(register, index),
                address: element.address(base),
                value: read_register(memory, base, &element)?,
            });
        }
    }

    Ok(snapshots)
}

fn element_name(register: &RegisterInfo, index: usize) -> String {
    if register.count() > 1 {
        format!("{}[{}]", register.name(), index)
    } else {
        register.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::dump;
    use crate::architecture::arm::component::fpb::Fpb;
    use crate::register::Peripheral;
    use crate::test::{MockMemory, Transaction};
    use pretty_assertions::assert_eq;

    #[test]
    fn dump_reads_each_readable_register_once() {
        let mut memory = MockMemory::new();
        memory.add_word_range(Fpb::BASE, &[0x1000_0261, 0x2000_0000]);
        memory.add_word_range(Fpb::BASE + 0x08, &[0; 8]);
        memory.add_word_range(Fpb::BASE + 0xFB0, &[0, 0x3]);
        memory.add_word_range(Fpb::BASE + 0xFD0, &[0x04, 0, 0, 0]);
        memory.add_word_range(Fpb::BASE + 0xFE0, &[0x03, 0xB0, 0x0B, 0x00]);
        memory.add_word_range(Fpb::BASE + 0xFF0, &[0x0D, 0xE0, 0x05, 0xB1]);

        let snapshots = dump::<Fpb, _>(&mut memory).unwrap();

        assert_eq!(snapshots[0].name, "FP_CTRL");
        assert_eq!(snapshots[0].value, 0x1000_0261);
        assert_eq!(snapshots[3].name, "FP_COMP[1]");
        assert_eq!(snapshots[3].address, Fpb::BASE + 0x0C);

        // LAR is write-only and must not show up.
        assert!(snapshots.iter().all(|s| s.name != "LAR"));
        assert!(memory
            .transactions()
            .iter()
            .all(|t| matches!(t, Transaction::Read { .. })));
        assert_eq!(memory.transactions().len(), snapshots.len());
    }

    #[test]
    fn snapshot_serializes() {
        let mut memory = MockMemory::new();
        memory.add_word_range(Fpb::BASE, &[0x1000_0261, 0x2000_0000]);
        memory.add_word_range(Fpb::BASE + 0x08, &[0; 8]);
        memory.add_word_range(Fpb::BASE + 0xFB0, &[0, 0x3]);
        memory.add_word_range(Fpb::BASE + 0xFD0, &[0; 4]);
        memory.add_word_range(Fpb::BASE + 0xFE0, &[0; 4]);
        memory.add_word_range(Fpb::BASE + 0xFF0, &[0; 4]);

        let snapshots = dump::<Fpb, _>(&mut memory).unwrap();
        let json = serde_json::to_value(&snapshots[0]).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "FP_CTRL",
                "address": 0xE000_2000u64,
                "value": 0x1000_0261u32,
            })
        );
    }

    #[test]
    fn dump_leaves_transfer_registers_alone() {
        use crate::architecture::arm::ap::memory_ap::MemAp;

        let mut memory = MockMemory::new();
        memory.add_word_range(MemAp::BASE, &[0; 0x100 / 4]);

        let snapshots = dump::<MemAp, _>(&mut memory).unwrap();
        let names: Vec<_> = snapshots.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, ["CSW", "TAR", "CFG", "BASE", "IDR"]);
        assert!(memory.transactions().iter().all(|t| matches!(
            t,
            Transaction::Read { address, .. } if ![0x0C, 0x10, 0x14, 0x18, 0x1C, 0x20].contains(address)
        )));
    }
}
