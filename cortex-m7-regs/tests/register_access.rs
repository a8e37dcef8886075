use cortex_m7_regs::architecture::arm::scs::scb::{self, CoreInfo, Fault, FaultStatus, Scb};
use cortex_m7_regs::register::{read_field, write_field, write_register};
use cortex_m7_regs::test::{MockMemory, Transaction};
use cortex_m7_regs::{AccessMode, Error, FieldDescriptor, Peripheral, RegisterWidth};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const AIRCR: u64 = 0xE000_ED0C;

fn scb_memory(words: &[u32]) -> MockMemory {
    let mut memory = MockMemory::new();
    memory.add_word_range(Scb::BASE, words);
    memory
}

#[test]
fn vectkey_write_keeps_low_half() {
    let mut memory = scb_memory(&[0x411F_C272, 0, 0, 0x0000_0002]);

    scb::aircr::VECTKEY
        .write(&mut memory, scb::VECTKEY_VALUE)
        .expect("Failed to write VECTKEY");

    assert_eq!(memory.read_u32(AIRCR), 0x05FA_0002);
    assert_eq!(
        memory.transactions(),
        &[
            Transaction::Read {
                address: AIRCR,
                width: RegisterWidth::U32
            },
            Transaction::Write {
                address: AIRCR,
                width: RegisterWidth::U32,
                value: 0x05FA_0002
            },
        ]
    );
}

#[test]
fn system_reset_request_keeps_priority_grouping() {
    let mut memory = scb_memory(&[0x411F_C272, 0, 0, 0xFA05_0300]);

    scb::request_system_reset(&mut memory).expect("Failed to request reset");

    assert_eq!(memory.read_u32(AIRCR), 0x05FA_0304);
    assert_eq!(memory.transactions().len(), 2);
}

#[test]
fn cpuid_rejects_raw_writes() {
    let mut memory = scb_memory(&[0x411F_C272]);
    let cpuid = scb::cpuid::REGISTER.info();

    assert!(matches!(
        write_field(&mut memory, Scb::BASE, &scb::cpuid::PARTNO.descriptor(), 0),
        Err(Error::NotWritable { name: "PARTNO" })
    ));
    assert!(matches!(
        write_register(&mut memory, Scb::BASE, &cpuid, 0),
        Err(Error::NotWritable { name: "CPUID" })
    ));

    assert!(memory.transactions().is_empty());
    assert_eq!(memory.read_u32(Scb::BASE), 0x411F_C272);
}

#[test]
fn write_only_field_is_never_read() {
    let mut memory = scb_memory(&[0, 0x0400_0000]);

    scb::icsr::PENDSVCLR
        .write(&mut memory, 1)
        .expect("Failed to write PENDSVCLR");

    assert_eq!(
        memory.transactions(),
        &[Transaction::Write {
            address: 0xE000_ED04,
            width: RegisterWidth::U32,
            value: 0x0800_0000
        }]
    );
}

#[test]
fn write_one_to_clear_field_touches_only_its_bit() {
    let mut memory = scb_memory(&[0; 16]);
    memory.write_u32(0xE000_ED28, 0x0200_8200);

    scb::cfsr::PRECISERR
        .write(&mut memory, 1)
        .expect("Failed to clear PRECISERR");

    assert_eq!(
        memory.transactions(),
        &[Transaction::Write {
            address: 0xE000_ED28,
            width: RegisterWidth::U32,
            value: 0x0000_0200
        }]
    );
}

#[test]
fn neighbouring_nibbles_are_independent() {
    let low = FieldDescriptor::checked("LOW", 0, RegisterWidth::U8, 0, 4, AccessMode::ReadWrite)
        .expect("Invalid field");
    let high = FieldDescriptor::checked("HIGH", 0, RegisterWidth::U8, 4, 4, AccessMode::ReadWrite)
        .expect("Invalid field");

    let mut memory = MockMemory::new();
    memory.add_range(0x2000_0000, vec![0; 4]);

    for a in 0..16 {
        for b in 0..16 {
            write_field(&mut memory, 0x2000_0000, &low, a).expect("Failed to write LOW");
            write_field(&mut memory, 0x2000_0000, &high, b).expect("Failed to write HIGH");

            assert_eq!(read_field(&mut memory, 0x2000_0000, &low).unwrap(), a);
            assert_eq!(read_field(&mut memory, 0x2000_0000, &high).unwrap(), b);

            write_field(&mut memory, 0x2000_0000, &low, 15 - a).expect("Failed to write LOW");
            assert_eq!(read_field(&mut memory, 0x2000_0000, &high).unwrap(), b);
        }
    }

    assert_eq!(memory.read_u32(0x2000_0000) & 0xFFFF_FF00, 0);
}

#[test]
fn random_fields_leave_other_bits_alone() {
    let mut rng = StdRng::seed_from_u64(0x0C27);
    let mut memory = MockMemory::new();
    memory.add_range(0x2000_0000, vec![0; 4]);

    for _ in 0..1000 {
        let bit_width = rng.gen_range(1..=32);
        let bit_offset = rng.gen_range(0..=32 - bit_width);
        let field = FieldDescriptor::checked(
            "RANDOM",
            0,
            RegisterWidth::U32,
            bit_offset,
            bit_width,
            AccessMode::ReadWrite,
        )
        .expect("Generated field does not fit");

        let before: u32 = rng.gen();
        let value: u32 = rng.gen();
        memory.write_u32(0x2000_0000, before);

        write_field(&mut memory, 0x2000_0000, &field, value).expect("Failed to write field");

        let after = memory.read_u32(0x2000_0000);
        assert_eq!(after & !field.shifted_mask(), before & !field.shifted_mask());
        assert_eq!(field.extract(after), value & field.mask());
    }
}

#[test]
fn field_past_register_end_is_rejected() {
    assert!(matches!(
        FieldDescriptor::checked("WIDE", 0, RegisterWidth::U8, 4, 8, AccessMode::ReadWrite),
        Err(Error::InvalidField {
            register_bits: 8,
            ..
        })
    ));
}

#[test]
fn identifies_cortex_m7() {
    let mut memory = scb_memory(&[0x411F_C272]);

    let core = CoreInfo::read(&mut memory).expect("Failed to read CPUID");

    assert!(core.is_cortex_m7());
    assert_eq!(core.to_string(), "ARM Cortex-M7 r1p2");
}

#[test]
fn bus_fault_is_reported_and_cleared() {
    let mut memory = scb_memory(&[0; 16]);
    memory.write_u32(0xE000_ED28, 0x0000_8200);
    memory.write_u32(0xE000_ED38, 0x2000_1000);

    let status = FaultStatus::read(&mut memory).expect("Failed to read fault status");

    assert!(status.is_faulted());
    assert_eq!(status.faults(), vec![Fault::PreciseDataBusError]);
    assert_eq!(status.bfar, Some(0x2000_1000));
    assert_eq!(status.mmfar, None);

    memory.clear_transactions();
    status.clear(&mut memory).expect("Failed to clear faults");

    assert_eq!(
        memory.transactions(),
        &[Transaction::Write {
            address: 0xE000_ED28,
            width: RegisterWidth::U32,
            value: 0x0000_8200
        }]
    );
}
