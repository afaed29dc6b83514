use cz80_core::cpu::z80::Z80;
mod common;
use common::{CF, HF, NF, PF, SF, TestBus, XF, YF, ZF, blank_cpu, run_instruction};

/// Run `CB op` against register B (or (HL) at 0x5000 when the low bits are 6).
fn exec_cb(cpu: &mut Z80, bus: &mut TestBus, op: u8, val: u8, f: u8) -> u32 {
    bus.load(0, &[0xCB, op]);
    cpu.pc = 0;
    cpu.f = f;
    cpu.b = val;
    cpu.set_hl(0x5000);
    bus.memory[0x5000] = val;
    run_instruction(cpu, bus)
}

#[test]
fn test_rotate_shift_register() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    let cases = [
        // op (on B), in, carry in, out, carry out
        (0x00u8, 0x80u8, false, 0x01u8, true), // RLC
        (0x08, 0x01, false, 0x80, true),       // RRC
        (0x10, 0x80, true, 0x01, true),        // RL
        (0x18, 0x01, true, 0x80, true),        // RR
        (0x20, 0xC1, false, 0x82, true),       // SLA
        (0x28, 0x81, false, 0xC0, true),       // SRA keeps the sign
        (0x30, 0x80, false, 0x01, true),       // SLL shifts in a 1
        (0x38, 0x81, true, 0x40, true),        // SRL
        (0x38, 0x02, true, 0x01, false),
    ];
    for (op, val, c, expect, expect_c) in cases {
        let cycles = exec_cb(&mut cpu, &mut bus, op, val, (if c { CF } else { 0 }) | HF | NF);
        assert_eq!(cycles, 8);
        assert_eq!(cpu.b, expect, "CB {op:02X} on {val:02X}");
        assert_eq!(cpu.f & CF != 0, expect_c, "CB {op:02X} carry");
        assert_eq!(cpu.f & (HF | NF), 0, "H and N cleared");
        assert_eq!(cpu.f & PF != 0, expect.count_ones() % 2 == 0, "parity");
        assert_eq!(cpu.f & (SF | YF | XF), expect & (SF | YF | XF));
    }
}

#[test]
fn test_rotate_result_zero_sets_z() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    exec_cb(&mut cpu, &mut bus, 0x20, 0x80, 0); // SLA 0x80
    assert_eq!(cpu.b, 0);
    assert_eq!(cpu.f, ZF | PF | CF);
}

#[test]
fn test_rotate_hl_memory() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    let cycles = exec_cb(&mut cpu, &mut bus, 0x06, 0x81, 0); // RLC (HL)
    assert_eq!(cycles, 15);
    assert_eq!(bus.memory[0x5000], 0x03);
    assert_eq!(cpu.b, 0x81, "B untouched by the (HL) form");
    assert_ne!(cpu.f & CF, 0);
}

#[test]
fn test_bit_register_flags() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();

    // BIT 0,B with bit clear: Z and PV set, H set, C kept
    let cycles = exec_cb(&mut cpu, &mut bus, 0x40, 0xFE, CF);
    assert_eq!(cycles, 8);
    assert_eq!(cpu.f, ZF | PF | HF | CF | (0xFE & (YF | XF)));

    // BIT 7,B with bit set: S set
    exec_cb(&mut cpu, &mut bus, 0x78, 0x80, 0);
    assert_eq!(cpu.f, SF | HF);

    // BIT 5,B set: Y comes from the operand, not from the tested-bit table
    exec_cb(&mut cpu, &mut bus, 0x68, 0x20, 0);
    assert_eq!(cpu.f, HF | YF);

    // BIT 3,B clear with operand bits 5 and 3 set elsewhere
    exec_cb(&mut cpu, &mut bus, 0x58, 0x20, NF);
    assert_eq!(cpu.f, ZF | PF | HF | YF, "N cleared");
}

#[test]
fn test_bit_hl_takes_xy_from_address() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    bus.load(0, &[0xCB, 0x46]); // BIT 0,(HL)
    cpu.set_hl(0x2800);
    bus.memory[0x2800] = 0x00;

    let cycles = run_instruction(&mut cpu, &mut bus);
    assert_eq!(cycles, 12);
    assert_eq!(cpu.f, ZF | PF | HF | YF | XF, "X/Y from H = 0x28");
}

#[test]
fn test_bit_all_bits_and_values() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    for bit in 0..8u8 {
        for val in 0..=255u8 {
            exec_cb(&mut cpu, &mut bus, 0x40 | (bit << 3), val, 0);
            let set = val & (1 << bit) != 0;
            assert_eq!(cpu.f & ZF == 0, set);
            assert_eq!(cpu.f & PF == 0, set);
            assert_eq!(cpu.f & SF != 0, bit == 7 && set);
            assert_eq!(cpu.b, val, "BIT does not write back");
        }
    }
}

#[test]
fn test_set_res_register_and_memory() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();

    let cycles = exec_cb(&mut cpu, &mut bus, 0xD8, 0x00, 0xFF); // SET 3,B
    assert_eq!(cycles, 8);
    assert_eq!(cpu.b, 0x08);
    assert_eq!(cpu.f, 0xFF, "SET leaves flags alone");

    exec_cb(&mut cpu, &mut bus, 0xB8, 0xFF, 0); // RES 7,B
    assert_eq!(cpu.b, 0x7F);
    assert_eq!(cpu.f, 0);

    let cycles = exec_cb(&mut cpu, &mut bus, 0xFE, 0x00, 0); // SET 7,(HL)
    assert_eq!(cycles, 15);
    assert_eq!(bus.memory[0x5000], 0x80);

    let cycles = exec_cb(&mut cpu, &mut bus, 0x86, 0xFF, 0); // RES 0,(HL)
    assert_eq!(cycles, 15);
    assert_eq!(bus.memory[0x5000], 0xFE);
}

#[test]
fn test_cb_register_operands() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    // SET 0 on C, D, E, H, L, A
    bus.load(0, &[0xCB, 0xC1, 0xCB, 0xC2, 0xCB, 0xC3, 0xCB, 0xC4, 0xCB, 0xC5, 0xCB, 0xC7]);
    for _ in 0..6 {
        run_instruction(&mut cpu, &mut bus);
    }
    assert_eq!([cpu.c, cpu.d, cpu.e, cpu.h, cpu.l, cpu.a], [1; 6]);
    assert_eq!(cpu.b, 0);
}
