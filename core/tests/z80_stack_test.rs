mod common;
use common::{TestBus, blank_cpu, run_instruction};

#[test]
fn test_push_pop_every_pair() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.sp = 0x8000;
    cpu.set_bc(0x1122);
    cpu.set_de(0x3344);
    cpu.set_hl(0x5566);
    cpu.set_af(0x77D5);
    // PUSH BC/DE/HL/AF ; POP BC/DE/HL/AF in reverse pairing
    bus.load(0, &[0xC5, 0xD5, 0xE5, 0xF5, 0xC1, 0xD1, 0xE1, 0xF1]);

    for _ in 0..4 {
        assert_eq!(run_instruction(&mut cpu, &mut bus), 11);
    }
    assert_eq!(cpu.sp, 0x7FF8);
    assert_eq!(&bus.memory[0x7FF8..0x8000], &[0xD5, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]);

    for _ in 0..4 {
        assert_eq!(run_instruction(&mut cpu, &mut bus), 10);
    }
    assert_eq!(cpu.sp, 0x8000);
    assert_eq!(cpu.get_bc(), 0x77D5);
    assert_eq!(cpu.get_de(), 0x5566);
    assert_eq!(cpu.get_hl(), 0x3344);
    assert_eq!(cpu.get_af(), 0x1122);
}

#[test]
fn test_pop_af_loads_all_flag_bits() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.sp = 0x7000;
    bus.load(0x7000, &[0xFF, 0x00]);
    bus.load(0, &[0xF1]); // POP AF

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.f, 0xFF);
    assert_eq!(cpu.a, 0x00);
}

#[test]
fn test_stack_pointer_wraps() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.sp = 0x0001;
    cpu.set_bc(0xABCD);
    bus.load(0x100, &[0xC5, 0xE1]); // PUSH BC ; POP HL
    cpu.pc = 0x100;

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.sp, 0xFFFF);
    assert_eq!(bus.memory[0x0000], 0xAB);
    assert_eq!(bus.memory[0xFFFF], 0xCD);

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.get_hl(), 0xABCD);
    assert_eq!(cpu.sp, 0x0001);
}

#[test]
fn test_ex_sp_hl() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.sp = 0x7000;
    cpu.set_hl(0x1234);
    bus.load(0x7000, &[0x78, 0x56]);
    bus.load(0, &[0xE3]); // EX (SP),HL

    assert_eq!(run_instruction(&mut cpu, &mut bus), 19);
    assert_eq!(cpu.get_hl(), 0x5678);
    assert_eq!(&bus.memory[0x7000..0x7002], &[0x34, 0x12]);
    assert_eq!(cpu.sp, 0x7000);
}

#[test]
fn test_ld_sp_hl() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.set_hl(0xC000);
    bus.load(0, &[0xF9]); // LD SP,HL
    assert_eq!(run_instruction(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.sp, 0xC000);
}

#[test]
fn test_inc_dec_sp() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.sp = 0xFFFF;
    bus.load(0, &[0x33, 0x3B, 0x3B]); // INC SP ; DEC SP ; DEC SP
    assert_eq!(run_instruction(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.sp, 0x0000);
    run_instruction(&mut cpu, &mut bus);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.sp, 0xFFFE);
}
