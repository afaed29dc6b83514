use cz80_core::core::{IrqLine, IrqState};
use cz80_core::cpu::Cpu;
use cz80_core::cpu::z80::Z80;
mod common;
use common::{TestBus, blank_cpu, run_instruction};

fn enabled_cpu(im: u8) -> Z80 {
    let mut cpu = blank_cpu();
    cpu.iff1 = true;
    cpu.iff2 = true;
    cpu.im = im;
    cpu.sp = 0x8000;
    cpu
}

fn stacked_pc(bus: &TestBus) -> u16 {
    u16::from_le_bytes([bus.memory[0x7FFE], bus.memory[0x7FFF]])
}

// --- NMI ---

#[test]
fn test_nmi_wakes_halted_cpu() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x8000;
    bus.load(0, &[0x76]); // HALT
    bus.load(0x66, &[0x00]); // NOP

    cpu.execute(&mut bus, 4);
    assert!(cpu.halted);

    cpu.set_irq(&mut bus, IrqLine::Nmi, IrqState::Assert);
    assert!(!cpu.halted);
    assert_eq!(cpu.pc, 0x0066);
    assert!(!cpu.iff1);
    assert_eq!(stacked_pc(&bus), 0x0001, "return lands after HALT");

    // 11 owed cycles, then the NOP at 0x66
    let used = cpu.execute(&mut bus, 15);
    assert_eq!(used, 15);
    assert_eq!(cpu.pc, 0x0067);
}

#[test]
fn test_nmi_ignores_mask_and_keeps_iff2() {
    let mut cpu = enabled_cpu(1);
    let mut bus = TestBus::new();
    cpu.pc = 0x1234;
    bus.load(0x66, &[0xED, 0x45]); // RETN

    cpu.set_irq(&mut bus, IrqLine::Nmi, IrqState::Pulse);
    assert!(!cpu.iff1);
    assert!(cpu.iff2);
    assert!(bus.acks.is_empty(), "NMI has no acknowledge cycle");

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x1234);
    assert!(cpu.iff1, "RETN restores the pre-NMI state");
}

#[test]
fn test_nmi_fires_with_interrupts_disabled() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.sp = 0x8000;
    cpu.set_irq(&mut bus, IrqLine::Nmi, IrqState::Hold);
    assert_eq!(cpu.pc, 0x0066);
    assert_eq!(cpu.total_cycles(), 11);
}

#[test]
fn test_nmi_clear_is_a_no_op() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.set_irq(&mut bus, IrqLine::Nmi, IrqState::Clear);
    assert_eq!(cpu.pc, 0);
    assert_eq!(cpu.total_cycles(), 0);
}

// --- Maskable modes ---

#[test]
fn test_im1_costs_thirteen() {
    let mut cpu = enabled_cpu(1);
    let mut bus = TestBus::new();
    cpu.pc = 0x0200;

    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Hold);
    assert_eq!(cpu.pc, 0x0038);
    assert_eq!(stacked_pc(&bus), 0x0200);
    assert!(!cpu.iff1);
    assert!(!cpu.iff2);

    let used = cpu.execute(&mut bus, 13);
    assert_eq!(used, 13);
    assert_eq!(cpu.pc, 0x0038, "budget went to the acceptance overhead");
    assert_eq!(cpu.total_cycles(), 13);
}

#[test]
fn test_im0_executes_rst_vector() {
    let mut cpu = enabled_cpu(0);
    let mut bus = TestBus::new();
    bus.ack_vector = Some(0xD7); // RST 10h

    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Hold);
    assert_eq!(cpu.pc, 0x0010);
    assert_eq!(cpu.total_cycles(), 13);
}

#[test]
fn test_im0_default_vector_is_rst38() {
    let mut cpu = enabled_cpu(0);
    let mut bus = TestBus::new();
    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Hold);
    assert_eq!(cpu.pc, 0x0038);
}

#[test]
fn test_im2_vector_table() {
    let mut cpu = enabled_cpu(2);
    let mut bus = TestBus::new();
    cpu.i = 0x40;
    cpu.pc = 0x0345;
    bus.ack_vector = Some(0x20);
    bus.load(0x4020, &[0x00, 0x90]);

    cpu.set_irq(&mut bus, IrqLine::Irq(3), IrqState::Hold);
    assert_eq!(cpu.pc, 0x9000);
    assert_eq!(stacked_pc(&bus), 0x0345);
    assert_eq!(cpu.total_cycles(), 17);
    assert_eq!(bus.acks, vec![3], "acknowledge called once with the line id");
}

#[test]
fn test_im2_floating_bus_uses_default_vector() {
    let mut cpu = enabled_cpu(2);
    let mut bus = TestBus::new();
    cpu.i = 0x40;
    bus.load(0x40FF, &[0x34, 0x12]);

    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Hold);
    assert_eq!(cpu.pc, 0x1234);
}

// --- Masking and the EI shadow ---

#[test]
fn test_masked_irq_waits_for_ei() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.sp = 0x8000;
    cpu.im = 1;
    bus.load(0, &[0x00, 0xFB, 0x00, 0x00]); // NOP ; EI ; NOP ; NOP

    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Assert);
    assert_eq!(cpu.pc, 0);
    assert_eq!(cpu.irq_state(), IrqState::Assert);

    run_instruction(&mut cpu, &mut bus); // NOP
    run_instruction(&mut cpu, &mut bus); // EI
    assert_eq!(cpu.pc, 2);
    run_instruction(&mut cpu, &mut bus); // NOP in the EI shadow
    assert_eq!(cpu.pc, 3);
    assert!(bus.acks.is_empty());

    assert_eq!(run_instruction(&mut cpu, &mut bus), 13);
    assert_eq!(cpu.pc, 0x0038);
    assert_eq!(stacked_pc(&bus), 3);
}

#[test]
fn test_ei_run_keeps_deferring() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.sp = 0x8000;
    cpu.im = 1;
    bus.load(0, &[0xFB, 0xFB, 0xFB, 0x00, 0x00]);
    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Assert);

    for expected_pc in 1..=4 {
        run_instruction(&mut cpu, &mut bus);
        assert_eq!(cpu.pc, expected_pc);
    }
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0038);
    assert_eq!(stacked_pc(&bus), 4);
}

#[test]
fn test_set_irq_inside_ei_shadow_is_deferred() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.sp = 0x8000;
    cpu.im = 1;
    bus.load(0, &[0xFB, 0x00, 0x00]); // EI ; NOP ; NOP

    run_instruction(&mut cpu, &mut bus);
    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Hold);
    assert_eq!(cpu.pc, 1, "not taken before the instruction after EI");

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 2);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0038);
    assert_eq!(cpu.irq_state(), IrqState::Clear);
}

#[test]
fn test_di_blocks_pending_line() {
    let mut cpu = enabled_cpu(1);
    let mut bus = TestBus::new();
    bus.load(0, &[0xF3, 0x00, 0x00]); // DI ; NOP ; NOP
    run_instruction(&mut cpu, &mut bus);
    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Assert);
    run_instruction(&mut cpu, &mut bus);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 3);
    assert!(bus.acks.is_empty());
}

// --- Line states ---

#[test]
fn test_hold_clears_on_acceptance() {
    let mut cpu = enabled_cpu(1);
    let mut bus = TestBus::new();
    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Hold);
    assert_eq!(cpu.irq_state(), IrqState::Clear);
}

#[test]
fn test_assert_stays_and_refires() {
    let mut cpu = enabled_cpu(1);
    let mut bus = TestBus::new();
    bus.load(0x38, &[0xFB, 0xED, 0x4D]); // EI ; RETI

    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Assert);
    assert_eq!(cpu.irq_state(), IrqState::Assert);
    assert_eq!(bus.acks.len(), 1);

    run_instruction(&mut cpu, &mut bus); // EI
    run_instruction(&mut cpu, &mut bus); // RETI in the shadow
    assert_eq!(cpu.pc, 0);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0038);
    assert_eq!(bus.acks.len(), 2);

    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Clear);
    assert_eq!(cpu.irq_state(), IrqState::Clear);
}

#[test]
fn test_pulse_dropped_while_disabled() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.im = 1;
    bus.load(0, &[0xFB, 0x00, 0x00]);

    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Pulse);
    assert_eq!(cpu.irq_state(), IrqState::Clear);
    for _ in 0..3 {
        run_instruction(&mut cpu, &mut bus);
    }
    assert_eq!(cpu.pc, 3);
    assert!(bus.acks.is_empty());
}

#[test]
fn test_pulse_taken_when_enabled() {
    let mut cpu = enabled_cpu(1);
    let mut bus = TestBus::new();
    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Pulse);
    assert_eq!(cpu.pc, 0x0038);
    assert_eq!(cpu.irq_state(), IrqState::Clear);
}

#[test]
fn test_clearing_a_pending_line_cancels_it() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.im = 1;
    bus.load(0, &[0xFB, 0x00, 0x00]);
    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Assert);
    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Clear);
    for _ in 0..3 {
        run_instruction(&mut cpu, &mut bus);
    }
    assert_eq!(cpu.pc, 3);
}

// --- HALT ---

#[test]
fn test_irq_wakes_halt() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.sp = 0x8000;
    cpu.im = 1;
    bus.load(0, &[0xFB, 0x76]); // EI ; HALT

    cpu.execute(&mut bus, 100);
    assert!(cpu.is_sleeping());
    assert_eq!(cpu.pc, 2);

    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Hold);
    assert!(!cpu.halted);
    assert_eq!(cpu.pc, 0x0038);
    assert_eq!(stacked_pc(&bus), 2);
}

#[test]
fn test_pending_irq_taken_at_boundary_during_execute() {
    let mut cpu = blank_cpu();
    let mut bus = TestBus::new();
    cpu.sp = 0x8000;
    cpu.im = 1;
    // EI ; NOP ; HALT
    bus.load(0, &[0xFB, 0x00, 0x76]);
    bus.load(0x38, &[0x76]);
    cpu.set_irq(&mut bus, IrqLine::Irq(0), IrqState::Assert);

    // EI (4) + NOP (4) + acceptance (13) + HALT (4)
    let used = cpu.execute(&mut bus, 25);
    assert_eq!(used, 25);
    assert_eq!(cpu.pc, 0x0039);
    assert!(cpu.halted);
    assert_eq!(stacked_pc(&bus), 2);
}
