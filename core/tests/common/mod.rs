#![allow(dead_code)]

use cz80_core::core::{Bus, BusMaster};
use cz80_core::cpu::z80::Z80;

/// Minimal bus for testing: flat 64KB memory, 64K I/O ports, a log of port
/// writes and a programmable interrupt-acknowledge byte.
pub struct TestBus {
    pub memory: Box<[u8; 0x10000]>,
    pub ports: Box<[u8; 0x10000]>,
    pub port_writes: Vec<(u16, u8)>,
    /// Byte returned by `irq_ack`; `None` leaves the bus floating.
    pub ack_vector: Option<u8>,
    pub acks: Vec<u8>,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: Box::new([0; 0x10000]),
            ports: Box::new([0; 0x10000]),
            port_writes: Vec::new(),
            ack_vector: None,
            acks: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }
}

impl Bus for TestBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, _master: BusMaster, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, _master: BusMaster, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
    }

    fn io_read(&mut self, _master: BusMaster, port: u16) -> u8 {
        self.ports[port as usize]
    }

    fn io_write(&mut self, _master: BusMaster, port: u16, data: u8) {
        self.port_writes.push((port, data));
        self.ports[port as usize] = data;
    }

    fn irq_ack(&mut self, _master: BusMaster, line: u8) -> Option<u8> {
        self.acks.push(line);
        self.ack_vector
    }
}

/// Execute one instruction and return its cycle cost.
pub fn run_instruction(cpu: &mut Z80, bus: &mut TestBus) -> u32 {
    cpu.step(bus)
}

/// CPU in the state most hand-written tests expect: everything zero,
/// including F, IX and IY.
pub fn blank_cpu() -> Z80 {
    let mut cpu = Z80::new();
    cpu.f = 0;
    cpu.ix = 0;
    cpu.iy = 0;
    cpu
}

pub const SF: u8 = 0x80;
pub const ZF: u8 = 0x40;
pub const YF: u8 = 0x20;
pub const HF: u8 = 0x10;
pub const XF: u8 = 0x08;
pub const PF: u8 = 0x04;
pub const NF: u8 = 0x02;
pub const CF: u8 = 0x01;
