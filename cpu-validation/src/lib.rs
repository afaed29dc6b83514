use std::collections::VecDeque;

use cz80_core::core::{Bus, BusMaster};
use serde::{Deserialize, Serialize};

// --- TracingBus: flat 64KB memory, scripted ports, access log ---

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BusOp {
    Read,
    Write,
    PortRead,
    PortWrite,
}

#[derive(Clone, Debug)]
pub struct BusCycle {
    pub addr: u16,
    pub data: u8,
    pub op: BusOp,
}

pub struct TracingBus {
    pub memory: Box<[u8; 0x10000]>,
    pub cycles: Vec<BusCycle>,
    /// Values handed out by successive port reads, in order.
    pub port_inputs: VecDeque<(u16, u8)>,
}

impl TracingBus {
    pub fn new() -> Self {
        Self {
            memory: Box::new([0; 0x10000]),
            cycles: Vec::new(),
            port_inputs: VecDeque::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn clear_cycles(&mut self) {
        self.cycles.clear();
    }

    /// Port writes seen so far, in order.
    pub fn port_writes(&self) -> Vec<(u16, u8)> {
        self.cycles
            .iter()
            .filter(|c| c.op == BusOp::PortWrite)
            .map(|c| (c.addr, c.data))
            .collect()
    }
}

impl Default for TracingBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for TracingBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, _master: BusMaster, addr: u16) -> u8 {
        let data = self.memory[addr as usize];
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Read,
        });
        data
    }

    fn write(&mut self, _master: BusMaster, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Write,
        });
    }

    fn io_read(&mut self, _master: BusMaster, port: u16) -> u8 {
        // unscripted reads float high
        let data = match self.port_inputs.front() {
            Some(&(addr, data)) if addr == port => {
                self.port_inputs.pop_front();
                data
            }
            _ => 0xFF,
        };
        self.cycles.push(BusCycle {
            addr: port,
            data,
            op: BusOp::PortRead,
        });
        data
    }

    fn io_write(&mut self, _master: BusMaster, port: u16, data: u8) {
        self.cycles.push(BusCycle {
            addr: port,
            data,
            op: BusOp::PortWrite,
        });
    }
}

// --- Z80 JSON test vector types (SingleStepTests/z80 format) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Z80TestCase {
    pub name: String,
    pub initial: Z80CpuState,
    #[serde(rename = "final")]
    pub final_state: Z80CpuState,
    pub cycles: Vec<(Option<u16>, Option<u8>, String)>,
    /// `(port, value, "r" | "w")`
    #[serde(default)]
    pub ports: Vec<(u16, u8, String)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Z80CpuState {
    pub pc: u16,
    pub sp: u16,
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub f: u8,
    pub h: u8,
    pub l: u8,
    pub i: u8,
    pub r: u8,
    pub ei: u8,
    /// Internal MEMPTR; not modelled by the core.
    #[serde(default)]
    pub wz: u16,
    pub ix: u16,
    pub iy: u16,
    #[serde(rename = "af_")]
    pub af_prime: u16,
    #[serde(rename = "bc_")]
    pub bc_prime: u16,
    #[serde(rename = "de_")]
    pub de_prime: u16,
    #[serde(rename = "hl_")]
    pub hl_prime: u16,
    pub im: u8,
    #[serde(default)]
    pub p: u8,
    #[serde(default)]
    pub q: u8,
    pub iff1: u8,
    pub iff2: u8,
    pub ram: Vec<(u16, u8)>,
}

impl Z80TestCase {
    /// Scripted port reads in the order the instruction performs them.
    pub fn port_inputs(&self) -> VecDeque<(u16, u8)> {
        self.ports
            .iter()
            .filter(|(_, _, dir)| dir.starts_with('r'))
            .map(|&(port, data, _)| (port, data))
            .collect()
    }

    /// Port writes the instruction must perform, in order.
    pub fn port_outputs(&self) -> Vec<(u16, u8)> {
        self.ports
            .iter()
            .filter(|(_, _, dir)| dir.starts_with('w'))
            .map(|&(port, data, _)| (port, data))
            .collect()
    }
}
