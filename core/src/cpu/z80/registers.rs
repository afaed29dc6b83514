//! Register accessor API for hosts, debuggers and save-state code.

use crate::core::IrqState;
use crate::cpu::z80::Z80;
use crate::error::Z80Error;

/// Architectural and control registers addressable by id.
///
/// Ids start at 1 and are stable: hosts may persist them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    Pc = 1,
    Sp,
    Af,
    Bc,
    De,
    Hl,
    Ix,
    Iy,
    Af2,
    Bc2,
    De2,
    Hl2,
    R,
    I,
    Im,
    Iff1,
    Iff2,
    Halt,
    IrqState,
    IrqLine,
}

impl Register {
    pub const ALL: [Register; 20] = [
        Register::Pc,
        Register::Sp,
        Register::Af,
        Register::Bc,
        Register::De,
        Register::Hl,
        Register::Ix,
        Register::Iy,
        Register::Af2,
        Register::Bc2,
        Register::De2,
        Register::Hl2,
        Register::R,
        Register::I,
        Register::Im,
        Register::Iff1,
        Register::Iff2,
        Register::Halt,
        Register::IrqState,
        Register::IrqLine,
    ];
}

impl TryFrom<u32> for Register {
    type Error = Z80Error;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        id.checked_sub(1)
            .and_then(|idx| Register::ALL.get(idx as usize))
            .copied()
            .ok_or(Z80Error::InvalidRegister(id))
    }
}

impl Z80 {
    pub fn get_register(&self, reg: Register) -> u32 {
        match reg {
            Register::Pc => self.pc as u32,
            Register::Sp => self.sp as u32,
            Register::Af => self.get_af() as u32,
            Register::Bc => self.get_bc() as u32,
            Register::De => self.get_de() as u32,
            Register::Hl => self.get_hl() as u32,
            Register::Ix => self.ix as u32,
            Register::Iy => self.iy as u32,
            Register::Af2 => ((self.a_prime as u32) << 8) | self.f_prime as u32,
            Register::Bc2 => ((self.b_prime as u32) << 8) | self.c_prime as u32,
            Register::De2 => ((self.d_prime as u32) << 8) | self.e_prime as u32,
            Register::Hl2 => ((self.h_prime as u32) << 8) | self.l_prime as u32,
            Register::R => self.refresh() as u32,
            Register::I => self.i as u32,
            Register::Im => self.im as u32,
            Register::Iff1 => self.iff1 as u32,
            Register::Iff2 => self.iff2 as u32,
            Register::Halt => self.halted as u32,
            Register::IrqState => self.irq_state as u32,
            Register::IrqLine => self.irq_line as u32,
        }
    }

    /// Values are truncated to the register's width. Setting PC does not
    /// disturb the fetch map.
    pub fn set_register(&mut self, reg: Register, value: u32) {
        let word = value as u16;
        let byte = value as u8;
        match reg {
            Register::Pc => self.pc = word,
            Register::Sp => self.sp = word,
            Register::Af => self.set_af(word),
            Register::Bc => self.set_bc(word),
            Register::De => self.set_de(word),
            Register::Hl => self.set_hl(word),
            Register::Ix => self.ix = word,
            Register::Iy => self.iy = word,
            Register::Af2 => {
                self.a_prime = (word >> 8) as u8;
                self.f_prime = byte;
            }
            Register::Bc2 => {
                self.b_prime = (word >> 8) as u8;
                self.c_prime = byte;
            }
            Register::De2 => {
                self.d_prime = (word >> 8) as u8;
                self.e_prime = byte;
            }
            Register::Hl2 => {
                self.h_prime = (word >> 8) as u8;
                self.l_prime = byte;
            }
            Register::R => self.set_refresh(byte),
            Register::I => self.i = byte,
            Register::Im => self.im = byte.min(2),
            Register::Iff1 => self.iff1 = value & 1 != 0,
            Register::Iff2 => self.iff2 = value & 1 != 0,
            Register::Halt => self.halted = value & 1 != 0,
            Register::IrqState => self.irq_state = IrqState::from_u8(byte).unwrap_or_default(),
            Register::IrqLine => self.irq_line = byte,
        }
    }

    /// Raw-id read. Unknown ids read as 0.
    pub fn get_register_raw(&self, id: u32) -> u32 {
        match Register::try_from(id) {
            Ok(reg) => self.get_register(reg),
            Err(err) => {
                log::warn!("Z80 {:?}: {}", self.master, err);
                0
            }
        }
    }

    /// Raw-id write. Unknown ids are ignored.
    pub fn set_register_raw(&mut self, id: u32, value: u32) {
        match Register::try_from(id) {
            Ok(reg) => self.set_register(reg, value),
            Err(err) => log::warn!("Z80 {:?}: {}", self.master, err),
        }
    }
}
