use crate::core::Bus;
use crate::cpu::z80::tables::{CF, SF, VF, ZF};
use crate::cpu::z80::{Z80, timing};

impl Z80 {
    /// Evaluate a condition code (3 bits from opcode bits 5-3).
    /// 0=NZ, 1=Z, 2=NC, 3=C, 4=PO, 5=PE, 6=P, 7=M
    pub(crate) fn eval_condition(&self, cc: u8) -> bool {
        match cc {
            0 => (self.f & ZF) == 0, // NZ
            1 => (self.f & ZF) != 0, // Z
            2 => (self.f & CF) == 0, // NC
            3 => (self.f & CF) != 0, // C
            4 => (self.f & VF) == 0, // PO (parity odd)
            5 => (self.f & VF) != 0, // PE (parity even)
            6 => (self.f & SF) == 0, // P (positive)
            7 => (self.f & SF) != 0, // M (minus)
            _ => unreachable!(),
        }
    }

    fn jump_relative(&mut self, disp: u8) {
        self.pc = self.pc.wrapping_add(disp as i8 as u16);
    }

    /// JP nn: 10 T
    pub(crate) fn op_jp_nn<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.pc = self.fetch16(bus);
    }

    /// JP cc,nn: 10 T whether taken or not.
    pub(crate) fn op_jp_cc_nn<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let addr = self.fetch16(bus);
        if self.eval_condition((opcode >> 3) & 0x07) {
            self.pc = addr;
        }
    }

    /// JR e: 12 T
    pub(crate) fn op_jr_e<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let disp = self.fetch8(bus);
        self.jump_relative(disp);
    }

    /// JR cc,e: 12 T taken, 7 T not taken. Only NZ/Z/NC/C exist.
    pub(crate) fn op_jr_cc_e<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let disp = self.fetch8(bus);
        if self.eval_condition((opcode >> 3) & 0x03) {
            self.jump_relative(disp);
            self.charge(timing::EXTRA_JR);
        }
    }

    /// JP (HL): 4 T. PC = HL/IX/IY, no memory access.
    pub(crate) fn op_jp_hl(&mut self) {
        self.pc = self.get_index_reg();
    }

    /// DJNZ e: 13 T taken, 8 T when B reaches 0.
    pub(crate) fn op_djnz<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let disp = self.fetch8(bus);
        self.b = self.b.wrapping_sub(1);
        if self.b != 0 {
            self.jump_relative(disp);
            self.charge(timing::EXTRA_JR);
        }
    }

    /// CALL nn: 17 T
    pub(crate) fn op_call_nn<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        self.push16(bus, self.pc);
        self.pc = addr;
    }

    /// CALL cc,nn: 17 T taken, 10 T not taken.
    pub(crate) fn op_call_cc_nn<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let addr = self.fetch16(bus);
        if self.eval_condition((opcode >> 3) & 0x07) {
            self.push16(bus, self.pc);
            self.pc = addr;
            self.charge(timing::EXTRA_CALL);
        }
    }

    /// RET: 10 T
    pub(crate) fn op_ret<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.pc = self.pop16(bus);
    }

    /// RET cc: 11 T taken, 5 T not taken.
    pub(crate) fn op_ret_cc<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        if self.eval_condition((opcode >> 3) & 0x07) {
            self.pc = self.pop16(bus);
            self.charge(timing::EXTRA_RET);
        }
    }

    /// RST p: 11 T. Opcode mask: 11 ppp 111, target = p * 8.
    pub(crate) fn op_rst<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        self.push16(bus, self.pc);
        self.pc = (opcode & 0x38) as u16;
    }

    /// DI: 4 T
    pub(crate) fn op_di(&mut self) {
        self.iff1 = false;
        self.iff2 = false;
    }

    /// EI: 4 T. The instruction after EI runs before any interrupt is
    /// checked; a run of EIs keeps deferring.
    pub(crate) fn op_ei(&mut self) {
        self.iff1 = true;
        self.iff2 = true;
        self.ei_delay = true;
    }

    /// RETN / RETI: 14 T. Only RETN (every ED x5 except 4D) copies IFF2 back
    /// into IFF1.
    pub(crate) fn op_retn<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        self.pc = self.pop16(bus);
        if opcode != 0x4D {
            self.iff1 = self.iff2;
        }
    }

    /// IM 0/1/2: 8 T. ED 46/4E/66/6E = IM 0, 56/76 = IM 1, 5E/7E = IM 2.
    pub(crate) fn op_im(&mut self, opcode: u8) {
        let mode = match (opcode >> 3) & 0x03 {
            0 | 1 => 0,
            2 => 1,
            _ => 2,
        };
        if mode != self.im {
            log::debug!("Z80 {:?} interrupt mode {} -> {}", self.master, self.im, mode);
        }
        self.im = mode;
    }
}
