use crate::core::Bus;
use crate::cpu::z80::Z80;
use crate::cpu::z80::tables::{CF, HF, NF, SF, VF, XF, YF, ZF, arith_index};

impl Z80 {
    // --- 8-bit arithmetic ---

    fn do_add(&mut self, val: u8, carry_in: bool) {
        let carry = carry_in && (self.f & CF) != 0;
        let result = self.a.wrapping_add(val).wrapping_add(carry as u8);
        self.f = self.tables.szhvc_add[arith_index(carry, self.a, result)];
        self.a = result;
    }

    fn do_sub(&mut self, val: u8, carry_in: bool) {
        let carry = carry_in && (self.f & CF) != 0;
        let result = self.a.wrapping_sub(val).wrapping_sub(carry as u8);
        self.f = self.tables.szhvc_sub[arith_index(carry, self.a, result)];
        self.a = result;
    }

    fn do_cp(&mut self, val: u8) {
        let result = self.a.wrapping_sub(val);
        // X/Y come from the operand for CP, not the result
        self.f = (self.tables.szhvc_sub[arith_index(false, self.a, result)] & !(YF | XF))
            | (val & (YF | XF));
    }

    fn perform_alu_op(&mut self, op: u8, val: u8) {
        match op {
            0 => self.do_add(val, false), // ADD
            1 => self.do_add(val, true),  // ADC
            2 => self.do_sub(val, false), // SUB
            3 => self.do_sub(val, true),  // SBC
            4 => { self.a &= val; self.f = self.tables.szp[self.a as usize] | HF; } // AND
            5 => { self.a ^= val; self.f = self.tables.szp[self.a as usize]; } // XOR
            6 => { self.a |= val; self.f = self.tables.szp[self.a as usize]; } // OR
            7 => self.do_cp(val),         // CP
            _ => unreachable!(),
        }
    }

    pub(crate) fn inc8(&mut self, val: u8) -> u8 {
        let result = val.wrapping_add(1);
        self.f = (self.f & CF) | self.tables.szhv_inc[result as usize];
        result
    }

    pub(crate) fn dec8(&mut self, val: u8) -> u8 {
        let result = val.wrapping_sub(1);
        self.f = (self.f & CF) | self.tables.szhv_dec[result as usize];
        result
    }

    // --- Instructions ---

    /// ALU A, r: 4 T (reg), 7 T ((HL)), 19 T ((IX+d))
    /// ADD, ADC, SUB, SBC, AND, XOR, OR, CP
    /// Opcode mask: 10 xxx zzz
    pub(crate) fn op_alu_r<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let alu_op = (opcode >> 3) & 0x07;
        let r = opcode & 0x07;

        let val = if r == 6 {
            let addr = self.hl_operand_addr(bus);
            self.read8(bus, addr)
        } else {
            self.get_reg8_ix(r)
        };
        self.perform_alu_op(alu_op, val);
    }

    /// ALU A, n: 7 T
    /// Opcode mask: 11 xxx 110
    pub(crate) fn op_alu_n<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let val = self.fetch8(bus);
        self.perform_alu_op((opcode >> 3) & 0x07, val);
    }

    /// INC/DEC r: 4 T (reg), 11 T ((HL)), 23 T ((IX+d))
    /// Opcode mask: 00 rrr 10x
    pub(crate) fn op_inc_dec_r<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let r = (opcode >> 3) & 0x07;
        let is_dec = (opcode & 0x01) != 0;

        if r == 6 {
            let addr = self.hl_operand_addr(bus);
            let val = self.read8(bus, addr);
            let result = if is_dec { self.dec8(val) } else { self.inc8(val) };
            self.write8(bus, addr, result);
        } else {
            let val = self.get_reg8_ix(r);
            let result = if is_dec { self.dec8(val) } else { self.inc8(val) };
            self.set_reg8_ix(r, result);
        }
    }

    /// NEG: 8 T. A = 0 - A with SUB flags.
    pub(crate) fn op_neg(&mut self) {
        let val = self.a;
        self.a = 0;
        self.do_sub(val, false);
    }

    // --- 16-bit ALU ---

    /// ADD HL,rr: 11 T
    /// Opcode mask: 00 rr1 001 (rr: 0=BC, 1=DE, 2=HL/IX/IY, 3=SP)
    /// Flags: H = carry from bit 11, C = carry from bit 15, N = 0.
    /// S, Z, PV preserved. X/Y from high byte of result.
    pub(crate) fn op_add_hl_rr(&mut self, opcode: u8) {
        let dst = self.get_rp(2) as u32;
        let src = self.get_rp((opcode >> 4) & 0x03) as u32;
        let result = dst + src;

        self.f = (self.f & (SF | ZF | VF))
            | (((dst ^ result ^ src) >> 8) as u8 & HF)
            | ((result >> 16) as u8 & CF)
            | ((result >> 8) as u8 & (YF | XF));
        self.set_rp(2, result as u16);
    }

    /// ADC HL,rr: 15 T
    /// Opcode mask: 01 rr1 010
    pub(crate) fn op_adc_hl_rr(&mut self, opcode: u8) {
        let hl = self.get_hl() as u32;
        let src = self.get_rp((opcode >> 4) & 0x03) as u32;
        let result = hl + src + (self.f & CF) as u32;

        let mut f = (((hl ^ result ^ src) >> 8) as u8 & HF)
            | ((result >> 16) as u8 & CF)
            | ((result >> 8) as u8 & (SF | YF | XF));
        if result & 0xFFFF == 0 {
            f |= ZF;
        }
        f |= (((src ^ hl ^ 0x8000) & (src ^ result) & 0x8000) >> 13) as u8;
        self.f = f;
        self.set_hl(result as u16);
    }

    /// SBC HL,rr: 15 T
    /// Opcode mask: 01 rr0 010
    pub(crate) fn op_sbc_hl_rr(&mut self, opcode: u8) {
        let hl = self.get_hl() as u32;
        let src = self.get_rp((opcode >> 4) & 0x03) as u32;
        let result = hl.wrapping_sub(src).wrapping_sub((self.f & CF) as u32);

        let mut f = NF
            | (((hl ^ result ^ src) >> 8) as u8 & HF)
            | ((result >> 16) as u8 & CF)
            | ((result >> 8) as u8 & (SF | YF | XF));
        if result & 0xFFFF == 0 {
            f |= ZF;
        }
        f |= (((src ^ hl) & (hl ^ result) & 0x8000) >> 13) as u8;
        self.f = f;
        self.set_hl(result as u16);
    }

    /// INC rr / DEC rr: 6 T
    /// INC: 00 rr0 011, DEC: 00 rr1 011. No flags affected.
    pub(crate) fn op_inc_dec_rr(&mut self, opcode: u8) {
        let rp = (opcode >> 4) & 0x03;
        let val = self.get_rp(rp);
        let result = if (opcode & 0x08) != 0 { val.wrapping_sub(1) } else { val.wrapping_add(1) };
        self.set_rp(rp, result);
    }

    // --- Accumulator Rotates ---

    /// RLCA: old bit 7 to carry and bit 0. S, Z, PV preserved.
    pub(crate) fn op_rlca(&mut self) {
        self.a = self.a.rotate_left(1);
        self.f = (self.f & (SF | ZF | VF)) | (self.a & (YF | XF | CF));
    }

    /// RRCA: old bit 0 to carry and bit 7.
    pub(crate) fn op_rrca(&mut self) {
        let carry = self.a & CF;
        self.a = self.a.rotate_right(1);
        self.f = (self.f & (SF | ZF | VF)) | carry | (self.a & (YF | XF));
    }

    /// RLA: old bit 7 to C, old C to bit 0.
    pub(crate) fn op_rla(&mut self) {
        let carry = self.a >> 7;
        self.a = (self.a << 1) | (self.f & CF);
        self.f = (self.f & (SF | ZF | VF)) | carry | (self.a & (YF | XF));
    }

    /// RRA: old bit 0 to C, old C to bit 7.
    pub(crate) fn op_rra(&mut self) {
        let carry = self.a & CF;
        self.a = (self.a >> 1) | ((self.f & CF) << 7);
        self.f = (self.f & (SF | ZF | VF)) | carry | (self.a & (YF | XF));
    }

    // --- Misc ALU ---

    /// DAA: decimal adjust A after a BCD add (N=0) or subtract (N=1).
    pub(crate) fn op_daa(&mut self) {
        let a = self.a;
        let low_adjust = (self.f & HF) != 0 || (a & 0x0F) > 9;
        let high_adjust = (self.f & CF) != 0 || a > 0x99;

        let mut result = a;
        if (self.f & NF) != 0 {
            if low_adjust { result = result.wrapping_sub(0x06); }
            if high_adjust { result = result.wrapping_sub(0x60); }
        } else {
            if low_adjust { result = result.wrapping_add(0x06); }
            if high_adjust { result = result.wrapping_add(0x60); }
        }

        let mut f = (self.f & (CF | NF)) | ((a ^ result) & HF) | self.tables.szp[result as usize];
        if a > 0x99 {
            f |= CF;
        }
        self.f = f;
        self.a = result;
    }

    /// CPL: complement A. Sets H and N. S, Z, PV, C preserved.
    pub(crate) fn op_cpl(&mut self) {
        self.a = !self.a;
        self.f = (self.f & (SF | ZF | VF | CF)) | HF | NF | (self.a & (YF | XF));
    }

    /// SCF: C = 1, H = 0, N = 0. X/Y from A.
    pub(crate) fn op_scf(&mut self) {
        self.f = (self.f & (SF | ZF | VF)) | CF | (self.a & (YF | XF));
    }

    /// CCF: H = old C, C inverted, N = 0. X/Y from A.
    pub(crate) fn op_ccf(&mut self) {
        self.f = ((self.f & (SF | ZF | VF | CF)) | ((self.f & CF) << 4) | (self.a & (YF | XF))) ^ CF;
    }

    /// RRD: 18 T. Rotate the low nibbles of A and (HL) right through (HL).
    pub(crate) fn op_rrd<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.get_hl();
        let n = self.read8(bus, addr);
        self.write8(bus, addr, (n >> 4) | (self.a << 4));
        self.a = (self.a & 0xF0) | (n & 0x0F);
        self.f = (self.f & CF) | self.tables.szp[self.a as usize];
    }

    /// RLD: 18 T. Rotate the low nibbles of A and (HL) left through (HL).
    pub(crate) fn op_rld<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.get_hl();
        let n = self.read8(bus, addr);
        self.write8(bus, addr, (n << 4) | (self.a & 0x0F));
        self.a = (self.a & 0xF0) | (n >> 4);
        self.f = (self.f & CF) | self.tables.szp[self.a as usize];
    }
}
