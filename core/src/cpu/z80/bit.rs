use crate::core::Bus;
use crate::cpu::z80::tables::{CF, HF, XF, YF};
use crate::cpu::z80::{Z80, timing};

impl Z80 {
    /// Perform CB rotate/shift operation on a value.
    /// op: 0=RLC, 1=RRC, 2=RL, 3=RR, 4=SLA, 5=SRA, 6=SLL(undoc), 7=SRL.
    /// Returns (result, new_flags). Flags: S, Z, PV(parity), C from shifted bit. H=0, N=0.
    fn do_cb_rotate_shift(&self, op: u8, val: u8) -> (u8, u8) {
        let (result, carry) = match op {
            0 => (val.rotate_left(1), val >> 7),                 // RLC
            1 => (val.rotate_right(1), val & 1),                 // RRC
            2 => ((val << 1) | (self.f & CF), val >> 7),         // RL
            3 => ((val >> 1) | ((self.f & CF) << 7), val & 1),   // RR
            4 => (val << 1, val >> 7),                           // SLA
            5 => ((val >> 1) | (val & 0x80), val & 1),           // SRA
            6 => ((val << 1) | 1, val >> 7),                     // SLL
            7 => (val >> 1, val & 1),                            // SRL
            _ => unreachable!(),
        };
        (result, self.tables.szp[result as usize] | carry)
    }

    /// BIT b: Z = ~bit, S = bit 7 if tested, PV = Z, H=1, N=0, C preserved.
    /// X/Y are supplied by the caller: the operand for registers, the high
    /// byte of the effective address for memory forms.
    fn bit_flags(&mut self, bit: u8, val: u8, xy: u8) {
        self.f = (self.f & CF)
            | HF
            | (self.tables.sz_bit[(val & (1 << bit)) as usize] & !(YF | XF))
            | (xy & (YF | XF));
    }

    /// Execute CB-prefixed instruction.
    /// Rotate/shift: S, Z, PV(parity), C from shifted bit, H=0, N=0.
    /// SET/RES: No flags affected.
    /// Register ops: 8 T. BIT b,(HL): 12 T. Rotate/shift/SET/RES (HL): 15 T.
    pub(crate) fn execute_instruction_cb<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let op = self.fetch_opcode(bus);
        self.charge(timing::CC_CB[op as usize] as u32);

        let xx = (op >> 6) & 0x03; // 0=rot/shift, 1=BIT, 2=RES, 3=SET
        let yyy = (op >> 3) & 0x07; // bit number or shift operation
        let zzz = op & 0x07; // register index

        if zzz == 6 {
            let addr = self.get_hl();
            let val = self.read8(bus, addr);
            if xx == 1 {
                self.bit_flags(yyy, val, (addr >> 8) as u8);
            } else {
                let result = self.cb_modify(xx, yyy, val);
                self.write8(bus, addr, result);
            }
        } else {
            let val = self.get_reg8(zzz);
            if xx == 1 {
                self.bit_flags(yyy, val, val);
            } else {
                let result = self.cb_modify(xx, yyy, val);
                self.set_reg8(zzz, result);
            }
        }
    }

    /// Rotate/shift (updating flags), RES or SET applied to `val`.
    fn cb_modify(&mut self, xx: u8, yyy: u8, val: u8) -> u8 {
        match xx {
            0 => {
                let (result, f) = self.do_cb_rotate_shift(yyy, val);
                self.f = f;
                result
            }
            2 => val & !(1 << yyy),
            3 => val | (1 << yyy),
            _ => unreachable!(),
        }
    }

    /// Execute DD CB d op / FD CB d op (indexed bit operations).
    /// The displacement and the sub-opcode are plain memory reads, not M1
    /// cycles, so R is not bumped for them.
    /// BIT b,(IX+d): 20 T with the prefix. Others: 23 T.
    /// For non-BIT ops with zzz != 6, result is also copied to register zzz (undocumented).
    pub(crate) fn execute_instruction_index_cb<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) {
        let addr = self.hl_operand_addr(bus);
        let op = self.fetch8(bus);
        self.charge(timing::CC_XYCB[op as usize] as u32);

        let xx = (op >> 6) & 0x03;
        let yyy = (op >> 3) & 0x07;
        let zzz = op & 0x07;

        let val = self.read8(bus, addr);
        if xx == 1 {
            self.bit_flags(yyy, val, (addr >> 8) as u8);
            return;
        }

        let result = self.cb_modify(xx, yyy, val);
        if zzz != 6 {
            self.set_reg8(zzz, result);
        }
        self.write8(bus, addr, result);
    }
}
