use crate::core::Bus;
use crate::cpu::z80::Z80;
use crate::cpu::z80::tables::{CF, VF};

impl Z80 {
    /// LD r, n: 7 T. LD (HL),n: 10 T. LD (IX+d),n: 19 T (d comes before n).
    /// Opcode mask: 00 rrr 110
    pub(crate) fn op_ld_r_n<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let r = (opcode >> 3) & 0x07;
        if r == 6 {
            let addr = self.hl_operand_addr(bus);
            let n = self.fetch8(bus);
            self.write8(bus, addr, n);
        } else {
            let n = self.fetch8(bus);
            self.set_reg8_ix(r, n);
        }
    }

    /// LD r, r': 4 T, 7 T with (HL), 19 T with (IX+d).
    /// Opcode mask: 01 ddd sss (0x76 is HALT, handled by the dispatcher)
    ///
    /// With a DD/FD prefix, H and L name IXH/IXL (IYH/IYL) unless the other
    /// operand is (IX+d), in which case they are the real H and L.
    pub(crate) fn op_ld_r_r<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let dst = (opcode >> 3) & 0x07;
        let src = opcode & 0x07;

        if dst == 6 {
            let addr = self.hl_operand_addr(bus);
            let val = self.get_reg8(src);
            self.write8(bus, addr, val);
        } else if src == 6 {
            let addr = self.hl_operand_addr(bus);
            let val = self.read8(bus, addr);
            self.set_reg8(dst, val);
        } else {
            let val = self.get_reg8_ix(src);
            self.set_reg8_ix(dst, val);
        }
    }

    /// LD rr, nn: 10 T
    /// Opcode mask: 00 rr0 001 (rr: 0=BC, 1=DE, 2=HL/IX/IY, 3=SP)
    pub(crate) fn op_ld_rr_nn<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let val = self.fetch16(bus);
        self.set_rp((opcode >> 4) & 0x03, val);
    }

    /// LD A, (BC): 7 T
    pub(crate) fn op_ld_a_bc<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.a = self.read8(bus, self.get_bc());
    }

    /// LD A, (DE): 7 T
    pub(crate) fn op_ld_a_de<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.a = self.read8(bus, self.get_de());
    }

    /// LD (BC), A: 7 T
    pub(crate) fn op_ld_bc_a<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.write8(bus, self.get_bc(), self.a);
    }

    /// LD (DE), A: 7 T
    pub(crate) fn op_ld_de_a<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.write8(bus, self.get_de(), self.a);
    }

    /// LD A, (nn): 13 T
    pub(crate) fn op_ld_a_nn<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        self.a = self.read8(bus, addr);
    }

    /// LD (nn), A: 13 T
    pub(crate) fn op_ld_nn_a<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        self.write8(bus, addr, self.a);
    }

    /// LD SP, HL: 6 T
    pub(crate) fn op_ld_sp_hl(&mut self) {
        self.sp = self.get_index_reg();
    }

    /// LD (nn), HL: 16 T
    pub(crate) fn op_ld_nn_hl<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        let val = self.get_index_reg();
        self.write16(bus, addr, val);
    }

    /// LD HL, (nn): 16 T
    pub(crate) fn op_ld_hl_nn_ind<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        let val = self.read16(bus, addr);
        self.set_index_reg(val);
    }

    /// EX AF, AF': 4 T
    pub(crate) fn op_ex_af_af(&mut self) {
        std::mem::swap(&mut self.a, &mut self.a_prime);
        std::mem::swap(&mut self.f, &mut self.f_prime);
    }

    /// EXX: 4 T (NOT affected by DD/FD prefix)
    pub(crate) fn op_exx(&mut self) {
        std::mem::swap(&mut self.b, &mut self.b_prime);
        std::mem::swap(&mut self.c, &mut self.c_prime);
        std::mem::swap(&mut self.d, &mut self.d_prime);
        std::mem::swap(&mut self.e, &mut self.e_prime);
        std::mem::swap(&mut self.h, &mut self.h_prime);
        std::mem::swap(&mut self.l, &mut self.l_prime);
    }

    /// EX DE, HL: 4 T (NOT affected by DD/FD prefix)
    pub(crate) fn op_ex_de_hl(&mut self) {
        std::mem::swap(&mut self.d, &mut self.h);
        std::mem::swap(&mut self.e, &mut self.l);
    }

    /// EX (SP), HL: 19 T
    pub(crate) fn op_ex_sp_hl<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let from_stack = self.read16(bus, self.sp);
        let val = self.get_index_reg();
        self.write16(bus, self.sp, val);
        self.set_index_reg(from_stack);
    }

    /// IN A, (n): 11 T. Port address is (A << 8) | n. No flags.
    pub(crate) fn op_in_a_n<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let port = ((self.a as u16) << 8) | self.fetch8(bus) as u16;
        self.a = bus.io_read(self.master, port);
    }

    /// OUT (n), A: 11 T. Port address is (A << 8) | n.
    pub(crate) fn op_out_n_a<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let port = ((self.a as u16) << 8) | self.fetch8(bus) as u16;
        bus.io_write(self.master, port, self.a);
    }

    // --- ED Load/Store Operations ---

    /// LD I,A: 9 T
    pub(crate) fn op_ld_i_a(&mut self) {
        self.i = self.a;
    }

    /// LD R,A: 9 T. Bit 7 of R is only ever set this way.
    pub(crate) fn op_ld_r_a(&mut self) {
        self.set_refresh(self.a);
    }

    /// LD A,I: 9 T
    /// Flags: S, Z, X, Y from I, H=0, N=0, PV=IFF2, C preserved.
    pub(crate) fn op_ld_a_i(&mut self) {
        self.a = self.i;
        self.f = (self.f & CF) | self.tables.sz[self.a as usize] | if self.iff2 { VF } else { 0 };
    }

    /// LD A,R: 9 T. Same flags as LD A,I.
    pub(crate) fn op_ld_a_r(&mut self) {
        self.a = self.refresh();
        self.f = (self.f & CF) | self.tables.sz[self.a as usize] | if self.iff2 { VF } else { 0 };
    }

    /// LD (nn),rr: 20 T
    /// Opcode mask: 01 rr0 011 (rr: 0=BC, 1=DE, 2=HL, 3=SP)
    pub(crate) fn op_ld_nn_rr_ed<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let addr = self.fetch16(bus);
        let val = self.get_rp((opcode >> 4) & 0x03);
        self.write16(bus, addr, val);
    }

    /// LD rr,(nn): 20 T
    /// Opcode mask: 01 rr1 011
    pub(crate) fn op_ld_rr_nn_ed<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let addr = self.fetch16(bus);
        let val = self.read16(bus, addr);
        self.set_rp((opcode >> 4) & 0x03, val);
    }

    /// IN r,(C): 12 T. Port address is BC.
    /// Flags: S, Z, PV(parity), X, Y from input, H=0, N=0, C preserved.
    /// For r=6 (IN F,(C)): flags affected but value not stored.
    pub(crate) fn op_in_r_c<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let val = bus.io_read(self.master, self.get_bc());
        let r = (opcode >> 3) & 0x07;
        if r != 6 {
            self.set_reg8(r, val);
        }
        self.f = (self.f & CF) | self.tables.szp[val as usize];
    }

    /// OUT (C),r: 12 T. No flag changes.
    /// For r=6: outputs 0 (undocumented).
    pub(crate) fn op_out_c_r<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let r = (opcode >> 3) & 0x07;
        let val = if r == 6 { 0 } else { self.get_reg8(r) };
        bus.io_write(self.master, self.get_bc(), val);
    }
}
