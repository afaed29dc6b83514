use crate::core::Bus;
use crate::cpu::z80::tables::{CF, HF, NF, SF, VF, XF, YF, ZF};
use crate::cpu::z80::{Z80, timing};

impl Z80 {
    /// Drive a repeating block instruction. `step` runs one iteration and
    /// returns true when the instruction should go round again.
    ///
    /// The first iteration has already been charged from the ED table. Each
    /// repeat costs 5 more, and every further iteration runs inside this
    /// loop as if the ED xx pair had been fetched again (R += 2, full ED
    /// cost). When the budget runs out or an interrupt is pending, PC is
    /// rewound onto the ED prefix so the next boundary resumes the loop.
    fn repeat_block<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
        step: fn(&mut Z80, u8, &mut B) -> bool,
    ) {
        while step(self, opcode, bus) {
            self.charge(timing::EXTRA_BLOCK);
            if self.icount <= 0 || self.irq_pending() {
                self.pc = self.pc.wrapping_sub(2);
                return;
            }
            self.bump_r(2);
            self.charge(timing::CC_ED[opcode as usize] as u32);
        }
    }

    /// Direction of a block opcode: bit 3 set means decrement.
    #[inline]
    fn block_delta(opcode: u8) -> u16 {
        if opcode & 0x08 != 0 { 0xFFFF } else { 1 }
    }

    // --- LDI/LDD ---

    fn ldi_step<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> bool {
        let delta = Self::block_delta(opcode);
        let hl = self.get_hl();
        let de = self.get_de();
        let val = self.read8(bus, hl);
        self.write8(bus, de, val);
        self.set_hl(hl.wrapping_add(delta));
        self.set_de(de.wrapping_add(delta));
        let bc = self.get_bc().wrapping_sub(1);
        self.set_bc(bc);

        // X/Y from bits 3 and 1 of A + transferred byte
        let n = self.a.wrapping_add(val);
        let mut f = self.f & (SF | ZF | CF);
        if n & 0x02 != 0 { f |= YF; }
        if n & 0x08 != 0 { f |= XF; }
        if bc != 0 { f |= VF; }
        self.f = f;
        bc != 0
    }

    /// LDI/LDD: 16 T. (DE) = (HL), HL/DE step, BC decremented.
    pub(crate) fn op_ldi_ldd<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        self.ldi_step(opcode, bus);
    }

    /// LDIR/LDDR: 21 T per repeat, 16 T for the last transfer.
    pub(crate) fn op_ldir_lddr<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        self.repeat_block(opcode, bus, Self::ldi_step::<B>);
    }

    // --- CPI/CPD ---

    fn cpi_step<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> bool {
        let hl = self.get_hl();
        let val = self.read8(bus, hl);
        let mut res = self.a.wrapping_sub(val);
        self.set_hl(hl.wrapping_add(Self::block_delta(opcode)));
        let bc = self.get_bc().wrapping_sub(1);
        self.set_bc(bc);

        let mut f = (self.f & CF)
            | (self.tables.sz[res as usize] & !(YF | XF))
            | ((self.a ^ val ^ res) & HF)
            | NF;
        // X/Y from the result less the half borrow
        if f & HF != 0 {
            res = res.wrapping_sub(1);
        }
        if res & 0x02 != 0 { f |= YF; }
        if res & 0x08 != 0 { f |= XF; }
        if bc != 0 { f |= VF; }
        self.f = f;
        bc != 0 && f & ZF == 0
    }

    /// CPI/CPD: 16 T. Compare A with (HL); C preserved.
    pub(crate) fn op_cpi_cpd<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        self.cpi_step(opcode, bus);
    }

    /// CPIR/CPDR: 21 T per repeat, 16 T when BC hits 0 or a match is found.
    pub(crate) fn op_cpir_cpdr<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        self.repeat_block(opcode, bus, Self::cpi_step::<B>);
    }

    // --- INI/IND ---

    /// Flags shared by the block I/O family. `t` is the 9-bit sum the
    /// hardware uses for H/C and parity.
    fn block_io_flags(&mut self, val: u8, t: u32) {
        let mut f = self.tables.sz[self.b as usize];
        if val & SF != 0 { f |= NF; }
        if t & 0x100 != 0 { f |= HF | CF; }
        f |= self.tables.szp[(((t as u8) & 0x07) ^ self.b) as usize] & VF;
        self.f = f;
    }

    fn ini_step<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> bool {
        let delta = Self::block_delta(opcode);
        let val = bus.io_read(self.master, self.get_bc());
        self.b = self.b.wrapping_sub(1);
        let hl = self.get_hl();
        self.write8(bus, hl, val);
        self.set_hl(hl.wrapping_add(delta));

        let t = self.c.wrapping_add(delta as u8) as u32 + val as u32;
        self.block_io_flags(val, t);
        self.b != 0
    }

    /// INI/IND: 16 T. (HL) = port (BC), B decremented after the port read.
    pub(crate) fn op_ini_ind<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        self.ini_step(opcode, bus);
    }

    /// INIR/INDR: 21 T per repeat, 16 T for the last byte.
    pub(crate) fn op_inir_indr<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        self.repeat_block(opcode, bus, Self::ini_step::<B>);
    }

    // --- OUTI/OUTD ---

    fn outi_step<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> bool {
        let hl = self.get_hl();
        let val = self.read8(bus, hl);
        // B is decremented before it goes out on the address bus
        self.b = self.b.wrapping_sub(1);
        bus.io_write(self.master, self.get_bc(), val);
        self.set_hl(hl.wrapping_add(Self::block_delta(opcode)));

        let t = self.l as u32 + val as u32;
        self.block_io_flags(val, t);
        self.b != 0
    }

    /// OUTI/OUTD: 16 T. Port (BC) = (HL) with B already decremented.
    pub(crate) fn op_outi_outd<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        self.outi_step(opcode, bus);
    }

    /// OTIR/OTDR: 21 T per repeat, 16 T for the last byte.
    pub(crate) fn op_otir_otdr<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        self.repeat_block(opcode, bus, Self::outi_step::<B>);
    }
}
