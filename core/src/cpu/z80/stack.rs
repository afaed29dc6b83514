use crate::core::Bus;
use crate::cpu::z80::Z80;

impl Z80 {
    /// Push a word, high byte first (SP-1 gets the high byte).
    pub(crate) fn push16<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, val: u16) {
        self.sp = self.sp.wrapping_sub(1);
        self.write8(bus, self.sp, (val >> 8) as u8);
        self.sp = self.sp.wrapping_sub(1);
        self.write8(bus, self.sp, val as u8);
    }

    pub(crate) fn pop16<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let low = self.read8(bus, self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        let high = self.read8(bus, self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        (high << 8) | low
    }

    /// PUSH rr: 11 T
    /// Opcode mask: 11 rr0 101 (rr: 0=BC, 1=DE, 2=HL/IX/IY, 3=AF)
    pub(crate) fn op_push<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let val = self.get_rp_af((opcode >> 4) & 0x03);
        self.push16(bus, val);
    }

    /// POP rr: 10 T
    /// Opcode mask: 11 rr0 001 (rr: 0=BC, 1=DE, 2=HL/IX/IY, 3=AF)
    pub(crate) fn op_pop<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let val = self.pop16(bus);
        self.set_rp_af((opcode >> 4) & 0x03, val);
    }
}
