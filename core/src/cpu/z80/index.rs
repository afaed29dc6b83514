use crate::core::Bus;
use crate::cpu::z80::{IndexMode, Z80, timing};

impl Z80 {
    /// DD/FD prefix decoder. The prefix fetch itself (4 T) has been charged.
    ///
    /// The next opcode runs through the base decoder with HL replaced by
    /// IX/IY. When another DD/FD follows, this prefix ends as a 4 T
    /// instruction of its own and the next one is left for the run loop, so
    /// a stream of prefixes still returns to the budget check. ED cancels the
    /// prefix and CB switches to the indexed bit decoder.
    pub(crate) fn execute_index<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        mode: IndexMode,
        bus: &mut B,
    ) {
        let next = self.fetch.fetch(bus, self.master, self.pc);
        if next == 0xDD || next == 0xFD {
            return;
        }

        self.index_mode = mode;
        let opcode = self.fetch_opcode(bus);
        match opcode {
            0xED => self.execute_instruction_ed(bus),
            0xCB => self.execute_instruction_index_cb(bus),
            _ => {
                self.charge(timing::CC_XY[opcode as usize] as u32);
                self.execute_instruction(opcode, bus);
            }
        }

        self.index_mode = IndexMode::HL;
    }
}
