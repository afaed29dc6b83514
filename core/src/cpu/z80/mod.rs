mod alu;
mod bit;
mod block;
mod branch;
mod index;
mod interrupt;
mod load_store;
mod registers;
mod stack;
pub mod tables;
pub mod timing;

pub use registers::Register;
pub use tables::FlagTables;

use crate::config::Z80Config;
use crate::core::{Bus, BusMaster, FetchMap, FetchRegion, IrqState};
use crate::cpu::{
    Cpu,
    state::{CpuStateTrait, Z80State},
};
use crate::error::Z80Error;

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum Flag {
    C = 0x01,  // Carry
    N = 0x02,  // Add/Subtract
    PV = 0x04, // Parity/Overflow
    X = 0x08,  // Unused (copy of bit 3)
    H = 0x10,  // Half Carry
    Y = 0x20,  // Unused (copy of bit 5)
    Z = 0x40,  // Zero
    S = 0x80,  // Sign
}

pub struct Z80 {
    // Registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    // Shadow Registers
    pub a_prime: u8,
    pub f_prime: u8,
    pub b_prime: u8,
    pub c_prime: u8,
    pub d_prime: u8,
    pub e_prime: u8,
    pub h_prime: u8,
    pub l_prime: u8,
    // Index & Special Registers
    pub ix: u16,
    pub iy: u16,
    pub i: u8,
    /// Raw refresh register; use [`Z80::refresh`] for the visible value.
    pub r: u8,
    pub sp: u16,
    pub pc: u16,

    // Internal state
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub halted: bool,
    pub ei_delay: bool, // Interrupts blocked for the instruction after EI

    // Interrupt line
    pub(crate) irq_state: IrqState,
    pub(crate) irq_line: u8,

    // Cycle accounting
    pub(crate) icount: i64,
    pub(crate) extra_cycles: i64,
    pub(crate) total_cycles: u64,

    // Prefix handling
    pub(crate) index_mode: IndexMode,

    pub(crate) fetch: FetchMap,
    pub(crate) config: Z80Config,
    pub(crate) master: BusMaster,
    pub(crate) tables: &'static FlagTables,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IndexMode {
    HL,
    IX,
    IY,
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl Z80 {
    pub fn new() -> Self {
        Self::with_config(Z80Config::default())
    }

    pub fn with_config(config: Z80Config) -> Self {
        let master = config.master();
        let mut cpu = Self {
            a: 0,
            f: 0,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            a_prime: 0,
            f_prime: 0,
            b_prime: 0,
            c_prime: 0,
            d_prime: 0,
            e_prime: 0,
            h_prime: 0,
            l_prime: 0,
            ix: 0,
            iy: 0,
            i: 0,
            r: 0,
            sp: 0,
            pc: 0,
            iff1: false,
            iff2: false,
            im: 0,
            halted: false,
            ei_delay: false,
            irq_state: IrqState::Clear,
            irq_line: 0,
            icount: 0,
            extra_cycles: 0,
            total_cycles: 0,
            index_mode: IndexMode::HL,
            fetch: FetchMap::new(),
            config,
            master,
            tables: tables::tables(),
        };
        cpu.reset_state();
        cpu
    }

    /// Zero the CPU state, keeping configuration and the fetch map.
    /// IX/IY come up as 0xFFFF and Z is set, as on real hardware.
    fn reset_state(&mut self) {
        self.a = 0;
        self.f = Flag::Z as u8;
        self.b = 0;
        self.c = 0;
        self.d = 0;
        self.e = 0;
        self.h = 0;
        self.l = 0;
        self.a_prime = 0;
        self.f_prime = 0;
        self.b_prime = 0;
        self.c_prime = 0;
        self.d_prime = 0;
        self.e_prime = 0;
        self.h_prime = 0;
        self.l_prime = 0;
        self.ix = 0xFFFF;
        self.iy = 0xFFFF;
        self.i = 0;
        self.r = 0;
        self.sp = 0;
        self.pc = 0;
        self.iff1 = false;
        self.iff2 = false;
        self.im = 0;
        self.halted = false;
        self.ei_delay = false;
        self.irq_state = IrqState::Clear;
        self.irq_line = 0;
        self.icount = 0;
        self.extra_cycles = 0;
        self.total_cycles = 0;
        self.index_mode = IndexMode::HL;
    }

    /// Return to the power-on state. Configuration and fetch map survive.
    pub fn reset(&mut self) {
        log::debug!("Z80 {:?} reset", self.master);
        self.reset_state();
    }

    pub fn config(&self) -> &Z80Config {
        &self.config
    }

    pub fn fetch_map(&self) -> &FetchMap {
        &self.fetch
    }

    pub fn fetch_map_mut(&mut self) -> &mut FetchMap {
        &mut self.fetch
    }

    /// Serve opcode fetches in `[low, high]` from `data`. See [`FetchMap::set_fetch`].
    pub fn set_fetch(&mut self, low: u16, high: u16, data: FetchRegion) -> Result<(), Z80Error> {
        self.fetch.set_fetch(low, high, data)
    }

    /// Cycles charged since construction or the last reset.
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Remaining budget of the current/last `execute` call. Negative values
    /// are a deficit the next call pays first.
    pub fn remaining_cycles(&self) -> i64 {
        self.icount
    }

    pub fn irq_state(&self) -> IrqState {
        self.irq_state
    }

    // Helpers for 16-bit register access
    pub fn get_bc(&self) -> u16 { ((self.b as u16) << 8) | self.c as u16 }
    pub fn set_bc(&mut self, val: u16) { self.b = (val >> 8) as u8; self.c = val as u8; }

    pub fn get_de(&self) -> u16 { ((self.d as u16) << 8) | self.e as u16 }
    pub fn set_de(&mut self, val: u16) { self.d = (val >> 8) as u8; self.e = val as u8; }

    pub fn get_hl(&self) -> u16 { ((self.h as u16) << 8) | self.l as u16 }
    pub fn set_hl(&mut self, val: u16) { self.h = (val >> 8) as u8; self.l = val as u8; }

    pub fn get_af(&self) -> u16 { ((self.a as u16) << 8) | self.f as u16 }
    pub fn set_af(&mut self, val: u16) { self.a = (val >> 8) as u8; self.f = val as u8; }

    /// Get 8-bit register by index, respecting IX/IY prefix for H/L (undocumented IXH/IXL/IYH/IYL).
    /// Index 6 is NOT handled here; callers must handle (HL)/(IX+d)/(IY+d) separately.
    pub fn get_reg8_ix(&self, index: u8) -> u8 {
        match (index, self.index_mode) {
            (4, IndexMode::IX) => (self.ix >> 8) as u8,
            (5, IndexMode::IX) => self.ix as u8,
            (4, IndexMode::IY) => (self.iy >> 8) as u8,
            (5, IndexMode::IY) => self.iy as u8,
            _ => self.get_reg8(index),
        }
    }

    pub fn set_reg8_ix(&mut self, index: u8, val: u8) {
        match (index, self.index_mode) {
            (4, IndexMode::IX) => self.ix = (self.ix & 0x00FF) | ((val as u16) << 8),
            (5, IndexMode::IX) => self.ix = (self.ix & 0xFF00) | val as u16,
            (4, IndexMode::IY) => self.iy = (self.iy & 0x00FF) | ((val as u16) << 8),
            (5, IndexMode::IY) => self.iy = (self.iy & 0xFF00) | val as u16,
            _ => self.set_reg8(index, val),
        }
    }

    /// Effective address for (HL)/(IX+d)/(IY+d).
    /// For IX/IY modes this fetches the displacement byte, so it must be
    /// called exactly once, at the point the displacement appears in the
    /// instruction stream.
    pub(crate) fn hl_operand_addr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u16 {
        match self.index_mode {
            IndexMode::HL => self.get_hl(),
            IndexMode::IX => {
                let d = self.fetch8(bus) as i8;
                self.ix.wrapping_add(d as u16)
            }
            IndexMode::IY => {
                let d = self.fetch8(bus) as i8;
                self.iy.wrapping_add(d as u16)
            }
        }
    }

    /// Get 16-bit register pair by index (0=BC, 1=DE, 2=HL/IX/IY, 3=SP).
    /// Index 2 respects current index_mode for DD/FD prefixed instructions.
    pub(crate) fn get_rp(&self, index: u8) -> u16 {
        match index {
            0 => self.get_bc(),
            1 => self.get_de(),
            2 => self.get_index_reg(),
            3 => self.sp,
            _ => unreachable!("get_rp called with index {}", index),
        }
    }

    /// Set 16-bit register pair by index (0=BC, 1=DE, 2=HL/IX/IY, 3=SP).
    pub(crate) fn set_rp(&mut self, index: u8, val: u16) {
        match index {
            0 => self.set_bc(val),
            1 => self.set_de(val),
            2 => self.set_index_reg(val),
            3 => self.sp = val,
            _ => unreachable!("set_rp called with index {}", index),
        }
    }

    /// Get 16-bit register pair by index for PUSH/POP (0=BC, 1=DE, 2=HL/IX/IY, 3=AF).
    pub(crate) fn get_rp_af(&self, index: u8) -> u16 {
        match index {
            3 => self.get_af(),
            _ => self.get_rp(index),
        }
    }

    /// Set 16-bit register pair by index for PUSH/POP (0=BC, 1=DE, 2=HL/IX/IY, 3=AF).
    pub(crate) fn set_rp_af(&mut self, index: u8, val: u16) {
        match index {
            3 => self.set_af(val),
            _ => self.set_rp(index, val),
        }
    }

    /// HL, IX or IY depending on the active prefix.
    pub(crate) fn get_index_reg(&self) -> u16 {
        match self.index_mode {
            IndexMode::HL => self.get_hl(),
            IndexMode::IX => self.ix,
            IndexMode::IY => self.iy,
        }
    }

    pub(crate) fn set_index_reg(&mut self, val: u16) {
        match self.index_mode {
            IndexMode::HL => self.set_hl(val),
            IndexMode::IX => self.ix = val,
            IndexMode::IY => self.iy = val,
        }
    }

    pub fn get_reg8(&self, index: u8) -> u8 {
        match index {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            7 => self.a,
            _ => unreachable!("get_reg8 called with index {}", index),
        }
    }

    pub fn set_reg8(&mut self, index: u8, val: u8) {
        match index {
            0 => self.b = val,
            1 => self.c = val,
            2 => self.d = val,
            3 => self.e = val,
            4 => self.h = val,
            5 => self.l = val,
            7 => self.a = val,
            _ => unreachable!("set_reg8 called with index {}", index),
        }
    }

    // --- Refresh register ---

    /// Visible value of R (bit 7 is never touched by refresh).
    pub fn refresh(&self) -> u8 {
        if self.config.exact_refresh {
            self.r
        } else {
            let ticks = (self.total_cycles / 4) as u8;
            (self.r & 0x80) | (self.r.wrapping_add(ticks) & 0x7F)
        }
    }

    pub fn set_refresh(&mut self, val: u8) {
        if self.config.exact_refresh {
            self.r = val;
        } else {
            let ticks = (self.total_cycles / 4) as u8;
            self.r = (val & 0x80) | (val.wrapping_sub(ticks) & 0x7F);
        }
    }

    /// Count `n` M1 cycles in R.
    #[inline]
    pub(crate) fn bump_r(&mut self, n: u32) {
        if self.config.exact_refresh {
            self.r = (self.r & 0x80) | (self.r.wrapping_add(n as u8) & 0x7F);
        }
    }

    // --- Bus access ---

    #[inline]
    pub(crate) fn charge(&mut self, cycles: u32) {
        self.icount -= cycles as i64;
        self.total_cycles += cycles as u64;
    }

    /// Immediate operand byte at PC.
    #[inline]
    pub(crate) fn fetch8<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let val = self.fetch.fetch(bus, self.master, self.pc);
        self.pc = self.pc.wrapping_add(1);
        val
    }

    /// Immediate little-endian word at PC.
    #[inline]
    pub(crate) fn fetch16<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let low = self.fetch8(bus) as u16;
        let high = self.fetch8(bus) as u16;
        (high << 8) | low
    }

    /// M1 opcode fetch: read at PC, increment PC, refresh R.
    #[inline]
    pub(crate) fn fetch_opcode<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u8 {
        self.bump_r(1);
        self.fetch8(bus)
    }

    #[inline]
    pub(crate) fn read8<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, addr: u16) -> u8 {
        bus.read(self.master, addr)
    }

    #[inline]
    pub(crate) fn write8<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, addr: u16, val: u8) {
        bus.write(self.master, addr, val)
    }

    pub(crate) fn read16<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, addr: u16) -> u16 {
        let low = self.read8(bus, addr) as u16;
        let high = self.read8(bus, addr.wrapping_add(1)) as u16;
        (high << 8) | low
    }

    pub(crate) fn write16<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, addr: u16, val: u16) {
        self.write8(bus, addr, val as u8);
        self.write8(bus, addr.wrapping_add(1), (val >> 8) as u8);
    }

    // --- Execution ---

    /// Run instructions until `cycles` more cycles have been charged.
    ///
    /// The budget is added to whatever the previous call left over: an
    /// overrun from the last instruction (or interrupt overhead charged by
    /// `set_irq` in between) is paid first, so splitting a budget across
    /// calls executes exactly what one call with the summed budget would.
    /// Returns the cycles charged during this call, saturated to `i32`.
    pub fn execute<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        cycles: i32,
    ) -> i32 {
        self.icount += i64::from(cycles);
        let start = self.icount;
        self.icount -= std::mem::take(&mut self.extra_cycles);

        while self.icount > 0 {
            self.run_one(bus);
        }

        (start - self.icount).clamp(i32::MIN.into(), i32::MAX.into()) as i32
    }

    /// Execute exactly one instruction (one block-instruction iteration, one
    /// interrupt acceptance, or one halted NOP) and return its cost.
    /// The `execute` budget is left untouched.
    pub fn step<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let saved = self.icount;
        self.icount = 1;
        self.run_one(bus);
        let used = 1 - self.icount;
        self.icount = saved;
        used as u32
    }

    /// One instruction boundary: interrupt check, then HALT or fetch/execute.
    fn run_one<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        if self.ei_delay {
            // EI delay: skip interrupt check for one instruction after EI
            self.ei_delay = false;
        } else if self.irq_pending() {
            let cycles = self.accept_irq(bus);
            self.charge(cycles);
            return;
        }

        if self.halted {
            // Burn the rest of the budget as NOPs; PC stays past HALT.
            let nops = ((self.icount.max(1) + 3) / 4) as u32;
            self.bump_r(nops);
            self.charge(nops * 4);
            return;
        }

        let opcode = self.fetch_opcode(bus);
        self.charge(timing::CC_OP[opcode as usize] as u32);
        self.execute_instruction(opcode, bus);
    }

    /// Base opcode dispatch. With a DD/FD prefix active (`index_mode` IX/IY)
    /// the same handlers run with HL redirected; the caller has already
    /// charged the opcode's cost.
    fn execute_instruction<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) {
        match opcode {
            // NOP: 4 T
            0x00 => {}

            // HALT: 4 T. PC stays past HALT (already incremented by fetch).
            0x76 => {
                self.halted = true;
            }

            // Prefixes
            0xCB => self.execute_instruction_cb(bus),
            0xED => self.execute_instruction_ed(bus),
            0xDD => self.execute_index(IndexMode::IX, bus),
            0xFD => self.execute_index(IndexMode::IY, bus),

            // --- Load/Store ---

            // LD (BC), A: 7 T
            0x02 => self.op_ld_bc_a(bus),
            // LD (DE), A: 7 T
            0x12 => self.op_ld_de_a(bus),
            // LD (nn), HL: 16 T
            0x22 => self.op_ld_nn_hl(bus),
            // LD (nn), A: 13 T
            0x32 => self.op_ld_nn_a(bus),

            // EX AF, AF': 4 T
            0x08 => self.op_ex_af_af(),

            // LD A, (BC): 7 T
            0x0A => self.op_ld_a_bc(bus),
            // LD A, (DE): 7 T
            0x1A => self.op_ld_a_de(bus),
            // LD HL, (nn): 16 T
            0x2A => self.op_ld_hl_nn_ind(bus),
            // LD A, (nn): 13 T
            0x3A => self.op_ld_a_nn(bus),

            // LD rr, nn (0x01/0x11/0x21/0x31): 10 T
            op if (op & 0xCF) == 0x01 => self.op_ld_rr_nn(op, bus),

            // LD r, n (0x06, 0x0E, ... 0x3E): 7 T, LD (HL),n: 10 T
            op if (op & 0xC7) == 0x06 => self.op_ld_r_n(op, bus),

            // LD r, r' (0x40-0x7F excluding 0x76): 4/7 T
            op if (op & 0xC0) == 0x40 => self.op_ld_r_r(op, bus),

            // LD SP, HL: 6 T
            0xF9 => self.op_ld_sp_hl(),

            // EX DE, HL: 4 T
            0xEB => self.op_ex_de_hl(),
            // EXX: 4 T
            0xD9 => self.op_exx(),
            // EX (SP), HL: 19 T
            0xE3 => self.op_ex_sp_hl(bus),

            // IN A,(n): 11 T
            0xDB => self.op_in_a_n(bus),
            // OUT (n),A: 11 T
            0xD3 => self.op_out_n_a(bus),

            // --- Stack ---

            // PUSH rr (0xC5/D5/E5/F5): 11 T
            op if (op & 0xCF) == 0xC5 => self.op_push(op, bus),
            // POP rr (0xC1/D1/E1/F1): 10 T
            op if (op & 0xCF) == 0xC1 => self.op_pop(op, bus),

            // --- ALU ---

            // ALU A, r (0x80 - 0xBF): 4 T (reg) or 7 T ((HL))
            op if (op & 0xC0) == 0x80 => self.op_alu_r(op, bus),
            // ALU A, n (0xC6, 0xCE, ... 0xFE): 7 T
            op if (op & 0xC7) == 0xC6 => self.op_alu_n(op, bus),

            // INC r / DEC r: 4 T (reg) or 11 T ((HL))
            op if (op & 0xC6) == 0x04 => self.op_inc_dec_r(op, bus),

            // ADD HL,rr (0x09/0x19/0x29/0x39): 11 T
            op if (op & 0xCF) == 0x09 => self.op_add_hl_rr(op),
            // INC rr / DEC rr (0x03/0x0B/...): 6 T
            op if (op & 0xC7) == 0x03 => self.op_inc_dec_rr(op),

            // Accumulator rotates: 4 T
            0x07 => self.op_rlca(),
            0x0F => self.op_rrca(),
            0x17 => self.op_rla(),
            0x1F => self.op_rra(),

            // Misc ALU: 4 T
            0x27 => self.op_daa(),
            0x2F => self.op_cpl(),
            0x37 => self.op_scf(),
            0x3F => self.op_ccf(),

            // --- Branch/Control Flow ---

            // JP nn: 10 T
            0xC3 => self.op_jp_nn(bus),
            // JP (HL): 4 T
            0xE9 => self.op_jp_hl(),
            // JR e: 12 T
            0x18 => self.op_jr_e(bus),
            // DJNZ e: 13/8 T
            0x10 => self.op_djnz(bus),
            // CALL nn: 17 T
            0xCD => self.op_call_nn(bus),
            // RET: 10 T
            0xC9 => self.op_ret(bus),

            // DI: 4 T
            0xF3 => self.op_di(),
            // EI: 4 T
            0xFB => self.op_ei(),

            // JP cc,nn: 10 T
            op if (op & 0xC7) == 0xC2 => self.op_jp_cc_nn(op, bus),
            // JR cc,e: 12/7 T (NZ/Z/NC/C only)
            op if (op & 0xE7) == 0x20 => self.op_jr_cc_e(op, bus),
            // CALL cc,nn: 17/10 T
            op if (op & 0xC7) == 0xC4 => self.op_call_cc_nn(op, bus),
            // RET cc: 11/5 T
            op if (op & 0xC7) == 0xC0 => self.op_ret_cc(op, bus),
            // RST p: 11 T
            op if (op & 0xC7) == 0xC7 => self.op_rst(op, bus),

            _ => unreachable!("unhandled base opcode {:02X}", opcode),
        }
    }

    /// ED prefix: fetch the second opcode (an M1 cycle) and dispatch.
    /// Costs in `CC_ED` include the ED byte. A DD/FD before ED has no effect
    /// beyond its own 4 cycles.
    pub(crate) fn execute_instruction_ed<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) {
        self.index_mode = IndexMode::HL;
        let opcode = self.fetch_opcode(bus);
        self.charge(timing::CC_ED[opcode as usize] as u32);

        match opcode {
            // --- Specific ED opcodes (low 3 bits = 111) ---
            0x47 => self.op_ld_i_a(),  // LD I,A: 9T
            0x4F => self.op_ld_r_a(),  // LD R,A: 9T
            0x57 => self.op_ld_a_i(),  // LD A,I: 9T
            0x5F => self.op_ld_a_r(),  // LD A,R: 9T
            0x67 => self.op_rrd(bus),  // RRD: 18T
            0x6F => self.op_rld(bus),  // RLD: 18T
            0x77 | 0x7F => {}          // ED NOP: 8T

            // --- Block transfer/compare/IO ---
            0xA0 | 0xA8 => self.op_ldi_ldd(opcode, bus),   // LDI/LDD: 16T
            0xA1 | 0xA9 => self.op_cpi_cpd(opcode, bus),   // CPI/CPD: 16T
            0xA2 | 0xAA => self.op_ini_ind(opcode, bus),   // INI/IND: 16T
            0xA3 | 0xAB => self.op_outi_outd(opcode, bus), // OUTI/OUTD: 16T
            0xB0 | 0xB8 => self.op_ldir_lddr(opcode, bus), // LDIR/LDDR: 21/16T
            0xB1 | 0xB9 => self.op_cpir_cpdr(opcode, bus), // CPIR/CPDR: 21/16T
            0xB2 | 0xBA => self.op_inir_indr(opcode, bus), // INIR/INDR: 21/16T
            0xB3 | 0xBB => self.op_otir_otdr(opcode, bus), // OTIR/OTDR: 21/16T

            // --- Pattern-based (40-7F range, low 3 bits 0-6) ---
            op if (op & 0xC7) == 0x40 => self.op_in_r_c(op, bus),  // IN r,(C): 12T
            op if (op & 0xC7) == 0x41 => self.op_out_c_r(op, bus), // OUT (C),r: 12T
            op if (op & 0xCF) == 0x42 => self.op_sbc_hl_rr(op),    // SBC HL,rr: 15T
            op if (op & 0xCF) == 0x43 => self.op_ld_nn_rr_ed(op, bus), // LD (nn),rr: 20T
            op if (op & 0xC7) == 0x44 => self.op_neg(),            // NEG: 8T
            op if (op & 0xC7) == 0x45 => self.op_retn(op, bus),    // RETN/RETI: 14T
            op if (op & 0xC7) == 0x46 => self.op_im(op),           // IM 0/1/2: 8T
            op if (op & 0xCF) == 0x4A => self.op_adc_hl_rr(op),    // ADC HL,rr: 15T
            op if (op & 0xCF) == 0x4B => self.op_ld_rr_nn_ed(op, bus), // LD rr,(nn): 20T

            // Undefined ED opcodes: 8T NOP
            _ => {}
        }
    }

    // --- Snapshot/restore ---

    pub fn restore(&mut self, s: &Z80State) {
        self.a = s.a;
        self.f = s.f;
        self.b = s.b;
        self.c = s.c;
        self.d = s.d;
        self.e = s.e;
        self.h = s.h;
        self.l = s.l;
        self.a_prime = s.a_prime;
        self.f_prime = s.f_prime;
        self.b_prime = s.b_prime;
        self.c_prime = s.c_prime;
        self.d_prime = s.d_prime;
        self.e_prime = s.e_prime;
        self.h_prime = s.h_prime;
        self.l_prime = s.l_prime;
        self.ix = s.ix;
        self.iy = s.iy;
        self.sp = s.sp;
        self.pc = s.pc;
        self.i = s.i;
        self.iff1 = s.iff1;
        self.iff2 = s.iff2;
        self.im = s.im;
        self.halted = s.halted;
        self.ei_delay = s.ei_delay;
        self.irq_state = IrqState::from_u8(s.irq_state).unwrap_or_default();
        self.irq_line = s.irq_line;
        self.icount = s.icount;
        self.extra_cycles = s.extra_cycles;
        self.total_cycles = s.total_cycles;
        // after total_cycles: the approximate R is derived from it
        self.set_refresh(s.r);
        self.index_mode = IndexMode::HL;
    }
}

impl Cpu for Z80 {
    type Bus = dyn Bus<Address = u16, Data = u8>;

    fn reset(&mut self) {
        Z80::reset(self);
    }

    fn execute(&mut self, bus: &mut Self::Bus, cycles: i32) -> i32 {
        Z80::execute(self, bus, cycles)
    }

    fn is_sleeping(&self) -> bool {
        self.halted
    }
}

impl CpuStateTrait for Z80 {
    type Snapshot = Z80State;

    fn snapshot(&self) -> Z80State {
        Z80State {
            a: self.a,
            f: self.f,
            b: self.b,
            c: self.c,
            d: self.d,
            e: self.e,
            h: self.h,
            l: self.l,
            a_prime: self.a_prime,
            f_prime: self.f_prime,
            b_prime: self.b_prime,
            c_prime: self.c_prime,
            d_prime: self.d_prime,
            e_prime: self.e_prime,
            h_prime: self.h_prime,
            l_prime: self.l_prime,
            ix: self.ix,
            iy: self.iy,
            sp: self.sp,
            pc: self.pc,
            i: self.i,
            r: self.refresh(),
            iff1: self.iff1,
            iff2: self.iff2,
            im: self.im,
            halted: self.halted,
            ei_delay: self.ei_delay,
            irq_state: self.irq_state as u8,
            irq_line: self.irq_line,
            icount: self.icount,
            extra_cycles: self.extra_cycles,
            total_cycles: self.total_cycles,
        }
    }
}
