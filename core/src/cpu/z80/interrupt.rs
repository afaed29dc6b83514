use crate::core::{Bus, IrqLine, IrqState};
use crate::cpu::z80::{Z80, timing};

impl Z80 {
    /// Drive an interrupt input.
    ///
    /// NMI is edge-triggered: any state other than `Clear` takes it right
    /// away. A maskable line that is asserted while IFF1 is set (and not
    /// inside the one-instruction EI shadow) is accepted immediately too;
    /// otherwise `Assert`/`Hold` wait for the next instruction boundary and
    /// `Pulse` is dropped. Overhead charged here is owed by the next
    /// `execute` call.
    pub fn set_irq<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        line: IrqLine,
        state: IrqState,
    ) {
        match line {
            IrqLine::Nmi => {
                if state != IrqState::Clear {
                    let cycles = self.take_nmi(bus);
                    self.owe(cycles);
                }
            }
            IrqLine::Irq(id) => {
                self.irq_line = id;
                self.irq_state = state;
                if state == IrqState::Clear {
                    return;
                }
                if self.irq_pending() && !self.ei_delay {
                    let cycles = self.accept_irq(bus);
                    self.owe(cycles);
                } else if state == IrqState::Pulse {
                    self.irq_state = IrqState::Clear;
                }
            }
        }
    }

    /// True when a maskable interrupt would be taken at the next boundary.
    #[inline]
    pub(crate) fn irq_pending(&self) -> bool {
        self.iff1 && self.irq_state != IrqState::Clear
    }

    fn owe(&mut self, cycles: u32) {
        self.extra_cycles += cycles as i64;
        self.total_cycles += cycles as u64;
    }

    /// NMI acceptance: IFF1 cleared (IFF2 keeps the old IFF1 for RETN),
    /// PC pushed, jump to 0x0066. Returns the overhead.
    pub(crate) fn take_nmi<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        log::trace!("Z80 {:?} NMI at {:04X}", self.master, self.pc);
        self.halted = false;
        self.ei_delay = false;
        self.iff1 = false;
        self.bump_r(1);
        self.push16(bus, self.pc);
        self.pc = 0x0066;
        timing::NMI
    }

    /// Maskable interrupt acceptance in the current mode. Returns the
    /// overhead; the caller decides whether it is charged now or owed.
    pub(crate) fn accept_irq<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        self.halted = false;
        self.iff1 = false;
        self.iff2 = false;
        self.bump_r(1);

        let vector = bus
            .irq_ack(self.master, self.irq_line)
            .unwrap_or(self.config.default_irq_vector);
        if matches!(self.irq_state, IrqState::Hold | IrqState::Pulse) {
            self.irq_state = IrqState::Clear;
        }

        log::trace!(
            "Z80 {:?} IRQ line {} IM {} vector {:02X} at {:04X}",
            self.master,
            self.irq_line,
            self.im,
            vector,
            self.pc
        );

        self.push16(bus, self.pc);
        match self.im {
            // the acknowledge byte is executed as RST p
            0 => {
                self.pc = (vector & 0x38) as u16;
                timing::IRQ_IM01
            }
            1 => {
                self.pc = 0x0038;
                timing::IRQ_IM01
            }
            _ => {
                let table = ((self.i as u16) << 8) | vector as u16;
                self.pc = self.read16(bus, table);
                timing::IRQ_IM2
            }
        }
    }
}
