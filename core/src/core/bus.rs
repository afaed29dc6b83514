/// Identifies who is accessing the bus (for multi-CPU arbitration).
///
/// Two Z80 cores sharing one host bus present different indices so the host
/// can route their accesses (e.g. a main CPU and a sound CPU).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BusMaster {
    Cpu(usize), // CPU 0, CPU 1, etc.
}

/// Memory, port and interrupt-acknowledge interface the CPU core calls into.
///
/// The core never owns memory: every data access, every I/O instruction and
/// every accepted maskable interrupt goes through this trait. Opcode fetches
/// go through it too unless the address has been mapped with
/// [`FetchMap::set_fetch`](crate::core::fetch::FetchMap::set_fetch).
pub trait Bus {
    type Address: Copy + Into<u64>; // u16 for the Z80
    type Data; // u8

    fn read(&mut self, master: BusMaster, addr: Self::Address) -> Self::Data;
    fn write(&mut self, master: BusMaster, addr: Self::Address, data: Self::Data);

    /// Read from I/O port address space (separate from memory on Z80).
    /// Default maps to memory read; override for hosts with real ports.
    fn io_read(&mut self, master: BusMaster, port: Self::Address) -> Self::Data {
        self.read(master, port)
    }

    /// Write to I/O port address space (separate from memory on Z80).
    /// Default maps to memory write; override for hosts with real ports.
    fn io_write(&mut self, master: BusMaster, port: Self::Address, data: Self::Data) {
        self.write(master, port, data)
    }

    /// Interrupt acknowledge cycle for maskable line `line`.
    ///
    /// Called exactly once per accepted maskable interrupt. The returned byte
    /// is the RST opcode in IM 0, ignored (but still fetched) in IM 1, and the
    /// low byte of the vector table address in IM 2. `None` means no device
    /// drove the data bus; the CPU then uses its configured default vector
    /// (0xFF unless overridden).
    fn irq_ack(&mut self, master: BusMaster, line: u8) -> Option<Self::Data> {
        let _ = (master, line);
        None
    }
}

/// State of a maskable interrupt line as set by the host.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum IrqState {
    /// Line released.
    #[default]
    Clear = 0,
    /// Level-triggered: stays asserted until the host clears it.
    Assert = 1,
    /// Latched until the CPU accepts it, then released automatically.
    Hold = 2,
    /// Accepted immediately if interrupts are enabled, otherwise dropped.
    Pulse = 3,
}

impl IrqState {
    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0 => Some(Self::Clear),
            1 => Some(Self::Assert),
            2 => Some(Self::Hold),
            3 => Some(Self::Pulse),
            _ => None,
        }
    }
}

/// Interrupt input selected by [`Z80::set_irq`](crate::cpu::z80::Z80::set_irq).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrqLine {
    /// Non-maskable interrupt. Edge-triggered: any non-`Clear` state fires it.
    Nmi,
    /// Maskable interrupt line with a host-defined id (passed to `irq_ack`).
    Irq(u8),
}
