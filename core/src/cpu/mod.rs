/// Generic CPU interface
pub trait Cpu: CpuStateTrait {
    /// Bus type the core executes against.
    type Bus: ?Sized;

    /// Power-on/reset state
    fn reset(&mut self);

    /// Run for `cycles` clock cycles and return how many were charged.
    fn execute(&mut self, bus: &mut Self::Bus, cycles: i32) -> i32;

    /// Query if CPU is halted internally (HALT instruction)
    fn is_sleeping(&self) -> bool;
}

// Re-export state types
pub mod state;
pub use state::{CpuStateTrait, Z80State};

// Z80 CPU
pub mod z80;
pub use z80::Z80;
