pub mod config;
pub mod core;
pub mod cpu;
pub mod error;

pub mod prelude {
    pub use crate::config::Z80Config;
    pub use crate::core::{Bus, BusMaster, FetchMap, FetchRegion, IrqLine, IrqState};
    pub use crate::cpu::z80::{Register, Z80};
    pub use crate::cpu::{Cpu, CpuStateTrait, Z80State};
    pub use crate::error::Z80Error;
}
