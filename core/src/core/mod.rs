pub mod bus;
pub mod fetch;

pub use bus::{Bus, BusMaster, IrqLine, IrqState};
pub use fetch::{FetchMap, FetchRegion};
