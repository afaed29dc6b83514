//! Per-instance CPU configuration.

use serde::{Deserialize, Serialize};

use crate::core::BusMaster;
use crate::error::Z80Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Z80Config {
    /// Increment R on every M1 fetch. When false, R is derived from the
    /// cycle counter (cycles / 4).
    pub exact_refresh: bool,
    /// Vector byte used when `Bus::irq_ack` leaves the data bus floating.
    pub default_irq_vector: u8,
    /// Index this core presents as `BusMaster::Cpu(index)`.
    pub index: usize,
}

impl Default for Z80Config {
    fn default() -> Self {
        Self {
            exact_refresh: true,
            default_irq_vector: 0xFF,
            index: 0,
        }
    }
}

impl Z80Config {
    pub fn from_toml_str(src: &str) -> Result<Self, Z80Error> {
        Ok(toml::from_str(src)?)
    }

    pub fn master(&self) -> BusMaster {
        BusMaster::Cpu(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = Z80Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Z80Config::default());
        assert_eq!(cfg.master(), BusMaster::Cpu(0));
    }

    #[test]
    fn partial_document_overrides_fields() {
        let cfg = Z80Config::from_toml_str("exact_refresh = false\nindex = 1\n").unwrap();
        assert!(!cfg.exact_refresh);
        assert_eq!(cfg.default_irq_vector, 0xFF);
        assert_eq!(cfg.master(), BusMaster::Cpu(1));
    }

    #[test]
    fn bad_types_are_reported() {
        let err = Z80Config::from_toml_str("default_irq_vector = \"rst38\"").unwrap_err();
        assert!(matches!(err, Z80Error::Config(_)));
    }
}
