use thiserror::Error;

#[derive(Debug, Error)]
pub enum Z80Error {
    #[error("unknown register id {0}")]
    InvalidRegister(u32),

    #[error("invalid fetch range {low:#06X}-{high:#06X}")]
    InvalidFetchRange { low: u16, high: u16 },

    #[error("invalid CPU configuration: {0}")]
    Config(#[from] toml::de::Error),
}
