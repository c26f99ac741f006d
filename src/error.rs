//! Crate error type

/// Errors surfaced at setup time. Nothing in the per-frame path fails.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A parallax layer closer than the game plane would scroll backwards
    #[error("invalid layer distance {0}: must be finite and >= 1")]
    InvalidDistance(f32),

    /// Config file could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for `RunnerConfig`
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
