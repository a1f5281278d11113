use thiserror::Error;

/// Errors that can occur when loading ABI-level configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// The parameters file could not be parsed.
    #[error("invalid execution params: {0}")]
    Config(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for gasket-abi operations.
pub type Result<T> = std::result::Result<T, Error>;
