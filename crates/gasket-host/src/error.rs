use crate::outcome::EngineFailure;
use crate::store::StoreError;
use thiserror::Error;

/// Errors surfaced by bridge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The program stopped on purpose; carries its revert data.
    #[error("execution reverted ({} bytes of revert data)", .0.len())]
    Reverted(Vec<u8>),

    /// The engine faulted.
    #[error("engine failure: {0}")]
    Failed(EngineFailure),

    /// Host and engine state have diverged; the caller must not continue.
    #[error("protocol invariant violated: {0}")]
    InvariantViolation(String),

    /// The module store rejected a write.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Error from the gasket-abi crate.
    #[error("ABI error: {0}")]
    Abi(#[from] gasket_abi::Error),
}

impl Error {
    /// Whether this error signals a consistency bug rather than a program outcome.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InvariantViolation(_))
    }

    /// Whether the program reverted on purpose.
    pub fn is_revert(&self) -> bool {
        matches!(self, Error::Reverted(_))
    }
}

/// Result type for gasket-host operations.
pub type Result<T> = std::result::Result<T, Error>;
