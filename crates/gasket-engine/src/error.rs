use gasket_abi::UserStatus;
use thiserror::Error;

/// Errors from the WASM execution engine.
#[derive(Error, Debug)]
pub enum Error {
    /// WASM compilation, instantiation or execution error.
    #[error("WASM error: {0}")]
    Wasm(String),

    /// The module format version is not one this engine understands.
    #[error("unsupported module version {0}")]
    UnsupportedVersion(u32),

    /// An execution parameter is outside what the engine accepts.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Error within a host function.
    #[error("Host function error: {0}")]
    HostFunction(String),

    /// Fuel ran out.
    #[error("out of gas")]
    OutOfGas,

    /// The wasm stack bound was exceeded.
    #[error("out of stack")]
    OutOfStack,

    /// The engine panicked; the panic was contained at the entry point.
    #[error("engine panicked: {0}")]
    Panic(String),
}

impl Error {
    /// Status byte reported across the boundary for this error.
    pub fn status(&self) -> UserStatus {
        match self {
            Error::OutOfGas => UserStatus::OutOfGas,
            Error::OutOfStack => UserStatus::OutOfStack,
            _ => UserStatus::Failure,
        }
    }

    /// Bytes written to the output buffer alongside [`Error::status`].
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Error::OutOfGas | Error::OutOfStack => Vec::new(),
            other => other.to_string().into_bytes(),
        }
    }
}

/// Result type for gasket-engine operations.
pub type Result<T> = std::result::Result<T, Error>;
