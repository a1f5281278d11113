use crate::{Error, Result};
use gasket_abi::UserStatus;
use std::fmt;

/// Why the engine faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Generic engine fault (trap, invalid module, bad params).
    Failure,
    /// Gas ran out.
    OutOfGas,
    /// The stack bound was exceeded.
    OutOfStack,
    /// A status code this host does not know.
    Unknown(u8),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Failure => write!(f, "failure"),
            FailureKind::OutOfGas => write!(f, "out of gas"),
            FailureKind::OutOfStack => write!(f, "out of stack"),
            FailureKind::Unknown(code) => write!(f, "unknown status {}", code),
        }
    }
}

/// An engine-level fault with its diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl EngineFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for EngineFailure {}

/// Typed result of one compile or call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(Vec<u8>),
    Revert(Vec<u8>),
    Failure(EngineFailure),
}

impl Outcome {
    /// Interpret a status byte together with the engine's output bytes.
    ///
    /// Total over every `u8`: `0` is success, `1` is revert, anything else is
    /// a failure.
    pub fn decode(code: u8, data: Vec<u8>) -> Self {
        match UserStatus::from_code(code) {
            Some(UserStatus::Success) => Outcome::Success(data),
            Some(UserStatus::Revert) => Outcome::Revert(data),
            Some(UserStatus::Failure) => Outcome::Failure(EngineFailure::new(
                FailureKind::Failure,
                message_or(data, "engine fault without diagnostic"),
            )),
            Some(UserStatus::OutOfGas) => Outcome::Failure(EngineFailure::new(
                FailureKind::OutOfGas,
                message_or(data, "gas exhausted"),
            )),
            Some(UserStatus::OutOfStack) => Outcome::Failure(EngineFailure::new(
                FailureKind::OutOfStack,
                message_or(data, "max call depth exceeded"),
            )),
            None => {
                tracing::error!(
                    status = code,
                    data = %hex::encode(&data),
                    "program errored with unknown status"
                );
                Outcome::Failure(EngineFailure::new(
                    FailureKind::Unknown(code),
                    message_or(data, "engine fault without diagnostic"),
                ))
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Success payload as `Ok`; revert and failure as the matching [`Error`].
    pub fn into_result(self) -> Result<Vec<u8>> {
        match self {
            Outcome::Success(data) => Ok(data),
            Outcome::Revert(data) => Err(Error::Reverted(data)),
            Outcome::Failure(failure) => Err(Error::Failed(failure)),
        }
    }
}

/// The engine's diagnostic, or `fallback` when it sent none.
fn message_or(data: Vec<u8>, fallback: &str) -> String {
    if data.is_empty() {
        return fallback.to_string();
    }
    String::from_utf8(data).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}
