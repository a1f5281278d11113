use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error parsing a [`ProgramId`] from text.
#[derive(Debug, Error, PartialEq)]
pub enum ProgramIdError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
}

const ID_LEN: usize = 20;

/// Identity of a deployed program, the key modules are stored under.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ProgramId([u8; ID_LEN]);

impl ProgramId {
    /// Length of an identity in bytes.
    pub const LEN: usize = ID_LEN;

    pub const fn new(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Derive an identity from program code: the trailing 20 bytes of its
    /// blake3 hash.
    pub fn from_code(code: &[u8]) -> Self {
        let hash = blake3::hash(code);
        let mut id = [0u8; Self::LEN];
        id.copy_from_slice(&hash.as_bytes()[32 - Self::LEN..]);
        Self(id)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl From<[u8; ID_LEN]> for ProgramId {
    fn from(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProgramId({})", self)
    }
}

impl FromStr for ProgramId {
    type Err = ProgramIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)?;
        let id: [u8; Self::LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ProgramIdError::Length {
                expected: Self::LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(id))
    }
}
