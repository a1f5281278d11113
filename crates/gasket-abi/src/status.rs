/// Outcome code returned by every engine entry point.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserStatus {
    /// The output buffer holds the return payload.
    Success = 0,
    /// The program stopped on purpose; the output buffer holds its revert data.
    Revert = 1,
    /// Engine-level fault; the output buffer holds a diagnostic message.
    Failure = 2,
    /// Fuel ran out before the program finished.
    OutOfGas = 3,
    /// The configured stack bound was exceeded.
    OutOfStack = 4,
}

impl UserStatus {
    /// Map a raw code onto a known status, if any.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::Revert),
            2 => Some(Self::Failure),
            3 => Some(Self::OutOfGas),
            4 => Some(Self::OutOfStack),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<UserStatus> for u8 {
    fn from(status: UserStatus) -> Self {
        status.code()
    }
}
