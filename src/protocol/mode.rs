use super::OpCode;

/// Transmission mode for outgoing data frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Mode {
    /// Payloads are sent as text frames.
    #[default]
    Text = 0,
    /// Payloads are sent as binary frames.
    Binary = 1,
}

impl Mode {
    /// Opcode used for the first frame of a message sent in this mode.
    #[inline]
    #[must_use]
    pub const fn opcode(self) -> OpCode {
        match self {
            Mode::Text => OpCode::Text,
            Mode::Binary => OpCode::Binary,
        }
    }
}
