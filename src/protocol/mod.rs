//! Protocol constants re-exported for callers that do not want to depend on
//! the transport's own symbol names.

pub mod close;
pub mod mode;
pub mod opcode;

pub use close::CloseCode;
pub use mode::Mode;
pub use opcode::OpCode;
