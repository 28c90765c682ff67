//! Error types for the bridge, the pools and the wrapped transport.
//!
//! Errors produced by the transport are forwarded to callers unchanged; the
//! wrapper layer never classifies, retries or recovers from them.

use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while upgrading or driving a WebSocket connection.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Generic upgrade failure.
    ///
    /// Exposed for callers that need a sentinel on their own upgrade-failure
    /// paths. The bridge never returns it.
    #[error("cannot upgrade connection")]
    CannotUpgrade,

    /// The peer's stream ended.
    #[error("EOF")]
    Eof,

    /// The upgrade request is not a valid WebSocket handshake.
    #[error("Invalid handshake: {0}")]
    InvalidHandshake(String),

    /// The request's Origin does not match the configured origin.
    #[error("Origin not allowed: {origin}")]
    OriginNotAllowed {
        /// Origin sent by the client, `(none)` when absent.
        origin: String,
    },

    /// None of the requested sub-protocols is accepted.
    #[error("Unsupported sub-protocol: {0}")]
    ProtocolNotSupported(String),

    /// Text frame payload is not valid UTF-8.
    #[error("Invalid UTF-8 in text frame")]
    InvalidUtf8,

    /// Close frame with a reason but no status code.
    #[error("Close frame has a reason but no status code")]
    CloseReasonWithoutCode,

    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by tungstenite.
    #[cfg(feature = "tungstenite")]
    #[error("Transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
}

impl Error {
    /// Check if this is the end-of-stream sentinel.
    #[inline]
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Error::Eof)
    }

    /// Check if this is the generic upgrade-failure sentinel.
    #[inline]
    #[must_use]
    pub const fn is_cannot_upgrade(&self) -> bool {
        matches!(self, Error::CannotUpgrade)
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}
