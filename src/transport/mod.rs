//! Contract of the wrapped WebSocket transport.
//!
//! The transport owns the handshake, frame parsing, masking and the protocol
//! state machine. This crate only talks to it through these traits:
//!
//! - [`Transport`] performs the HTTP upgrade and calls back once per
//!   connection.
//! - [`NativeConn`] is the transport's connection, read and written one frame
//!   at a time.
//! - [`NativeFrame`] is the transport's frame.
//!
//! With the `tungstenite` feature (enabled by default) the [`tungstenite`]
//! module provides an implementation over `tokio-tungstenite` and hyper
//! upgrades.

use std::future::Future;

use axum::extract::Request;
use axum::response::Response;
use bytes::Bytes;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{CloseCode, OpCode};

pub mod handshake;

#[cfg(feature = "tungstenite")]
pub mod tungstenite;

/// A frame owned by the transport.
pub trait NativeFrame: Default + Send + 'static {
    /// Frame opcode.
    fn opcode(&self) -> OpCode;

    /// Set the frame opcode.
    fn set_opcode(&mut self, opcode: OpCode);

    /// Check if this is the final frame of a message.
    fn is_fin(&self) -> bool;

    /// Set the final-frame bit.
    fn set_fin(&mut self, fin: bool);

    /// Frame payload. For close frames this is the reason text.
    fn payload(&self) -> &[u8];

    /// Replace the frame payload.
    fn set_payload(&mut self, payload: Bytes);

    /// Close status carried by a close frame.
    fn status(&self) -> Option<CloseCode>;

    /// Set the close status.
    fn set_status(&mut self, code: CloseCode);

    /// Reset to the state of a freshly created frame.
    fn reset(&mut self);

    /// Copy this frame's contents into `other`.
    fn copy_to(&self, other: &mut Self);

    /// Release transport-internal resources held by the frame.
    ///
    /// Called exactly once per frame handed out through a pooled wrapper.
    fn release(self) {}
}

/// A connection owned by the transport.
///
/// Every operation suspends until the transport completes it. Errors are
/// returned as produced; end of stream is reported as
/// [`Error::Eof`](crate::Error::Eof).
pub trait NativeConn: Send + 'static {
    /// Frame type read from and written to this connection.
    type Frame: NativeFrame;

    /// Wait for the next frame.
    fn next_frame(&mut self) -> impl Future<Output = Result<Self::Frame>> + Send;

    /// Read the next frame into `frame`, returning the payload length.
    fn read_frame(&mut self, frame: &mut Self::Frame) -> impl Future<Output = Result<usize>> + Send;

    /// Read a complete message into `frame` and append its payload to `buf`.
    fn read_full(
        &mut self,
        buf: Vec<u8>,
        frame: &mut Self::Frame,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Write `frame`, returning the payload length written.
    fn write_frame(&mut self, frame: &Self::Frame) -> impl Future<Output = Result<usize>> + Send;

    /// Answer a received close frame.
    fn reply_close(&mut self, frame: &Self::Frame) -> impl Future<Output = Result<()>> + Send;

    /// Sub-protocol negotiated during the handshake.
    fn protocol(&self) -> Option<&str> {
        None
    }
}

/// The transport's upgrade procedure.
pub trait Transport: Send + Sync + 'static {
    /// Connection type produced by a successful upgrade.
    type Conn: NativeConn;

    /// Upgrade `request` and return the HTTP response to send back.
    ///
    /// On success `on_upgrade` is invoked exactly once with the new connection,
    /// typically on a task of its own. On failure the transport answers with an
    /// error response and `on_upgrade` is never called.
    fn upgrade<F, Fut>(&self, request: Request, config: &Config, on_upgrade: F) -> Response
    where
        F: FnOnce(Self::Conn) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static;
}
