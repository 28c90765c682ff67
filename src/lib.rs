//! # wsbridge - Pooled WebSocket wrappers for axum
//!
//! `wsbridge` adapts a WebSocket transport to axum's handler conventions. It
//! owns none of the protocol logic: the handshake, frame codec and close
//! semantics stay inside the transport (`tokio-tungstenite` by default).
//!
//! ## Features
//!
//! - **Upgrade bridge** turning a connection handler into an axum handler
//! - **Pooled wrappers** for connections and frames, reused across connections
//! - **Explicit delegation** to the transport's connection and frame types
//! - **Protocol constants** for close codes, opcodes and transmission modes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use wsbridge::{Conn, WsConn};
//!
//! async fn echo(mut conn: Conn<WsConn>) {
//!     while let Ok(frame) = conn.next_frame().await {
//!         if frame.is_close() {
//!             let _ = conn.reply_close(&frame).await;
//!             frame.release();
//!             break;
//!         }
//!         let _ = conn.write_frame(&frame).await;
//!         frame.release();
//!     }
//! }
//!
//! let app = Router::new().route("/ws", get(wsbridge::upgrade(echo)));
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod pool;
pub mod protocol;
pub mod transport;
pub mod upgrade;

pub use config::{Config, Limits};
pub use connection::{Conn, Frame, release_frame};
pub use error::{Error, Result};
pub use pool::{Pool, PoolStats, Pools};
pub use protocol::{CloseCode, Mode, OpCode};
pub use transport::{NativeConn, NativeFrame, Transport};
pub use upgrade::Upgrader;

#[cfg(feature = "tungstenite")]
pub use transport::tungstenite::{TungsteniteTransport, WsConn, WsFrame};
#[cfg(feature = "tungstenite")]
pub use upgrade::{upgrade, upgrade_with_config};

/// End-of-stream sentinel returned when the peer's stream ends.
pub const EOF: Error = Error::Eof;

/// Sentinel for callers' own upgrade-failure paths.
pub const CANNOT_UPGRADE: Error = Error::CannotUpgrade;
