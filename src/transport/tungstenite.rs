//! Transport over `tokio-tungstenite` and hyper upgrades.
//!
//! [`TungsteniteTransport`] has tungstenite validate the request and build the
//! `101 Switching Protocols` answer, applies the origin and sub-protocol
//! policy, and, once hyper hands over the raw stream, wraps
//! it in a server-role [`WebSocketStream`] and calls back with a [`WsConn`].
//! Each tungstenite message is surfaced as one [`WsFrame`]; tungstenite has
//! already reassembled fragments and answered pings by the time a frame is
//! returned.

use std::future::Future;

use axum::body::Body;
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use http::{HeaderValue, StatusCode, header};
use hyper::upgrade::{OnUpgrade, Upgraded};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::handshake::server::create_response_with_body;
use tokio_tungstenite::tungstenite::protocol::frame::Frame as RawFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::{
    CloseCode as WsCloseCode, Control, Data, OpCode as WsOpCode,
};
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, Role, WebSocketConfig};
use tokio_tungstenite::tungstenite::{Error as WsError, Message, Utf8Bytes};

use super::handshake::{negotiate_protocol, request_origin, requested_protocols, validate_origin};
use super::{NativeConn, NativeFrame, Transport};
use crate::config::{Config, Limits};
use crate::error::{Error, Result};
use crate::protocol::{CloseCode, OpCode};

/// Raw stream handed over by hyper after a successful upgrade.
pub type UpgradedIo = TokioIo<Upgraded>;

fn reject(status: StatusCode, error: Error) -> Response {
    tracing::debug!(%status, %error, "WebSocket upgrade rejected");
    (status, error.to_string()).into_response()
}

fn ws_config(limits: Limits) -> WebSocketConfig {
    WebSocketConfig::default()
        .max_frame_size(Some(limits.max_frame_size))
        .max_message_size(Some(limits.max_message_size))
}

fn to_ws_opcode(opcode: OpCode) -> WsOpCode {
    match opcode {
        OpCode::Continuation => WsOpCode::Data(Data::Continue),
        OpCode::Text => WsOpCode::Data(Data::Text),
        OpCode::Binary => WsOpCode::Data(Data::Binary),
        OpCode::Close => WsOpCode::Control(Control::Close),
        OpCode::Ping => WsOpCode::Control(Control::Ping),
        OpCode::Pong => WsOpCode::Control(Control::Pong),
    }
}

fn from_ws_opcode(opcode: WsOpCode) -> OpCode {
    OpCode::from_u8(u8::from(opcode)).unwrap_or(OpCode::Binary)
}

fn utf8(payload: Bytes) -> Result<Utf8Bytes> {
    Utf8Bytes::try_from(payload).map_err(|_| Error::InvalidUtf8)
}

/// Upgrades axum requests with `tokio-tungstenite`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteTransport;

impl TungsteniteTransport {
    /// Create the transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Transport for TungsteniteTransport {
    type Conn = WsConn;

    fn upgrade<F, Fut>(&self, mut request: Request, config: &Config, on_upgrade: F) -> Response
    where
        F: FnOnce(Self::Conn) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut response = match create_response_with_body(&request, Body::empty) {
            Ok(response) => response,
            Err(e) => {
                return reject(StatusCode::BAD_REQUEST, Error::InvalidHandshake(e.to_string()));
            }
        };

        if let Err(e) = validate_origin(request_origin(request.headers()), &config.origin) {
            return reject(StatusCode::FORBIDDEN, e);
        }

        let requested = requested_protocols(request.headers());
        let protocol = match negotiate_protocol(&requested, &config.protocols) {
            Ok(protocol) => protocol,
            Err(e) => return reject(StatusCode::BAD_REQUEST, e),
        };

        let Some(upgraded) = request.extensions_mut().remove::<OnUpgrade>() else {
            return reject(
                StatusCode::UPGRADE_REQUIRED,
                Error::InvalidHandshake("Connection does not support upgrades".into()),
            );
        };

        if let Some(value) = protocol
            .as_deref()
            .and_then(|p| HeaderValue::from_str(p).ok())
        {
            response
                .headers_mut()
                .insert(header::SEC_WEBSOCKET_PROTOCOL, value);
        }

        let ws_config = ws_config(config.limits);
        tokio::spawn(async move {
            match upgraded.await {
                Ok(upgraded) => {
                    let stream = WebSocketStream::from_raw_socket(
                        TokioIo::new(upgraded),
                        Role::Server,
                        Some(ws_config),
                    )
                    .await;
                    tracing::debug!(protocol = ?protocol, "WebSocket connection upgraded");
                    on_upgrade(WsConn::new(stream, protocol)).await;
                }
                Err(e) => tracing::debug!(error = %e, "HTTP upgrade failed"),
            }
        });

        response
    }
}

/// Frame read from or written to a [`WsConn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsFrame {
    opcode: OpCode,
    fin: bool,
    payload: Bytes,
    status: Option<CloseCode>,
}

impl Default for WsFrame {
    fn default() -> Self {
        Self {
            opcode: OpCode::Text,
            fin: true,
            payload: Bytes::new(),
            status: None,
        }
    }
}

impl WsFrame {
    /// Load a received message, replacing the frame's previous contents.
    fn load(&mut self, message: Message) {
        self.reset();
        match message {
            Message::Text(text) => {
                self.opcode = OpCode::Text;
                self.payload = Bytes::from(text);
            }
            Message::Binary(data) => {
                self.opcode = OpCode::Binary;
                self.payload = data;
            }
            Message::Ping(data) => {
                self.opcode = OpCode::Ping;
                self.payload = data;
            }
            Message::Pong(data) => {
                self.opcode = OpCode::Pong;
                self.payload = data;
            }
            Message::Close(close) => {
                self.opcode = OpCode::Close;
                if let Some(close) = close {
                    self.status = Some(CloseCode::from_u16(u16::from(close.code)));
                    self.payload = Bytes::from(close.reason);
                }
            }
            Message::Frame(raw) => {
                let header = raw.header();
                self.opcode = from_ws_opcode(header.opcode);
                self.fin = header.is_final;
                self.payload = Bytes::copy_from_slice(raw.payload());
            }
        }
    }

    fn to_message(&self) -> Result<Message> {
        let payload = self.payload.clone();
        let message = match (self.opcode, self.fin) {
            (OpCode::Text, true) => Message::Text(utf8(payload)?),
            (OpCode::Binary, true) => Message::Binary(payload),
            (OpCode::Ping, _) => Message::Ping(payload),
            (OpCode::Pong, _) => Message::Pong(payload),
            (OpCode::Close, _) => Message::Close(match self.status {
                Some(code) => Some(CloseFrame {
                    code: WsCloseCode::from(code.as_u16()),
                    reason: utf8(payload)?,
                }),
                None if payload.is_empty() => None,
                // A close reason is only encodable after a status code.
                None => return Err(Error::CloseReasonWithoutCode),
            }),
            (opcode, fin) => Message::Frame(RawFrame::message(payload, to_ws_opcode(opcode), fin)),
        };
        Ok(message)
    }
}

impl NativeFrame for WsFrame {
    fn opcode(&self) -> OpCode {
        self.opcode
    }

    fn set_opcode(&mut self, opcode: OpCode) {
        self.opcode = opcode;
    }

    fn is_fin(&self) -> bool {
        self.fin
    }

    fn set_fin(&mut self, fin: bool) {
        self.fin = fin;
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn set_payload(&mut self, payload: Bytes) {
        self.payload = payload;
    }

    fn status(&self) -> Option<CloseCode> {
        self.status
    }

    fn set_status(&mut self, code: CloseCode) {
        self.status = Some(code);
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn copy_to(&self, other: &mut Self) {
        other.clone_from(self);
    }
}

/// Server-side tungstenite connection.
pub struct WsConn<S = UpgradedIo> {
    stream: WebSocketStream<S>,
    protocol: Option<String>,
}

impl<S> WsConn<S> {
    /// Wrap an established stream.
    pub fn new(stream: WebSocketStream<S>, protocol: Option<String>) -> Self {
        Self { stream, protocol }
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &WebSocketStream<S> {
        &self.stream
    }

    /// Get a mutable reference to the underlying stream.
    pub fn get_mut(&mut self) -> &mut WebSocketStream<S> {
        &mut self.stream
    }
}

impl<S> std::fmt::Debug for WsConn<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsConn")
            .field("protocol", &self.protocol)
            .finish_non_exhaustive()
    }
}

impl<S> WsConn<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Message> {
        match self.stream.next().await {
            Some(Ok(message)) => Ok(message),
            // The peer dropped the stream without a closing handshake.
            Some(Err(WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake))) | None => {
                Err(Error::Eof)
            }
            Some(Err(e)) => Err(e.into()),
        }
    }
}

impl<S> NativeConn for WsConn<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Frame = WsFrame;

    async fn next_frame(&mut self) -> Result<WsFrame> {
        let message = self.recv().await?;
        let mut frame = WsFrame::default();
        frame.load(message);
        Ok(frame)
    }

    async fn read_frame(&mut self, frame: &mut WsFrame) -> Result<usize> {
        let message = self.recv().await?;
        frame.load(message);
        Ok(frame.payload.len())
    }

    async fn read_full(&mut self, mut buf: Vec<u8>, frame: &mut WsFrame) -> Result<Vec<u8>> {
        let message = self.recv().await?;
        frame.load(message);
        buf.extend_from_slice(&frame.payload);
        Ok(buf)
    }

    async fn write_frame(&mut self, frame: &WsFrame) -> Result<usize> {
        let message = frame.to_message()?;
        self.stream.send(message).await?;
        Ok(frame.payload.len())
    }

    async fn reply_close(&mut self, frame: &WsFrame) -> Result<()> {
        let code = frame.status.unwrap_or_default();
        let close = CloseFrame {
            code: WsCloseCode::from(code.as_u16()),
            reason: Utf8Bytes::from_static(""),
        };
        match self.stream.send(Message::Close(Some(close))).await {
            Ok(()) | Err(WsError::ConnectionClosed) => Ok(()),
            // A close from the peer already queued tungstenite's reply.
            Err(WsError::Protocol(ProtocolError::SendAfterClosing)) => {
                self.stream.flush().await.map_err(Error::from)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }
}
