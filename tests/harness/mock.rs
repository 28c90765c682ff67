//! Scripted in-memory transport.
//!
//! Every upgrade yields a [`MockConn`] that replays the transport's script
//! and records what the handler writes. Shared counters live in [`MockLog`].

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::StatusCode;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use wsbridge::{CloseCode, Config, Error, NativeConn, NativeFrame, OpCode, Result, Transport};

/// Header that makes [`MockTransport`] refuse the upgrade.
pub const REJECT_HEADER: &str = "x-mock-reject";

#[derive(Debug, Clone, Default)]
pub struct MockFrame {
    pub opcode: OpCode,
    pub fin: bool,
    pub payload: Bytes,
    pub status: Option<CloseCode>,
    released: Option<Arc<AtomicUsize>>,
}

impl MockFrame {
    pub fn text(payload: &'static str) -> Self {
        Self {
            opcode: OpCode::Text,
            fin: true,
            payload: Bytes::from_static(payload.as_bytes()),
            ..Self::default()
        }
    }

    pub fn binary(payload: &'static [u8]) -> Self {
        Self {
            opcode: OpCode::Binary,
            fin: true,
            payload: Bytes::from_static(payload),
            ..Self::default()
        }
    }

    pub fn fragment(opcode: OpCode, payload: &'static str, fin: bool) -> Self {
        Self {
            opcode,
            fin,
            payload: Bytes::from_static(payload.as_bytes()),
            ..Self::default()
        }
    }

    pub fn close(code: CloseCode) -> Self {
        Self {
            opcode: OpCode::Close,
            fin: true,
            status: Some(code),
            ..Self::default()
        }
    }
}

impl PartialEq for MockFrame {
    fn eq(&self, other: &Self) -> bool {
        self.opcode == other.opcode
            && self.fin == other.fin
            && self.payload == other.payload
            && self.status == other.status
    }
}

impl NativeFrame for MockFrame {
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
        let released = self.released.take();
        *self = Self {
            released,
            ..Self::default()
        };
    }

    fn copy_to(&self, other: &mut Self) {
        other.opcode = self.opcode;
        other.fin = self.fin;
        other.payload = self.payload.clone();
        other.status = self.status;
    }

    fn release(self) {
        if let Some(released) = self.released {
            released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Counters and records shared by a [`MockTransport`] and its connections.
#[derive(Debug, Default)]
pub struct MockLog {
    pub upgrades: AtomicUsize,
    pub native_releases: Arc<AtomicUsize>,
    pub close_replies: AtomicUsize,
    pub written: Mutex<Vec<MockFrame>>,
    pub tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl MockLog {
    pub fn native_releases(&self) -> usize {
        self.native_releases.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> Vec<MockFrame> {
        self.written.lock().unwrap().clone()
    }

    pub fn take_tasks(&self) -> Vec<JoinHandle<()>> {
        std::mem::take(&mut *self.tasks.lock().unwrap())
    }
}

#[derive(Debug)]
pub struct MockConn {
    pub id: usize,
    inbox: VecDeque<MockFrame>,
    log: Arc<MockLog>,
    protocol: Option<String>,
}

impl MockConn {
    fn pop(&mut self) -> Result<MockFrame> {
        let mut frame = self.inbox.pop_front().ok_or(Error::Eof)?;
        frame.released = Some(Arc::clone(&self.log.native_releases));
        Ok(frame)
    }
}

impl NativeConn for MockConn {
    type Frame = MockFrame;

    async fn next_frame(&mut self) -> Result<MockFrame> {
        self.pop()
    }

    async fn read_frame(&mut self, frame: &mut MockFrame) -> Result<usize> {
        let next = self.pop()?;
        next.copy_to(frame);
        Ok(frame.payload.len())
    }

    async fn read_full(&mut self, mut buf: Vec<u8>, frame: &mut MockFrame) -> Result<Vec<u8>> {
        loop {
            let next = self.pop()?;
            buf.extend_from_slice(&next.payload);
            if next.fin {
                next.copy_to(frame);
                return Ok(buf);
            }
        }
    }

    async fn write_frame(&mut self, frame: &MockFrame) -> Result<usize> {
        self.log.written.lock().unwrap().push(frame.clone());
        Ok(frame.payload.len())
    }

    async fn reply_close(&mut self, _frame: &MockFrame) -> Result<()> {
        self.log.close_replies.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }
}

/// Transport that upgrades every request not carrying [`REJECT_HEADER`].
///
/// Connection ids are sent on the completion channel once the upgrade
/// callback has returned, so pool state is final when a test receives them.
pub struct MockTransport {
    script: Vec<MockFrame>,
    log: Arc<MockLog>,
    next_id: AtomicUsize,
    done: mpsc::UnboundedSender<usize>,
}

impl MockTransport {
    pub fn new(script: Vec<MockFrame>) -> (Self, Arc<MockLog>, mpsc::UnboundedReceiver<usize>) {
        let log = Arc::new(MockLog::default());
        let (done, rx) = mpsc::unbounded_channel();
        let transport = Self {
            script,
            log: Arc::clone(&log),
            next_id: AtomicUsize::new(0),
            done,
        };
        (transport, log, rx)
    }
}

impl Transport for MockTransport {
    type Conn = MockConn;

    fn upgrade<F, Fut>(&self, request: Request, config: &Config, on_upgrade: F) -> Response
    where
        F: FnOnce(Self::Conn) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if request.headers().contains_key(REJECT_HEADER) {
            return StatusCode::BAD_REQUEST.into_response();
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.log.upgrades.fetch_add(1, Ordering::SeqCst);

        let protocol = config.protocols.first().filter(|p| !p.is_empty()).cloned();
        let conn = MockConn {
            id,
            inbox: self.script.iter().cloned().collect(),
            log: Arc::clone(&self.log),
            protocol,
        };

        let done = self.done.clone();
        let task = tokio::spawn(async move {
            on_upgrade(conn).await;
            let _ = done.send(id);
        });
        self.log.tasks.lock().unwrap().push(task);

        StatusCode::SWITCHING_PROTOCOLS.into_response()
    }
}
