use std::sync::Arc;

use bytes::Bytes;

use crate::pool::{Pool, Slot};
use crate::protocol::{CloseCode, OpCode};
use crate::transport::NativeFrame;

/// Pooled wrapper around a transport frame.
///
/// Every accessor forwards to the bound native frame. The holder must hand
/// the frame back with [`Frame::release`] (or [`release_frame`]); a frame that
/// is merely dropped is freed instead of returning to its pool.
pub struct Frame<F: NativeFrame> {
    slot: Box<Slot<F>>,
    pool: Arc<Pool<F>>,
}

impl<F: NativeFrame> Frame<F> {
    pub(crate) fn acquire(pool: &Arc<Pool<F>>, native: F) -> Self {
        Self {
            slot: pool.acquire(native),
            pool: Arc::clone(pool),
        }
    }

    /// Get the bound native frame.
    #[inline]
    pub fn native(&self) -> &F {
        match self.slot.native() {
            Some(native) => native,
            None => unreachable!("frame slot is bound until released"),
        }
    }

    /// Get the bound native frame mutably.
    #[inline]
    pub fn native_mut(&mut self) -> &mut F {
        match self.slot.native_mut() {
            Some(native) => native,
            None => unreachable!("frame slot is bound until released"),
        }
    }

    /// Frame opcode.
    pub fn opcode(&self) -> OpCode {
        self.native().opcode()
    }

    /// Set the frame opcode.
    pub fn set_opcode(&mut self, opcode: OpCode) {
        self.native_mut().set_opcode(opcode);
    }

    /// Check if this is the final frame of a message.
    pub fn is_fin(&self) -> bool {
        self.native().is_fin()
    }

    /// Set the final-frame bit.
    pub fn set_fin(&mut self, fin: bool) {
        self.native_mut().set_fin(fin);
    }

    /// Frame payload.
    pub fn payload(&self) -> &[u8] {
        self.native().payload()
    }

    /// Replace the frame payload.
    pub fn set_payload(&mut self, payload: impl Into<Bytes>) {
        self.native_mut().set_payload(payload.into());
    }

    /// Close status of a close frame.
    pub fn status(&self) -> Option<CloseCode> {
        self.native().status()
    }

    /// Set the close status.
    pub fn set_status(&mut self, code: CloseCode) {
        self.native_mut().set_status(code);
    }

    /// Check if this is a control frame.
    pub fn is_control(&self) -> bool {
        self.opcode().is_control()
    }

    /// Check if this is a close frame.
    pub fn is_close(&self) -> bool {
        self.opcode() == OpCode::Close
    }

    /// Reset the native frame to its initial state.
    pub fn reset(&mut self) {
        self.native_mut().reset();
    }

    /// Copy this frame's contents into `other`.
    pub fn copy_to(&self, other: &mut Frame<F>) {
        self.native().copy_to(other.native_mut());
    }

    /// Release the native frame, then return this wrapper to its pool.
    ///
    /// The transport's release runs first; the wrapper only re-enters the free
    /// list once the native frame is gone.
    pub fn release(self) {
        let Frame { slot, pool } = self;
        pool.release_with(slot, F::release);
    }
}

impl<F: NativeFrame> std::fmt::Debug for Frame<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("opcode", &self.opcode())
            .field("fin", &self.is_fin())
            .field("len", &self.payload().len())
            .field("status", &self.status())
            .finish()
    }
}

/// Release `frame` to the transport and its wrapper to the pool.
///
/// Equivalent to [`Frame::release`].
pub fn release_frame<F: NativeFrame>(frame: Frame<F>) {
    frame.release();
}
