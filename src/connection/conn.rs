use crate::connection::Frame;
use crate::error::Result;
use crate::pool::{Pools, Slot};
use crate::transport::NativeConn;

/// Pooled wrapper around a transport connection.
///
/// Handed to the upgrade handler. Every I/O method forwards to the native
/// connection and returns its result unchanged. The wrapper goes back to the
/// connection pool, with its native reference cleared, as soon as it is
/// dropped.
///
/// ## Example
///
/// ```rust,ignore
/// async fn echo(mut conn: Conn<WsConn>) {
///     while let Ok(frame) = conn.next_frame().await {
///         if frame.is_close() {
///             let _ = conn.reply_close(&frame).await;
///             frame.release();
///             break;
///         }
///         let _ = conn.write_frame(&frame).await;
///         frame.release();
///     }
/// }
/// ```
pub struct Conn<C: NativeConn> {
    slot: Option<Box<Slot<C>>>,
    pools: Pools<C>,
}

impl<C: NativeConn> Conn<C> {
    pub(crate) fn acquire(pools: Pools<C>, native: C) -> Self {
        Self {
            slot: Some(pools.conns().acquire(native)),
            pools,
        }
    }

    /// Get the bound native connection.
    #[inline]
    pub fn native(&self) -> &C {
        match self.slot.as_ref().and_then(|slot| slot.native()) {
            Some(native) => native,
            None => unreachable!("conn slot is bound until dropped"),
        }
    }

    /// Get the bound native connection mutably.
    #[inline]
    pub fn native_mut(&mut self) -> &mut C {
        match self.slot.as_mut().and_then(|slot| slot.native_mut()) {
            Some(native) => native,
            None => unreachable!("conn slot is bound until dropped"),
        }
    }

    /// Sub-protocol negotiated during the handshake.
    pub fn protocol(&self) -> Option<&str> {
        self.native().protocol()
    }

    /// Wait for the next frame and wrap it in a pooled [`Frame`].
    ///
    /// The caller owns the returned frame and must release it.
    pub async fn next_frame(&mut self) -> Result<Frame<C::Frame>> {
        let native = self.native_mut().next_frame().await?;
        Ok(Frame::acquire(self.pools.frames(), native))
    }

    /// Read the next frame into `frame`, returning the payload length.
    pub async fn read_frame(&mut self, frame: &mut Frame<C::Frame>) -> Result<usize> {
        self.native_mut().read_frame(frame.native_mut()).await
    }

    /// Read a complete message into `frame` and append its payload to `buf`.
    pub async fn read_full(&mut self, buf: Vec<u8>, frame: &mut Frame<C::Frame>) -> Result<Vec<u8>> {
        self.native_mut().read_full(buf, frame.native_mut()).await
    }

    /// Write `frame`, returning the payload length written.
    pub async fn write_frame(&mut self, frame: &Frame<C::Frame>) -> Result<usize> {
        self.native_mut().write_frame(frame.native()).await
    }

    /// Answer a received close frame.
    pub async fn reply_close(&mut self, frame: &Frame<C::Frame>) -> Result<()> {
        self.native_mut().reply_close(frame.native()).await
    }

    /// Take a pooled frame bound to a fresh native frame, for building
    /// outgoing frames.
    pub fn acquire_frame(&self) -> Frame<C::Frame> {
        Frame::acquire(self.pools.frames(), C::Frame::default())
    }
}

impl<C: NativeConn> Drop for Conn<C> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.pools.conns().release(slot);
        }
    }
}

impl<C: NativeConn> std::fmt::Debug for Conn<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conn")
            .field("protocol", &self.protocol())
            .finish_non_exhaustive()
    }
}
