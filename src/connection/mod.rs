//! Pooled wrappers delegating to the transport's connections and frames.
//!
//! [`Conn`] and [`Frame`] hold a pooled slot bound to a native object and
//! expose the same operations, forwarding each call. They add no buffering,
//! retries or conversions.
//!
//! ## Lifecycle
//!
//! 1. The upgrader acquires a `Conn` when the transport hands over a connection
//! 2. Each successful [`Conn::next_frame`] acquires a `Frame`
//! 3. The handler releases frames with [`Frame::release`] / [`release_frame`]
//! 4. The `Conn` returns to its pool when the handler drops it

mod conn;
mod frame;

pub use conn::Conn;
pub use frame::{Frame, release_frame};
