//! Test harness utilities for the upgrade bridge and pooled wrappers.
//!
//! - [`MockTransport`] drives handlers with scripted frames, no network
//!   involved.
//! - [`TestServer`] and [`TestClient`] run real WebSocket connections over
//!   axum and tokio-tungstenite.

#![allow(dead_code)]

mod client;
mod mock;
mod server;

pub use client::TestClient;
pub use mock::{MockConn, MockFrame, MockLog, MockTransport, REJECT_HEADER};
pub use server::{PROTOCOL_QUERY, TestServer, echo};

use std::time::Duration;

/// Poll `condition` until it holds or two seconds pass.
pub async fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
