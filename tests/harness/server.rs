//! Echo server on a random port, served by axum.

use std::net::SocketAddr;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wsbridge::{Config, Conn, Pools, Upgrader, WsConn};

/// Text message answered with the negotiated sub-protocol instead of an echo.
pub const PROTOCOL_QUERY: &str = "protocol?";

/// Echo data frames back until the peer closes.
pub async fn echo(mut conn: Conn<WsConn>) {
    while let Ok(frame) = conn.next_frame().await {
        if frame.is_close() {
            let _ = conn.reply_close(&frame).await;
            frame.release();
            return;
        }

        let written = if frame.payload() == PROTOCOL_QUERY.as_bytes() {
            let mut reply = conn.acquire_frame();
            reply.set_payload(conn.protocol().unwrap_or_default().to_owned());
            let written = conn.write_frame(&reply).await;
            reply.release();
            written
        } else {
            conn.write_frame(&frame).await
        };

        frame.release();
        if written.is_err() {
            return;
        }
    }
}

pub struct TestServer {
    handle: JoinHandle<()>,
    pools: Pools<WsConn>,
}

impl TestServer {
    pub async fn spawn() -> (Self, SocketAddr) {
        Self::spawn_with_config(Config::default()).await
    }

    pub async fn spawn_with_config(config: Config) -> (Self, SocketAddr) {
        let upgrader = Upgrader::new(config);
        let pools = upgrader.pools().clone();
        let app = Router::new().route("/ws", get(upgrader.into_handler(echo)));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (Self { handle, pools }, addr)
    }

    /// Pools shared by every connection this server accepted.
    pub fn pools(&self) -> &Pools<WsConn> {
        &self.pools
    }

    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}
