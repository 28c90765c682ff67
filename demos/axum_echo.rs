//! Example: Echo server on axum using wsbridge's pooled wrappers.
//!
//! The upgrade, handshake checks and frame codec are handled by the
//! tungstenite transport; the handler only sees a pooled `Conn`.
//!
//! Run with:
//!   RUST_LOG=wsbridge=trace cargo run --example axum_echo
//!
//! Open http://127.0.0.1:9001 in a browser to use the test page.

use std::error::Error;

use axum::Router;
use axum::response::Html;
use axum::routing::get;
use tracing_subscriber::EnvFilter;
use wsbridge::{CloseCode, Config, Conn, OpCode, WsConn};

const ADDR: &str = "127.0.0.1:9001";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::new()
        .with_protocols(["echo", ""])
        .with_pool_capacity(64);

    let app = Router::new()
        .route("/", get(Html(PAGE)))
        .route("/ws", get(wsbridge::upgrade_with_config(echo, config)));

    println!("Axum + wsbridge server listening on {}", ADDR);
    println!("  WebSocket endpoint: ws://{}/ws", ADDR);
    println!("  Test page:          http://{}/", ADDR);

    let listener = tokio::net::TcpListener::bind(ADDR).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Echo every data frame; answer close frames and stop.
async fn echo(mut conn: Conn<WsConn>) {
    println!("  WebSocket connection established (protocol: {:?})", conn.protocol());

    loop {
        let frame = match conn.next_frame().await {
            Ok(frame) => frame,
            Err(e) if e.is_eof() => {
                println!("  Connection closed");
                return;
            }
            Err(e) => {
                eprintln!("  WebSocket session error: {}", e);
                return;
            }
        };

        match frame.opcode() {
            OpCode::Close => {
                let code = frame.status().unwrap_or(CloseCode::Normal);
                println!("  Received close: {}", code.as_u16());
                let _ = conn.reply_close(&frame).await;
                frame.release();
                return;
            }
            OpCode::Ping | OpCode::Pong => {
                println!("  Received {} ({} bytes)", frame.opcode(), frame.payload().len());
            }
            opcode => {
                println!("  Received {}: {} bytes", opcode, frame.payload().len());
                if let Err(e) = conn.write_frame(&frame).await {
                    eprintln!("  Write failed: {}", e);
                    frame.release();
                    return;
                }
            }
        }

        frame.release();
    }
}

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>wsbridge + Axum</title></head>
<body>
  <h2>wsbridge + Axum WebSocket Demo</h2>
  <div>
    <input id="msg" type="text" value="Hello, WebSocket!" />
    <button onclick="send()">Send</button>
    <button onclick="close_ws()">Close</button>
  </div>
  <pre id="log"></pre>
  <script>
    const log = document.getElementById('log');
    const ws = new WebSocket('ws://' + location.host + '/ws', ['echo']);
    ws.onopen    = () => appendLog('Connected (protocol: ' + ws.protocol + ')');
    ws.onmessage = (e) => appendLog('Received: ' + e.data);
    ws.onclose   = (e) => appendLog('Closed: code=' + e.code + ' reason=' + e.reason);
    ws.onerror   = (e) => appendLog('Error: ' + e);
    function send() {
      const text = document.getElementById('msg').value;
      ws.send(text);
      appendLog('Sent: ' + text);
    }
    function close_ws() { ws.close(1000, 'user closed'); }
    function appendLog(msg) { log.textContent += msg + '\n'; }
  </script>
</body>
</html>"#;
