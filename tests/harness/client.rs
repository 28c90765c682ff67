//! WebSocket test client over tokio-tungstenite.

use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Response;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    response: Response,
    pub id: usize,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> Result<Self, Error> {
        Self::connect_with_headers(addr, &[]).await
    }

    pub async fn connect_with_id(addr: SocketAddr, id: usize) -> Result<Self, Error> {
        let mut client = Self::connect(addr).await?;
        client.id = id;
        Ok(client)
    }

    /// Connect to `/ws` with extra request headers.
    pub async fn connect_with_headers(
        addr: SocketAddr,
        headers: &[(&'static str, &'static str)],
    ) -> Result<Self, Error> {
        let mut request = format!("ws://{addr}/ws").into_client_request()?;
        for (name, value) in headers {
            request
                .headers_mut()
                .insert(*name, HeaderValue::from_static(value));
        }

        let (ws, response) = connect_async(request).await?;
        Ok(Self {
            ws,
            response,
            id: 0,
        })
    }

    /// Sub-protocol selected by the server, if any.
    pub fn protocol(&self) -> Option<&str> {
        self.response
            .headers()
            .get("sec-websocket-protocol")
            .and_then(|v| v.to_str().ok())
    }

    pub async fn send_text(&mut self, text: &str) -> Result<(), Error> {
        self.ws.send(Message::text(text.to_owned())).await
    }

    pub async fn send_binary(&mut self, data: &[u8]) -> Result<(), Error> {
        self.ws.send(Message::binary(data.to_vec())).await
    }

    /// Receive the next text message, skipping control frames.
    ///
    /// Returns `None` once the server closes.
    pub async fn recv_text(&mut self) -> Result<Option<String>, Error> {
        Ok(self.recv().await?.map(|m| match m {
            Message::Text(text) => text.as_str().to_owned(),
            other => panic!("expected text message, got {other:?}"),
        }))
    }

    pub async fn recv_binary(&mut self) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.recv().await?.map(|m| match m {
            Message::Binary(data) => data.to_vec(),
            other => panic!("expected binary message, got {other:?}"),
        }))
    }

    async fn recv(&mut self) -> Result<Option<Message>, Error> {
        while let Some(message) = self.ws.next().await {
            match message? {
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
                Message::Close(_) => return Ok(None),
                data => return Ok(Some(data)),
            }
        }
        Ok(None)
    }

    /// Run the closing handshake and wait for the server's reply.
    pub async fn close(self) -> Result<(), Error> {
        self.close_with(None).await.map(|_| ())
    }

    /// Close with `frame` and return the status code the server answered with.
    pub async fn close_with(mut self, frame: Option<CloseFrame>) -> Result<Option<u16>, Error> {
        self.ws.close(frame).await?;
        let mut reply = None;
        while let Some(message) = self.ws.next().await {
            match message {
                Ok(Message::Close(close)) => reply = close.map(|c| u16::from(c.code)),
                Ok(_) => continue,
                Err(Error::ConnectionClosed) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(reply)
    }
}
