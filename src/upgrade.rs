//! Bridge from axum request handlers to the transport's upgrader.

use std::future::{Future, Ready, ready};
use std::sync::Arc;

use axum::extract::Request;
use axum::response::Response;

use crate::config::Config;
use crate::connection::Conn;
use crate::pool::Pools;
use crate::transport::Transport;

#[cfg(feature = "tungstenite")]
use crate::transport::tungstenite::{TungsteniteTransport, WsConn};

/// Upgrades requests through a [`Transport`] and runs a handler per
/// connection with a pooled [`Conn`].
///
/// The configuration is normalized once here and never changes afterwards.
/// The upgrader owns the connection and frame pools shared by every
/// connection it serves.
pub struct Upgrader<T: Transport> {
    transport: T,
    config: Config,
    pools: Pools<T::Conn>,
}

#[cfg(feature = "tungstenite")]
impl Upgrader<TungsteniteTransport> {
    /// Create an upgrader over the tungstenite transport.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_transport(TungsteniteTransport::new(), config)
    }
}

impl<T: Transport> Upgrader<T> {
    /// Create an upgrader over `transport`.
    #[must_use]
    pub fn with_transport(transport: T, config: Config) -> Self {
        let config = config.normalized();
        let pools = Pools::with_capacity(config.pool_capacity);
        Self {
            transport,
            config,
            pools,
        }
    }

    /// The normalized configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pools backing this upgrader's wrappers.
    pub fn pools(&self) -> &Pools<T::Conn> {
        &self.pools
    }

    /// The wrapped transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Upgrade a single request and run `handler` on the resulting connection.
    ///
    /// Delegates to [`Transport::upgrade`]. Upgrade failures are answered by
    /// the transport and `handler` is not called.
    pub fn upgrade<H, Fut>(&self, request: Request, handler: H) -> Response
    where
        H: FnOnce(Conn<T::Conn>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let pools = self.pools.clone();
        self.transport
            .upgrade(request, &self.config, move |native| async move {
                let conn = Conn::acquire(pools, native);
                handler(conn).await;
                tracing::trace!("WebSocket handler finished");
            })
    }

    /// Turn this upgrader into an axum handler that runs `handler` once per
    /// upgraded connection.
    pub fn into_handler<H, Fut>(
        self,
        handler: H,
    ) -> impl Fn(Request) -> Ready<Response> + Clone + Send + Sync + 'static
    where
        H: Fn(Conn<T::Conn>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let upgrader = Arc::new(self);
        let handler = Arc::new(handler);
        move |request: Request| {
            let handler = Arc::clone(&handler);
            ready(upgrader.upgrade(request, move |conn| (*handler)(conn)))
        }
    }
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for Upgrader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upgrader")
            .field("transport", &self.transport)
            .field("config", &self.config)
            .field("pools", &self.pools)
            .finish()
    }
}

/// Build an axum handler that upgrades with the default configuration.
///
/// Accepts any sub-protocol and any origin.
///
/// ```rust,ignore
/// let app = Router::new().route("/ws", get(wsbridge::upgrade(echo)));
/// ```
#[cfg(feature = "tungstenite")]
pub fn upgrade<H, Fut>(
    handler: H,
) -> impl Fn(Request) -> Ready<Response> + Clone + Send + Sync + 'static
where
    H: Fn(Conn<WsConn>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    upgrade_with_config(handler, Config::default())
}

/// Build an axum handler that upgrades with `config`.
#[cfg(feature = "tungstenite")]
pub fn upgrade_with_config<H, Fut>(
    handler: H,
    config: Config,
) -> impl Fn(Request) -> Ready<Response> + Clone + Send + Sync + 'static
where
    H: Fn(Conn<WsConn>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Upgrader::new(config).into_handler(handler)
}
