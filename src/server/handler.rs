//! Connection handler abstraction driven by the accept loop.

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Per-connection logic plugged into [`listen_and_serve`].
///
/// `handle` is called once for every accepted connection and is expected to
/// serve it until the peer goes away, an error occurs, or `ctx` is cancelled.
/// `close` is called once during shutdown and must terminate every
/// connection the handler is still serving.
///
/// [`listen_and_serve`]: crate::server::listen_and_serve
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, ctx: CancellationToken, conn: TcpStream);

    async fn close(&self) -> Result<()>;
}
