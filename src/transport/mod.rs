//! Transport layer: opens the byte stream a single exchange runs over.
//!
//! [`Connector`] is the seam between the exchange logic and the network, so
//! that the exchange can run against in-memory doubles as well as TCP.

mod tcp;

pub use tcp::TcpConnector;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::Result;

/// Opens one connection per request.
///
/// The returned stream is owned by the caller; dropping it closes the
/// connection.
#[async_trait]
pub trait Connector: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    async fn connect(&self, host: &str, port: u16) -> Result<Self::Stream>;
}
