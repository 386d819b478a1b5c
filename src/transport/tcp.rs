use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;

use super::Connector;
use crate::{Error, Result};

/// Plain TCP connector. No TLS.
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    connect_timeout: Option<Duration>,
}

impl TcpConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the connect handshake. `None` waits for the OS timeout.
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> Result<TcpStream> {
        let connecting = TcpStream::connect((host, port));
        let result = match self.connect_timeout {
            Some(after) => tokio::time::timeout(after, connecting)
                .await
                .map_err(|_| Error::Timeout {
                    operation: "connecting",
                    after,
                })?,
            None => connecting.await,
        };
        let stream = result.map_err(|source| Error::Connection {
            addr: format!("{}:{}", host, port),
            source,
        })?;

        // Requests are a single small frame; don't let Nagle hold it back.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("failed to set TCP_NODELAY: {}", e);
        }
        Ok(stream)
    }
}
