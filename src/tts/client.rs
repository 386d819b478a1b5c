//! HTS synthesis client.

use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, info_span, warn, Instrument};

use super::types::SynthesisOutput;
use crate::config::ClientConfig;
use crate::endpoint::{EndpointTable, ResolvedEndpoint, ResponseMode};
use crate::protocol::{write_frame, SynthesisRequest, RECV_CHUNK_SIZE};
use crate::transport::{Connector, TcpConnector};
use crate::{Error, Result};

/// Client for the HTS synthesis service.
///
/// Holds only read-only configuration. Each call to
/// [`HtsClient::ask_for_service`] opens its own connection, so one client can
/// serve concurrent requests.
pub struct HtsClient<C = TcpConnector> {
    connector: C,
    host: String,
    read_timeout: Option<Duration>,
    endpoints: EndpointTable,
}

impl HtsClient<TcpConnector> {
    /// Start building a TCP-backed client.
    pub fn builder() -> HtsClientBuilder {
        HtsClientBuilder::new()
    }

    /// Client configured from `HTS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        HtsClientBuilder::new()
            .config(ClientConfig::from_env()?)
            .build()
    }
}

impl<C: Connector> HtsClient<C> {
    /// Server host every request connects to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Endpoint table used by [`HtsClient::configure`].
    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    /// Connector that opens each request's connection.
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Resolve port, token and model for `language`. No network I/O.
    pub fn configure(&self, language: &str, model: &str) -> Result<ResolvedEndpoint> {
        self.endpoints.resolve(language, model)
    }

    /// Run one request against `endpoint`.
    ///
    /// In text mode the trimmed transcription is returned and `output` is not
    /// touched. In stream mode the response is written to `output` (created or
    /// truncated). On failure a partially written file is left in place.
    ///
    /// Empty `text` fails before any connection is attempted.
    pub async fn ask_for_service(
        &self,
        endpoint: &ResolvedEndpoint,
        text: &str,
        output: impl AsRef<Path>,
    ) -> Result<SynthesisOutput> {
        let request = SynthesisRequest::new(endpoint, text)?;
        let payload = request.payload();
        let output = output.as_ref();

        let span = info_span!(
            "synthesis",
            language = endpoint.language(),
            model = endpoint.model(),
            port = endpoint.port()
        );
        async move {
            let mut stream = self.connector.connect(&self.host, endpoint.port()).await?;
            debug!(host = %self.host, "connected");
            let result = self
                .exchange(&mut stream, endpoint.mode(), payload, output)
                .await;
            drop(stream);
            debug!("connection closed");
            result
        }
        .instrument(span)
        .await
    }

    async fn exchange<S>(
        &self,
        stream: &mut S,
        mode: ResponseMode,
        payload: Bytes,
        output: &Path,
    ) -> Result<SynthesisOutput>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let sent = payload.len();
        write_frame(stream, payload).await?;
        debug!(payload_bytes = sent, "request frame sent");

        match mode {
            ResponseMode::Text => {
                let text = self.read_text(stream).await?;
                info!(chars = text.chars().count(), "transcription received");
                Ok(SynthesisOutput::Transcription { text })
            }
            ResponseMode::Stream => self.stream_to_file(stream, output).await,
        }
    }

    /// One receive of at most [`RECV_CHUNK_SIZE`] bytes.
    async fn read_text<S>(&self, stream: &mut S) -> Result<String>
    where
        S: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; RECV_CHUNK_SIZE];
        let n = self.recv(stream, &mut buf).await?;
        if n == RECV_CHUNK_SIZE {
            warn!("transcription filled the receive buffer and may be truncated");
        }
        buf.truncate(n);
        let text = String::from_utf8(buf)?;
        Ok(text.trim().to_string())
    }

    async fn stream_to_file<S>(&self, stream: &mut S, output: &Path) -> Result<SynthesisOutput>
    where
        S: AsyncRead + Unpin,
    {
        let path = output.to_path_buf();
        let mut file = File::create(&path)
            .await
            .map_err(|e| Error::file_io(&path, e))?;

        match self.copy_to_file(stream, &mut file, &path).await {
            Ok(bytes_written) => {
                info!(path = %path.display(), bytes_written, "file received complete");
                Ok(SynthesisOutput::Audio {
                    path,
                    bytes_written,
                })
            }
            Err(e) => {
                if let Err(flush_err) = file.flush().await {
                    debug!(error = %flush_err, "failed to flush partial output");
                }
                warn!(path = %path.display(), error = %e, "response interrupted, partial output left in place");
                Err(e)
            }
        }
    }

    async fn copy_to_file<S>(&self, stream: &mut S, file: &mut File, path: &Path) -> Result<u64>
    where
        S: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; RECV_CHUNK_SIZE];
        let mut written = 0u64;
        loop {
            let n = self.recv(stream, &mut buf).await?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])
                .await
                .map_err(|e| Error::file_io(path, e))?;
            written += n as u64;
        }
        // tokio's File completes writes in the background; flush before reporting success.
        file.flush().await.map_err(|e| Error::file_io(path, e))?;
        Ok(written)
    }

    async fn recv<S>(&self, stream: &mut S, buf: &mut [u8]) -> Result<usize>
    where
        S: AsyncRead + Unpin,
    {
        let read = stream.read(buf);
        let result = match self.read_timeout {
            Some(after) => tokio::time::timeout(after, read)
                .await
                .map_err(|_| Error::Timeout {
                    operation: "receiving",
                    after,
                })?,
            None => read.await,
        };
        result.map_err(Error::Reception)
    }
}

/// Builder for [`HtsClient`].
pub struct HtsClientBuilder {
    config: ClientConfig,
    endpoints: Option<EndpointTable>,
}

impl HtsClientBuilder {
    /// Builder with default host, timeouts and the built-in table.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            endpoints: None,
        }
    }

    /// Replace every setting with `config`.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Load the endpoint table from a YAML file at build time.
    pub fn endpoints_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.endpoints_path = Some(path.into());
        self
    }

    /// Use `table` instead of the built-in or file-based table.
    pub fn endpoint_table(mut self, table: EndpointTable) -> Self {
        self.endpoints = Some(table);
        self
    }

    pub fn build(self) -> Result<HtsClient<TcpConnector>> {
        let connector = TcpConnector::new().with_connect_timeout(self.config.connect_timeout);
        self.build_with_connector(connector)
    }

    /// Build around a custom [`Connector`]. The connect timeout is then up to
    /// the connector.
    pub fn build_with_connector<C: Connector>(self, connector: C) -> Result<HtsClient<C>> {
        let host = self.config.host.trim().to_string();
        if host.is_empty() {
            return Err(Error::configuration("Host must not be empty"));
        }
        let endpoints = match self.endpoints {
            Some(table) => table,
            None => self.config.endpoint_table()?,
        };
        Ok(HtsClient {
            connector,
            host,
            read_timeout: self.config.read_timeout,
            endpoints,
        })
    }
}

impl Default for HtsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
