//! HTTP synthesis backend.
//!
//! The web front end of the HTS service exposes a JSON endpoint that takes the
//! romanized text and returns base64-encoded MP3 audio in a `result` field.
//! Unlike the TCP channels there is no per-language port or token; the dialect
//! is chosen by `tts_lang`.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, info_span, Instrument};

use super::types::SynthesisOutput;
use crate::{Error, ErrorContext, Result};

pub const DEFAULT_BASE_URL: &str = "https://dev.taigiedu.com";
pub const DEFAULT_ENDPOINT_PATH: &str = "/backend/synthesize_speech";
/// Taiwanese (Tâi-lô) voice.
pub const DEFAULT_TTS_LANG: &str = "tb";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    tts_lang: &'a str,
    tts_data: &'a str,
}

#[derive(Debug, Deserialize)]
struct SpeechResponse {
    #[serde(default)]
    result: Option<String>,
}

/// Client for the JSON synthesis endpoint.
pub struct HttpSynthesisClient {
    http_client: reqwest::Client,
    endpoint: String,
    tts_lang: String,
    timeout: Duration,
}

impl HttpSynthesisClient {
    /// Start building an HTTP-backed client.
    pub fn builder() -> HttpSynthesisClientBuilder {
        HttpSynthesisClientBuilder::new()
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Voice selector sent as `tts_lang`.
    pub fn tts_lang(&self) -> &str {
        &self.tts_lang
    }

    /// Synthesize `text` and return the decoded MP3 bytes.
    ///
    /// Empty `text` fails before any request is made.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        if text.is_empty() {
            return Err(Error::validation_with_context(
                "Length of text must be bigger than zero",
                ErrorContext::new()
                    .with_field_path("text")
                    .with_source("http_backend"),
            ));
        }
        let body = SpeechRequest {
            tts_lang: &self.tts_lang,
            tts_data: text,
        };

        let span = info_span!("http_synthesis", tts_lang = %self.tts_lang);
        async move {
            let response = self
                .http_client
                .post(&self.endpoint)
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| self.request_error(e))?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(|e| self.request_error(e))?;
            debug!(%status, body_bytes = bytes.len(), "response received");

            if !status.is_success() {
                return Err(Error::api_with_context(
                    format!("HTTP {}: {}", status, String::from_utf8_lossy(&bytes)),
                    ErrorContext::new().with_source("http_backend"),
                ));
            }
            let audio = decode_audio(&bytes)?;
            info!(audio_bytes = audio.len(), "audio received");
            Ok(audio)
        }
        .instrument(span)
        .await
    }

    /// Synthesize `text` and write the MP3 audio to `output` (created or truncated).
    pub async fn synthesize_to_file(
        &self,
        text: &str,
        output: impl AsRef<Path>,
    ) -> Result<SynthesisOutput> {
        let audio = self.synthesize(text).await?;
        let path = output.as_ref().to_path_buf();
        tokio::fs::write(&path, &audio)
            .await
            .map_err(|e| Error::file_io(&path, e))?;
        info!(path = %path.display(), bytes_written = audio.len(), "file received complete");
        Ok(SynthesisOutput::Audio {
            path,
            bytes_written: audio.len() as u64,
        })
    }

    fn request_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            return Error::Timeout {
                operation: "waiting for the HTTP backend",
                after: self.timeout,
            };
        }
        Error::network_with_context(
            format!("Synthesis request failed: {}", e),
            ErrorContext::new()
                .with_details(self.endpoint.clone())
                .with_source("http_backend"),
        )
    }
}

/// Pull the base64 `result` out of a response body and decode it.
fn decode_audio(body: &[u8]) -> Result<Vec<u8>> {
    let parsed: SpeechResponse = serde_json::from_slice(body).map_err(|e| {
        Error::api_with_context(
            format!("Response is not valid JSON: {}", e),
            ErrorContext::new().with_source("http_backend"),
        )
    })?;
    let encoded = parsed
        .result
        .filter(|r| !r.is_empty())
        .ok_or_else(|| {
            Error::api_with_context(
                "Response carries no audio",
                ErrorContext::new()
                    .with_field_path("result")
                    .with_source("http_backend"),
            )
        })?;
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| {
            Error::api_with_context(
                format!("Audio is not valid base64: {}", e),
                ErrorContext::new()
                    .with_field_path("result")
                    .with_source("http_backend"),
            )
        })
}

/// Builder for [`HttpSynthesisClient`].
pub struct HttpSynthesisClientBuilder {
    base_url: Option<String>,
    endpoint_path: Option<String>,
    tts_lang: Option<String>,
    timeout: Duration,
}

impl HttpSynthesisClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            endpoint_path: None,
            tts_lang: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn endpoint_path(mut self, path: impl Into<String>) -> Self {
        self.endpoint_path = Some(path.into());
        self
    }

    pub fn tts_lang(mut self, lang: impl Into<String>) -> Self {
        self.tts_lang = Some(lang.into());
        self
    }

    /// Whole-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpSynthesisClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if base_url.trim().is_empty() {
            return Err(Error::configuration("Base URL must not be empty"));
        }
        let endpoint_path = self
            .endpoint_path
            .unwrap_or_else(|| DEFAULT_ENDPOINT_PATH.to_string());
        let endpoint_path = if endpoint_path.starts_with('/') {
            endpoint_path
        } else {
            format!("/{}", endpoint_path)
        };
        let tts_lang = self
            .tts_lang
            .unwrap_or_else(|| DEFAULT_TTS_LANG.to_string());
        if tts_lang.is_empty() {
            return Err(Error::configuration_with_context(
                "tts_lang must not be empty",
                ErrorContext::new().with_field_path("tts_lang"),
            ));
        }
        let http_client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(HttpSynthesisClient {
            http_client,
            endpoint: format!("{}{}", base_url.trim().trim_end_matches('/'), endpoint_path),
            tts_lang,
            timeout: self.timeout,
        })
    }
}

impl Default for HttpSynthesisClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
