//! Resolved endpoint types.

use serde::Serialize;

/// How the server answers a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// One UTF-8 chunk with the phonetic transcription.
    Text,
    /// Raw audio bytes until the peer closes the connection.
    Stream,
}

impl ResponseMode {
    /// Pinyin languages answer with text, everything else streams audio.
    pub fn for_language(language: &str) -> Self {
        if language.contains("pinyin") {
            Self::Text
        } else {
            Self::Stream
        }
    }
}

/// Immutable result of endpoint resolution, passed to every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEndpoint {
    language: String,
    port: u16,
    token: String,
    model: String,
    mode: ResponseMode,
}

impl ResolvedEndpoint {
    pub fn new(
        language: impl Into<String>,
        port: u16,
        token: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let language = language.into();
        let mode = ResponseMode::for_language(&language);
        Self {
            language,
            port,
            token: token.into(),
            model: model.into(),
            mode,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    /// Same endpoint on another port (local servers, tunnels).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}
