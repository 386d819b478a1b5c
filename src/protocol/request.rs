//! Request payload composition

use bytes::Bytes;

use super::DELIMITER;
use crate::endpoint::ResolvedEndpoint;
use crate::{Error, ErrorContext, Result};

/// A single synthesis request, borrowed from a resolved endpoint and the caller's text.
///
/// Only [`SynthesisRequest::new`] builds one, so the text is never empty.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisRequest<'a> {
    token: &'a str,
    text: &'a str,
    model: &'a str,
    language: &'a str,
}

impl<'a> SynthesisRequest<'a> {
    /// Build a request for `text` against `endpoint`.
    ///
    /// Fails with a validation error when `text` is empty.
    pub fn new(endpoint: &'a ResolvedEndpoint, text: &'a str) -> Result<Self> {
        if text.is_empty() {
            return Err(Error::validation_with_context(
                "Length of text must be bigger than zero",
                ErrorContext::new()
                    .with_field_path("text")
                    .with_source("synthesis_request"),
            ));
        }
        Ok(Self {
            token: endpoint.token(),
            text,
            model: endpoint.model(),
            language: endpoint.language(),
        })
    }

    /// Channel token.
    pub fn token(&self) -> &'a str {
        self.token
    }

    /// Text to synthesize, never empty.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Model name sent to the server.
    pub fn model(&self) -> &'a str {
        self.model
    }

    /// Language tag sent to the server.
    pub fn language(&self) -> &'a str {
        self.language
    }

    /// UTF-8 payload: `token@@@text@@@model@@@language`.
    pub fn payload(&self) -> Bytes {
        let mut out = String::with_capacity(
            self.token.len()
                + self.text.len()
                + self.model.len()
                + self.language.len()
                + DELIMITER.len() * 3,
        );
        for (i, field) in [self.token, self.text, self.model, self.language]
            .iter()
            .enumerate()
        {
            if i > 0 {
                out.push_str(DELIMITER);
            }
            out.push_str(field);
        }
        Bytes::from(out)
    }
}
