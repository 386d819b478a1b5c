//! Synthesis result types.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a completed request produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SynthesisOutput {
    /// Phonetic transcription returned in text mode, whitespace-trimmed.
    Transcription { text: String },
    /// Audio streamed into `path`.
    Audio { path: PathBuf, bytes_written: u64 },
}

impl SynthesisOutput {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Transcription { text } => Some(text),
            Self::Audio { .. } => None,
        }
    }

    pub fn audio_path(&self) -> Option<&Path> {
        match self {
            Self::Audio { path, .. } => Some(path),
            Self::Transcription { .. } => None,
        }
    }
}
