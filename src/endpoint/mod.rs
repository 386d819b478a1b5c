//! 端点选择：按语言/方言解析服务端口、令牌与合成模型。
//!
//! Endpoint selection: maps a language identifier to the server channel
//! (port and token) and the synthesis model to request.
//!
//! | Language | Port | Model |
//! |----------|------|-------|
//! | `chinese` | 10015 | always `M60` |
//! | `taiwanese`, `tailuo` | 10011 | caller's model |
//! | `taiwanese_sandhi`, `tailuo_sandhi` | 10012 | caller's model |
//! | anything containing `hakka` | 10010 | caller's model |
//!
//! Languages containing `pinyin` are answered with a text transcription
//! instead of audio; see [`ResponseMode`].

mod table;
mod types;

pub use table::{EndpointEntry, EndpointTable, LanguageMatch};
pub use types::{ResolvedEndpoint, ResponseMode};

/// Resolve `language` against the built-in table.
pub fn configure(language: &str, model: &str) -> crate::Result<ResolvedEndpoint> {
    EndpointTable::builtin().resolve(language, model)
}
