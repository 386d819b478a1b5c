//! TTS（文字转语音）模块：通过 HTS 合成服务的 TCP 协议将文本合成为音频或拼音，
//! 也可经由其 HTTP 接口取得 MP3 音频。

mod client;
mod http;
mod types;

pub use client::{HtsClient, HtsClientBuilder};
pub use http::{
    HttpSynthesisClient, HttpSynthesisClientBuilder, DEFAULT_BASE_URL, DEFAULT_ENDPOINT_PATH,
    DEFAULT_TTS_LANG,
};
pub use types::SynthesisOutput;
