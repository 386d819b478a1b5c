//! # hts-client
//!
//! 国台客语 HTS 语音合成服务的客户端：按语言选择端口与令牌，发送长度前缀请求帧，
//! 并将返回的音频写入文件（或返回拼音文本）。
//!
//! Client for the HTS speech synthesis service. A request selects a server
//! channel by language/dialect, sends one length-prefixed frame over TCP, and
//! either streams the returned audio into a file or returns the phonetic
//! transcription as text.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hts_client::HtsClient;
//!
//! #[tokio::main]
//! async fn main() -> hts_client::Result<()> {
//!     let client = HtsClient::builder().build()?;
//!     let endpoint = client.configure("taiwanese", "M10")?;
//!     let output = client
//!         .ask_for_service(&endpoint, "gua2 kin1-a2-jit8 kho2-tshi3", "output.wav")
//!         .await?;
//!     println!("{:?}", output);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`endpoint`] | Language to port/token/model resolution |
//! | [`protocol`] | Request payload and length-prefixed framing |
//! | [`transport`] | Connection seam and TCP connector |
//! | [`tts`] | The TCP synthesis client and the HTTP backend |
//! | [`config`] | Host, timeouts and endpoint table source |

pub mod config;
pub mod endpoint;
pub mod protocol;
pub mod transport;
pub mod tts;

pub use config::ClientConfig;
pub use endpoint::{configure, EndpointTable, ResolvedEndpoint, ResponseMode};
pub use transport::{Connector, TcpConnector};
pub use tts::{
    HtsClient, HtsClientBuilder, HttpSynthesisClient, HttpSynthesisClientBuilder, SynthesisOutput,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ErrorKind};
