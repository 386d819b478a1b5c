//! 线路协议层：请求负载拼接与 4 字节大端长度前缀分帧。
//!
//! # Wire Protocol
//!
//! One request per TCP connection:
//!
//! ```text
//! Request:  [4 bytes: u32 BE length N] [N bytes: UTF-8 "<token>@@@<text>@@@<model>@@@<language>"]
//! Response: text mode   -> one UTF-8 chunk of at most 8192 bytes
//!           stream mode -> raw bytes until the peer closes the connection
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`request`] | Request payload composition |
//! | [`frame`] | Length-prefixed framing on top of `LengthDelimitedCodec` |

pub mod frame;
pub mod request;

pub use frame::{encode_frame, frame_codec, write_frame};
pub use request::SynthesisRequest;

/// Field separator inside the request payload.
pub const DELIMITER: &str = "@@@";

/// Size of a single receive from the server.
pub const RECV_CHUNK_SIZE: usize = 8192;

/// Width of the big-endian length prefix.
pub const LENGTH_PREFIX_BYTES: usize = 4;
