//! Length-prefixed framing.
//!
//! The server expects a 4-byte big-endian byte count followed by the payload.
//! `LengthDelimitedCodec` already speaks that format; it only needs its frame
//! limit raised to the full `u32` range.

use bytes::{Bytes, BytesMut};
use futures::SinkExt;
use tokio::io::AsyncWrite;
use tokio_util::codec::{Encoder, FramedWrite, LengthDelimitedCodec};

use super::LENGTH_PREFIX_BYTES;
use crate::{Error, ErrorContext, Result};

const MAX_PAYLOAD_LEN: usize = u32::MAX as usize;

/// Codec producing `[u32 BE len][payload]` frames.
pub fn frame_codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(LENGTH_PREFIX_BYTES)
        .big_endian()
        .max_frame_length(MAX_PAYLOAD_LEN)
        .new_codec()
}

fn check_len(payload: &Bytes) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(Error::validation_with_context(
            "Request payload does not fit a 32-bit length prefix",
            ErrorContext::new()
                .with_details(format!("{} bytes", payload.len()))
                .with_source("frame"),
        ));
    }
    Ok(())
}

/// Encode `payload` into a complete wire frame.
pub fn encode_frame(payload: Bytes) -> Result<BytesMut> {
    check_len(&payload)?;
    let mut dst = BytesMut::with_capacity(LENGTH_PREFIX_BYTES + payload.len());
    frame_codec().encode(payload, &mut dst).map_err(|e| {
        Error::validation_with_context(
            format!("Failed to encode request frame: {}", e),
            ErrorContext::new().with_source("frame"),
        )
    })?;
    Ok(dst)
}

/// Write one frame to `writer` and flush it.
///
/// Returns only after every byte has been handed to the writer.
pub async fn write_frame<W>(writer: &mut W, payload: Bytes) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    check_len(&payload)?;
    let mut framed = FramedWrite::new(writer, frame_codec());
    framed.send(payload).await.map_err(Error::Transmission)
}
