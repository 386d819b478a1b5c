//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use hts_client::{Connector, Error, Result};
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_test::io::Mock;

/// Scripted stream that counts how often it is closed (dropped).
pub struct TrackedStream {
    inner: Mock,
    closes: Arc<AtomicUsize>,
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

impl AsyncRead for TrackedStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for TrackedStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

/// Connector handing out one scripted stream, recording every attempt.
///
/// Without a script, connecting fails with a refused connection.
#[derive(Default)]
pub struct RecordingConnector {
    script: Mutex<Option<Mock>>,
    connects: AtomicUsize,
    closes: Arc<AtomicUsize>,
    last_addr: Mutex<Option<(String, u16)>>,
}

impl RecordingConnector {
    pub fn new(script: Mock) -> Self {
        Self {
            script: Mutex::new(Some(script)),
            ..Self::default()
        }
    }

    pub fn refusing() -> Self {
        Self::default()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn last_addr(&self) -> Option<(String, u16)> {
        self.last_addr.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for RecordingConnector {
    type Stream = TrackedStream;

    async fn connect(&self, host: &str, port: u16) -> Result<TrackedStream> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        *self.last_addr.lock().unwrap() = Some((host.to_string(), port));
        let script = self.script.lock().unwrap().take();
        match script {
            Some(inner) => Ok(TrackedStream {
                inner,
                closes: self.closes.clone(),
            }),
            None => Err(Error::Connection {
                addr: format!("{}:{}", host, port),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            }),
        }
    }
}

/// `[u32 BE len][payload]`, built by hand.
pub fn frame(payload: &str) -> Vec<u8> {
    let mut out = (payload.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(payload.as_bytes());
    out
}
