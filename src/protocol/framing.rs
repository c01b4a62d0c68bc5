//! Module `framing`
//!
//! Turns a raw connected byte stream into discrete length-prefixed
//! messages. Every frame on the wire is a big-endian `u32` length followed
//! by that many payload bytes. A zero-length frame is a legitimate,
//! distinct message used as an end-of-stream terminator during file
//! transfers.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::error::TransportError;

/// Size of the length prefix preceding every payload.
pub const PREFIX_LEN: usize = 4;

/// Outcome of one receive operation.
///
/// The four cases are never conflated; callers must branch on each one.
/// Timeout is not a disconnect, and a disconnect is not a generic
/// transport failure.
#[derive(Debug)]
pub enum RecvOutcome {
    /// A complete frame arrived; the payload occupies `buf[..n]` (n may be 0)
    Frame(usize),
    /// Peer closed the connection before a complete length prefix arrived
    Disconnected,
    /// The receive timeout expired before a complete frame arrived
    TimedOut,
    /// I/O failure, oversized frame, or peer closure mid-payload
    Failed(TransportError),
}

enum ReadStatus {
    Done,
    Eof,
    TimedOut,
    Error(io::Error),
}

/// A connected stream with frame-oriented send and receive.
///
/// Generic over the underlying stream so the framing logic can be tested
/// against in-memory duplex pipes as well as TCP sockets.
pub struct FrameSocket<S> {
    stream: S,
    recv_timeout: Option<Duration>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> FrameSocket<S> {
    pub fn new(stream: S, recv_timeout: Option<Duration>) -> Self {
        Self {
            stream,
            recv_timeout,
        }
    }

    /// Writes one frame: the 4-byte length prefix, then the payload.
    ///
    /// Fails if either part cannot be written in full.
    pub async fn send_frame(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if payload.len() > u32::MAX as usize {
            return Err(TransportError::PayloadTooLarge(payload.len()));
        }

        let prefix = (payload.len() as u32).to_be_bytes();
        self.stream.write_all(&prefix).await?;
        if !payload.is_empty() {
            self.stream.write_all(payload).await?;
        }
        self.stream.flush().await?;
        Ok(())
    }

    /// Sends a text payload as a single frame.
    pub async fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        self.send_frame(text.as_bytes()).await
    }

    /// Reads one frame into `buf`, bounded by the receive timeout.
    ///
    /// A declared length larger than `buf.len()` yields
    /// `Failed(FrameTooLarge)` and the payload is NOT consumed: the stream
    /// is desynchronized from that point on, so callers must treat the
    /// outcome as fatal for the connection rather than retry the read.
    pub async fn recv_frame(&mut self, buf: &mut [u8]) -> RecvOutcome {
        let mut prefix = [0u8; PREFIX_LEN];
        match self.read_full(&mut prefix).await {
            ReadStatus::Done => {}
            ReadStatus::Eof => return RecvOutcome::Disconnected,
            ReadStatus::TimedOut => return RecvOutcome::TimedOut,
            ReadStatus::Error(e) => return RecvOutcome::Failed(TransportError::Io(e)),
        }

        let declared = u32::from_be_bytes(prefix) as usize;
        if declared > buf.len() {
            return RecvOutcome::Failed(TransportError::FrameTooLarge {
                declared,
                capacity: buf.len(),
            });
        }
        if declared == 0 {
            return RecvOutcome::Frame(0);
        }

        match self.read_full(&mut buf[..declared]).await {
            ReadStatus::Done => RecvOutcome::Frame(declared),
            ReadStatus::Eof => {
                RecvOutcome::Failed(TransportError::TruncatedPayload { expected: declared })
            }
            ReadStatus::TimedOut => RecvOutcome::TimedOut,
            ReadStatus::Error(e) => RecvOutcome::Failed(TransportError::Io(e)),
        }
    }

    async fn read_full(&mut self, buf: &mut [u8]) -> ReadStatus {
        let limit = self.recv_timeout;
        let read = self.stream.read_exact(buf);

        let result = match limit {
            Some(limit) => match timeout(limit, read).await {
                Ok(result) => result,
                Err(_) => return ReadStatus::TimedOut,
            },
            None => read.await,
        };

        match result {
            Ok(_) => ReadStatus::Done,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => ReadStatus::Eof,
            Err(e) => ReadStatus::Error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(recv_timeout: Option<Duration>) -> (
        FrameSocket<tokio::io::DuplexStream>,
        FrameSocket<tokio::io::DuplexStream>,
    ) {
        let (a, b) = tokio::io::duplex(8192);
        (
            FrameSocket::new(a, recv_timeout),
            FrameSocket::new(b, recv_timeout),
        )
    }

    #[tokio::test]
    async fn frame_round_trip() {
        let (mut tx, mut rx) = pair(None);
        tx.send_frame(b"hello, frame").await.unwrap();

        let mut buf = [0u8; 64];
        match rx.recv_frame(&mut buf).await {
            RecvOutcome::Frame(n) => assert_eq!(&buf[..n], b"hello, frame"),
            other => panic!("expected frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn zero_length_frame_is_distinct() {
        let (mut tx, mut rx) = pair(None);
        tx.send_frame(b"").await.unwrap();
        tx.send_frame(b"after").await.unwrap();

        let mut buf = [0u8; 64];
        match rx.recv_frame(&mut buf).await {
            RecvOutcome::Frame(0) => {}
            other => panic!("expected empty frame, got {:?}", other),
        }
        match rx.recv_frame(&mut buf).await {
            RecvOutcome::Frame(n) => assert_eq!(&buf[..n], b"after"),
            other => panic!("expected frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn oversized_frame_is_rejected_without_partial_delivery() {
        let (mut tx, mut rx) = pair(None);
        tx.send_frame(&[7u8; 100]).await.unwrap();

        let mut buf = [0u8; 16];
        match rx.recv_frame(&mut buf).await {
            RecvOutcome::Failed(TransportError::FrameTooLarge { declared, capacity }) => {
                assert_eq!(declared, 100);
                assert_eq!(capacity, 16);
            }
            other => panic!("expected oversize failure, got {:?}", other),
        }
        assert!(buf.iter().all(|&b| b == 0), "no partial payload delivered");
    }

    #[tokio::test]
    async fn peer_close_before_prefix_is_disconnect() {
        let (tx, mut rx) = pair(None);
        drop(tx);

        let mut buf = [0u8; 16];
        match rx.recv_frame(&mut buf).await {
            RecvOutcome::Disconnected => {}
            other => panic!("expected disconnect, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn silence_expires_as_timeout() {
        let (tx, mut rx) = pair(Some(Duration::from_millis(50)));

        let mut buf = [0u8; 16];
        let outcome = rx.recv_frame(&mut buf).await;
        match outcome {
            RecvOutcome::TimedOut => {}
            other => panic!("expected timeout, got {:?}", other),
        }
        drop(tx);
    }
}
