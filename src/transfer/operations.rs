//! Module `transfer::operations`
//!
//! Streams file content as a sequence of fixed-size frames ending with one
//! zero-length terminator frame. The same two functions serve both sides
//! of the wire: the server streams for GET and receives for PUT, the
//! client does the reverse.
//!
//! There is no integrity check beyond framing and no resumption: an
//! aborted transfer leaves a partial file behind, by design.

use std::fmt;
use std::io;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::TransportError;
use crate::protocol::framing::{FrameSocket, RecvOutcome};

/// Why a streaming transfer stopped before the terminator frame.
#[derive(Debug)]
pub enum TransferError {
    Transport(TransportError),
    TimedOut,
    Disconnected,
    File(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Transport(e) => write!(f, "transport failure: {}", e),
            TransferError::TimedOut => write!(f, "receive timeout expired mid-stream"),
            TransferError::Disconnected => write!(f, "peer disconnected mid-stream"),
            TransferError::File(e) => write!(f, "file I/O failure: {}", e),
        }
    }
}

impl std::error::Error for TransferError {}

/// Streams `file` over `conn` in frames of at most `chunk_size` bytes,
/// then sends the zero-length terminator frame. Returns the number of
/// content bytes sent.
pub async fn send_file<S>(
    conn: &mut FrameSocket<S>,
    mut file: File,
    chunk_size: usize,
) -> Result<u64, TransferError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; chunk_size];
    let mut total = 0u64;

    loop {
        let n = file.read(&mut buf).await.map_err(TransferError::File)?;
        if n == 0 {
            break;
        }
        conn.send_frame(&buf[..n])
            .await
            .map_err(TransferError::Transport)?;
        total += n as u64;
    }

    conn.send_frame(&[])
        .await
        .map_err(TransferError::Transport)?;
    Ok(total)
}

/// Receives content frames into `file` until the zero-length terminator
/// arrives. Returns the number of content bytes written.
///
/// On any error the destination is left partially written; callers decide
/// whether the connection is still usable (it is not, except for a file
/// write failure that interrupts an otherwise healthy stream).
pub async fn receive_file<S>(
    conn: &mut FrameSocket<S>,
    mut file: File,
    chunk_size: usize,
) -> Result<u64, TransferError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; chunk_size];
    let mut total = 0u64;

    loop {
        match conn.recv_frame(&mut buf).await {
            RecvOutcome::Frame(0) => {
                file.flush().await.map_err(TransferError::File)?;
                return Ok(total);
            }
            RecvOutcome::Frame(n) => {
                file.write_all(&buf[..n])
                    .await
                    .map_err(TransferError::File)?;
                total += n as u64;
            }
            RecvOutcome::Disconnected => {
                let _ = file.flush().await;
                return Err(TransferError::Disconnected);
            }
            RecvOutcome::TimedOut => {
                let _ = file.flush().await;
                return Err(TransferError::TimedOut);
            }
            RecvOutcome::Failed(e) => {
                let _ = file.flush().await;
                return Err(TransferError::Transport(e));
            }
        }
    }
}
