//! Protocol client
//!
//! Mirrors the server's wire exchanges: sender role for PUT, receiver role
//! for GET, one status frame per command otherwise. Interactive menus and
//! input parsing live outside this crate; this is the protocol engine
//! only.

use log::info;
use std::fmt;
use std::io;
use std::path::Path;
use std::time::Duration;

use tokio::fs::File;
use tokio::net::TcpStream;

use crate::error::TransportError;
use crate::protocol::framing::{FrameSocket, RecvOutcome};
use crate::protocol::reply::{self, WIRE_OK};
use crate::protocol::version::ProtocolVersion;
use crate::transfer::{self, TransferError};

const FRAME_LIMIT: usize = 512;
const CHUNK_SIZE: usize = 1024;

/// Client-side failures
#[derive(Debug)]
pub enum ClientError {
    /// The server answered with a non-OK status line
    Refused(String),
    Transport(TransportError),
    Disconnected,
    TimedOut,
    File(io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Refused(status) => write!(f, "Server refused: {}", status),
            ClientError::Transport(e) => write!(f, "Transport error: {}", e),
            ClientError::Disconnected => write!(f, "Server closed the connection"),
            ClientError::TimedOut => write!(f, "No response from server"),
            ClientError::File(e) => write!(f, "Local file error: {}", e),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<TransportError> for ClientError {
    fn from(error: TransportError) -> Self {
        ClientError::Transport(error)
    }
}

impl From<TransferError> for ClientError {
    fn from(error: TransferError) -> Self {
        match error {
            TransferError::Transport(e) => ClientError::Transport(e),
            TransferError::TimedOut => ClientError::TimedOut,
            TransferError::Disconnected => ClientError::Disconnected,
            TransferError::File(e) => ClientError::File(e),
        }
    }
}

/// One connected, version-negotiated client session.
pub struct Client {
    conn: FrameSocket<TcpStream>,
    buf: Vec<u8>,
}

impl Client {
    /// Connects and negotiates the protocol version. For `2.0` the caller
    /// must [`login`](Self::login) before issuing commands.
    pub async fn connect(
        addr: &str,
        version: ProtocolVersion,
        recv_timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ClientError::Transport(TransportError::Io(e)))?;

        let mut client = Self {
            conn: FrameSocket::new(stream, recv_timeout),
            buf: vec![0u8; FRAME_LIMIT],
        };

        // Greeting is 200 OK, or 503 when the server is at capacity
        client.expect_ok().await?;

        client.conn.send_text(version.token()).await?;
        client.expect_ok().await?;

        info!("Connected to {} (version {})", addr, version.token());
        Ok(client)
    }

    /// Sends the username frame (version `2.0` only).
    pub async fn login(&mut self, username: &str) -> Result<(), ClientError> {
        self.conn.send_text(username).await?;
        self.expect_ok().await
    }

    /// LIST: names of the files in the session namespace.
    pub async fn list(&mut self) -> Result<Vec<String>, ClientError> {
        self.conn.send_text("LIST").await?;
        let text = self.recv_text().await?;

        match reply::parse_status(&text) {
            Some((204, _)) => Ok(Vec::new()),
            Some(_) => Err(ClientError::Refused(text)),
            None => Ok(text.lines().map(str::to_string).collect()),
        }
    }

    /// GET: downloads a remote file into `dest`. Returns the byte count.
    pub async fn get(&mut self, filename: &str, dest: &Path) -> Result<u64, ClientError> {
        self.conn.send_text(&format!("GET {}", filename)).await?;
        self.expect_ok().await?;

        let file = File::create(dest).await.map_err(ClientError::File)?;
        let bytes = transfer::receive_file(&mut self.conn, file, CHUNK_SIZE).await?;
        info!("Downloaded {} ({} bytes)", filename, bytes);
        Ok(bytes)
    }

    /// PUT: uploads a local file under the given remote name. Returns the
    /// byte count.
    pub async fn put(&mut self, src: &Path, filename: &str) -> Result<u64, ClientError> {
        let file = File::open(src).await.map_err(ClientError::File)?;

        self.conn.send_text(&format!("PUT {}", filename)).await?;
        self.expect_ok().await?;

        let bytes = transfer::send_file(&mut self.conn, file, CHUNK_SIZE).await?;
        self.expect_ok().await?;
        info!("Uploaded {} ({} bytes)", filename, bytes);
        Ok(bytes)
    }

    /// DELETE: removes a remote file.
    pub async fn delete(&mut self, filename: &str) -> Result<(), ClientError> {
        let status = self.request(&format!("DELETE {}", filename)).await?;
        if status == WIRE_OK {
            Ok(())
        } else {
            Err(ClientError::Refused(status))
        }
    }

    /// INFO: metadata report for a remote file.
    pub async fn info(&mut self, filename: &str) -> Result<String, ClientError> {
        let text = self.request(&format!("INFO {}", filename)).await?;
        match reply::parse_status(&text) {
            Some(_) => Err(ClientError::Refused(text)),
            None => Ok(text),
        }
    }

    /// EXIT: ends the session. The server sends no reply; both sides
    /// close.
    pub async fn exit(mut self) -> Result<(), ClientError> {
        self.conn.send_text("EXIT").await?;
        Ok(())
    }

    /// Sends one raw command frame and returns the single reply frame.
    pub async fn request(&mut self, line: &str) -> Result<String, ClientError> {
        self.conn.send_text(line).await?;
        self.recv_text().await
    }

    async fn recv_text(&mut self) -> Result<String, ClientError> {
        match self.conn.recv_frame(&mut self.buf).await {
            RecvOutcome::Frame(n) => Ok(String::from_utf8_lossy(&self.buf[..n]).into_owned()),
            RecvOutcome::Disconnected => Err(ClientError::Disconnected),
            RecvOutcome::TimedOut => Err(ClientError::TimedOut),
            RecvOutcome::Failed(e) => Err(ClientError::Transport(e)),
        }
    }

    async fn expect_ok(&mut self) -> Result<(), ClientError> {
        let text = self.recv_text().await?;
        if text == WIRE_OK {
            Ok(())
        } else {
            Err(ClientError::Refused(text))
        }
    }
}
