//! Session module
//!
//! One `Session` owns one client connection end to end: handshake,
//! authentication, and the command loop. Sessions end on EXIT, peer
//! disconnect, receive timeout, or a fatal protocol/transport failure,
//! and the connection is closed exactly once, on drop.

mod dispatcher;
mod handshake;

use log::{info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpStream;

use crate::config::ServerConfig;
use crate::protocol::framing::FrameSocket;
use crate::protocol::version::ProtocolVersion;
use crate::server::CommandStats;

use handshake::HandshakeEnd;

/// Server-side state for one client connection.
pub struct Session {
    conn: FrameSocket<TcpStream>,
    peer: SocketAddr,
    /// Empty until the handshake authenticates a `2.0` client
    username: String,
    /// Directory all file operations of this session resolve against
    namespace: PathBuf,
    version: ProtocolVersion,
    config: Arc<ServerConfig>,
    stats: Arc<CommandStats>,
}

impl Session {
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        config: Arc<ServerConfig>,
        stats: Arc<CommandStats>,
    ) -> Self {
        let conn = FrameSocket::new(stream, Some(config.recv_timeout()));
        Self {
            conn,
            peer,
            username: String::new(),
            namespace: config.storage_root_path(),
            version: ProtocolVersion::Legacy,
            config,
            stats,
        }
    }

    /// Drives the session from greeting to close.
    pub async fn run(mut self) {
        info!("Client connected: {}", self.peer);

        match handshake::negotiate(&mut self).await {
            Ok(()) => {
                info!(
                    "Session {} entering command loop (version {})",
                    self.peer,
                    self.version.token()
                );
                if let Err(e) = dispatcher::command_loop(&mut self).await {
                    warn!("Session {} ended on transport failure: {}", self.peer, e);
                }
            }
            Err(HandshakeEnd::Rejected(e)) => {
                warn!("Handshake with {} rejected: {}", self.peer, e);
            }
            Err(HandshakeEnd::Provisioning(e)) => {
                warn!("Failed to provision namespace for {}: {}", self.peer, e);
            }
            Err(HandshakeEnd::Disconnected) => {
                info!("Client {} disconnected during handshake", self.peer);
            }
            Err(HandshakeEnd::TimedOut) => {
                warn!("Handshake with {} timed out", self.peer);
            }
            Err(HandshakeEnd::Transport(e)) => {
                warn!("Handshake with {} failed: {}", self.peer, e);
            }
        }

        if self.username.is_empty() {
            info!("Client disconnected: {}", self.peer);
        } else {
            info!("Client {} disconnected: {}", self.username, self.peer);
        }
    }
}
