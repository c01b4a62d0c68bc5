//! Session handshake
//!
//! Greeting, version negotiation, and authentication. Any violation here
//! is session-fatal: the peer gets one status frame explaining the
//! rejection and the connection closes.

use log::info;

use crate::error::{ProtocolError, StorageError, TransportError};
use crate::protocol::framing::RecvOutcome;
use crate::protocol::reply::Reply;
use crate::protocol::version::ProtocolVersion;
use crate::session::Session;
use crate::storage;

/// Why a handshake did not reach the command loop.
#[derive(Debug)]
pub enum HandshakeEnd {
    /// Peer violated the protocol; a rejection frame was already sent
    Rejected(ProtocolError),
    /// Namespace directory could not be created
    Provisioning(StorageError),
    Disconnected,
    TimedOut,
    Transport(TransportError),
}

/// Runs the handshake: greet, negotiate the version, and for `2.0`
/// authenticate the username and provision its namespace.
pub(super) async fn negotiate(session: &mut Session) -> Result<(), HandshakeEnd> {
    session
        .conn
        .send_text(&Reply::Ok.to_wire())
        .await
        .map_err(HandshakeEnd::Transport)?;

    let mut buf = vec![0u8; session.config.command_frame_limit];

    let token = recv_text(session, &mut buf).await?;
    let version = match ProtocolVersion::from_token(token.trim()) {
        Some(version) => version,
        None => {
            let _ = session.conn.send_text(&Reply::invalid_version().to_wire()).await;
            return Err(HandshakeEnd::Rejected(ProtocolError::InvalidVersion(token)));
        }
    };
    session.version = version;
    session
        .conn
        .send_text(&Reply::Ok.to_wire())
        .await
        .map_err(HandshakeEnd::Transport)?;

    if version == ProtocolVersion::Legacy {
        // Legacy clients share the anonymous storage root
        info!("Client {} negotiated version 1.0", session.peer);
        return Ok(());
    }

    let username = recv_text(session, &mut buf).await?;
    if let Err(e) = storage::validate_username(&username) {
        let _ = session.conn.send_text(&Reply::invalid_username().to_wire()).await;
        return Err(HandshakeEnd::Rejected(e));
    }

    let namespace =
        match storage::provision_namespace(&session.config.storage_root_path(), &username) {
            Ok(dir) => dir,
            Err(e) => {
                let _ = session
                    .conn
                    .send_text(&Reply::cannot_create_namespace().to_wire())
                    .await;
                return Err(HandshakeEnd::Provisioning(e));
            }
        };

    session
        .conn
        .send_text(&Reply::Ok.to_wire())
        .await
        .map_err(HandshakeEnd::Transport)?;

    info!("Client {} authenticated as {}", session.peer, username);
    session.username = username;
    session.namespace = namespace;
    Ok(())
}

async fn recv_text(session: &mut Session, buf: &mut [u8]) -> Result<String, HandshakeEnd> {
    match session.conn.recv_frame(buf).await {
        RecvOutcome::Frame(n) => Ok(String::from_utf8_lossy(&buf[..n]).into_owned()),
        RecvOutcome::Disconnected => Err(HandshakeEnd::Disconnected),
        RecvOutcome::TimedOut => Err(HandshakeEnd::TimedOut),
        RecvOutcome::Failed(e) => Err(HandshakeEnd::Transport(e)),
    }
}
