//! Command dispatcher
//!
//! Receives one frame per command, validates it, and routes it to the
//! matching handler. Invalid arguments reject only the current command;
//! the loop continues. Transport trouble of any kind ends the session.

use log::{error, info, warn};
use tokio::fs::File;

use crate::error::{StorageError, TransportError};
use crate::protocol::command::{Command, parse_command};
use crate::protocol::framing::RecvOutcome;
use crate::protocol::reply::Reply;
use crate::session::Session;
use crate::storage;
use crate::transfer::{self, TransferError};

/// Whether the session survives the command just handled.
enum Flow {
    Continue,
    End,
}

/// Runs the command loop until EXIT, disconnect, timeout, or failure.
///
/// `Err` means the wire itself failed and no explanation could be
/// delivered to the peer; every other ending is reported in-band first.
pub(super) async fn command_loop(session: &mut Session) -> Result<(), TransportError> {
    let mut buf = vec![0u8; session.config.command_frame_limit];

    loop {
        let raw = match session.conn.recv_frame(&mut buf).await {
            RecvOutcome::Frame(n) => String::from_utf8_lossy(&buf[..n]).into_owned(),
            RecvOutcome::Disconnected => {
                info!("Connection closed by {}", session.peer);
                return Ok(());
            }
            RecvOutcome::TimedOut => {
                warn!("Receive timeout for {}, closing session", session.peer);
                return Ok(());
            }
            RecvOutcome::Failed(e) => return Err(e),
        };

        let command = parse_command(&raw);
        info!("Received from {}: {:?}", session.peer, command);

        // Every recognized action counts, including invalid-argument attempts
        if let Some(action) = command.action() {
            session.stats.record(action);
        }

        if let Some(filename) = command.filename() {
            if storage::validate_filename(filename).is_err() {
                warn!("Rejected filename {:?} from {}", filename, session.peer);
                session
                    .conn
                    .send_text(&Reply::invalid_filename().to_wire())
                    .await?;
                continue;
            }
        }

        let flow = match command {
            Command::Exit => {
                info!("Client {} requested exit", session.peer);
                return Ok(());
            }
            Command::Unknown(_) => {
                session
                    .conn
                    .send_text(&Reply::invalid_command().to_wire())
                    .await?;
                Flow::Continue
            }
            Command::List => handle_list(session).await?,
            Command::Get(filename) => handle_get(session, &filename).await?,
            Command::Put(filename) => handle_put(session, &filename).await?,
            Command::Delete(filename) => handle_delete(session, &filename).await?,
            Command::Info(filename) => handle_info(session, &filename).await?,
        };

        if let Flow::End = flow {
            return Ok(());
        }
    }
}

/// GET: `200 OK`, content frames of chunk size, then a zero-length
/// terminator frame. A missing file gets `404` and no content frames.
async fn handle_get(session: &mut Session, filename: &str) -> Result<Flow, TransportError> {
    let path = session.namespace.join(filename);

    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) => {
            info!("GET {} for {}: {}", filename, session.peer, e);
            session
                .conn
                .send_text(&Reply::missing_file().to_wire())
                .await?;
            return Ok(Flow::Continue);
        }
    };

    session.conn.send_text(&Reply::Ok.to_wire()).await?;

    match transfer::send_file(&mut session.conn, file, session.config.chunk_size).await {
        Ok(bytes) => {
            info!("Sent {} ({} bytes) to {}", filename, bytes, session.peer);
            Ok(Flow::Continue)
        }
        Err(TransferError::Transport(e)) => Err(e),
        Err(e) => {
            // Frames may already be in flight, so no status can explain this
            error!("Download of {} by {} aborted: {}", filename, session.peer, e);
            Ok(Flow::End)
        }
    }
}

/// PUT: `200 OK`, then incoming content frames until the zero-length
/// terminator, then a final `200 OK`. An aborted transfer leaves a
/// partial file behind; there is no rollback.
async fn handle_put(session: &mut Session, filename: &str) -> Result<Flow, TransportError> {
    let path = session.namespace.join(filename);

    let file = match File::create(&path).await {
        Ok(file) => file,
        Err(e) => {
            error!("PUT {} for {}: {}", filename, session.peer, e);
            session
                .conn
                .send_text(&Reply::cannot_create_file().to_wire())
                .await?;
            return Ok(Flow::Continue);
        }
    };

    session.conn.send_text(&Reply::Ok.to_wire()).await?;

    match transfer::receive_file(&mut session.conn, file, session.config.chunk_size).await {
        Ok(bytes) => {
            info!(
                "Stored {} ({} bytes) from {}",
                filename, bytes, session.peer
            );
            session.conn.send_text(&Reply::Ok.to_wire()).await?;
            Ok(Flow::Continue)
        }
        Err(TransferError::Transport(e)) => Err(e),
        Err(e) => {
            error!(
                "Upload of {} by {} aborted, partial file remains: {}",
                filename, session.peer, e
            );
            Ok(Flow::End)
        }
    }
}

/// LIST: regular files only, one frame. An empty namespace yields a
/// distinct `204` so the client can tell "empty" from a transport glitch.
async fn handle_list(session: &mut Session) -> Result<Flow, TransportError> {
    match storage::list_files(&session.namespace) {
        Ok(names) if names.is_empty() => {
            session
                .conn
                .send_text(&Reply::empty_directory().to_wire())
                .await?;
        }
        Ok(names) => {
            session.conn.send_text(&names.join("\n")).await?;
        }
        Err(e) => {
            error!("LIST for {}: {}", session.peer, e);
            session
                .conn
                .send_text(&Reply::cannot_open_directory().to_wire())
                .await?;
        }
    }
    Ok(Flow::Continue)
}

async fn handle_delete(session: &mut Session, filename: &str) -> Result<Flow, TransportError> {
    match storage::delete_file(&session.namespace, filename) {
        Ok(()) => {
            info!("Deleted {} for {}", filename, session.peer);
            session.conn.send_text(&Reply::Ok.to_wire()).await?;
        }
        Err(StorageError::NotFound(_)) => {
            session
                .conn
                .send_text(&Reply::missing_file().to_wire())
                .await?;
        }
        Err(e) => {
            error!("DELETE {} for {}: {}", filename, session.peer, e);
            session
                .conn
                .send_text(&Reply::cannot_delete_file().to_wire())
                .await?;
        }
    }
    Ok(Flow::Continue)
}

async fn handle_info(session: &mut Session, filename: &str) -> Result<Flow, TransportError> {
    match storage::describe_file(&session.namespace, filename) {
        Ok(report) => {
            session.conn.send_text(&report).await?;
        }
        Err(StorageError::NotFound(_)) => {
            session
                .conn
                .send_text(&Reply::missing_file().to_wire())
                .await?;
        }
        Err(e) => {
            error!("INFO {} for {}: {}", filename, session.peer, e);
            session
                .conn
                .send_text(&Reply::cannot_stat_file().to_wire())
                .await?;
        }
    }
    Ok(Flow::Continue)
}
