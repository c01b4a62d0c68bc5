//! Listener core
//!
//! Accepts connections serially, applies admission control before any
//! handshake frame is exchanged, and hands each admitted connection to a
//! session task that owns it end to end.

use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::protocol::framing::FrameSocket;
use crate::protocol::reply::Reply;
use crate::server::stats::CommandStats;
use crate::session::Session;

pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
    stats: Arc<CommandStats>,
    admission: Arc<Semaphore>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

/// Requests server shutdown from outside the accept loop.
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

impl Server {
    /// Binds the listening socket and provisions the storage root.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;

        let addr = config.listen_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!("Server bound to {}", addr);

        tokio::fs::create_dir_all(config.storage_root_path()).await?;
        info!("Storage root: {}", config.storage_root);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            listener,
            admission: Arc::new(Semaphore::new(config.max_sessions)),
            config: Arc::new(config),
            stats: Arc::new(CommandStats::default()),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Address the listener actually bound to (relevant with port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared command counters, for diagnostics and reporting.
    pub fn stats(&self) -> Arc<CommandStats> {
        Arc::clone(&self.stats)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    /// Runs the accept loop until shutdown, then waits for every in-flight
    /// session before returning.
    pub async fn run(self) {
        info!(
            "Accepting connections (max {} concurrent sessions)",
            self.config.max_sessions
        );

        let mut sessions = JoinSet::new();
        let mut shutdown_rx = self.shutdown_rx.clone();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown requested, no longer accepting connections");
                        break;
                    }
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => self.dispatch(stream, peer, &mut sessions).await,
                        Err(e) => error!("Error accepting connection: {}", e),
                    }
                }
            }

            // Reap finished session tasks without blocking the accept loop
            while let Some(finished) = sessions.try_join_next() {
                if let Err(e) = finished {
                    error!("Session task failed: {}", e);
                }
            }
        }

        if !sessions.is_empty() {
            info!("Waiting for {} in-flight session(s)", sessions.len());
        }
        while let Some(finished) = sessions.join_next().await {
            if let Err(e) = finished {
                error!("Session task failed: {}", e);
            }
        }

        for (action, count) in self.stats.snapshot() {
            info!("Handled {} {} command(s)", count, action);
        }
        info!("Server stopped");
    }

    /// Admission control happens here, on the accepting task: a connection
    /// beyond capacity is refused immediately, before any handshake frame
    /// is read from it.
    async fn dispatch(
        &self,
        stream: tokio::net::TcpStream,
        peer: SocketAddr,
        sessions: &mut JoinSet<()>,
    ) {
        let permit = match Arc::clone(&self.admission).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Refusing {}: server at capacity", peer);
                let mut conn = FrameSocket::new(stream, None);
                if let Err(e) = conn.send_text(&Reply::at_capacity().to_wire()).await {
                    warn!("Failed to notify {} of refusal: {}", peer, e);
                }
                return;
            }
        };

        let session = Session::new(
            stream,
            peer,
            Arc::clone(&self.config),
            Arc::clone(&self.stats),
        );
        sessions.spawn(async move {
            session.run().await;
            drop(permit);
        });
    }
}
