//! Error types
//!
//! Defines domain-specific error types for each module of the file server.

use std::fmt;
use std::io;

/// Wire-level failures on a framed connection.
///
/// Timeout and peer disconnect are not errors at this level; the framing
/// layer reports those as distinct receive outcomes so callers can react
/// to each one differently.
#[derive(Debug)]
pub enum TransportError {
    Io(io::Error),
    /// Outgoing payload does not fit in a u32 length prefix
    PayloadTooLarge(usize),
    /// Declared frame length exceeds the receiver's buffer capacity
    FrameTooLarge { declared: usize, capacity: usize },
    /// Peer closed the connection in the middle of a payload
    TruncatedPayload { expected: usize },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Io(e) => write!(f, "I/O failure: {}", e),
            TransportError::PayloadTooLarge(len) => {
                write!(f, "Payload of {} bytes exceeds frame limit", len)
            }
            TransportError::FrameTooLarge { declared, capacity } => {
                write!(
                    f,
                    "Incoming frame of {} bytes exceeds buffer capacity {}",
                    declared, capacity
                )
            }
            TransportError::TruncatedPayload { expected } => {
                write!(f, "Peer closed mid-frame, expected {} bytes", expected)
            }
        }
    }
}

impl std::error::Error for TransportError {}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        TransportError::Io(error)
    }
}

/// Protocol violations by the peer
#[derive(Debug)]
pub enum ProtocolError {
    InvalidVersion(String),
    InvalidUsername(String),
    InvalidFilename(String),
    InvalidCommand(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidVersion(v) => write!(f, "Invalid protocol version: {}", v),
            ProtocolError::InvalidUsername(u) => write!(f, "Invalid username: {}", u),
            ProtocolError::InvalidFilename(n) => write!(f, "Invalid filename: {}", n),
            ProtocolError::InvalidCommand(c) => write!(f, "Invalid command: {}", c),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    NotFound(String),
    Io(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(name) => write!(f, "File not found: {}", name),
            StorageError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::Io(error)
    }
}

/// General server error that encompasses all error types
#[derive(Debug)]
pub enum ServerError {
    Config(config::ConfigError),
    Transport(TransportError),
    Protocol(ProtocolError),
    Storage(StorageError),
    Io(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::Transport(e) => write!(f, "Transport error: {}", e),
            ServerError::Protocol(e) => write!(f, "Protocol error: {}", e),
            ServerError::Storage(e) => write!(f, "Storage error: {}", e),
            ServerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<TransportError> for ServerError {
    fn from(error: TransportError) -> Self {
        ServerError::Transport(error)
    }
}

impl From<ProtocolError> for ServerError {
    fn from(error: ProtocolError) -> Self {
        ServerError::Protocol(error)
    }
}

impl From<StorageError> for ServerError {
    fn from(error: StorageError) -> Self {
        ServerError::Storage(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::Io(error)
    }
}
