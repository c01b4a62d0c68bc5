//! Error handling module
//!
//! Contains domain-specific error types for each part of the server.

mod types;

pub use types::{ProtocolError, ServerError, StorageError, TransportError};
