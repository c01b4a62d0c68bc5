//! Transfer module
//!
//! Chunked file streaming over framed connections, shared by the server
//! handlers and the protocol client.

mod operations;

pub use operations::{TransferError, receive_file, send_file};
