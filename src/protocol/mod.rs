//! Wire protocol module
//!
//! Length-prefixed framing, command parsing, reply serialization, and
//! protocol version negotiation tokens.

pub mod command;
pub mod framing;
pub mod reply;
pub mod version;

pub use command::{Command, parse_command};
pub use framing::{FrameSocket, RecvOutcome};
pub use reply::Reply;
pub use version::ProtocolVersion;
