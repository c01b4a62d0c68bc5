//! Reply handling
//!
//! Outcomes are a closed set of tagged results; the numeric status line is
//! produced only here, at the protocol boundary. Internal logic never
//! string-matches status prefixes.

/// Wire form of a plain success reply.
pub const WIRE_OK: &str = "200 OK";

/// A status reply sent to the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok,
    NoContent(&'static str),
    BadRequest(&'static str),
    NotFound(&'static str),
    ServerError(&'static str),
    Unavailable(&'static str),
}

impl Reply {
    pub fn empty_directory() -> Self {
        Reply::NoContent("The directory is empty.")
    }

    pub fn invalid_version() -> Self {
        Reply::BadRequest("Invalid version.")
    }

    pub fn invalid_username() -> Self {
        Reply::BadRequest("Invalid username.")
    }

    pub fn invalid_filename() -> Self {
        Reply::BadRequest("Invalid filename.")
    }

    pub fn invalid_command() -> Self {
        Reply::BadRequest("Invalid command.")
    }

    pub fn missing_file() -> Self {
        Reply::NotFound("File does not exist.")
    }

    pub fn cannot_create_file() -> Self {
        Reply::ServerError("Unable to create file.")
    }

    pub fn cannot_delete_file() -> Self {
        Reply::ServerError("Unable to delete file.")
    }

    pub fn cannot_stat_file() -> Self {
        Reply::ServerError("Unable to retrieve file info.")
    }

    pub fn cannot_open_directory() -> Self {
        Reply::ServerError("Failed to open directory.")
    }

    pub fn cannot_create_namespace() -> Self {
        Reply::ServerError("Unable to create client folder.")
    }

    pub fn at_capacity() -> Self {
        Reply::Unavailable("Server is at capacity. Try again later.")
    }

    /// Serialize to the wire status line.
    pub fn to_wire(&self) -> String {
        match self {
            Reply::Ok => WIRE_OK.to_string(),
            Reply::NoContent(detail) => format!("204 NO CONTENT: {}", detail),
            Reply::BadRequest(detail) => format!("400 BAD REQUEST: {}", detail),
            Reply::NotFound(detail) => format!("404 NOT FOUND: {}", detail),
            Reply::ServerError(detail) => format!("500 SERVER ERROR: {}", detail),
            Reply::Unavailable(detail) => format!("503 SERVICE UNAVAILABLE: {}", detail),
        }
    }
}

/// Split a received frame into a numeric status code and detail text.
///
/// Returns `None` when the frame does not start with a three-digit code,
/// which lets clients tell status lines apart from raw payloads such as
/// directory listings or file metadata reports.
pub fn parse_status(text: &str) -> Option<(u16, &str)> {
    let (head, rest) = text.split_once(' ')?;
    if head.len() != 3 || !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let code = head.parse::<u16>().ok()?;
    Some((code, rest))
}
