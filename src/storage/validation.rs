//! Name validation
//!
//! Usernames and filenames are validated before any filesystem access;
//! rejection never touches the disk.

use crate::error::ProtocolError;

/// A username must be non-empty and composed solely of ASCII
/// alphanumeric characters.
pub fn validate_username(username: &str) -> Result<(), ProtocolError> {
    if username.is_empty() || !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ProtocolError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

/// A filename must be non-empty, not the literal `.`, and free of path
/// separators so it cannot escape the session namespace.
pub fn validate_filename(filename: &str) -> Result<(), ProtocolError> {
    if filename.is_empty()
        || filename == "."
        || filename.contains('/')
        || filename.contains('\\')
    {
        return Err(ProtocolError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphanumeric_usernames() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("Bob42").is_ok());
        assert!(validate_username("0").is_ok());
    }

    #[test]
    fn rejects_bad_usernames() {
        assert!(validate_username("").is_err());
        assert!(validate_username("a b").is_err());
        assert!(validate_username("a-b").is_err());
        assert!(validate_username("a/b").is_err());
        assert!(validate_username("dot.").is_err());
        assert!(validate_username("émile").is_err());
    }

    #[test]
    fn accepts_plain_filenames() {
        assert!(validate_filename("report.txt").is_ok());
        assert!(validate_filename("archive.tar.gz").is_ok());
        assert!(validate_filename("no extension").is_ok());
    }

    #[test]
    fn rejects_bad_filenames() {
        assert!(validate_filename("").is_err());
        assert!(validate_filename(".").is_err());
        assert!(validate_filename("a/b").is_err());
        assert!(validate_filename("../x").is_err());
        assert!(validate_filename("a\\b").is_err());
        assert!(validate_filename("/etc/passwd").is_err());
    }
}
