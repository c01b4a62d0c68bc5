//! Storage operations
//!
//! Filesystem operations for namespace provisioning, LIST, INFO, and
//! DELETE. All paths resolve against a session's namespace directory.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::StorageError;

/// Creates the namespace directory for a username if it does not exist.
///
/// Idempotent: an existing directory is reused untouched, so files survive
/// across sessions of the same user.
pub fn provision_namespace(root: &Path, username: &str) -> Result<PathBuf, StorageError> {
    let dir = root.join(username);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Names of the regular files in a namespace, sorted. Subdirectories
/// are excluded.
pub fn list_files(dir: &Path) -> Result<Vec<String>, StorageError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Removes one file from a namespace.
pub fn delete_file(dir: &Path, filename: &str) -> Result<(), StorageError> {
    let path = dir.join(filename);
    fs::remove_file(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound(filename.to_string()),
        _ => StorageError::Io(e),
    })
}

/// Builds the INFO report for one file: size, timestamps, and an
/// owner/group/other permission rendering.
pub fn describe_file(dir: &Path, filename: &str) -> Result<String, StorageError> {
    let path = dir.join(filename);
    let meta = fs::metadata(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound(filename.to_string()),
        _ => StorageError::Io(e),
    })?;

    let mut report = String::new();
    let _ = writeln!(report, "Size: {} bytes", meta.len());
    let _ = writeln!(report, "Last Modified: {}", epoch_seconds(meta.modified()));
    let _ = writeln!(report, "Last Accessed: {}", epoch_seconds(meta.accessed()));
    let _ = writeln!(report, "Creation Time: {}", epoch_seconds(meta.created()));
    let _ = write!(report, "Permissions: {}", render_permissions(&meta));
    Ok(report)
}

/// Seconds since the UNIX epoch, or 0 where the filesystem does not
/// record the timestamp.
fn epoch_seconds(time: io::Result<SystemTime>) -> u64 {
    time.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(unix)]
fn render_permissions(meta: &fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    let mode = meta.permissions().mode();
    let mut out = String::with_capacity(9);
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(not(unix))]
fn render_permissions(meta: &fs::Metadata) -> String {
    if meta.permissions().readonly() {
        "r--r--r--".to_string()
    } else {
        "rw-rw-rw-".to_string()
    }
}
