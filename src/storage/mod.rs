//! Storage module
//!
//! Username/filename validation, namespace provisioning, and the
//! filesystem operations behind LIST, INFO, and DELETE.

mod operations;
mod validation;

pub use operations::{delete_file, describe_file, list_files, provision_namespace};
pub use validation::{validate_filename, validate_username};
