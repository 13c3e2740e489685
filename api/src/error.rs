//! Error type of the data layer.
//!
//! Everything that can fail down here is file I/O; richer, user-facing
//! diagnostics belong to the filesystem crate, which wraps these values
//! with the context of the command that triggered them. The `#[from]`
//! annotation gives a `From<io::Error>` impl so the controller can use
//! the `?` operator directly.

use std::io;
use thiserror::Error;

/// Error raised by the controller and codec layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Opening, reading or writing the backing image file failed.
    #[error("disk image I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Shorthand for results in this crate.
pub type Result<T> = std::result::Result<T, ApiError>;
