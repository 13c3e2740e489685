//! File-backed disk controller.
//!
//! The disk is an ordinary file holding one serialized image. The
//! controller opens, reads or writes and closes the file on every call;
//! no handle is kept between operations, so the only state that survives
//! a call is the file's contents. Behavior under concurrent external
//! writers is undefined (not supported).

use crate::codec;
use crate::error::Result;
use crate::types::Image;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Read and decode the image stored at `path`.
///
/// A file shorter than a full image decodes with the missing tail read as
/// zeroes. Errors only when the file cannot be opened or read.
pub fn read_image<P: AsRef<Path>>(path: P) -> Result<Image> {
    let bytes = std::fs::read(path)?;
    Ok(codec::decode(&bytes))
}

/// Truncate the file at `path` and write the full encoded `image` to it.
pub fn persist<P: AsRef<Path>>(path: P, image: &Image) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(&codec::encode(image))?;
    Ok(())
}
