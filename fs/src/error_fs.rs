//! User-facing error type of the filesystem layer.
//!
//! Every variant renders as the literal diagnostic line the command loop
//! prints to stderr, so the `Display` impl derived by `thiserror` *is* the
//! output format. Scripts and tests match on these strings; do not reword
//! them.

use thiserror::Error;

/// An operation-level failure. None of these corrupt the mounted image:
/// the operation that raised one has no partial effect.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FsError {
    /// The disk file could not be opened for mounting.
    #[error("Error: Cannot find disk {0}")]
    DiskNotFound(String),

    /// The decoded image failed one of the six consistency checks.
    #[error("Error: File system in {name} is inconsistent (error code: {code})")]
    Inconsistent {
        /// Name of the disk that was being mounted.
        name: String,
        /// Code of the first failing check, 1 through 6.
        code: u8,
    },

    /// A command other than mount arrived with no disk mounted.
    #[error("Error: No file system is mounted")]
    NotMounted,

    /// All 126 inode slots are taken.
    #[error("Error: Superblock in disk {disk} is full, cannot create {name}")]
    SuperblockFull {
        /// The mounted disk.
        disk: String,
        /// Name that could not be created.
        name: String,
    },

    /// No contiguous free run of the requested length exists.
    #[error("Error: Cannot allocate {size} KB on {disk}")]
    CannotAllocate {
        /// Requested size in blocks.
        size: u8,
        /// The mounted disk.
        disk: String,
    },

    /// The name is already taken in the current directory.
    #[error("Error: File or directory {0} already exists")]
    AlreadyExists(String),

    /// Delete target not present in the current directory.
    #[error("Error: File or directory {0} does not exist")]
    NotFound(String),

    /// Read/write/resize target is missing or is a directory.
    #[error("Error: File {0} does not exist")]
    FileNotFound(String),

    /// Block number outside the file's extent.
    #[error("Error: {name} does not have block {block}")]
    NoSuchBlock {
        /// The file named in the command.
        name: String,
        /// The out-of-range block number.
        block: u8,
    },

    /// Resize-grow found no room, in place or anywhere else.
    #[error("Error: File {name} cannot expand to size {size}")]
    CannotExpand {
        /// The file named in the command.
        name: String,
        /// The requested new size in blocks.
        size: u8,
    },

    /// Change-directory target is missing or is a file.
    #[error("Error: Directory {0} does not exist")]
    DirNotFound(String),

    /// Persisting the image back to its disk file failed. The in-memory
    /// image and the mount stay intact.
    #[error("Error: Failure to write to disk {0}")]
    WriteFailure(String),
}

#[cfg(test)]
mod tests {
    use super::FsError;

    // The exact wording is an external interface; pin a few samples.
    #[test]
    fn diagnostics_render_verbatim() {
        assert_eq!(
            FsError::DiskNotFound("disk0".into()).to_string(),
            "Error: Cannot find disk disk0"
        );
        assert_eq!(
            FsError::Inconsistent { name: "d".into(), code: 3 }.to_string(),
            "Error: File system in d is inconsistent (error code: 3)"
        );
        assert_eq!(
            FsError::CannotAllocate { size: 1, disk: "d".into() }.to_string(),
            "Error: Cannot allocate 1 KB on d"
        );
        assert_eq!(
            FsError::NoSuchBlock { name: "f".into(), block: 9 }.to_string(),
            "Error: f does not have block 9"
        );
        assert_eq!(
            FsError::CannotExpand { name: "f".into(), size: 100 }.to_string(),
            "Error: File f cannot expand to size 100"
        );
        assert_eq!(FsError::NotMounted.to_string(), "Error: No file system is mounted");
    }
}
