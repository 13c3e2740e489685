//! The filesystem operations: mount, create, delete, read, write, list,
//! resize, defragment and change-directory, bound together by a
//! [`Session`].
//!
//! A session is one mounted disk: its name, the decoded image, the
//! directory index derived from it and the current working directory.
//! Operations mutate the in-memory image only; persisting it back to the
//! disk file is the command loop's job, and only after a successful
//! mutation. The 1 KiB transfer buffer lives outside the session; it
//! survives remounts.

use crate::alloc;
use crate::error_fs::FsError;
use crate::index::DirIndex;
use crate::verifier;
use log::debug;
use minifs_api::controller;
use minifs_api::types::{
    pack_name, Image, Inode, BLOCK_COUNT, BLOCK_SIZE, INODE_COUNT, ROOT_INDEX,
};
use std::io::{self, Write};

/// The process-wide 1 KiB transfer buffer used by read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoBuffer(pub [u8; BLOCK_SIZE]);

impl Default for IoBuffer {
    fn default() -> IoBuffer {
        IoBuffer([0; BLOCK_SIZE])
    }
}

impl IoBuffer {
    /// Zero the buffer, then copy up to 1 KiB of `bytes` into its prefix;
    /// the rest stays zero.
    pub fn fill(&mut self, bytes: &[u8]) {
        self.0 = [0; BLOCK_SIZE];
        let n = bytes.len().min(BLOCK_SIZE);
        self.0[..n].copy_from_slice(&bytes[..n]);
    }
}

/// One mounted disk and the cursor state that goes with it.
#[derive(Debug, Clone)]
pub struct Session {
    disk: String,
    image: Image,
    index: DirIndex,
    cwd: u8,
}

impl Session {
    /// Mount the disk file at `path`: read, decode, verify, adopt. On any
    /// failure the caller's previous session (if it has one) stays valid.
    pub fn mount(path: &str) -> Result<Session, FsError> {
        let image = controller::read_image(path)
            .map_err(|_| FsError::DiskNotFound(path.to_string()))?;
        Session::from_image(path.to_string(), image)
    }

    /// Adopt an already decoded image as a mounted disk. Runs the
    /// consistency verifier and builds the directory index; the working
    /// directory starts at the root.
    pub fn from_image(disk: String, image: Image) -> Result<Session, FsError> {
        if let Err(flaw) = verifier::verify(&image.superblock) {
            return Err(FsError::Inconsistent {
                name: disk,
                code: flaw.code(),
            });
        }
        let index = DirIndex::build(&image.superblock);
        debug!("mounted {}", disk);
        Ok(Session {
            disk,
            image,
            index,
            cwd: ROOT_INDEX,
        })
    }

    /// Name of the mounted disk file.
    pub fn disk(&self) -> &str {
        &self.disk
    }

    /// The in-memory image.
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Current working directory: [`ROOT_INDEX`] or an in-use directory
    /// inode index.
    pub fn cwd(&self) -> u8 {
        self.cwd
    }

    /// Write the image back to the disk file. A failure leaves the mount
    /// and the in-memory image untouched.
    pub fn persist(&self) -> Result<(), FsError> {
        controller::persist(&self.disk, &self.image)
            .map_err(|_| FsError::WriteFailure(self.disk.clone()))
    }

    /// Create a file of `size` blocks, or a directory when `size` is 0,
    /// in the current directory. A new file's blocks are *not* zeroed;
    /// delete and shrink keep freed blocks clean instead.
    pub fn create(&mut self, name: &str, size: u8) -> Result<(), FsError> {
        let slot = (0..INODE_COUNT as u8)
            .find(|&i| !self.image.inode(i).is_used())
            .ok_or_else(|| FsError::SuperblockFull {
                disk: self.disk.clone(),
                name: name.to_string(),
            })?;
        let packed = pack_name(name);
        if self
            .index
            .resolve(&self.image.superblock, self.cwd, &packed)
            .is_some()
        {
            return Err(FsError::AlreadyExists(name.to_string()));
        }
        if size == 0 {
            *self.image.inode_mut(slot) = Inode::new_dir(packed, self.cwd);
        } else {
            let start = alloc::allocate(&mut self.image, size).ok_or_else(|| {
                FsError::CannotAllocate {
                    size,
                    disk: self.disk.clone(),
                }
            })?;
            *self.image.inode_mut(slot) = Inode::new_file(packed, size, start, self.cwd);
        }
        self.index.insert(self.cwd, slot);
        Ok(())
    }

    /// Delete a file or directory in the current directory. Directories
    /// go down recursively, children first; file blocks are zeroed and
    /// their bits cleared. Never fails once the name resolves.
    pub fn delete(&mut self, name: &str) -> Result<(), FsError> {
        let target = self
            .index
            .resolve(&self.image.superblock, self.cwd, &pack_name(name))
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;
        self.delete_tree(target);
        Ok(())
    }

    fn delete_tree(&mut self, idx: u8) {
        let ino = *self.image.inode(idx);
        if ino.is_dir() {
            for child in self.index.children(idx).to_vec() {
                self.delete_tree(child);
            }
            self.index.forget_dir(idx);
        } else {
            alloc::free_run(&mut self.image, ino.start_block, ino.size());
        }
        self.index.remove(ino.parent(), idx);
        self.image.inode_mut(idx).clear();
    }

    // Resolve `name` in the cwd and insist on a file.
    fn resolve_file(&self, name: &str) -> Result<u8, FsError> {
        match self
            .index
            .resolve(&self.image.superblock, self.cwd, &pack_name(name))
        {
            Some(idx) if !self.image.inode(idx).is_dir() => Ok(idx),
            _ => Err(FsError::FileNotFound(name.to_string())),
        }
    }

    // Absolute block number of the file's `block`-th block, bounds
    // checked against both the file extent and the addressable range.
    fn file_block(ino: &Inode, name: &str, block: u8) -> Result<usize, FsError> {
        let at = ino.start_block as usize + block as usize;
        if block >= ino.size() || at >= BLOCK_COUNT {
            return Err(FsError::NoSuchBlock {
                name: name.to_string(),
                block,
            });
        }
        Ok(at)
    }

    /// Copy the file's `block`-th block into the transfer buffer.
    pub fn read(&self, name: &str, block: u8, buf: &mut IoBuffer) -> Result<(), FsError> {
        let ino = *self.image.inode(self.resolve_file(name)?);
        let at = Session::file_block(&ino, name, block)?;
        buf.0 = self.image.blocks[at].0;
        Ok(())
    }

    /// Copy the transfer buffer into the file's `block`-th block.
    pub fn write(&mut self, name: &str, block: u8, buf: &IoBuffer) -> Result<(), FsError> {
        let ino = *self.image.inode(self.resolve_file(name)?);
        let at = Session::file_block(&ino, name, block)?;
        self.image.blocks[at].0 = buf.0;
        Ok(())
    }

    /// Print the current directory: `.` and `..` with their child counts,
    /// then every child in insertion order. Directories show their child
    /// count, files their size in KB.
    pub fn list(&self, out: &mut dyn Write) -> io::Result<()> {
        let here = self.index.child_count(self.cwd);
        let up = if self.cwd == ROOT_INDEX {
            here
        } else {
            self.index.child_count(self.image.inode(self.cwd).parent())
        };
        writeln!(out, ".       {:3}", here)?;
        writeln!(out, "..      {:3}", up)?;
        for &child in self.index.children(self.cwd) {
            let ino = self.image.inode(child);
            if ino.is_dir() {
                writeln!(out, "{:<5.5}   {:3}", ino.name_str(), self.index.child_count(child))?;
            } else {
                writeln!(out, "{:<5.5}   {:3} KB", ino.name_str(), ino.size())?;
            }
        }
        Ok(())
    }

    /// Resize a file in the current directory to `new_size` blocks.
    ///
    /// Shrinking frees and zeroes the tail. Growing first tries to extend
    /// in place; failing that the file moves wholesale to the first free
    /// run long enough, and if none exists the operation aborts with no
    /// effect.
    pub fn resize(&mut self, name: &str, new_size: u8) -> Result<(), FsError> {
        let idx = self.resolve_file(name)?;
        let ino = *self.image.inode(idx);
        let old_size = ino.size();

        if new_size == old_size {
            return Ok(());
        }
        if new_size < old_size {
            alloc::free_run(&mut self.image, ino.start_block + new_size, old_size - new_size);
            self.image.inode_mut(idx).used_size = new_size | 0x80;
            return Ok(());
        }

        let tail = ino.start_block + old_size;
        let grown = new_size - old_size;
        if self.image.superblock.free_block_list.run_free(tail, grown) {
            for b in tail..tail + grown {
                self.image.superblock.free_block_list.set(b);
            }
            self.image.inode_mut(idx).used_size = new_size | 0x80;
            return Ok(());
        }

        // The file's own bits stay set during the search, so the new run
        // never overlaps the old one.
        match self.image.superblock.free_block_list.find_run(new_size) {
            None => Err(FsError::CannotExpand {
                name: name.to_string(),
                size: new_size,
            }),
            Some(dest) => {
                debug!("resize: moving {} from {} to {}", name, ino.start_block, dest);
                alloc::relocate(&mut self.image, ino.start_block, old_size, dest, new_size);
                let slot = self.image.inode_mut(idx);
                slot.start_block = dest;
                slot.used_size = new_size | 0x80;
                Ok(())
            }
        }
    }

    /// Compact all file data toward low block numbers; see
    /// [`alloc::defragment`].
    pub fn defragment(&mut self) {
        alloc::defragment(&mut self.image);
    }

    /// Change the working directory: `.` stays put, `..` moves to the
    /// parent (the root is its own parent), anything else must name a
    /// directory in the current one.
    pub fn change_dir(&mut self, name: &str) -> Result<(), FsError> {
        match name {
            "." => Ok(()),
            ".." => {
                if self.cwd != ROOT_INDEX {
                    self.cwd = self.image.inode(self.cwd).parent();
                }
                Ok(())
            }
            _ => {
                match self
                    .index
                    .resolve(&self.image.superblock, self.cwd, &pack_name(name))
                {
                    Some(idx) if self.image.inode(idx).is_dir() => {
                        self.cwd = idx;
                        Ok(())
                    }
                    _ => Err(FsError::DirNotFound(name.to_string())),
                }
            }
        }
    }
}
