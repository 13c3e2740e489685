//! Consistency verification of a freshly decoded superblock.
//!
//! Six structural checks run in a fixed order; the first failure wins and
//! its code (1 through 6) ends up in the mount diagnostic. A disk that
//! fails any check is rejected wholesale and the previous mount, if any,
//! stays active.

use minifs_api::types::{FreeBlockList, Superblock, INODE_COUNT, ROOT_INDEX};

/// Outcome of a failed verification, ordered by check number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inconsistency {
    /// Check 1: the stored free-block list disagrees with the one implied
    /// by the file inodes, or two files claim the same block.
    BitmapMismatch = 1,
    /// Check 2: two children of the same parent share a name.
    DuplicateName = 2,
    /// Check 3: a free inode has a nonzero byte, or an in-use inode has an
    /// all-NUL name.
    BadFreeState = 3,
    /// Check 4: an in-use file's start block is outside `1..=127`.
    BadStartBlock = 4,
    /// Check 5: an in-use directory has a nonzero size or start block.
    BadDirFields = 5,
    /// Check 6: a parent field is 126, or names a slot that is not an
    /// in-use directory.
    BadParent = 6,
}

impl Inconsistency {
    /// The numeric error code used in the mount diagnostic.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Run all six checks in order; `Err` carries the first failure.
pub fn verify(sb: &Superblock) -> Result<(), Inconsistency> {
    check_bitmap(sb)?;
    check_unique_names(sb)?;
    check_free_state(sb)?;
    check_start_blocks(sb)?;
    check_dir_fields(sb)?;
    check_parents(sb)
}

/// Check 1. Rebuild the expected free-block list from the file inodes and
/// compare it byte-for-byte with the stored one. Marking a bit twice means
/// two files overlap, which is the same failure. Files whose start block
/// is out of range contribute nothing here; check 4 owns that complaint.
fn check_bitmap(sb: &Superblock) -> Result<(), Inconsistency> {
    let mut expected = FreeBlockList::default();
    for ino in sb.inodes.iter() {
        if !ino.is_used() || ino.is_dir() {
            continue;
        }
        if ino.start_block < 1 {
            continue;
        }
        let end = (ino.start_block as usize + ino.size() as usize).min(128);
        for b in ino.start_block as usize..end {
            if expected.get(b as u8) {
                return Err(Inconsistency::BitmapMismatch);
            }
            expected.set(b as u8);
        }
    }
    expected.set(0);
    if expected.as_bytes() != sb.free_block_list.as_bytes() {
        return Err(Inconsistency::BitmapMismatch);
    }
    Ok(())
}

/// Check 2. Within every parent, in-use children carry pairwise distinct
/// names (full 5-byte compare, NUL padding included).
fn check_unique_names(sb: &Superblock) -> Result<(), Inconsistency> {
    for i in 0..INODE_COUNT {
        if !sb.inodes[i].is_used() {
            continue;
        }
        for j in i + 1..INODE_COUNT {
            if !sb.inodes[j].is_used() {
                continue;
            }
            if sb.inodes[i].parent() == sb.inodes[j].parent()
                && sb.inodes[i].name == sb.inodes[j].name
            {
                return Err(Inconsistency::DuplicateName);
            }
        }
    }
    Ok(())
}

/// Check 3. A free inode is all zeroes; an in-use inode has at least one
/// nonzero name byte.
fn check_free_state(sb: &Superblock) -> Result<(), Inconsistency> {
    for ino in sb.inodes.iter() {
        let ok = if ino.is_used() {
            ino.name != [0; 5]
        } else {
            ino.is_zero()
        };
        if !ok {
            return Err(Inconsistency::BadFreeState);
        }
    }
    Ok(())
}

/// Check 4. Every in-use file's start block lies in `1..=127`: the high
/// bit clear and the low seven bits nonzero.
fn check_start_blocks(sb: &Superblock) -> Result<(), Inconsistency> {
    for ino in sb.inodes.iter() {
        if ino.is_used() && !ino.is_dir() {
            if ino.start_block & 0x7F == 0 || ino.start_block & 0x80 != 0 {
                return Err(Inconsistency::BadStartBlock);
            }
        }
    }
    Ok(())
}

/// Check 5. In-use directories store zero for both size and start block.
fn check_dir_fields(sb: &Superblock) -> Result<(), Inconsistency> {
    for ino in sb.inodes.iter() {
        if ino.is_used() && ino.is_dir() {
            if ino.size() != 0 || ino.start_block != 0 {
                return Err(Inconsistency::BadDirFields);
            }
        }
    }
    Ok(())
}

/// Check 6. Every in-use inode's parent is the root sentinel or an in-use
/// directory slot; 126 is never legal.
fn check_parents(sb: &Superblock) -> Result<(), Inconsistency> {
    for ino in sb.inodes.iter() {
        if !ino.is_used() {
            continue;
        }
        let p = ino.parent();
        if p == ROOT_INDEX {
            continue;
        }
        if p as usize >= INODE_COUNT {
            return Err(Inconsistency::BadParent);
        }
        let parent = &sb.inodes[p as usize];
        if !parent.is_used() || !parent.is_dir() {
            return Err(Inconsistency::BadParent);
        }
    }
    Ok(())
}
