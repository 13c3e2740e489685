//! Runtime directory index: parent inode index -> ordered child list.
//!
//! Rebuilt from the superblock on every successful mount and maintained
//! incrementally by create and delete. The key is the parent's inode
//! index with [`ROOT_INDEX`] standing in for the implicit root, so two
//! unrelated directories that happen to share a name never collide.
//! Sibling order is insertion order; `ls` prints it verbatim.

use minifs_api::types::{Superblock, NAME_LEN, ROOT_INDEX};
use std::collections::HashMap;

/// The parent -> children mapping.
#[derive(Debug, Default, Clone)]
pub struct DirIndex {
    children: HashMap<u8, Vec<u8>>,
}

impl DirIndex {
    /// Build the index for a verified superblock by scanning the inode
    /// table in slot order.
    pub fn build(sb: &Superblock) -> DirIndex {
        let mut index = DirIndex::default();
        for (i, ino) in sb.inodes.iter().enumerate() {
            if ino.is_used() {
                index.insert(ino.parent(), i as u8);
            }
        }
        index
    }

    /// The ordered children of `parent` (empty for leaves and unknown
    /// directories).
    pub fn children(&self, parent: u8) -> &[u8] {
        self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of children of `parent`.
    pub fn child_count(&self, parent: u8) -> usize {
        self.children(parent).len()
    }

    /// Find the child of `parent` whose 5-byte name matches exactly.
    pub fn resolve(&self, sb: &Superblock, parent: u8, name: &[u8; NAME_LEN]) -> Option<u8> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| &sb.inodes[c as usize].name == name)
    }

    /// Append `child` to `parent`'s list.
    pub fn insert(&mut self, parent: u8, child: u8) {
        debug_assert!(parent == ROOT_INDEX || (parent as usize) < 126);
        self.children.entry(parent).or_insert_with(Vec::new).push(child);
    }

    /// Remove `child` from `parent`'s list, keeping the order of the
    /// remaining siblings.
    pub fn remove(&mut self, parent: u8, child: u8) {
        if let Some(list) = self.children.get_mut(&parent) {
            list.retain(|&c| c != child);
        }
    }

    /// Drop the child list of a directory that is being deleted.
    pub fn forget_dir(&mut self, dir: u8) {
        self.children.remove(&dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minifs_api::types::{pack_name, Inode};

    // root -> d(0), f(2); d -> e(1), g(3)
    fn sample() -> (Superblock, DirIndex) {
        let mut sb = Superblock::default();
        sb.inodes[0] = Inode::new_dir(pack_name("d"), ROOT_INDEX);
        sb.inodes[1] = Inode::new_dir(pack_name("e"), 0);
        sb.inodes[2] = Inode::new_file(pack_name("f"), 1, 1, ROOT_INDEX);
        sb.inodes[3] = Inode::new_file(pack_name("g"), 1, 2, 0);
        let index = DirIndex::build(&sb);
        (sb, index)
    }

    #[test]
    fn build_groups_by_parent_in_slot_order() {
        let (_, index) = sample();
        assert_eq!(index.children(ROOT_INDEX), &[0, 2]);
        assert_eq!(index.children(0), &[1, 3]);
        assert_eq!(index.children(1), &[] as &[u8]);
        assert_eq!(index.child_count(ROOT_INDEX), 2);
    }

    #[test]
    fn resolve_is_keyed_by_parent_index() {
        let (mut sb, mut index) = sample();
        assert_eq!(index.resolve(&sb, ROOT_INDEX, &pack_name("d")), Some(0));
        assert_eq!(index.resolve(&sb, 0, &pack_name("g")), Some(3));
        assert_eq!(index.resolve(&sb, ROOT_INDEX, &pack_name("g")), None);

        // Two directories named alike in different parents stay distinct.
        sb.inodes[4] = Inode::new_dir(pack_name("e"), ROOT_INDEX);
        index.insert(ROOT_INDEX, 4);
        assert_eq!(index.resolve(&sb, ROOT_INDEX, &pack_name("e")), Some(4));
        assert_eq!(index.resolve(&sb, 0, &pack_name("e")), Some(1));
    }

    #[test]
    fn remove_preserves_sibling_order() {
        let (_, mut index) = sample();
        index.insert(ROOT_INDEX, 9);
        index.remove(ROOT_INDEX, 2);
        assert_eq!(index.children(ROOT_INDEX), &[0, 9]);
        index.forget_dir(0);
        assert_eq!(index.child_count(0), 0);
    }
}
