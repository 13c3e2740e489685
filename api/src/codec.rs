//! Bit-exact (de)serialization between raw image bytes and the typed
//! [`Image`] structure.
//!
//! The encoding writes, in order: the 16-byte free-block list, the 126
//! 8-byte inode records (name, `used_size`, `start_block`, `dir_parent`)
//! and the 127 data blocks. There is no header, magic number or padding;
//! the encoded form is always exactly [`IMAGE_SIZE`] bytes.

use crate::types::{
    FreeBlockList, Image, Inode, BLOCK_SIZE, DATA_BLOCK_COUNT, FREE_LIST_LEN, IMAGE_SIZE,
    INODE_BYTES, INODE_COUNT, NAME_LEN,
};

/// Serialize `image` into its on-disk byte form.
pub fn encode(image: &Image) -> Vec<u8> {
    let mut out = Vec::with_capacity(IMAGE_SIZE);
    out.extend_from_slice(image.superblock.free_block_list.as_bytes());
    for ino in image.superblock.inodes.iter() {
        out.extend_from_slice(&ino.name);
        out.push(ino.used_size);
        out.push(ino.start_block);
        out.push(ino.dir_parent);
    }
    for block in &image.blocks[..DATA_BLOCK_COUNT] {
        out.extend_from_slice(&block.0);
    }
    debug_assert_eq!(out.len(), IMAGE_SIZE);
    out
}

/// Deserialize raw bytes into an [`Image`], the exact inverse of
/// [`encode`]. Input shorter than a full image is padded with zeroes;
/// anything past [`IMAGE_SIZE`] is ignored.
pub fn decode(bytes: &[u8]) -> Image {
    let mut raw = vec![0u8; IMAGE_SIZE];
    let n = bytes.len().min(IMAGE_SIZE);
    raw[..n].copy_from_slice(&bytes[..n]);

    let mut image = Image::default();

    let mut free = [0u8; FREE_LIST_LEN];
    free.copy_from_slice(&raw[..FREE_LIST_LEN]);
    image.superblock.free_block_list = FreeBlockList::from_bytes(free);

    for i in 0..INODE_COUNT {
        let at = FREE_LIST_LEN + i * INODE_BYTES;
        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&raw[at..at + NAME_LEN]);
        image.superblock.inodes[i] = Inode {
            name,
            used_size: raw[at + NAME_LEN],
            start_block: raw[at + NAME_LEN + 1],
            dir_parent: raw[at + NAME_LEN + 2],
        };
    }

    let data_start = FREE_LIST_LEN + INODE_COUNT * INODE_BYTES;
    for b in 0..DATA_BLOCK_COUNT {
        let at = data_start + b * BLOCK_SIZE;
        image.blocks[b].0.copy_from_slice(&raw[at..at + BLOCK_SIZE]);
    }

    image
}
