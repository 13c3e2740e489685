#![allow(dead_code)]

//Shared helpers for the integration tests
//Every test works in its own directory under the crate root, so tests
//running in parallel never share a disk image.
use minifs_api::codec;
use minifs_api::types::{Image, IMAGE_SIZE};
use std::fs::{self, create_dir_all, remove_dir, remove_file};
use std::path::{Path, PathBuf};

//Create the directory 'name' leading up to 'img_name', starting from the
//crate root, and remove a stale image file if a previous run left one.
pub fn disk_prep_path(name: &str, img_name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push(name);
    path.push(img_name);

    if path.exists() {
        remove_file(&path).unwrap();
    }
    {
        let prefix = path.parent().unwrap();
        create_dir_all(prefix).unwrap();
    }

    path
}

//Undo folder creation, including removing the parent
pub fn disk_unprep_path(path: &Path) {
    remove_file(path).unwrap();

    let parent = path.parent().unwrap();
    remove_dir(parent).unwrap(); //Safety; only removes an empty directory
}

//A blank, consistent disk: 128 KiB of zeroes with only the reserved
//block's bit set.
pub fn write_blank_disk(path: &Path) {
    let mut bytes = vec![0u8; IMAGE_SIZE];
    bytes[0] = 0x80;
    fs::write(path, bytes).unwrap();
}

//Serialize a hand-built image to the given path
pub fn write_image(path: &Path, image: &Image) {
    fs::write(path, codec::encode(image)).unwrap();
}

//Raw bytes currently stored at the given path
pub fn read_raw(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap()
}
