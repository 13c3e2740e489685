//Front-end behavior: the mount state machine, persistence after each
//mutating command, and the buffer surviving remounts. Pure syntax checks
//live next to the parser itself.

use minifs::ops::Session;
use minifs::shell::Shell;
use minifs_api::types::{pack_name, Image, Inode, BLOCK_SIZE, IMAGE_SIZE, ROOT_INDEX};
use std::path::{Path, PathBuf};

mod utils;

fn disk_prep_path(name: &str) -> PathBuf {
    utils::disk_prep_path(&("fs-images-shell-".to_string() + name), "img")
}

fn run(shell: &mut Shell, line: &str, line_no: usize) -> String {
    let mut out = Vec::new();
    shell.execute_line(line, line_no, &mut out);
    String::from_utf8(out).unwrap()
}

fn mount_line(path: &Path) -> String {
    format!("M {}", path.to_str().unwrap())
}

#[test]
fn commands_require_a_mount() {
    let mut shell = Shell::new("input".to_string());
    assert_eq!(run(&mut shell, "L", 1), "");
    run(&mut shell, "C a 3", 2);
    run(&mut shell, "B abc", 3);
    assert!(!shell.is_mounted());
    assert!(shell.buffer().0.iter().all(|&b| b == 0));
}

#[test]
fn full_session_persists_each_mutation() {
    let path = disk_prep_path("session");
    utils::write_blank_disk(&path);
    let mut shell = Shell::new("script".to_string());

    run(&mut shell, &mount_line(&path), 1);
    assert!(shell.is_mounted());

    run(&mut shell, "C a 2", 2);
    let raw = utils::read_raw(&path);
    assert_eq!(raw[16..21], *b"a\0\0\0\0");
    assert_eq!(raw[21], 0x82);
    assert_eq!(raw[22], 1);
    assert_eq!(raw[0], 0b1110_0000);

    run(&mut shell, "B hello world", 3);
    assert_eq!(&shell.buffer().0[..11], b"hello world");
    assert!(shell.buffer().0[11..].iter().all(|&b| b == 0));
    // Loading the buffer is not a disk mutation.
    assert_eq!(utils::read_raw(&path)[2048], 0);

    run(&mut shell, "W a 0", 4);
    let raw = utils::read_raw(&path);
    assert_eq!(&raw[2048..2048 + 11], b"hello world");

    let listing = run(&mut shell, "L", 5);
    assert_eq!(listing, ".         1\n..        1\na         2 KB\n");

    run(&mut shell, "E a 1", 6);
    let raw = utils::read_raw(&path);
    assert_eq!(raw[21], 0x81);
    assert_eq!(raw[0], 0b1100_0000);
    // The freed tail block was zeroed on disk as well.
    assert!(raw[1024 + 2 * BLOCK_SIZE..1024 + 3 * BLOCK_SIZE].iter().all(|&b| b == 0));

    run(&mut shell, "D a", 7);
    let raw = utils::read_raw(&path);
    assert_eq!(raw[0], 0x80);
    assert!(raw[16..24].iter().all(|&b| b == 0));
    assert!(raw[1024..].iter().all(|&b| b == 0));

    utils::disk_unprep_path(&path);
}

#[test]
fn malformed_lines_change_nothing() {
    let path = disk_prep_path("malformed");
    utils::write_blank_disk(&path);
    let mut shell = Shell::new("script".to_string());
    run(&mut shell, &mount_line(&path), 1);
    run(&mut shell, "C a 2", 2);
    let before = utils::read_raw(&path);

    for (no, line) in ["C b 128", "C toolong 1", "E a ten", "L extra", "Z", "R a 128"]
        .iter()
        .copied()
        .enumerate()
    {
        run(&mut shell, line, no + 3);
    }
    assert_eq!(utils::read_raw(&path), before);
    assert_eq!(shell.session().unwrap().cwd(), ROOT_INDEX);

    utils::disk_unprep_path(&path);
}

#[test]
fn semantic_errors_leave_the_image_alone() {
    let path = disk_prep_path("semantic");
    utils::write_blank_disk(&path);
    let mut shell = Shell::new("script".to_string());
    run(&mut shell, &mount_line(&path), 1);
    run(&mut shell, "C a 2", 2);
    let before = utils::read_raw(&path);

    run(&mut shell, "C a 1", 3); // already exists
    run(&mut shell, "D miss", 4); // does not exist
    run(&mut shell, "R a 2", 5); // no such block
    run(&mut shell, "Y a", 6); // not a directory
    assert_eq!(utils::read_raw(&path), before);

    utils::disk_unprep_path(&path);
}

#[test]
fn switching_disks_mounts_fresh_at_root() {
    let d1 = disk_prep_path("switch-a");
    let d2 = utils::disk_prep_path("fs-images-shell-switch-b", "img");
    utils::write_blank_disk(&d1);
    utils::write_blank_disk(&d2);
    let mut shell = Shell::new("script".to_string());

    run(&mut shell, &mount_line(&d1), 1);
    run(&mut shell, "C d 0", 2);
    run(&mut shell, "Y d", 3);
    assert_eq!(shell.session().unwrap().cwd(), 0);

    run(&mut shell, &mount_line(&d2), 4);
    let session = shell.session().unwrap();
    assert_eq!(session.disk(), d2.to_str().unwrap());
    assert_eq!(session.cwd(), ROOT_INDEX);
    // The first disk kept its directory.
    assert_eq!(utils::read_raw(&d1)[16..21], *b"d\0\0\0\0");

    utils::disk_unprep_path(&d1);
    utils::disk_unprep_path(&d2);
}

#[test]
fn failed_mount_keeps_the_prior_session() {
    let good = disk_prep_path("keep-good");
    let bad = utils::disk_prep_path("fs-images-shell-keep-bad", "img");
    utils::write_blank_disk(&good);

    // An image whose stored free-block list disagrees with its inodes.
    let mut image = Image::default();
    image.superblock.inodes[0] = Inode::new_file(pack_name("a"), 2, 4, ROOT_INDEX);
    image.superblock.inodes[1] = Inode::new_file(pack_name("b"), 1, 5, ROOT_INDEX);
    image.superblock.free_block_list.set(0);
    for b in 4..6 {
        image.superblock.free_block_list.set(b);
    }
    utils::write_image(&bad, &image);

    let mut shell = Shell::new("script".to_string());
    run(&mut shell, &mount_line(&good), 1);
    run(&mut shell, "C a 1", 2);
    run(&mut shell, &mount_line(&bad), 3);

    // Still on the good disk, and it still works.
    assert_eq!(shell.session().unwrap().disk(), good.to_str().unwrap());
    run(&mut shell, "C b 1", 4);
    assert_eq!(utils::read_raw(&good)[24..29], *b"b\0\0\0\0");

    // A disk that cannot be opened is rejected the same way.
    run(&mut shell, "M nodisk", 5);
    assert_eq!(shell.session().unwrap().disk(), good.to_str().unwrap());

    utils::disk_unprep_path(&good);
    utils::disk_unprep_path(&bad);
}

#[test]
fn buffer_survives_a_remount() {
    let d1 = disk_prep_path("buffer-a");
    let d2 = utils::disk_prep_path("fs-images-shell-buffer-b", "img");
    utils::write_blank_disk(&d1);
    utils::write_blank_disk(&d2);
    let mut shell = Shell::new("script".to_string());

    run(&mut shell, &mount_line(&d1), 1);
    run(&mut shell, "B carried bytes", 2);
    run(&mut shell, &mount_line(&d2), 3);
    run(&mut shell, "C f 1", 4);
    run(&mut shell, "W f 0", 5);

    let raw = utils::read_raw(&d2);
    assert_eq!(&raw[2048..2048 + 13], b"carried bytes");

    utils::disk_unprep_path(&d1);
    utils::disk_unprep_path(&d2);
}

#[test]
fn fresh_blank_disk_verifies_and_mounts() {
    let path = disk_prep_path("blank");
    utils::write_blank_disk(&path);
    assert_eq!(utils::read_raw(&path).len(), IMAGE_SIZE);
    let session = Session::mount(path.to_str().unwrap()).unwrap();
    assert_eq!(session.cwd(), ROOT_INDEX);
    utils::disk_unprep_path(&path);
}
