//! e2e: a container with a corrupted trailer back-pointer refuses to open,
//! and a container never touched by a mutating open leaves its bytes intact.

use pfar::{CompressionKind, Container, ContainerError, OpenMode, PageFormat, PageKind};
use std::fs;
use std::io::{Seek, SeekFrom, Write};
use tempfile::NamedTempFile;

#[test]
fn zeroed_trailer_back_pointer_fails_to_open() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    c.append_page(
        1,
        "a".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Plain),
        b"payload",
    )
    .unwrap();
    c.close(true).unwrap();

    // Zero the last 8 bytes — the trailer_length back-pointer.
    let len = fs::metadata(path).unwrap().len();
    let mut f = fs::OpenOptions::new().write(true).open(path).unwrap();
    f.seek(SeekFrom::Start(len - 8)).unwrap();
    f.write_all(&[0u8; 8]).unwrap();
    drop(f);

    let result = Container::open(path, OpenMode::ReadOnly);
    assert!(matches!(result, Err(ContainerError::TrailerMalformed)));
}

#[test]
fn bad_magic_fails_to_open() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();
    fs::write(path, b"not a paged archive at all").unwrap();

    let result = Container::open(path, OpenMode::ReadOnly);
    assert!(matches!(result, Err(ContainerError::MagicMismatch)));
}

#[test]
fn readonly_close_without_save_leaves_file_untouched() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    c.append_page(
        1,
        "a".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Plain),
        b"hello",
    )
    .unwrap();
    c.close(true).unwrap();

    let before = fs::read(path).unwrap();

    let c = Container::open(path, OpenMode::ReadOnly).unwrap();
    c.close(false).unwrap();

    let after = fs::read(path).unwrap();
    assert_eq!(before, after);
}
