//! e2e: create → append → read, and a basic reopen/enumerate round-trip.

use pfar::{CompressionKind, Container, OpenMode, PageFormat, PageKind};
use tempfile::NamedTempFile;

#[test]
fn create_append_read_roundtrip() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    c.append_page(
        1,
        "hello".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Plain),
        b"HELLO",
    )
    .unwrap();

    let zeros = vec![0u8; 200_000];
    c.append_page(
        2,
        "z".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Lz4Block),
        &zeros,
    )
    .unwrap();
    c.close(true).unwrap();

    let mut c = Container::open(path, OpenMode::ReadOnly).unwrap();
    assert_eq!(c.header().list_pages(), &[1, 2]);

    let mut buf = vec![0u8; 5];
    let n = c.read_page(1, &mut buf).unwrap();
    assert_eq!(n, 5);
    assert_eq!(&buf, b"HELLO");

    let mut buf = vec![0u8; 200_000];
    let n = c.read_page(2, &mut buf).unwrap();
    assert_eq!(n as usize, 200_000);
    assert!(buf.iter().all(|&b| b == 0));
}

#[test]
fn interleaved_meta_and_file_pages_preserve_insertion_order() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    c.new_meta_page(
        0,
        PageFormat::new(PageKind::Directory, CompressionKind::Plain),
        "d/".to_string(),
    )
    .unwrap();
    c.append_page(
        1,
        "d/a.txt".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Plain),
        b"aaa",
    )
    .unwrap();
    c.new_meta_page(
        2,
        PageFormat::new(PageKind::Directory, CompressionKind::Plain),
        "e/".to_string(),
    )
    .unwrap();
    c.append_page(
        3,
        "e/b.txt".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Plain),
        b"bbb",
    )
    .unwrap();
    c.close(true).unwrap();

    let c = Container::open(path, OpenMode::ReadOnly).unwrap();
    assert_eq!(c.header().list_pages(), &[0, 1, 2, 3]);
}

#[test]
fn empty_container_enumerates_zero_pages() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let c = Container::open(path, OpenMode::Create).unwrap();
    c.close(true).unwrap();

    let c = Container::open(path, OpenMode::ReadOnly).unwrap();
    assert!(c.header().list_pages().is_empty());
}

#[test]
fn streaming_write_matches_appended_bytes() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    c.new_page_named(5, "stream".to_string()).unwrap();
    c.write(b"abc").unwrap();
    c.write(b"def").unwrap();
    c.end_new_page().unwrap();
    c.close(true).unwrap();

    let mut c = Container::open(path, OpenMode::ReadOnly).unwrap();
    let mut buf = vec![0u8; 6];
    let n = c.read_page(5, &mut buf).unwrap();
    assert_eq!(n, 6);
    assert_eq!(&buf, b"abcdef");
}

#[test]
fn zero_length_and_max_length_names_round_trip() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let long_name: String = "x".repeat(65_535);

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    c.append_page(
        1,
        String::new(),
        PageFormat::new(PageKind::File, CompressionKind::Plain),
        b"a",
    )
    .unwrap();
    c.append_page(
        2,
        long_name.clone(),
        PageFormat::new(PageKind::File, CompressionKind::Plain),
        b"b",
    )
    .unwrap();
    c.close(true).unwrap();

    let c = Container::open(path, OpenMode::ReadOnly).unwrap();
    assert_eq!(c.header().desc(1).unwrap().name, "");
    assert_eq!(c.header().desc(2).unwrap().name, long_name);
}
