//! e2e: delete-and-compact — `RemovePages` slides surviving pages down to
//! close the gap left by a deleted one, in a single forward pass.

use pfar::{CompressionKind, Container, OpenMode, PageFormat, PageKind};
use std::fs;
use tempfile::NamedTempFile;

fn append_fixed(c: &mut Container, id: u32, len: usize) {
    let content = vec![b'a'; len];
    c.append_page(
        id,
        String::new(),
        PageFormat::new(PageKind::File, CompressionKind::Plain),
        &content,
    )
    .unwrap();
}

#[test]
fn delete_middle_page_compacts_survivors_in_order() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    append_fixed(&mut c, 1, 100);
    append_fixed(&mut c, 2, 200);
    append_fixed(&mut c, 3, 300);
    append_fixed(&mut c, 4, 400);
    c.close(true).unwrap();

    let len_before = fs::metadata(path).unwrap().len();

    let mut c = Container::open(path, OpenMode::ReadWrite).unwrap();
    let start1 = c.header().desc(1).unwrap().start;
    c.remove_pages(&[2]).unwrap();
    c.close(true).unwrap();

    let len_after = fs::metadata(path).unwrap().len();
    assert!(
        len_before - len_after >= 200,
        "file should shrink by at least the deleted page's payload ({len_before} -> {len_after})"
    );

    let c = Container::open(path, OpenMode::ReadOnly).unwrap();
    assert_eq!(c.header().list_pages(), &[1, 3, 4]);

    let desc1 = c.header().desc(1).unwrap();
    assert_eq!(desc1.start, start1);

    let desc3 = c.header().desc(3).unwrap();
    assert_eq!(desc3.start, desc1.start + 100);

    let desc4 = c.header().desc(4).unwrap();
    assert_eq!(desc4.start, desc3.start + 300);

    assert!(!c.header().exists(2));
}

#[test]
fn compacted_survivors_retain_original_bytes() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    c.append_page(
        1,
        "a".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Plain),
        b"first",
    )
    .unwrap();
    c.append_page(
        2,
        "b".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Plain),
        b"second-page",
    )
    .unwrap();
    c.append_page(
        3,
        "c".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Plain),
        b"third",
    )
    .unwrap();
    c.remove_pages(&[2]).unwrap();
    c.close(true).unwrap();

    let mut c = Container::open(path, OpenMode::ReadOnly).unwrap();
    let mut buf = [0u8; 5];
    assert_eq!(c.read_page(1, &mut buf).unwrap(), 5);
    assert_eq!(&buf, b"first");
    assert_eq!(c.read_page(3, &mut buf).unwrap(), 5);
    assert_eq!(&buf, b"third");
}

#[test]
fn deleting_nonexistent_id_is_a_no_op() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    append_fixed(&mut c, 1, 10);
    c.remove_pages(&[999]).unwrap();
    c.close(true).unwrap();

    let c = Container::open(path, OpenMode::ReadOnly).unwrap();
    assert_eq!(c.header().list_pages(), &[1]);
}
