//! e2e: meta pages (directories, links) survive deletion of unrelated file
//! pages and are never relocated or deleted by compaction themselves.

use pfar::{CompressionKind, Container, OpenMode, PageFormat, PageId, PageKind};
use tempfile::NamedTempFile;

#[test]
fn directory_meta_page_preserved_across_delete() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    c.new_meta_page(
        10,
        PageFormat::new(PageKind::Directory, CompressionKind::Plain),
        "d/".to_string(),
    )
    .unwrap();
    c.append_page(
        11,
        "d/f.txt".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Plain),
        b"contents",
    )
    .unwrap();
    c.remove_pages(&[11]).unwrap();
    c.close(true).unwrap();

    let c = Container::open(path, OpenMode::ReadOnly).unwrap();
    assert!(c.header().exists(10));
    assert_eq!(c.header().desc(10).unwrap().format.kind(), PageKind::Directory);
    assert!(!c.header().exists(11));
}

#[test]
fn delete_request_on_meta_page_is_ignored() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    c.new_meta_page(
        1,
        PageFormat::new(PageKind::Directory, CompressionKind::Plain),
        "d/".to_string(),
    )
    .unwrap();
    c.append_page(
        2,
        "d/f.txt".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Plain),
        b"x",
    )
    .unwrap();

    // Requesting deletion of a non-File id must be silently ignored, not an error.
    c.remove_pages(&[1]).unwrap();
    c.close(true).unwrap();

    let c = Container::open(path, OpenMode::ReadOnly).unwrap();
    let ids: Vec<PageId> = c.header().list_pages().to_vec();
    assert!(ids.contains(&1));
    assert!(ids.contains(&2));
}

#[test]
fn symlink_and_hardlink_meta_pages_round_trip() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    c.new_meta_page(
        1,
        PageFormat::new(PageKind::SymLink, CompressionKind::Plain),
        "link -> target".to_string(),
    )
    .unwrap();
    c.new_meta_page(
        2,
        PageFormat::new(PageKind::HardLink, CompressionKind::Plain),
        "hardlink".to_string(),
    )
    .unwrap();
    c.close(true).unwrap();

    let c = Container::open(path, OpenMode::ReadOnly).unwrap();
    assert_eq!(c.header().desc(1).unwrap().format.kind(), PageKind::SymLink);
    assert_eq!(c.header().desc(2).unwrap().format.kind(), PageKind::HardLink);
}
