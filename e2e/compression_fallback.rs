//! e2e: fallback-on-no-gain — compressing an incompressible payload must
//! persist the page as plain and preserve the original bytes exactly.

use pfar::{CompressionKind, Container, OpenMode, PageFormat, PageKind};
use tempfile::NamedTempFile;

fn incompressible_bytes(n: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state & 0xff) as u8
        })
        .collect()
}

#[test]
fn no_gain_compression_falls_back_to_plain() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let random_16 = incompressible_bytes(16, 0x243F_6A88_85A3_08D3);

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    c.append_page(
        7,
        "r".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Lz4Block),
        &random_16,
    )
    .unwrap();
    c.close(true).unwrap();

    let mut c = Container::open(path, OpenMode::ReadOnly).unwrap();
    let desc = c.header().desc(7).unwrap().clone();
    assert!(!desc.format.is_compressed());
    assert_eq!(desc.format.raw() & 0xff00, 0);

    let mut buf = vec![0u8; 16];
    let n = c.read_page(7, &mut buf).unwrap();
    assert_eq!(n, 16);
    assert_eq!(buf, random_16);
}

#[test]
fn compressed_size_equal_to_original_is_stored_plain() {
    // A single byte cannot be shrunk by LZ4 (compressed form always carries
    // at least a token byte), so this exercises the >= comparison exactly.
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    c.append_page(
        1,
        "one".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Lz4Block),
        b"x",
    )
    .unwrap();
    c.close(true).unwrap();

    let c = Container::open(path, OpenMode::ReadOnly).unwrap();
    let desc = c.header().desc(1).unwrap();
    assert!(!desc.format.is_compressed());
    assert_eq!(desc.length, 1);
}
