//! e2e: a payload well above `LZ4_MAX_INPUT_SIZE` must route through the
//! LZ4 frame codec and round-trip exactly.

use pfar::container::codec::choose_format;
use pfar::{CompressionKind, Container, OpenMode, PageFormat, PageKind};
use tempfile::NamedTempFile;

const SIXTY_FOUR_MIB: usize = 64 * 1024 * 1024;

#[test]
fn sixty_four_mib_frame_payload_round_trips() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let pattern: Vec<u8> = (0..SIXTY_FOUR_MIB).map(|i| (i % 256) as u8).collect();
    assert_eq!(
        choose_format(pattern.len() as u64),
        CompressionKind::Lz4Frame
    );

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    c.append_page(
        1,
        "big".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Lz4Frame),
        &pattern,
    )
    .unwrap();
    c.close(true).unwrap();

    let mut c = Container::open(path, OpenMode::ReadOnly).unwrap();
    let desc = c.header().desc(1).unwrap().clone();
    assert_eq!(desc.format.compression(), CompressionKind::Lz4Frame);
    assert_eq!(desc.uncompressed_length, SIXTY_FOUR_MIB as u64);

    let mut buf = vec![0u8; SIXTY_FOUR_MIB];
    let n = c.read_page(1, &mut buf).unwrap();
    assert_eq!(n as usize, SIXTY_FOUR_MIB);
    assert_eq!(buf, pattern);
}

#[test]
fn large_frame_page_view_round_trips() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();

    let pattern: Vec<u8> = (0..SIXTY_FOUR_MIB).map(|i| ((i * 7) % 251) as u8).collect();

    let mut c = Container::open(path, OpenMode::Create).unwrap();
    c.append_page(
        1,
        "big".to_string(),
        PageFormat::new(PageKind::File, CompressionKind::Lz4Frame),
        &pattern,
    )
    .unwrap();

    let mut view = c.create_page_view(1).unwrap();
    let mut decoded = Vec::new();
    use std::io::Read;
    view.read_to_end(&mut decoded).unwrap();
    assert_eq!(decoded, pattern);
}
