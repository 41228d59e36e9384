//! Page descriptor — per-page metadata kept in the page table.

use super::format::PageFormat;

/// Metadata for one page. Corresponds to `PagedFileHeader::PageDesc` in
/// `original_source/include/PagedFile.h`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    pub format: PageFormat,
    /// Byte offset of the payload in the container. `0` for non-file kinds.
    pub start: u64,
    /// Payload length on disk (post-compression if compressed). `0` for
    /// non-file kinds.
    pub length: u64,
    /// Original payload length. Only meaningful (and only persisted) when
    /// `format.is_compressed()`.
    pub uncompressed_length: u64,
    pub name: String,
}

impl PageDescriptor {
    /// A zero-payload descriptor for directory/symlink/hardlink meta pages.
    pub fn meta(format: PageFormat, name: String) -> Self {
        PageDescriptor {
            format,
            start: 0,
            length: 0,
            uncompressed_length: 0,
            name,
        }
    }

    /// The length a caller must read to recover the original bytes: the
    /// uncompressed length when compressed, else the on-disk length.
    pub fn decoded_length(&self) -> u64 {
        if self.format.is_compressed() {
            self.uncompressed_length
        } else {
            self.length
        }
    }
}
