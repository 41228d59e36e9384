//! Page table (component C): an ordered, id-keyed collection of page
//! descriptors, plus its on-disk trailer serialization.
//!
//! Corresponds to `PagedFileHeader` in
//! `original_source/include/PagedFile.h`/`.cpp`. Wire format is exactly
//! `spec.md` §4.3's "Parse"/"Serialize" byte layout.

use std::collections::HashMap;

use super::descriptor::PageDescriptor;
use super::error::ContainerError;
use super::format::{PageFormat, PageId, MAGIC};
use super::handle::RandomAccessFile;

/// In-memory page table: a unique-key mapping plus the insertion-order
/// sequence that is the canonical enumeration order (`spec.md` §3,
/// invariant 1).
#[derive(Debug, Default)]
pub struct PageTable {
    by_id: HashMap<PageId, PageDescriptor>,
    order: Vec<PageId>,
}

// ── Little-endian wire helpers ──────────────────────────────────────────────
// Mirrors the style of `frame::header::{read_le32, write_le32, ...}`: plain
// functions over explicit byte arrays, no alignment assumptions.

fn read_u16(h: &mut RandomAccessFile) -> Result<u16, ContainerError> {
    let mut buf = [0u8; 2];
    h.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32(h: &mut RandomAccessFile) -> Result<u32, ContainerError> {
    let mut buf = [0u8; 4];
    h.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(h: &mut RandomAccessFile) -> Result<u64, ContainerError> {
    let mut buf = [0u8; 8];
    h.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_i64(h: &mut RandomAccessFile) -> Result<i64, ContainerError> {
    let mut buf = [0u8; 8];
    h.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

impl PageTable {
    pub fn new() -> Self {
        PageTable::default()
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.order.clear();
    }

    pub fn exists(&self, id: PageId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn desc(&self, id: PageId) -> Option<&PageDescriptor> {
        self.by_id.get(&id)
    }

    pub fn desc_mut(&mut self, id: PageId) -> Option<&mut PageDescriptor> {
        self.by_id.get_mut(&id)
    }

    /// Appends a new descriptor. Caller guarantees `id` is unique —
    /// mirrors `PagedFileHeader::AddPage`, which does not itself check.
    pub fn add_page(&mut self, id: PageId, desc: PageDescriptor) {
        self.by_id.insert(id, desc);
        self.order.push(id);
    }

    /// Inserts a zero-payload descriptor, failing if `id` already exists.
    pub fn new_meta_page(&mut self, id: PageId, format: PageFormat, name: String) -> bool {
        if self.by_id.contains_key(&id) {
            return false;
        }
        self.add_page(id, PageDescriptor::meta(format, name));
        true
    }

    /// Removes `id` from the mapping only — the caller is responsible for
    /// also removing it from `order` (or replacing `order` wholesale, as
    /// `Container::remove_pages` does during compaction).
    pub fn remove_from_map(&mut self, id: PageId) {
        self.by_id.remove(&id);
    }

    /// Replaces the insertion-order sequence. Used by compaction, which
    /// rebuilds the order while removing deleted ids and preserving the
    /// relative order of survivors (`spec.md` §4.4).
    pub fn set_order(&mut self, order: Vec<PageId>) {
        self.order = order;
    }

    /// Canonical enumeration order.
    pub fn list_pages(&self) -> &[PageId] {
        &self.order
    }

    /// Subset of ids whose name starts with `prefix` (byte-wise, not
    /// path-aware). Empty `prefix` returns [`list_pages`] verbatim; a
    /// nonempty prefix returns results in unspecified order, matching
    /// `spec.md` §4.3.
    pub fn list_pages_with_prefix(&self, prefix: &str) -> Vec<PageId> {
        if prefix.is_empty() {
            return self.order.clone();
        }
        self.by_id
            .iter()
            .filter(|(_, desc)| desc.name.starts_with(prefix))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Parses a table trailer from `handle`, which must be positioned at a
    /// file of length ≥ 12 whose first 4 bytes are the magic number.
    /// Returns the table and the recovered `tail_pos`.
    pub fn parse_from(handle: &mut RandomAccessFile) -> Result<(PageTable, u64), ContainerError> {
        let len = handle.len()?;
        if len < 12 {
            return Err(ContainerError::MagicMismatch);
        }

        handle.seek_to(0)?;
        let magic = read_u32(handle)?;
        if magic != MAGIC {
            return Err(ContainerError::MagicMismatch);
        }

        handle.seek_to(len - 8)?;
        let trailer_length = read_i64(handle)?;
        if trailer_length < 0 || (trailer_length as u64) > len - 8 {
            return Err(ContainerError::TrailerMalformed);
        }

        let tail_pos = len - 8 - trailer_length as u64;
        handle.seek_to(tail_pos)?;

        let num_pages = read_u32(handle)?;
        let mut table = PageTable::new();
        for _ in 0..num_pages {
            let id = read_u32(handle)?;
            let start = read_u64(handle)?;
            let length = read_u64(handle)?;
            let raw_format = read_u16(handle)?;
            let format = PageFormat::from_raw(raw_format)
                .ok_or(ContainerError::FormatInvalid(raw_format))?;

            let uncompressed_length = if format.is_compressed() {
                read_u64(handle)?
            } else {
                0
            };

            let name_length = read_u16(handle)?;
            let name = if name_length == 0 {
                String::new()
            } else {
                let mut buf = vec![0u8; name_length as usize];
                handle.read_exact(&mut buf)?;
                String::from_utf8(buf).map_err(|_| ContainerError::TrailerMalformed)?
            };

            table.add_page(
                id,
                PageDescriptor {
                    format,
                    start,
                    length,
                    uncompressed_length,
                    name,
                },
            );
        }

        // The descriptor stream just read must run up exactly to where the
        // trailing back-pointer begins. A mismatch here means `trailer_length`
        // and the actual descriptor bytes disagree — most commonly because
        // the back-pointer was corrupted (e.g. zeroed) independently of the
        // page table bytes it is supposed to describe.
        if handle.position()? != len - 8 {
            return Err(ContainerError::TrailerMalformed);
        }

        Ok((table, tail_pos))
    }

    /// Writes the trailer at `tail_pos` and returns the resulting file
    /// length (= end of the freshly written trailer). Mirrors
    /// `PagedFileHeader::WriteToFile`.
    pub fn serialize_to(&self, handle: &mut RandomAccessFile, tail_pos: u64) -> Result<u64, ContainerError> {
        handle.seek_to(tail_pos)?;

        handle.write_all(&(self.order.len() as u32).to_le_bytes())?;

        for &id in &self.order {
            let desc = self
                .by_id
                .get(&id)
                .expect("order and by_id are kept in lock-step");

            handle.write_all(&id.to_le_bytes())?;
            handle.write_all(&desc.start.to_le_bytes())?;
            handle.write_all(&desc.length.to_le_bytes())?;
            handle.write_all(&desc.format.raw().to_le_bytes())?;
            if desc.format.is_compressed() {
                handle.write_all(&desc.uncompressed_length.to_le_bytes())?;
            }
            let name_bytes = desc.name.as_bytes();
            handle.write_all(&(name_bytes.len() as u16).to_le_bytes())?;
            if !name_bytes.is_empty() {
                handle.write_all(name_bytes)?;
            }
        }

        let end_of_trailer = handle.position()?;
        let trailer_length = (end_of_trailer - tail_pos) as i64;
        handle.write_all(&trailer_length.to_le_bytes())?;
        handle.position().map_err(ContainerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::format::{CompressionKind, OpenMode, PageKind};
    use tempfile::NamedTempFile;

    fn sample_table() -> PageTable {
        let mut t = PageTable::new();
        t.add_page(
            1,
            PageDescriptor {
                format: PageFormat::new(PageKind::File, CompressionKind::Plain),
                start: 4,
                length: 5,
                uncompressed_length: 0,
                name: "hello".into(),
            },
        );
        t.add_page(
            2,
            PageDescriptor {
                format: PageFormat::new(PageKind::File, CompressionKind::Lz4Block),
                start: 9,
                length: 20,
                uncompressed_length: 200_000,
                name: "z".into(),
            },
        );
        t
    }

    #[test]
    fn serialize_then_parse_round_trips() {
        let tmp = NamedTempFile::new().unwrap();
        let mut h = RandomAccessFile::open(tmp.path(), OpenMode::Create).unwrap();
        h.write_all(&MAGIC.to_le_bytes()).unwrap();

        let table = sample_table();
        table.serialize_to(&mut h, 4).unwrap();
        drop(h);

        let mut h = RandomAccessFile::open(tmp.path(), OpenMode::ReadOnly).unwrap();
        let (parsed, tail_pos) = PageTable::parse_from(&mut h).unwrap();
        assert_eq!(tail_pos, 4);
        assert_eq!(parsed.list_pages(), &[1, 2]);
        assert_eq!(parsed.desc(1).unwrap().name, "hello");
        assert_eq!(parsed.desc(2).unwrap().uncompressed_length, 200_000);
    }

    #[test]
    fn serializing_twice_is_byte_identical() {
        let tmp1 = NamedTempFile::new().unwrap();
        let tmp2 = NamedTempFile::new().unwrap();
        let table = sample_table();

        for tmp in [&tmp1, &tmp2] {
            let mut h = RandomAccessFile::open(tmp.path(), OpenMode::Create).unwrap();
            h.write_all(&MAGIC.to_le_bytes()).unwrap();
            table.serialize_to(&mut h, 4).unwrap();
        }

        assert_eq!(
            std::fs::read(tmp1.path()).unwrap(),
            std::fs::read(tmp2.path()).unwrap()
        );
    }

    #[test]
    fn empty_table_round_trips() {
        let tmp = NamedTempFile::new().unwrap();
        let mut h = RandomAccessFile::open(tmp.path(), OpenMode::Create).unwrap();
        h.write_all(&MAGIC.to_le_bytes()).unwrap();
        PageTable::new().serialize_to(&mut h, 4).unwrap();
        drop(h);

        let mut h = RandomAccessFile::open(tmp.path(), OpenMode::ReadOnly).unwrap();
        let (parsed, tail_pos) = PageTable::parse_from(&mut h).unwrap();
        assert_eq!(tail_pos, 4);
        assert!(parsed.list_pages().is_empty());
    }

    #[test]
    fn rejects_bad_magic() {
        let tmp = NamedTempFile::new().unwrap();
        let mut h = RandomAccessFile::open(tmp.path(), OpenMode::Create).unwrap();
        h.write_all(b"NOPE").unwrap();
        PageTable::new().serialize_to(&mut h, 4).unwrap();
        drop(h);

        let mut h = RandomAccessFile::open(tmp.path(), OpenMode::ReadOnly).unwrap();
        assert!(matches!(
            PageTable::parse_from(&mut h),
            Err(ContainerError::MagicMismatch)
        ));
    }

    #[test]
    fn rejects_zeroed_trailer_back_pointer() {
        let tmp = NamedTempFile::new().unwrap();
        {
            let mut h = RandomAccessFile::open(tmp.path(), OpenMode::Create).unwrap();
            h.write_all(&MAGIC.to_le_bytes()).unwrap();
            sample_table().serialize_to(&mut h, 4).unwrap();
        }

        // Zero out the last 8 bytes (the trailer_length back-pointer),
        // leaving the real descriptor bytes in place but unreachable.
        let len = std::fs::metadata(tmp.path()).unwrap().len();
        let mut h = RandomAccessFile::open(tmp.path(), OpenMode::ReadWrite).unwrap();
        h.seek_to(len - 8).unwrap();
        h.write_all(&[0u8; 8]).unwrap();
        drop(h);

        let mut h = RandomAccessFile::open(tmp.path(), OpenMode::ReadOnly).unwrap();
        assert!(matches!(
            PageTable::parse_from(&mut h),
            Err(ContainerError::TrailerMalformed)
        ));
    }

    #[test]
    fn rejects_oversized_trailer_length() {
        let tmp = NamedTempFile::new().unwrap();
        {
            let mut h = RandomAccessFile::open(tmp.path(), OpenMode::Create).unwrap();
            h.write_all(&MAGIC.to_le_bytes()).unwrap();
            PageTable::new().serialize_to(&mut h, 4).unwrap();
        }
        let len = std::fs::metadata(tmp.path()).unwrap().len();
        let mut h = RandomAccessFile::open(tmp.path(), OpenMode::ReadWrite).unwrap();
        h.seek_to(len - 8).unwrap();
        h.write_all(&i64::MAX.to_le_bytes()).unwrap();
        drop(h);

        let mut h = RandomAccessFile::open(tmp.path(), OpenMode::ReadOnly).unwrap();
        assert!(matches!(
            PageTable::parse_from(&mut h),
            Err(ContainerError::TrailerMalformed)
        ));
    }
}
