//! Container engine (component D): the open/close lifecycle, the
//! streaming page builder, random page reads, and compaction.
//!
//! Grounded in `PagedFile` (`original_source/include/PagedFile.h`,
//! `original_source/src/src/PagedFile.cpp`). Where the original reports
//! failure via a boolean/0 sentinel, this port returns `Result<_,
//! ContainerError>`, except for the cases `spec.md` calls out as
//! intentional sentinels: `read_page` returning `Ok(0)` for every failure
//! mode `ReadPage` itself folds into its `0` return (missing page, edit in
//! progress, undersized buffer, codec error), and `remove_pages` silently
//! skipping ids that don't name a `File`-kind page.

use std::path::{Path, PathBuf};

use super::codec;
use super::descriptor::PageDescriptor;
use super::error::ContainerError;
use super::format::{CompressionKind, OpenMode, PageFormat, PageId, PageKind, MAGIC};
use super::handle::{truncate_to, RandomAccessFile};
use super::table::PageTable;
use super::view::PageView;

/// A single open archive. Not `Sync`: a `Container` has one read/write
/// cursor and no internal locking, matching `spec.md` §5.
pub struct Container {
    handle: RandomAccessFile,
    table: PageTable,
    path: PathBuf,
    mode: OpenMode,
    /// Offset where the trailer will be written on close: the end of the
    /// payload region as of the last completed page edit.
    tail_pos: u64,
    /// `tail_pos` as of `open`, used to decide whether `close` must
    /// truncate (mirrors `PagedFile::old_tail_`).
    old_tail: u64,
    /// Id of the page currently being streamed via `new_page`/`write`, if
    /// any.
    editing: Option<PageId>,
    /// Scratch buffer shared by compression, decompression, and compaction
    /// moves. Grown on demand and never shrunk, mirroring `comp_buffer_` in
    /// `PagedFile` (`original_source/src/src/PagedFile.cpp`).
    scratch: Vec<u8>,
}

impl Container {
    /// Opens `path` according to `mode`. `Create` always starts from an
    /// empty table; `ReadOnly`/`ReadWrite` parse the existing trailer.
    pub fn open(path: &Path, mode: OpenMode) -> Result<Self, ContainerError> {
        let mut handle = RandomAccessFile::open(path, mode)?;

        let (table, tail_pos) = match mode {
            OpenMode::Create => {
                handle.seek_to(0)?;
                handle.write_all(&MAGIC.to_le_bytes())?;
                let tail_pos = handle.position()?;
                (PageTable::new(), tail_pos)
            }
            OpenMode::ReadOnly | OpenMode::ReadWrite => PageTable::parse_from(&mut handle)?,
        };

        Ok(Container {
            handle,
            table,
            path: path.to_path_buf(),
            mode,
            tail_pos,
            old_tail: tail_pos,
            editing: None,
            scratch: Vec::new(),
        })
    }

    /// Finalizes the container. With `save = true` (and mode != ReadOnly),
    /// writes the trailer and truncates the file if compaction shrank it.
    /// With `save = false`, the file is left exactly as it was on disk,
    /// discarding any pages appended this session.
    pub fn close(mut self, save: bool) -> Result<(), ContainerError> {
        if !save || self.mode == OpenMode::ReadOnly {
            return Ok(());
        }

        if self.editing.is_some() {
            self.end_new_page()?;
        }

        let file_length = self.table.serialize_to(&mut self.handle, self.tail_pos)?;
        self.handle.flush()?;
        let path = self.path.clone();
        let tail_pos = self.tail_pos;
        let old_tail = self.old_tail;
        drop(self.handle);

        if tail_pos < old_tail {
            truncate_to(&path, file_length)?;
        }
        Ok(())
    }

    /// Read-only view of the page table.
    pub fn header(&self) -> &PageTable {
        &self.table
    }

    /// Begins streaming a new page with id `idx` and an empty name.
    pub fn new_page(&mut self, idx: PageId) -> Result<(), ContainerError> {
        self.new_page_named(idx, String::new())
    }

    /// Begins streaming a new page with id `idx` and the given name.
    /// Only one page may be open for writing at a time.
    pub fn new_page_named(&mut self, idx: PageId, name: String) -> Result<(), ContainerError> {
        if self.mode == OpenMode::ReadOnly {
            return Err(ContainerError::WrongMode);
        }
        if self.editing.is_some() {
            return Err(ContainerError::EditInProgress);
        }
        if self.table.exists(idx) {
            return Err(ContainerError::IdCollision(idx));
        }

        self.handle.seek_to(self.tail_pos)?;
        let start = self.handle.position()?;

        self.table.add_page(
            idx,
            PageDescriptor {
                format: PageFormat::new(PageKind::File, CompressionKind::Plain),
                start,
                length: 0,
                uncompressed_length: 0,
                name,
            },
        );
        self.editing = Some(idx);
        Ok(())
    }

    /// Appends bytes to the page currently being streamed.
    pub fn write(&mut self, buf: &[u8]) -> Result<(), ContainerError> {
        if self.editing.is_none() {
            return Err(ContainerError::EditInProgress);
        }
        self.handle.write_all(buf)?;
        Ok(())
    }

    /// Finalizes the page started by `new_page`, recording its length from
    /// how far the write cursor advanced.
    pub fn end_new_page(&mut self) -> Result<(), ContainerError> {
        let idx = self.editing.ok_or(ContainerError::EditInProgress)?;
        let cur_pos = self.handle.position()?;
        let desc = self
            .table
            .desc_mut(idx)
            .expect("editing id always has a live descriptor");
        desc.length = cur_pos - desc.start;
        self.tail_pos = cur_pos;
        self.editing = None;
        Ok(())
    }

    /// One-shot page append: compresses `content` per `format`'s
    /// compression kind (falling back to plain storage if compression
    /// didn't shrink the payload), then writes it as a single page.
    pub fn append_page(
        &mut self,
        idx: PageId,
        name: String,
        format: PageFormat,
        content: &[u8],
    ) -> Result<(), ContainerError> {
        let (actual_compression, n) =
            codec::compress_for_append(format.compression(), content, &mut self.scratch)?;
        let actual_format = if actual_compression == CompressionKind::Plain {
            format.with_plain_compression()
        } else {
            format
        };

        self.new_page_named(idx, name)?;
        if actual_format.is_compressed() {
            self.handle.write_all(&self.scratch[..n])?;
        } else {
            self.handle.write_all(content)?;
        }
        self.end_new_page()?;

        let desc = self
            .table
            .desc_mut(idx)
            .expect("just inserted by new_page_named");
        desc.format = actual_format;
        if actual_format.is_compressed() {
            desc.uncompressed_length = content.len() as u64;
        }
        Ok(())
    }

    /// Inserts a zero-payload meta page (directory/symlink/hardlink entry).
    /// `name` is the entry's path as recorded in the table — for symlinks
    /// the caller packs in whatever target information the archive format
    /// needs to represent, since a meta page carries only this one string.
    pub fn new_meta_page(
        &mut self,
        idx: PageId,
        format: PageFormat,
        name: String,
    ) -> Result<(), ContainerError> {
        if self.editing.is_some() {
            return Err(ContainerError::EditInProgress);
        }
        if self.table.new_meta_page(idx, format, name) {
            Ok(())
        } else {
            Err(ContainerError::IdCollision(idx))
        }
    }

    /// Reads and decodes page `idx` into `buffer`, returning the number of
    /// decoded bytes written. Returns `Ok(0)` — never an `Err` — for every
    /// sentinel case `PagedFile::ReadPage` itself returns 0 for: an edit in
    /// progress, a missing or zero-length page, a buffer too small to hold
    /// the decoded bytes, or a codec failure while decompressing
    /// (`original_source/src/src/PagedFile.cpp:406-407,414-417,430-432,
    /// 457-460`; `spec.md` §4.4 steps 1, 2, 4, 5).
    pub fn read_page(&mut self, idx: PageId, buffer: &mut [u8]) -> Result<u64, ContainerError> {
        if self.editing.is_some() {
            return Ok(0);
        }
        let desc = match self.table.desc(idx) {
            Some(d) => d.clone(),
            None => return Ok(0),
        };

        let decoded_len = desc.decoded_length();
        if buffer.len() < decoded_len as usize {
            return Ok(0);
        }
        if desc.length == 0 {
            return Ok(0);
        }

        self.handle.seek_to(desc.start)?;
        let raw_len = desc.length as usize;
        if self.scratch.len() < raw_len {
            self.scratch.resize(raw_len, 0);
        }
        self.handle.read_exact(&mut self.scratch[..raw_len])?;

        let decoded = match desc.format.compression() {
            CompressionKind::Plain => {
                buffer[..raw_len].copy_from_slice(&self.scratch[..raw_len]);
                Ok(raw_len)
            }
            CompressionKind::Lz4Block => codec::decompress_block(&self.scratch[..raw_len], buffer),
            CompressionKind::Lz4Frame => codec::decompress_frame(&self.scratch[..raw_len], buffer),
        };

        Ok(decoded.unwrap_or(0) as u64)
    }

    /// Returns a standalone, fully decoded, seekable view of page `idx`.
    /// An absent or empty page yields an empty view rather than an error.
    pub fn create_page_view(&mut self, idx: PageId) -> Result<PageView, ContainerError> {
        let desc = match self.table.desc(idx) {
            Some(d) => d.clone(),
            None => return Ok(PageView::empty()),
        };
        if desc.length == 0 {
            return Ok(PageView::empty());
        }

        let mut buf = vec![0u8; desc.decoded_length() as usize];
        let n = self.read_page(idx, &mut buf)?;
        buf.truncate(n as usize);
        Ok(PageView::new(buf))
    }

    /// Positions the read/write cursor at the start of page `idx`'s raw
    /// payload. Only meaningful for pages with zero-offset-relative data
    /// (i.e. not currently being edited); fails for meta pages, which have
    /// no payload region.
    pub fn go_to_page(&mut self, idx: PageId) -> Result<(), ContainerError> {
        let desc = self.table.desc(idx).ok_or(ContainerError::IdMissing(idx))?;
        if desc.format.kind() != PageKind::File {
            return Err(ContainerError::WrongMode);
        }
        self.handle.seek_to(desc.start)?;
        Ok(())
    }

    /// Low-level positional read at the current cursor, bypassing the page
    /// table entirely. Requires no edit in progress.
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<(), ContainerError> {
        if self.editing.is_some() {
            return Err(ContainerError::EditInProgress);
        }
        self.handle.read_exact(buffer)?;
        Ok(())
    }

    /// Removes the given page ids and compacts the payload region in a
    /// single forward pass, sliding surviving `File` pages down to close
    /// the gaps left by deleted ones. Ids that don't name a `File`-kind
    /// page (directories, symlinks, hardlinks) are silently ignored:
    /// those pages are metadata and are never relocated or deleted.
    ///
    /// This is a direct port of `PagedFile::RemovePages`'s `move_dst`/
    /// `moving` state machine: once a deletion opens a gap, every
    /// surviving `File` page after it is read into a scratch buffer and
    /// rewritten at the gap's start, advancing the gap forward by that
    /// page's length. Reading a page before writing it to `move_dst` is
    /// always safe because `move_dst <= desc.start` throughout.
    pub fn remove_pages(&mut self, ids: &[PageId]) -> Result<(), ContainerError> {
        let old_order = self.table.list_pages().to_vec();

        let mut move_dst: u64 = 0;
        let mut moving = false;
        let mut new_order = Vec::with_capacity(old_order.len());

        for idx in old_order {
            let desc = self
                .table
                .desc(idx)
                .expect("id from list_pages always has a descriptor")
                .clone();

            if desc.format.kind() != PageKind::File {
                new_order.push(idx);
                continue;
            }

            let delete_page = ids.contains(&idx);

            if !moving {
                if delete_page {
                    self.table.remove_from_map(idx);
                    move_dst = desc.start;
                    moving = true;
                } else {
                    new_order.push(idx);
                }
            } else if delete_page {
                self.table.remove_from_map(idx);
            } else {
                self.scratch_move(desc.start, desc.length, move_dst)?;
                let moved = self
                    .table
                    .desc_mut(idx)
                    .expect("still present, only its start changes");
                moved.start = move_dst;
                new_order.push(idx);
                move_dst += desc.length;
            }
        }

        self.table.set_order(new_order);
        if moving {
            self.tail_pos = move_dst;
        }
        Ok(())
    }

    /// Reads `length` bytes from `src` and rewrites them at `dst` using the
    /// shared scratch buffer, growing it to the largest page length seen so
    /// far across the compaction pass rather than allocating fresh storage
    /// per move (`spec.md` §5's resource policy; `comp_buffer_.resize` in
    /// `PagedFile.cpp:423-425`).
    fn scratch_move(&mut self, src: u64, length: u64, dst: u64) -> Result<(), ContainerError> {
        let length = length as usize;
        if self.scratch.len() < length {
            self.scratch.resize(length, 0);
        }
        self.handle.seek_to(src)?;
        self.handle.read_exact(&mut self.scratch[..length])?;
        self.handle.seek_to(dst)?;
        self.handle.write_all(&self.scratch[..length])?;
        Ok(())
    }
}
