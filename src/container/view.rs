//! Page input view (component E): an owned, seekable byte view over a
//! fully decoded page.
//!
//! Grounded in `PagedFile::PageInputStream` (`original_source/include/
//! PagedFile.h`), which wraps a decoded buffer in a `std::istream`. Rust's
//! `Read`/`Seek` traits let [`PageView`] play that role directly over an
//! owned `Vec<u8>`, per `spec.md` §9's design note.
use std::io::{self, Read, Seek, SeekFrom};

/// A decoded page's bytes, with an independent read cursor. Cheap to
/// construct for empty pages: a missing or zero-length page yields an
/// empty view rather than an error (`spec.md` §4.6).
pub struct PageView {
    data: Vec<u8>,
    pos: usize,
}

impl PageView {
    pub fn new(data: Vec<u8>) -> Self {
        PageView { data, pos: 0 }
    }

    pub fn empty() -> Self {
        PageView::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Read for PageView {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.data[self.pos.min(self.data.len())..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl Seek for PageView {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(p) => p as i64,
            SeekFrom::End(offset) => self.data.len() as i64 + offset,
            SeekFrom::Current(offset) => self.pos as i64 + offset,
        };
        if new_pos < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative position",
            ));
        }
        self.pos = new_pos as usize;
        Ok(self.pos as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_sequentially() {
        let mut v = PageView::new(b"hello world".to_vec());
        let mut buf = [0u8; 5];
        v.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn seek_from_end_then_read() {
        let mut v = PageView::new(b"hello world".to_vec());
        v.seek(SeekFrom::End(-5)).unwrap();
        let mut buf = [0u8; 5];
        v.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"world");
    }

    #[test]
    fn empty_view_reads_zero_bytes() {
        let mut v = PageView::empty();
        let mut buf = [0u8; 4];
        assert_eq!(v.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn rejects_negative_seek() {
        let mut v = PageView::new(vec![1, 2, 3]);
        assert!(v.seek(SeekFrom::Current(-1)).is_err());
    }
}
