//! Random-access byte I/O handle over a single file (component A).
//!
//! Corresponds to the `std::fstream fs_` member of `PagedFile` in
//! `original_source/include/PagedFile.h`: one file, opened in binary mode,
//! with independent read and write cursors and an out-of-band truncate
//! operation performed after close. All multi-byte integers on the wire are
//! little-endian (`spec.md` §4.1).

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::format::OpenMode;

/// A single random-access file handle, in binary mode.
///
/// `RandomAccessFile` makes no buffering guarantees beyond the platform's:
/// callers must not interleave reads and writes without an intervening
/// `seek_read`/`seek_write`, matching `spec.md` §4.1.
pub struct RandomAccessFile {
    file: File,
    path: PathBuf,
}

impl RandomAccessFile {
    /// Opens `path` according to `mode`.
    ///
    /// - `ReadOnly`: the file must already exist.
    /// - `Create`: the file is truncated to empty (or created).
    /// - `ReadWrite`: the file must already exist; read and write cursors
    ///   are both available.
    pub fn open(path: &Path, mode: OpenMode) -> io::Result<Self> {
        let mut opts = OpenOptions::new();
        match mode {
            OpenMode::ReadOnly => {
                opts.read(true);
            }
            OpenMode::Create => {
                opts.read(true).write(true).create(true).truncate(true);
            }
            OpenMode::ReadWrite => {
                opts.read(true).write(true);
            }
        }
        let file = opts.open(path)?;
        Ok(RandomAccessFile {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Current length of the file as seen by the OS.
    pub fn len(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Moves the shared cursor to an absolute offset from the start of the
    /// file. Because reads and writes share one `File` descriptor here
    /// (mirroring the single `std::fstream` in the original), a seek
    /// affects both the next read and the next write.
    pub fn seek_to(&mut self, pos: u64) -> io::Result<u64> {
        self.file.seek(SeekFrom::Start(pos))
    }

    /// Seeks to the end of the file and returns the resulting offset.
    pub fn seek_to_end(&mut self) -> io::Result<u64> {
        self.file.seek(SeekFrom::End(0))
    }

    /// Current cursor position.
    pub fn position(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.file.read_exact(buf)
    }

    pub fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    /// Closes the handle, releasing the descriptor without touching file
    /// length. Truncation (if needed) happens separately via
    /// [`truncate_to`], after this handle is dropped, to avoid interactions
    /// with platform-specific buffering (`spec.md` §4.1).
    pub fn close(self) {
        drop(self);
    }
}

/// Truncates the file at `path` to exactly `len` bytes. Reopens the path
/// rather than reusing a live handle, matching the "truncate after close"
/// ordering required by `spec.md` §4.1.
pub fn truncate_to(path: &Path, len: u64) -> io::Result<()> {
    let file = OpenOptions::new().write(true).open(path)?;
    file.set_len(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn create_then_write_then_read_back() {
        let tmp = NamedTempFile::new().unwrap();
        {
            let mut h = RandomAccessFile::open(tmp.path(), OpenMode::Create).unwrap();
            h.write_all(b"hello").unwrap();
        }
        let mut h = RandomAccessFile::open(tmp.path(), OpenMode::ReadWrite).unwrap();
        h.seek_to(0).unwrap();
        let mut buf = [0u8; 5];
        h.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn truncate_shrinks_file() {
        let tmp = NamedTempFile::new().unwrap();
        {
            let mut h = RandomAccessFile::open(tmp.path(), OpenMode::Create).unwrap();
            h.write_all(b"0123456789").unwrap();
        }
        truncate_to(tmp.path(), 4).unwrap();
        let h = RandomAccessFile::open(tmp.path(), OpenMode::ReadOnly).unwrap();
        assert_eq!(h.len().unwrap(), 4);
    }
}
