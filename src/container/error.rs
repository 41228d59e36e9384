//! Error type for the container engine.
//!
//! Mirrors the error-kind taxonomy from `spec.md` §7. Unlike the C++
//! original (which reports failures via boolean/0/empty-value sentinels),
//! mutating operations here return `Result<_, ContainerError>` except where
//! the spec explicitly tests the sentinel itself (`read_page` returning
//! `Ok(0)`, `remove_pages` silently skipping non-file ids).

use core::fmt;

use crate::block::compress::Lz4Error;
use crate::block::decompress_core::DecompressError;
use crate::frame::types::Lz4FError;

use super::format::PageId;

/// Errors produced by the container engine (component D) and its page
/// table (component C).
#[derive(Debug)]
pub enum ContainerError {
    /// The container is not open, or was already closed.
    NotOpen,
    /// The operation is not permitted in the container's current open mode
    /// (e.g. a mutation attempted on a `ReadOnly` container).
    WrongMode,
    /// A page edit is already in progress (`new_page` was called twice
    /// without an intervening `end_new_page`), or the requested operation
    /// cannot run while one is in progress.
    EditInProgress,
    /// `new_page` / `new_meta_page` was called with an id already present
    /// in the table.
    IdCollision(PageId),
    /// The requested page id is not present in the table.
    IdMissing(PageId),
    /// The caller-supplied buffer is smaller than the page requires.
    BufferTooSmall,
    /// The `format` field's compression bits do not name a known codec.
    FormatInvalid(u16),
    /// The LZ4 codec reported a failure (corruption, oversized input, etc).
    Codec(CodecError),
    /// The underlying file I/O failed.
    Io(std::io::Error),
    /// The first four bytes of the file are not the `PFAR` magic number.
    MagicMismatch,
    /// The trailer back-pointer is negative, or points outside the file.
    TrailerMalformed,
}

/// Errors from the LZ4 block/frame codec, adapted to the container's needs.
#[derive(Debug)]
pub enum CodecError {
    Block(Lz4Error),
    BlockDecompress(DecompressError),
    Frame(Lz4FError),
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerError::NotOpen => write!(f, "container is not open"),
            ContainerError::WrongMode => write!(f, "operation not permitted in this open mode"),
            ContainerError::EditInProgress => write!(f, "a page edit is already in progress"),
            ContainerError::IdCollision(id) => write!(f, "page id {id} already exists"),
            ContainerError::IdMissing(id) => write!(f, "page id {id} does not exist"),
            ContainerError::BufferTooSmall => write!(f, "destination buffer is too small"),
            ContainerError::FormatInvalid(fmt_bits) => {
                write!(f, "page format {fmt_bits:#06x} is invalid")
            }
            ContainerError::Codec(e) => write!(f, "codec error: {e}"),
            ContainerError::Io(e) => write!(f, "I/O error: {e}"),
            ContainerError::MagicMismatch => write!(f, "magic number mismatch"),
            ContainerError::TrailerMalformed => write!(f, "trailer is malformed"),
        }
    }
}

impl std::error::Error for ContainerError {}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Block(e) => write!(f, "{e:?}"),
            CodecError::BlockDecompress(e) => write!(f, "{e:?}"),
            CodecError::Frame(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<std::io::Error> for ContainerError {
    fn from(e: std::io::Error) -> Self {
        ContainerError::Io(e)
    }
}

impl From<CodecError> for ContainerError {
    fn from(e: CodecError) -> Self {
        ContainerError::Codec(e)
    }
}
