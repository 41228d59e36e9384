//! Paged archive container: a single-file format storing independently
//! addressable, optionally LZ4-compressed pages behind a self-describing
//! trailer. Grounded throughout on `original_source/include/PagedFile.h`
//! and `original_source/src/src/PagedFile.cpp`.

pub mod codec;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod format;
pub mod handle;
pub mod table;
pub mod view;

pub use descriptor::PageDescriptor;
pub use engine::Container;
pub use error::{CodecError, ContainerError};
pub use format::{CompressionKind, OpenMode, PageFormat, PageId, PageKind, MAGIC};
pub use handle::RandomAccessFile;
pub use table::PageTable;
pub use view::PageView;
