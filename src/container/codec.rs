//! Archive-specific compression policy layered over the LZ4 block/frame
//! codec (component B's archive-facing half).
//!
//! The codec proper (`crate::block`, `crate::frame`) is a faithful port of
//! the reference LZ4 implementation; this module applies the policies
//! `spec.md` §4.2 describes: format selection by input size, and
//! fallback-on-no-gain for the one-shot append path. Compression and
//! decompression both work against a caller-owned scratch buffer rather
//! than allocating fresh storage per call, mirroring `comp_buffer_` in
//! `PagedFile` (`original_source/src/src/PagedFile.cpp`), which is grown
//! on demand and reused across every `AppendPage`/`ReadPage` call.

use crate::block::compress::{compress_bound, compress_default, LZ4_MAX_INPUT_SIZE};
use crate::block::decompress_api::decompress_safe;
use crate::frame::compress::lz4f_compress_frame;
use crate::frame::decompress::{
    lz4f_create_decompression_context, lz4f_decompress, lz4f_reset_decompression_context,
};
use crate::frame::header::lz4f_compress_frame_bound;
use crate::frame::types::{FrameInfo, Preferences};

use super::error::CodecError;
use super::format::CompressionKind;

/// Returns `LZ4Block` for inputs that fit in a single LZ4 block, else
/// `LZ4Frame`. Equivalent to `PagedFile::ChooseCompressionFormat`.
pub fn choose_format(len: u64) -> CompressionKind {
    if len <= LZ4_MAX_INPUT_SIZE as u64 {
        CompressionKind::Lz4Block
    } else {
        CompressionKind::Lz4Frame
    }
}

/// Compresses `src` with the requested codec for the one-shot append path,
/// growing `scratch` to fit the compressed output and writing into it in
/// place (`comp_buffer_.resize` + `LZ4_compress_default`/`LZ4F_compressFrame`
/// in `PagedFile::AppendPage`).
///
/// Returns the codec actually used and the number of valid bytes written to
/// the front of `scratch`. If compression did not strictly shrink the
/// input, the result is `(CompressionKind::Plain, 0)` — the fallback-on-
/// no-gain rule (`spec.md` §4.2, invariant 5) — and the caller is expected
/// to write `src` itself rather than anything in `scratch`.
pub fn compress_for_append(
    kind: CompressionKind,
    src: &[u8],
    scratch: &mut Vec<u8>,
) -> Result<(CompressionKind, usize), CodecError> {
    let n = match kind {
        CompressionKind::Plain => return Ok((CompressionKind::Plain, 0)),
        CompressionKind::Lz4Block => {
            let bound = compress_bound(src.len() as i32).max(0) as usize;
            if scratch.len() < bound {
                scratch.resize(bound, 0);
            }
            compress_default(src, &mut scratch[..bound]).map_err(CodecError::Block)?
        }
        CompressionKind::Lz4Frame => {
            let mut prefs = Preferences::default();
            prefs.frame_info = FrameInfo {
                content_size: src.len() as u64,
                ..FrameInfo::default()
            };
            let bound = lz4f_compress_frame_bound(src.len(), Some(&prefs));
            if scratch.len() < bound {
                scratch.resize(bound, 0);
            }
            lz4f_compress_frame(&mut scratch[..bound], src, Some(&prefs)).map_err(CodecError::Frame)?
        }
    };

    if n >= src.len() {
        Ok((CompressionKind::Plain, 0))
    } else {
        Ok((kind, n))
    }
}

/// Decompresses a single LZ4 block payload directly into `dst`, returning
/// the number of bytes produced. Equivalent to the `kLZ4Block` branch of
/// `PagedFile::ReadPage`, which decodes straight into the caller's output
/// buffer rather than through an intermediate allocation.
pub fn decompress_block(src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
    decompress_safe(src, dst).map_err(CodecError::BlockDecompress)
}

/// Decompresses an LZ4 frame payload directly into `dst`, driving the
/// streaming decoder in a loop until the compressed source is exhausted.
/// Equivalent to the `kLZ4Frame` branch of `PagedFile::ReadPage`.
pub fn decompress_frame(src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
    let mut dctx = lz4f_create_decompression_context(100).map_err(CodecError::Frame)?;
    lz4f_reset_decompression_context(&mut dctx);

    let mut dst_consumed = 0usize;
    let mut src_pos = 0usize;

    while src_pos < src.len() {
        let (consumed, produced, hint) =
            lz4f_decompress(&mut dctx, Some(&mut dst[dst_consumed..]), &src[src_pos..], None)
                .map_err(CodecError::Frame)?;
        src_pos += consumed;
        dst_consumed += produced;
        if hint == 0 && consumed == 0 && produced == 0 {
            break;
        }
    }

    Ok(dst_consumed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::compress::LZ4_MAX_INPUT_SIZE;

    #[test]
    fn chooses_block_for_small_input() {
        assert_eq!(choose_format(16), CompressionKind::Lz4Block);
        assert_eq!(choose_format(LZ4_MAX_INPUT_SIZE as u64), CompressionKind::Lz4Block);
    }

    #[test]
    fn chooses_frame_for_large_input() {
        assert_eq!(
            choose_format(LZ4_MAX_INPUT_SIZE as u64 + 1),
            CompressionKind::Lz4Frame
        );
    }

    #[test]
    fn block_round_trip() {
        let src = b"hello hello hello hello hello hello".repeat(10);
        let mut scratch = Vec::new();
        let (kind, n) = compress_for_append(CompressionKind::Lz4Block, &src, &mut scratch).unwrap();
        assert_eq!(kind, CompressionKind::Lz4Block);
        let mut decoded = vec![0u8; src.len()];
        let decoded_len = decompress_block(&scratch[..n], &mut decoded).unwrap();
        assert_eq!(&decoded[..decoded_len], &src[..]);
    }

    #[test]
    fn larger_block_payload_round_trips() {
        let src = vec![0u8; 200_000];
        let mut scratch = Vec::new();
        let (kind, n) = compress_for_append(CompressionKind::Lz4Block, &src, &mut scratch).unwrap();
        assert_eq!(kind, CompressionKind::Lz4Block);
        let mut decoded = vec![0u8; src.len()];
        let decoded_len = decompress_block(&scratch[..n], &mut decoded).unwrap();
        assert_eq!(&decoded[..decoded_len], &src[..]);
    }

    #[test]
    fn lz4_frame_codec_round_trip_explicit() {
        let src: Vec<u8> = (0..500_000u32).map(|i| (i % 251) as u8).collect();
        let mut scratch = Vec::new();
        let (kind, n) = compress_for_append(CompressionKind::Lz4Frame, &src, &mut scratch).unwrap();
        assert_eq!(kind, CompressionKind::Lz4Frame);
        let mut decoded = vec![0u8; src.len()];
        let decoded_len = decompress_frame(&scratch[..n], &mut decoded).unwrap();
        assert_eq!(&decoded[..decoded_len], &src[..]);
    }

    #[test]
    fn fallback_on_no_gain_returns_plain() {
        // Incompressible random-ish bytes: a short xorshift sequence has no
        // LZ4-exploitable redundancy, so the compressed form should not
        // shrink below the original.
        let mut state = 0x243F_6A88_85A3_08D3u64;
        let src: Vec<u8> = (0..16)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state & 0xff) as u8
            })
            .collect();
        let mut scratch = Vec::new();
        let (kind, n) = compress_for_append(CompressionKind::Lz4Block, &src, &mut scratch).unwrap();
        assert_eq!(kind, CompressionKind::Plain);
        assert_eq!(n, 0);
    }

    #[test]
    fn scratch_buffer_is_reused_and_grows_as_needed() {
        let mut scratch = Vec::new();
        let small = vec![0u8; 64];
        compress_for_append(CompressionKind::Lz4Block, &small, &mut scratch).unwrap();
        let small_cap = scratch.len();

        let large = vec![0u8; 1_000_000];
        compress_for_append(CompressionKind::Lz4Block, &large, &mut scratch).unwrap();
        assert!(scratch.len() >= small_cap, "scratch must never shrink between calls");
    }
}
