//! LZO1X block format: constants, error types and the one-shot API.
//!
//! The stream layout is a sequence of tokens, each either a literal run or a
//! back-reference of one of four classes, selected by the leading
//! instruction byte:
//!
//! | Class | instruction byte | max distance | length                |
//! |-------|------------------|--------------|-----------------------|
//! | M1    | 0..16 (state 1-3)| 0x0400       | 2                     |
//! | M1    | 0..16 (state 4)  | 0x0C00       | 3                     |
//! | M4    | 16..32           | 0xBFFF       | 3..9, zero-extended   |
//! | M3    | 32..64           | 0x4000       | 3..33, zero-extended  |
//! | M2    | 64..256          | 0x0800       | 3..8                  |
//!
//! Up to 3 trailing literals after a match ride in the low 2 bits of the
//! last emitted opcode byte. The stream ends with `0x11 0x00 0x00`, an M4
//! token with encoded distance zero.

pub mod compress;
pub mod compress_hc;
pub mod decompress;
pub(crate) mod encode;
pub(crate) mod hashtable;

use alloc::vec::Vec;
use core::fmt;

// ─── Match offset bounds (max backward distance per class) ───

pub(crate) const MAX_OFFSET_M1: usize = 0x0400;
pub(crate) const MAX_OFFSET_M2: usize = 0x0800;
pub(crate) const MAX_OFFSET_M3: usize = 0x4000;
pub(crate) const MAX_OFFSET_M4: usize = 0xbfff;
/// Upper distance bound of the M1 form selected after a 4+ literal run.
pub(crate) const MAX_OFFSET_MX: usize = MAX_OFFSET_M1 + MAX_OFFSET_M2;

// ─── Match length bounds per class ───

pub(crate) const MIN_LEN_M2: usize = 3;
pub(crate) const MAX_LEN_M2: usize = 8;
pub(crate) const MAX_LEN_M3: usize = 33;
pub(crate) const MAX_LEN_M4: usize = 9;

// ─── Instruction byte markers ───

pub(crate) const MARKER_M1: u8 = 0;
pub(crate) const MARKER_M4: u8 = 16;
pub(crate) const MARKER_M3: u8 = 32;
pub(crate) const MARKER_M2: u8 = 64;

/// Base distance of the state-4 short match form.
pub(crate) const SHORT_MATCH_BASE_OFFSET: usize = 0x0800;

/// Every valid stream ends with these three bytes: an M4 instruction whose
/// encoded distance is zero and whose length field decodes to 3.
pub(crate) const STREAM_TERMINATOR: [u8; 3] = [MARKER_M4 | 1, 0, 0];

/// Cap on the number of zero bytes in a zero-extended length so that
/// `255 * chunks` cannot overflow during reconstruction.
pub(crate) const MAX_ZERO_EXTENDED_CHUNKS: usize = usize::MAX / 255 - 2;

/// Returns the worst-case compressed size for `input_len` bytes, including
/// the stream terminator. Compression output never exceeds this bound.
#[inline]
pub fn max_compressed_size(input_len: usize) -> usize {
    input_len + input_len / 16 + 64 + 3
}

// ─────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────

/// Errors returned by LZO1X decompression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecompressError {
    /// The source buffer has zero bytes.
    EmptyInput,
    /// The decoder would read past the end of the source, or the stream
    /// carries a malformed terminator.
    InputOverrun,
    /// The decoder would write past the end of the destination buffer.
    OutputOverrun,
    /// A back-reference points before the start of the output.
    LookbehindUnderrun,
    /// The source ended in a state where more bytes were required.
    UnexpectedEof,
    /// The stream reader exceeded the caller's input-size bound.
    InputTooLarge,
}

impl fmt::Display for DecompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecompressError::EmptyInput => f.write_str("empty input"),
            DecompressError::InputOverrun => f.write_str("input overrun"),
            DecompressError::OutputOverrun => f.write_str("output overrun"),
            DecompressError::LookbehindUnderrun => f.write_str("lookbehind underrun"),
            DecompressError::UnexpectedEof => f.write_str("unexpected end of input"),
            DecompressError::InputTooLarge => f.write_str("input exceeds max_input_size"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecompressError {}

/// Errors returned by LZO1X compression.
///
/// A well-formed input never produces an error; `Internal` indicates an
/// invariant violation inside the matcher or token encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompressError {
    /// Internal invariant violation in the matcher/encoder.
    Internal,
}

impl fmt::Display for CompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressError::Internal => f.write_str("internal compressor error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CompressError {}

// ─────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────

/// Configuration for decompression entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompressOptions {
    /// Expected decompressed size. The decoder never writes more than this
    /// many bytes; the result may be shorter if the terminator arrives
    /// early.
    pub out_len: usize,
    /// Byte bound applied by [`decompress_from_reader`](crate::decompress_from_reader)
    /// when draining the reader. `0` means unlimited.
    pub max_input_size: usize,
}

impl DecompressOptions {
    /// Options with the given output length and no input bound.
    pub fn new(out_len: usize) -> Self {
        DecompressOptions {
            out_len,
            max_input_size: 0,
        }
    }
}

/// Configuration for compression entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// Compression level. Clamped to `0..=9`; 0 and 1 select the fast
    /// LZO1X-1 parser, 2..=9 the LZO1X-999 parser.
    pub level: i32,
}

impl Default for CompressOptions {
    fn default() -> Self {
        CompressOptions { level: 1 }
    }
}

// ─────────────────────────────────────────────────────────────────────────
// One-shot API
// ─────────────────────────────────────────────────────────────────────────

/// Compress all bytes of `input` at the given level.
///
/// The level is clamped to `0..=9`: 0 and 1 run the fast LZO1X-1 parser
/// (identical output), 2..=9 run LZO1X-999 with increasing search depth.
pub fn compress(input: &[u8], level: i32) -> Result<Vec<u8>, CompressError> {
    let level = level.max(0);
    if level <= 1 {
        return compress::compress_fast(input);
    }
    compress_hc::compress_999_level(input, level.min(9) as usize)
}

/// Compress all bytes of `input` with the LZO1X-999 parser.
///
/// The level is clamped to `1..=9`. Level 1 here is the shallowest 999
/// search, not the fast parser.
pub fn compress_999(input: &[u8], level: i32) -> Result<Vec<u8>, CompressError> {
    compress_hc::compress_999_level(input, level.clamp(1, 9) as usize)
}

/// Compress with an options record. Equivalent to
/// `compress(input, opts.level)`.
pub fn compress_with(input: &[u8], opts: &CompressOptions) -> Result<Vec<u8>, CompressError> {
    compress(input, opts.level)
}

pub use decompress::{decompress, decompress_into, decompress_n, decompress_n_into};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_is_clamped() {
        let data: Vec<u8> = b"0123456789abcdef".repeat(512);

        let neg = compress(&data, -100).unwrap();
        let zero = compress(&data, 0).unwrap();
        assert_eq!(neg, zero);

        let high = compress(&data, 100).unwrap();
        let nine = compress(&data, 9).unwrap();
        assert_eq!(high, nine);
    }

    #[test]
    fn fast_levels_are_identical() {
        let data: Vec<u8> = b"ABCDEF123456".repeat(1024);
        assert_eq!(compress(&data, 0).unwrap(), compress(&data, 1).unwrap());
    }

    #[test]
    fn default_options_select_level_one() {
        let data: Vec<u8> = b"ABCDEF123456".repeat(256);
        let by_default = compress_with(&data, &CompressOptions::default()).unwrap();
        let by_level = compress(&data, 1).unwrap();
        assert_eq!(by_default, by_level);
    }

    #[test]
    fn compress_999_clamps_to_one_through_nine() {
        let data: Vec<u8> = b"compress-999-level".repeat(512);

        assert_eq!(
            compress_999(&data, -10).unwrap(),
            compress_999(&data, 1).unwrap()
        );
        assert_eq!(
            compress_999(&data, 100).unwrap(),
            compress_999(&data, 9).unwrap()
        );
    }

    #[test]
    fn terminator_suffix_on_every_level() {
        let data = b"terminator check input";
        for level in 0..=9 {
            let out = compress(data, level).unwrap();
            assert_eq!(&out[out.len() - 3..], &STREAM_TERMINATOR);
        }
    }

    #[test]
    fn output_stays_under_worst_case_bound() {
        // Incompressible-ish input: a cycling byte pattern defeats both
        // parsers without being pure noise.
        let data: Vec<u8> = (0..10_000u32)
            .map(|n| (n as u8).wrapping_mul(0xA7).wrapping_add(33) ^ 0xA2)
            .collect();
        for level in [0, 1, 5, 9] {
            let out = compress(&data, level).unwrap();
            assert_le!(out.len(), max_compressed_size(data.len()));
        }
    }
}
