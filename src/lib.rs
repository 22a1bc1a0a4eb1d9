//! Pure Rust, safe implementation of LZO1X compression.
//!
//! LZO1X is a byte-oriented LZ77 codec: a stream is a sequence of literal
//! runs and back-references encoded with four match classes (M1–M4), closed
//! by the terminator `0x11 0x00 0x00`. The format carries no header, no
//! stored length and no checksum, so decompression needs the expected output
//! size from the caller.
//!
//! Two compressors are provided behind one level parameter:
//!
//! - levels 0 and 1 select the fast LZO1X-1 parser (single-slot hash
//!   dictionary, dual probe),
//! - levels 2 to 9 select the LZO1X-999 parser (sliding-window hash chains,
//!   lazy matching, opcode-cost aware match shortening). Higher levels probe
//!   deeper and compress better at the cost of speed.
//!
//! Output of either compressor decodes with any `lzo1x_decompress_safe`
//! compatible decoder, and [`decompress`] accepts streams produced by other
//! LZO1X encoders.
//!
//! # Example: block round-trip
//! ```
//! let input: &[u8] = b"Hello people, what's up?";
//! let compressed = lzo_flex::compress(input, 1).unwrap();
//! let decompressed = lzo_flex::decompress(&compressed, input.len()).unwrap();
//! assert_eq!(input, &decompressed[..]);
//! ```
//!
//! # Example: demuxing concatenated streams
//! ```
//! let a = lzo_flex::compress(b"first block", 9).unwrap();
//! let b = lzo_flex::compress(b"second block", 9).unwrap();
//! let joined = [&a[..], &b[..]].concat();
//!
//! let (first, consumed) = lzo_flex::decompress_n(&joined, 11).unwrap();
//! assert_eq!(&first[..], b"first block");
//! let (second, _) = lzo_flex::decompress_n(&joined[consumed..], 12).unwrap();
//! assert_eq!(&second[..], b"second block");
//! ```
//!
//! ## Feature Flags
//!
//! - `std` enables [`decompress_from_reader`], reuse pools for the
//!   high-compression dictionary, and `std::error::Error` impls.
//!   _enabled by default_
//!
//! For no_std support disable default features; the block API only needs
//! `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
#[macro_use]
extern crate more_asserts;

pub mod block;
pub(crate) mod fastcpy;
#[cfg(feature = "std")]
pub(crate) mod pool;
#[cfg(feature = "std")]
mod stream;

pub use block::{
    compress, compress_999, compress_with, decompress, decompress_into, decompress_n,
    decompress_n_into, max_compressed_size, CompressError, CompressOptions, DecompressError,
    DecompressOptions,
};

#[cfg(feature = "std")]
pub use stream::{decompress_from_reader, StreamError};
