//! Reading a compressed stream from `std::io::Read`.
//!
//! There is no framing in LZO1X, so this is deliberately thin: drain the
//! reader (optionally bounded), then hand the bytes to the block decoder.

use crate::block::{decompress, DecompressError, DecompressOptions};
use std::fmt;
use std::io;
use std::io::Read;
use std::vec::Vec;

/// Errors from [`decompress_from_reader`].
#[derive(Debug)]
#[non_exhaustive]
pub enum StreamError {
    /// Reading from the source failed.
    Io(io::Error),
    /// The drained bytes did not decode.
    Decompress(DecompressError),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Io(err) => write!(f, "read failed: {err}"),
            StreamError::Decompress(err) => write!(f, "decompression failed: {err}"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Io(err) => Some(err),
            StreamError::Decompress(err) => Some(err),
        }
    }
}

impl From<io::Error> for StreamError {
    fn from(err: io::Error) -> Self {
        StreamError::Io(err)
    }
}

impl From<DecompressError> for StreamError {
    fn from(err: DecompressError) -> Self {
        StreamError::Decompress(err)
    }
}

/// Reads the whole stream from `reader` and decompresses it.
///
/// With `opts.max_input_size > 0` the reader is cut off one byte past the
/// bound, and exceeding it fails with
/// [`DecompressError::InputTooLarge`] instead of buffering an unbounded
/// amount of input.
pub fn decompress_from_reader<R: Read>(
    reader: R,
    opts: &DecompressOptions,
) -> Result<Vec<u8>, StreamError> {
    let mut src = Vec::new();

    if opts.max_input_size > 0 {
        let limit = (opts.max_input_size as u64).saturating_add(1);
        reader.take(limit).read_to_end(&mut src)?;
        if src.len() > opts.max_input_size {
            return Err(DecompressError::InputTooLarge.into());
        }
    } else {
        let mut reader = reader;
        reader.read_to_end(&mut src)?;
    }

    Ok(decompress(&src, opts.out_len)?)
}
