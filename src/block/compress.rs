//! The fast compression algorithm (LZO1X-1, levels 0 and 1).
//!
//! One hash probe per position against a single-slot dictionary, with a
//! second related slot tried on a miss. A confirmed 3-byte match is
//! extended greedily: a short unrolled extension covers lengths up to 8,
//! and only matches that survive it pay for the byte-wise long extension.
//! On repeated misses the parser skips ahead faster
//! (`1 + (pos - literal_start) / 32`), which keeps incompressible input
//! close to memcpy speed.

use crate::block::encode::{encode_literal_run, encode_match};
use crate::block::hashtable::{self, FastDict};
use crate::block::{
    max_compressed_size, CompressError, MAX_LEN_M2, MAX_OFFSET_M2, MAX_OFFSET_M4,
    STREAM_TERMINATOR,
};
use alloc::vec::Vec;

/// Compress all bytes of `input` with the fast parser.
///
/// Levels 0 and 1 both land here; they are the same parser with the same
/// parameters, so their output is byte-identical.
pub(crate) fn compress_fast(input: &[u8]) -> Result<Vec<u8>, CompressError> {
    let mut out = Vec::with_capacity(max_compressed_size(input.len()));

    // Anything too short to hold a match plus the required tail is one
    // literal run.
    let literal_tail = if input.len() > MAX_LEN_M2 + 5 {
        compress_fast_core(input, &mut out)?
    } else {
        input.len()
    };

    if literal_tail > 0 {
        let start = input.len() - literal_tail;
        encode_literal_run(&mut out, input, start, literal_tail)?;
    }

    out.extend_from_slice(&STREAM_TERMINATOR);
    Ok(out)
}

/// Runs the parse over `input` and returns the length of the pending
/// literal tail the caller still has to flush.
fn compress_fast_core(input: &[u8], out: &mut Vec<u8>) -> Result<usize, CompressError> {
    let input_len = input.len();
    let input_limit = input_len - MAX_LEN_M2 - 5;
    let mut dict = FastDict::new();
    let mut literal_start = 0usize;
    let mut input_pos = 4usize;

    'parse: loop {
        let mut idx = hashtable::hash_at(input, input_pos);

        for attempt in 0..2 {
            if let Some((cand, off)) = find_candidate(&dict, input, input_pos, idx) {
                if input[cand] == input[input_pos]
                    && input[cand + 1] == input[input_pos + 1]
                    && input[cand + 2] == input[input_pos + 2]
                {
                    dict.put(idx, input_pos);

                    let run_len = input_pos - literal_start;
                    if run_len > 0 {
                        encode_literal_run(out, input, literal_start, run_len)?;
                    }

                    let match_start = input_pos;
                    input_pos += 3;

                    // Short extension first; most matches end inside it.
                    let mut i = 3;
                    while i < MAX_LEN_M2 + 1 {
                        input_pos += 1;
                        if input[cand + i] != input[input_pos - 1] {
                            break;
                        }
                        i += 1;
                    }

                    if i < MAX_LEN_M2 + 1 {
                        input_pos -= 1;
                    } else {
                        // Long match: keep extending byte by byte to the
                        // end of the input.
                        let mut m = cand + MAX_LEN_M2 + 1;
                        while input_pos < input_len && input[m] == input[input_pos] {
                            m += 1;
                            input_pos += 1;
                        }
                    }

                    encode_match(out, input_pos - match_start, off, run_len)?;

                    literal_start = input_pos;
                    if input_pos >= input_limit {
                        break 'parse;
                    }
                    continue 'parse;
                }
            }

            if attempt == 0 {
                idx = hashtable::second_probe(idx);
            }
        }

        // Miss on both probes: record the position and skip ahead, faster
        // the longer the current literal run already is.
        dict.put(idx, input_pos);
        input_pos += 1 + ((input_pos - literal_start) >> 5);
        if input_pos >= input_limit {
            break;
        }
    }

    Ok(input_len - literal_start)
}

/// Reads the dictionary slot and applies the distance filters: a candidate
/// is usable within the M2 window unconditionally, and beyond it only when
/// the 4th byte agrees (a cheap discriminator against hash collisions on
/// far matches).
#[inline]
fn find_candidate(
    dict: &FastDict,
    input: &[u8],
    input_pos: usize,
    idx: usize,
) -> Option<(usize, usize)> {
    let stored = dict.get(idx);
    if stored == 0 {
        return None;
    }
    let cand = stored as usize - 1;
    if cand >= input_pos {
        return None;
    }
    let off = input_pos - cand;
    if off > MAX_OFFSET_M4 {
        return None;
    }
    if off <= MAX_OFFSET_M2 || input[cand + 3] == input[input_pos + 3] {
        return Some((cand, off));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::decompress::decompress;

    fn roundtrip(data: &[u8]) {
        let compressed = compress_fast(data).unwrap();
        let decompressed = decompress(&compressed, data.len()).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn tiny_inputs_become_literal_runs() {
        roundtrip(b"");
        roundtrip(b"x");
        roundtrip(b"ahhd");
        roundtrip(b"0123456789abc");
    }

    #[test]
    fn empty_input_is_just_the_terminator() {
        assert_eq!(compress_fast(b"").unwrap(), STREAM_TERMINATOR);
    }

    #[test]
    fn short_text_compresses_and_round_trips() {
        let data = b"hello world, lzo test";
        let compressed = compress_fast(data).unwrap();
        assert_lt!(compressed.len(), data.len() * 2);
        assert_eq!(decompress(&compressed, data.len()).unwrap(), data);
    }

    #[test]
    fn short_matches_use_the_two_byte_form() {
        // Period-4 repetition inside the M2 window: matches of length <= 8
        // should keep the stream tight.
        let data: Vec<u8> = b"abcd".repeat(16);
        let compressed = compress_fast(&data).unwrap();
        assert_lt!(compressed.len(), data.len() / 2);
        roundtrip(&data);
    }

    #[test]
    fn long_runs_take_the_long_extension_path() {
        let data = [0xFFu8; 12_000];
        let compressed = compress_fast(&data).unwrap();
        assert_lt!(compressed.len(), 128);
        roundtrip(&data);
    }

    #[test]
    fn far_matches_fall_into_m3_and_m4_classes() {
        // The same block repeated behind unique filler so that the second
        // and third copies sit beyond the M2 and M3 windows respectively.
        let block: Vec<u8> = (0u8..=255).collect();
        let mut data = Vec::new();
        data.extend_from_slice(&block);
        for i in 0..700u32 {
            data.extend_from_slice(&i.to_le_bytes());
            data.push(i as u8 ^ 0x5A);
        }
        data.extend_from_slice(&block); // ~3.7 KiB back: M3 territory
        for i in 0..3500u32 {
            data.extend_from_slice(&(i ^ 0xDEAD_BEEF).to_le_bytes());
            data.push(i as u8 ^ 0xA5);
        }
        data.extend_from_slice(&block); // ~17.8 KiB back: M4 territory
        roundtrip(&data);
    }

    #[test]
    fn long_leading_literal_run_takes_the_extended_header() {
        // More than 238 leading literals cannot use the compact first-token
        // header.
        let mut data: Vec<u8> = (0..300u32)
            .map(|n| (n as u8).wrapping_mul(89).wrapping_add(7))
            .collect();
        data.extend_from_slice(&b"repeatrepeatrepeat".repeat(8));
        roundtrip(&data);
    }

    #[test]
    fn incompressible_input_round_trips() {
        let data: Vec<u8> = (0..4096u32)
            .map(|n| (n as u8).wrapping_mul(167).wrapping_add(13) ^ (n >> 8) as u8)
            .collect();
        roundtrip(&data);
    }

    #[test]
    fn levels_with_window_sized_input() {
        // Cross the dictionary's position space well past 64 KiB.
        let mut data = Vec::with_capacity(200_000);
        while data.len() < 200_000 {
            let n = data.len() as u32;
            data.extend_from_slice(b"pattern-");
            data.extend_from_slice(&n.to_le_bytes());
        }
        roundtrip(&data);
    }
}
