#![no_main]
use libfuzzer_sys::fuzz_target;

use lzo_flex::decompress;

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary bytes may fail, but must never panic or write out
    // of bounds.
    let _ = decompress(data, 1 << 16);
    let _ = decompress(data, 0);
});
