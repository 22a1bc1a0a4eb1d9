#![no_main]
use libfuzzer_sys::fuzz_target;

use lzo_flex::{compress, decompress};

fuzz_target!(|input: (&[u8], u8)| {
    let (data, level) = input;
    let compressed = compress(data, (level % 10) as i32).unwrap();
    let decompressed = decompress(&compressed, data.len()).unwrap();
    assert_eq!(data, decompressed);
});
