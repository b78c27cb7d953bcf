//! Fuzz target: `LineDecoder::feed`
//!
//! Drives arbitrary byte sequences into the host line decoder and asserts
//! that it never panics and never yields an over-long, empty or
//! multi-line result, whether the input arrives in one chunk or byte by
//! byte.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use farmwatch::protocol::line::{LineDecoder, MAX_LINE_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut whole = Vec::new();
    let mut decoder = LineDecoder::new();
    decoder.feed(data, |line| whole.push(line));

    for line in &whole {
        assert!(line.len() <= MAX_LINE_LEN, "line exceeds MAX_LINE_LEN");
        assert!(!line.trim().is_empty(), "decoder must not yield blank lines");
        assert!(!line.contains('\n') && !line.contains('\r'));
    }

    // Chunking must not change the result.
    let mut split = Vec::new();
    let mut decoder = LineDecoder::new();
    for &byte in data {
        if let Some(line) = decoder.push(byte) {
            split.push(line);
        }
    }
    assert_eq!(whole, split);
});
