//! Fuzz target for the line framer
//!
//! The first byte picks a chunk size; the rest is fed in chunks of that
//! size and compared with a single feed of the whole input.

#![no_main]

use libfuzzer_sys::fuzz_target;

use slirc_client::LineFramer;

fuzz_target!(|data: &[u8]| {
    let Some((&size, input)) = data.split_first() else {
        return;
    };
    let size = usize::from(size).max(1);

    let mut whole = LineFramer::default();
    let expected = whole.feed(input);

    let mut chunked = LineFramer::default();
    let mut actual = Vec::new();
    for chunk in input.chunks(size) {
        actual.extend(chunked.feed(chunk));
    }

    assert_eq!(actual, expected);
});
