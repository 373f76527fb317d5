//! Fuzz target for message decoding and dispatch
//!
//! Feeds arbitrary lines through the decoder and the dispatcher and checks
//! that neither panics.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

use slirc_client::{ClientState, Dispatcher, Message};

fuzz_target!(|data: &[u8]| {
    // Only fuzz valid UTF-8; the framer has already decoded by this point
    if let Ok(input) = str::from_utf8(data) {
        if input.len() > 8191 {
            return;
        }

        let _ = input.parse::<Message>();

        let mut state = ClientState::new("fuzz");
        let _ = Dispatcher::new().dispatch_line(&mut state, input);
    }
});
