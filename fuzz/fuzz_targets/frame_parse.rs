//! Fuzz target for inbound frame classification.
//!
//! Arbitrary channel data must never panic the dispatcher: malformed input
//! is discarded, unknown types are ignored, and only well-formed frames
//! classify.

#![no_main]

use banter_client::parse_frame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_frame(text);
    }
});
