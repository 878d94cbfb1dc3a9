//! Fuzz testing for provider decoding and normalization.
//!
//! Any JSON that decodes as a provider record must normalize without
//! panicking, and every store in the result must have a purchase URL.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_normalize -- -max_total_time=60
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use gamehub::models::{RawGame, UpstreamEnvelope};
use gamehub::normalize::normalize;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = serde_json::from_slice::<RawGame>(data) {
        let game = normalize(raw);
        assert!(game.stores.iter().all(|s| !s.url.is_empty()));
    }

    if let Ok(page) = serde_json::from_slice::<UpstreamEnvelope>(data) {
        for raw in page.results {
            let _ = normalize(raw);
        }
    }
});
