#![no_main]

use libfuzzer_sys::fuzz_target;

use bencode_canon::{decode, decode_canonical, DecodeLimits};

fuzz_target!(|data: &[u8]| {
    let limits = DecodeLimits::for_bytes(data.len()).with_max_depth(64);
    let lenient = decode(data, limits);
    let strict = decode_canonical(data, limits);
    // Strict acceptance implies lenient acceptance of the same value.
    if let Ok(v) = &strict {
        assert_eq!(lenient.as_ref().ok(), Some(v));
    }
});
