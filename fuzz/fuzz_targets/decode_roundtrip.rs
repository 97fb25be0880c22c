#![no_main]

use libfuzzer_sys::fuzz_target;

use bencode_canon::{decode, decode_canonical, encode_to_vec, BencodeBytes, DecodeLimits};

fuzz_target!(|data: &[u8]| {
    let limits = DecodeLimits::for_bytes(data.len()).with_max_depth(64);
    let Ok(v) = decode(data, limits) else {
        return;
    };

    // Re-encoding always yields a canonical document that decodes to the same value.
    let out = encode_to_vec(&v).expect("re-encode");
    let out_limits = DecodeLimits::for_bytes(out.len()).with_max_depth(64);
    let back = decode_canonical(&out, out_limits).expect("canonical decode");
    assert_eq!(back, v);

    // Canonical input is a fixed point.
    if decode_canonical(data, limits).is_ok() {
        assert_eq!(out, data);
        let canon = BencodeBytes::from_slice(data, limits).expect("canonical bytes");
        assert_eq!(canon.sha256(), BencodeBytes::from(&v).sha256());
    }
});
