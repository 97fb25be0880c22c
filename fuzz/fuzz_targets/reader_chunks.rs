#![no_main]

use std::io::Read;

use libfuzzer_sys::fuzz_target;

use bencode_canon::{decode_stream, DecodeLimits, Reader};

/// Hands out at most `step` bytes per read call.
struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.data.len().min(self.step).min(buf.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fuzz_target!(|input: (u8, &[u8])| {
    let (step, data) = input;
    let limits = DecodeLimits::for_bytes(data.len()).with_max_depth(64);
    let mut reader = Reader::with_limits(
        Trickle {
            data,
            step: usize::from(step).max(1),
        },
        limits,
    );

    // Chunked reads agree with whole-buffer decoding up to the first error.
    for expected in decode_stream(data, limits) {
        match (expected, reader.read()) {
            (Ok(a), Ok(Some(b))) => assert_eq!(a, b),
            (Err(_), Err(_)) => return,
            (a, b) => panic!("reader diverged: {a:?} vs {b:?}"),
        }
    }
});
