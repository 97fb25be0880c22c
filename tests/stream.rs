#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use bencode_canon::{
    decode, encode_to_vec, BencodeBytes, BencodeDecode, BencodeError, BufferPool, DecodeLimits,
    Decoder, ErrorCode, ErrorKind, Reader, Value, Writer,
};

/// Hands out at most `step` bytes per read.
struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(self.data.len()).min(out.len());
        out[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

struct Broken;

impl Read for Broken {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
    }
}

impl Write for Broken {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn writer_emits_documents_back_to_back() {
    let mut w = Writer::new(Vec::new());
    w.write(&1i64).unwrap();
    w.write("spam").unwrap();
    w.write(&BTreeMap::from([("b", 2), ("a", 1)])).unwrap();
    w.flush().unwrap();
    assert_eq!(w.bytes_written(), 3 + 6 + 14);
    assert_eq!(w.get_ref().as_slice(), b"i1e4:spamd1:ai1e1:bi2ee");
}

#[test]
fn writer_writes_nothing_for_failed_encode() {
    let pool = BufferPool::new(4, 1024);
    let mut w = Writer::with_pool(Vec::new(), &pool);
    w.write(&[1u32, 2]).unwrap();
    let err = w.write(&vec![Some(1u64), None, Some(u64::MAX)]).unwrap_err();
    assert_eq!(err.code, ErrorCode::IntegerOverflow);
    let err = w.write(&None::<i64>).unwrap_err();
    assert_eq!(err.code, ErrorCode::AbsentRoot);
    w.write(&2i64).unwrap();
    assert_eq!(w.into_inner(), b"li1ei2eei2e");
    assert_eq!(pool.idle(), 1);
}

#[test]
fn writer_reports_sink_failure() {
    let mut w = Writer::new(Broken);
    let err = w.write(&1i64).unwrap_err();
    assert_eq!(err.code, ErrorCode::Io);
    assert_eq!(err.kind(), ErrorKind::External);
    let source = err.into_source().unwrap().downcast::<io::Error>().unwrap();
    assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
}

#[test]
fn reader_reads_until_clean_eof() {
    let mut r = Reader::new(Cursor::new(b"i1e4:spamd1:ai1ee".to_vec()));
    assert_eq!(r.read().unwrap(), Some(Value::from(1)));
    assert_eq!(r.position(), 3);
    assert_eq!(r.read().unwrap(), Some(Value::from("spam")));
    assert_eq!(r.read().unwrap(), Some(Value::dict([("a", Value::from(1))])));
    assert_eq!(r.read().unwrap(), None);
    assert_eq!(r.read().unwrap(), None);
    assert_eq!(r.position(), 17);

    assert!(Reader::new(io::empty()).read().unwrap().is_none());
}

#[test]
fn reader_handles_documents_split_across_reads() {
    let mut input = Vec::new();
    let long = "x".repeat(10_000);
    let mut w = Writer::new(&mut input);
    w.write(&vec!["a", "bc"]).unwrap();
    w.write(long.as_str()).unwrap();
    w.write(&BTreeMap::from([("k", -5i64)])).unwrap();
    drop(w);

    for step in [5, 64, 4096] {
        let docs: Vec<Value> = Reader::new(Trickle {
            data: &input,
            step,
        })
        .collect::<Result<_, _>>()
        .unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[1].as_str(), Some(long.as_str()));
        assert_eq!(docs[2].get("k").and_then(Value::as_int), Some(-5));
    }
}

#[test]
fn reader_reports_truncated_document() {
    let mut r = Reader::new(Trickle {
        data: b"i1el1:a",
        step: 3,
    });
    assert_eq!(r.read().unwrap(), Some(Value::from(1)));
    let err = r.read().unwrap_err();
    assert_eq!(err.code, ErrorCode::UnexpectedEof);
    assert_eq!(err.offset, 7);
}

#[test]
fn reader_shifts_error_offsets_by_stream_position() {
    let mut r = Reader::new(Cursor::new(b"i1ei01e".to_vec()));
    assert_eq!(r.read().unwrap(), Some(Value::from(1)));
    let err = r.read().unwrap_err();
    assert_eq!(err.code, ErrorCode::LeadingZero);
    assert_eq!(err.offset, 4);
}

#[test]
fn reader_enforces_per_document_limit() {
    let input = b"4:spam10:0123456789".to_vec();
    let mut r = Reader::with_limits(Cursor::new(input), DecodeLimits::for_bytes(8));
    assert_eq!(r.read().unwrap(), Some(Value::from("spam")));
    let err = r.read().unwrap_err();
    assert_eq!(err.code, ErrorCode::InputLimitExceeded);
    assert_eq!(err.kind(), ErrorKind::Limit);
    assert_eq!(err.offset, 6 + 8);
}

#[test]
fn reader_enforces_depth_limit() {
    let mut r = Reader::with_limits(
        Cursor::new(b"llleee".to_vec()),
        DecodeLimits::default().with_max_depth(2),
    );
    assert_eq!(r.read().unwrap_err().code, ErrorCode::DepthLimitExceeded);
}

#[test]
fn reader_reports_source_failure() {
    let err = Reader::new(Broken).read().unwrap_err();
    assert_eq!(err.code, ErrorCode::Io);
}

#[test]
fn reader_decodes_into_typed_documents() {
    let mut r = Reader::new(Cursor::new(b"d1:ai1e1:bi2eed1:bi1e1:ai2ee".to_vec()));
    let first: BencodeBytes = r.read_as().unwrap().unwrap();
    assert_eq!(first.as_bytes(), b"d1:ai1e1:bi2ee");
    let err = r.read_as::<BencodeBytes>().unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsortedKey);
    assert_eq!(err.offset, 14 + 7);
}

static PARSE_ATTEMPTS: AtomicUsize = AtomicUsize::new(0);

/// A `Value` that counts how often the reader tried to parse it.
struct Counted(Value);

impl BencodeDecode for Counted {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, BencodeError> {
        PARSE_ATTEMPTS.fetch_add(1, Ordering::Relaxed);
        decoder.value().map(Self)
    }
}

#[test]
fn reader_parses_large_documents_in_amortized_linear_work() {
    let items: Vec<i64> = (0..200_000).collect();
    let doc = encode_to_vec(&items).unwrap();
    assert!(doc.len() > 1_000_000);

    let mut r = Reader::new(Trickle {
        data: &doc,
        step: 4096,
    });
    let Counted(value) = r.read_as().unwrap().unwrap();
    assert_eq!(value, decode(&doc, DecodeLimits::default()).unwrap());
    assert!(r.read().unwrap().is_none());

    // Hundreds of refills, but only a logarithmic number of parse attempts.
    let attempts = PARSE_ATTEMPTS.load(Ordering::Relaxed);
    assert!(attempts <= 24, "{attempts} parse attempts");
}
