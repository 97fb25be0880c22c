#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use bencode_canon::{encode_to_vec, BufferPool, ErrorCode, Writer};

#[test]
fn buffers_are_reused_with_capacity() {
    let pool = BufferPool::new(2, 4096);
    assert_eq!(pool.idle(), 0);

    let cap = {
        let buf = pool.encode(&vec!["spam"; 64]).unwrap();
        assert_eq!(&buf[..7], b"l4:spam");
        buf.capacity()
    };
    assert_eq!(pool.idle(), 1);

    let buf = pool.checkout();
    assert!(buf.is_empty());
    assert_eq!(buf.capacity(), cap);
    assert_eq!(pool.idle(), 0);
}

#[test]
fn pool_keeps_at_most_max_retained() {
    let pool = BufferPool::new(2, 4096);
    let bufs: Vec<_> = (0..4).map(|i| pool.encode(&i).unwrap()).collect();
    assert_eq!(pool.idle(), 0);
    drop(bufs);
    assert_eq!(pool.idle(), 2);
}

#[test]
fn oversized_and_unused_buffers_are_not_kept() {
    let pool = BufferPool::new(4, 64);
    drop(pool.encode(&vec![0u8; 1000]).unwrap());
    assert_eq!(pool.idle(), 0);

    drop(pool.checkout());
    assert_eq!(pool.idle(), 0);
}

#[test]
fn failed_encode_returns_buffer() {
    let pool = BufferPool::new(4, 4096);
    drop(pool.encode(&1i64).unwrap());
    let err = pool.encode(&[Some(1u128), Some(u128::MAX)]).unwrap_err();
    assert_eq!(err.code, ErrorCode::IntegerOverflow);
    assert_eq!(pool.idle(), 1);
    assert!(pool.checkout().is_empty());
}

#[test]
fn detached_buffer_leaves_pool() {
    let pool = BufferPool::default();
    let bytes = pool.encode("hello").unwrap().detach();
    assert_eq!(bytes, b"5:hello");
    assert_eq!(pool.idle(), 0);
}

#[test]
fn pooled_output_matches_plain_encoding() {
    let pool = BufferPool::new(1, 1 << 16);
    let map: HashMap<String, Vec<i64>> = (0..30)
        .map(|i| (format!("key{i}"), vec![i, -i]))
        .collect();
    let expected = encode_to_vec(&map).unwrap();
    for _ in 0..3 {
        let buf = pool.encode(&map).unwrap();
        assert_eq!(buf.as_slice(), expected.as_slice());
    }
}

#[test]
fn global_pool_is_shared_across_threads() {
    let docs = Arc::new(vec![vec![1i64, 2, 3], vec![], vec![i64::MIN]]);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let docs = Arc::clone(&docs);
            thread::spawn(move || {
                let mut w = Writer::new(Vec::new());
                for _ in 0..50 {
                    for doc in docs.iter() {
                        w.write(doc).unwrap();
                    }
                }
                w.into_inner()
            })
        })
        .collect();

    let single: Vec<u8> = docs
        .iter()
        .flat_map(|d| encode_to_vec(d).unwrap())
        .collect::<Vec<u8>>()
        .repeat(50);
    for h in handles {
        assert_eq!(h.join().unwrap(), single);
    }
    assert!(BufferPool::global().idle() <= bencode_canon::DEFAULT_MAX_RETAINED);
}
