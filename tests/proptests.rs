// Property-based tests for canonical bencode round trips.
//
// Sizes and depths stay small so the suite runs fast.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

use bencode_canon::{
    cmp_key_bytes, decode, decode_canonical, encode_to_vec, is_strictly_ascending, sort_keys,
    BencodeBytes, DecodeLimits, Dictionary, Reader, Value,
};

fn arb_key() -> impl Strategy<Value = Vec<u8>> {
    // Mostly a, b and 0xff, so keys often share prefixes.
    proptest::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), Just(0xff), any::<u8>()], 0..8)
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(Value::ByteString),
        "[a-z ]{0,12}".prop_map(Value::from),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 128, 8, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..8).prop_map(Value::List),
            proptest::collection::vec((arb_key(), inner), 0..8)
                .prop_map(|pairs| Value::Dictionary(pairs.into_iter().collect::<Dictionary>())),
        ]
    })
}

proptest! {
    #[test]
    fn canonical_roundtrip(v in arb_value()) {
        let bytes = encode_to_vec(&v).unwrap();
        let strict = decode_canonical(&bytes, DecodeLimits::default()).unwrap();
        prop_assert_eq!(&strict, &v);
        prop_assert_eq!(encode_to_vec(&strict).unwrap(), bytes);
    }

    #[test]
    fn canonical_bytes_agree_with_encoder(v in arb_value()) {
        let bytes = encode_to_vec(&v).unwrap();
        let validated = BencodeBytes::from_vec(bytes.clone(), DecodeLimits::default()).unwrap();
        prop_assert_eq!(validated.as_bytes(), &bytes[..]);
        let from_value = BencodeBytes::from(&v);
        prop_assert_eq!(from_value.as_bytes(), &bytes[..]);
    }

    #[test]
    fn sort_keys_matches_std_sort(keys in proptest::collection::vec(arb_key(), 0..64)) {
        let mut ours = keys.clone();
        sort_keys(&mut ours, |k| k.as_slice());
        let mut std_sorted = keys;
        std_sorted.sort();
        prop_assert_eq!(ours, std_sorted);
    }

    #[test]
    fn sorted_unique_keys_are_strictly_ascending(
        keys in proptest::collection::btree_set(arb_key(), 0..48)
    ) {
        let mut shuffled: Vec<Vec<u8>> = keys.iter().rev().cloned().collect();
        sort_keys(&mut shuffled, |k| k.as_slice());
        prop_assert!(is_strictly_ascending(&shuffled));
        prop_assert_eq!(shuffled, keys.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn cmp_key_bytes_agrees_with_slice_ord(a in arb_key(), b in arb_key()) {
        prop_assert_eq!(cmp_key_bytes(&a, &b), a.cmp(&b));
    }

    #[test]
    fn hash_map_encoding_is_deterministic(
        entries in proptest::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..64)
    ) {
        let tree: BTreeMap<String, i64> = entries.clone();
        let hashed: HashMap<String, i64> = entries.into_iter().collect();
        let from_tree = encode_to_vec(&tree).unwrap();
        let from_hash = encode_to_vec(&hashed).unwrap();
        prop_assert_eq!(from_tree, from_hash);
    }

    #[test]
    fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode(&bytes, DecodeLimits::default().with_max_depth(32));
    }

    #[test]
    fn reader_agrees_with_slice_decode(vs in proptest::collection::vec(arb_value(), 0..6)) {
        let mut stream = Vec::new();
        for v in &vs {
            stream.extend_from_slice(&encode_to_vec(v).unwrap());
        }
        let read: Vec<Value> = Reader::new(stream.as_slice())
            .collect::<Result<_, _>>()
            .unwrap();
        prop_assert_eq!(read, vs);
    }
}
