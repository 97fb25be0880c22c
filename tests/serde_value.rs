#![cfg(feature = "serde")]
#![allow(clippy::unwrap_used)]

use bencode_canon::{decode, encode_to_vec, DecodeLimits, EncodeOptions, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Envelope {
    details: Value,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct CodecConfig {
    limits: DecodeLimits,
    encode: EncodeOptions,
}

#[test]
fn value_json_roundtrip() {
    let bytes = b"d4:infod6:lengthi1024e4:name8:file.txte4:tagsl1:a1:bee";
    let value = decode(bytes, DecodeLimits::default()).unwrap();

    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(
        json,
        r#"{"info":{"length":1024,"name":"file.txt"},"tags":["a","b"]}"#
    );

    let back: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(back, value);
    assert_eq!(encode_to_vec(&back).unwrap(), bytes);
}

#[test]
fn value_inside_serde_struct() {
    let msg = Envelope {
        details: Value::dict([("b", Value::from(2)), ("a", Value::list([]))]),
    };
    let json = serde_json::to_string(&msg).unwrap();
    assert_eq!(json, r#"{"details":{"a":[],"b":2}}"#);
    let decoded: Envelope = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, msg);
}

#[test]
fn json_without_bencode_counterpart() {
    let v: Value = serde_json::from_str("[true, false]").unwrap();
    assert_eq!(v, Value::list([Value::from(1), Value::from(0)]));

    assert!(serde_json::from_str::<Value>("1.5").is_err());
    assert!(serde_json::from_str::<Value>("null").is_err());
    assert!(serde_json::from_str::<Value>("18446744073709551615").is_err());
    assert_eq!(
        serde_json::from_str::<Value>("-9223372036854775808").unwrap(),
        Value::Integer(i64::MIN)
    );
}

#[test]
fn non_utf8_bytes_serialize_as_bytes() {
    let v = Value::bytes(vec![0xff, 0x00]);
    assert_eq!(serde_json::to_string(&v).unwrap(), "[255,0]");

    let keyed = Value::Dictionary([(vec![0xff], Value::from(1))].into_iter().collect());
    assert!(serde_json::to_string(&keyed).is_err());
}

#[test]
fn config_types_deserialize_with_defaults() {
    let cfg: CodecConfig =
        serde_json::from_str(r#"{"limits":{"max_depth":8},"encode":{"float_bits":true}}"#)
            .unwrap();
    assert_eq!(cfg.limits, DecodeLimits::default().with_max_depth(8));
    assert_eq!(cfg.encode, EncodeOptions::with_float_bits());

    let cfg: CodecConfig = serde_json::from_str(r#"{"limits":{},"encode":{}}"#).unwrap();
    assert_eq!(cfg.limits, DecodeLimits::default());
    assert_eq!(cfg.encode, EncodeOptions::canonical());

    let json = serde_json::to_string(&DecodeLimits::for_bytes(1024)).unwrap();
    assert_eq!(json, r#"{"max_input_bytes":1024,"max_depth":256}"#);
}
