#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use bencode_canon::{
    decode, encode_to_vec, is_valid_key, BencodeEncode, DecodeLimits, ErrorCode, FieldDecl,
    FieldPlan, Record, Value,
};

fn enc<T: BencodeEncode>(v: &T) -> String {
    String::from_utf8(encode_to_vec(v).unwrap()).unwrap()
}

#[derive(BencodeEncode)]
struct Declared {
    zeta: i64,
    alpha: String,
    mid: Vec<i64>,
}

#[test]
fn record_fields_emitted_in_key_order() {
    let v = Declared {
        zeta: 1,
        alpha: "a".into(),
        mid: vec![2, 3],
    };
    assert_eq!(enc(&v), "d5:alpha1:a3:midli2ei3ee4:zetai1ee");

    let plan = Declared::field_plan();
    let declared: Vec<&str> = plan.entries().iter().map(|e| e.key()).collect();
    assert_eq!(declared, ["zeta", "alpha", "mid"]);
    assert_eq!(plan.keys(), ["alpha", "mid", "zeta"]);
}

#[test]
fn record_plan_is_cached() {
    let a = Declared::field_plan();
    let b = Declared::field_plan();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
}

#[derive(BencodeEncode)]
struct Renamed {
    #[bencode(rename = "piece length")]
    piece_length: i64,
    #[bencode(rename = "announce-list")]
    announce_list: Vec<String>,
    #[bencode(rename = "bad/key")]
    fallback: i64,
    #[bencode(rename = "")]
    empty: i64,
    #[bencode(rename = "$x_1.y")]
    symbols: i64,
}

#[test]
fn record_rename_validity() {
    let v = Renamed {
        piece_length: 262_144,
        announce_list: vec!["udp://a".into()],
        fallback: 1,
        empty: 2,
        symbols: 3,
    };
    assert_eq!(
        Renamed::field_plan().keys(),
        ["$x_1.y", "announce-list", "empty", "fallback", "piece length"]
    );
    assert_eq!(
        enc(&v),
        "d6:$x_1.yi3e13:announce-listl7:udp://ae5:emptyi2e8:fallbacki1e12:piece lengthi262144ee"
    );
}

#[test]
fn valid_key_rules() {
    assert!(is_valid_key("piece length"));
    assert!(is_valid_key("a-b_c.d$"));
    assert!(is_valid_key("ключ"));
    assert!(!is_valid_key(""));
    assert!(!is_valid_key("a/b"));
    assert!(!is_valid_key("a,b"));
    assert!(!is_valid_key("\"q\""));
    assert!(is_valid_key("x9"));
    assert!(!is_valid_key("½"));
    assert!(!is_valid_key("Ⅳ"));
    assert!(!is_valid_key("x²"));
    assert!(!is_valid_key("٣"));
}

struct NotEncodable;

#[derive(BencodeEncode)]
struct Skips {
    kept: i64,
    #[bencode(skip)]
    #[allow(dead_code)]
    hidden: NotEncodable,
}

#[test]
fn record_skip_drops_field() {
    let v = Skips {
        kept: 1,
        hidden: NotEncodable,
    };
    assert_eq!(enc(&v), "d4:kepti1ee");
    assert_eq!(Skips::field_plan().len(), 1);
}

#[derive(BencodeEncode, Default)]
struct OmitEmpty {
    #[bencode(omit_empty)]
    name: String,
    #[bencode(omit_empty)]
    count: u32,
    #[bencode(omit_empty)]
    tags: Vec<String>,
    #[bencode(omit_empty)]
    extra: BTreeMap<String, i64>,
    #[bencode(omit_empty)]
    flag: bool,
    #[bencode(omit_empty)]
    maybe: Option<i64>,
    always: i64,
}

#[test]
fn record_omit_empty() {
    assert_eq!(enc(&OmitEmpty::default()), "d6:alwaysi0ee");

    let v = OmitEmpty {
        name: "n".into(),
        count: 2,
        tags: vec!["t".into()],
        extra: BTreeMap::from([("k".to_string(), 1)]),
        flag: true,
        maybe: Some(0),
        always: 5,
    };
    assert_eq!(
        enc(&v),
        "d6:alwaysi5e5:counti2e5:extrad1:ki1ee4:flagi1e5:maybei0e4:name1:n4:tagsl1:tee"
    );
}

#[derive(BencodeEncode)]
struct Optional {
    a: Option<i64>,
    b: i64,
}

#[test]
fn record_absent_field_drops_key() {
    assert_eq!(enc(&Optional { a: None, b: 1 }), "d1:bi1ee");
    assert_eq!(enc(&Optional { a: Some(0), b: 1 }), "d1:ai0e1:bi1ee");
}

#[derive(BencodeEncode)]
struct Inner {
    x: i64,
    #[bencode(rename = "a")]
    first: i64,
}

#[derive(BencodeEncode)]
struct Outer {
    #[bencode(flatten)]
    inner: Inner,
    m: i64,
}

#[derive(BencodeEncode)]
struct OuterNested {
    #[bencode(flatten, rename = "sub")]
    inner: Inner,
    m: i64,
}

#[derive(BencodeEncode)]
struct Deep {
    #[bencode(flatten)]
    outer: Outer,
    z: i64,
}

#[test]
fn record_flatten_splices_fields() {
    let v = Outer {
        inner: Inner { x: 1, first: 2 },
        m: 3,
    };
    assert_eq!(enc(&v), "d1:ai2e1:mi3e1:xi1ee");

    let plan = Outer::field_plan();
    let paths: Vec<&[usize]> = plan.entries().iter().map(|e| e.path()).collect();
    assert_eq!(paths, [&[0, 0][..], &[0, 1][..], &[1][..]]);
    assert_eq!(v.field(&[0, 1]).map(|f| encode_to_vec(f).unwrap()), Some(b"i2e".to_vec()));
    assert!(v.field(&[7]).is_none());
}

#[test]
fn record_flatten_with_rename_nests() {
    let v = OuterNested {
        inner: Inner { x: 1, first: 2 },
        m: 3,
    };
    assert_eq!(enc(&v), "d1:mi3e3:subd1:ai2e1:xi1eee");
}

#[test]
fn record_flatten_recurses() {
    let v = Deep {
        outer: Outer {
            inner: Inner { x: 1, first: 2 },
            m: 3,
        },
        z: 4,
    };
    assert_eq!(enc(&v), "d1:ai2e1:mi3e1:xi1e1:zi4ee");
    assert_eq!(Deep::field_plan().entries()[0].path(), [0, 0, 0]);
}

#[derive(BencodeEncode)]
struct Collides {
    #[bencode(flatten)]
    inner: Inner,
    x: i64,
}

#[test]
fn record_key_collision_is_reported() {
    let v = Collides {
        inner: Inner { x: 1, first: 2 },
        x: 3,
    };
    let err = encode_to_vec(&v).unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateKey);
}

#[derive(BencodeEncode)]
struct Generic<T> {
    value: T,
    label: &'static str,
}

#[test]
fn record_generic_fields() {
    assert_eq!(
        enc(&Generic {
            value: 7,
            label: "n"
        }),
        "d5:label1:n5:valuei7ee"
    );
    assert_eq!(
        enc(&Generic {
            value: vec!["a"],
            label: "l"
        }),
        "d5:label1:l5:valuel1:aee"
    );
}

#[derive(BencodeEncode)]
struct Pair(i64, String);

#[derive(BencodeEncode)]
struct Marker;

#[test]
fn tuple_and_unit_structs() {
    assert_eq!(enc(&Pair(1, "x".into())), "li1e1:xe");
    assert_eq!(enc(&vec![Pair(1, "a".into()), Pair(2, "b".into())]), "lli1e1:aeli2e1:bee");

    let err = encode_to_vec(&Marker).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsupportedType);
    assert_eq!(err.shape(), Some("Marker"));
}

#[derive(BencodeEncode)]
struct Node {
    name: String,
    children: Vec<Node>,
}

#[test]
fn recursive_records() {
    let tree = Node {
        name: "root".into(),
        children: vec![Node {
            name: "leaf".into(),
            children: vec![],
        }],
    };
    assert_eq!(
        enc(&tree),
        "d8:childrenld8:childrenle4:name4:leafee4:name4:roote"
    );
}

#[test]
fn records_round_trip_through_value() {
    let v = Declared {
        zeta: -1,
        alpha: "α".into(),
        mid: vec![],
    };
    let bytes = encode_to_vec(&v).unwrap();
    let value = decode(&bytes, DecodeLimits::default()).unwrap();
    assert_eq!(value.get("alpha").and_then(Value::as_str), Some("α"));
    assert_eq!(value.get("zeta").and_then(Value::as_int), Some(-1));
    assert_eq!(encode_to_vec(&value).unwrap(), bytes);
}

#[test]
fn plan_builder_by_hand() {
    let inner = FieldPlan::builder()
        .field(0, FieldDecl::new("b"))
        .field(1, FieldDecl::new("a").rename("no good"))
        .build();
    assert_eq!(inner.keys(), ["b", "no good"]);

    let plan = FieldPlan::builder()
        .field(0, FieldDecl::new("skipped").skip())
        .flatten(1, FieldDecl::new("inner"), &inner)
        .field(2, FieldDecl::new("c").rename("bad:key").omit_empty())
        .build();
    assert_eq!(plan.keys(), ["b", "c", "no good"]);
    assert!(plan.entries()[2].omit_empty());
    assert_eq!(plan.entries()[1].path(), [1, 1]);
}
