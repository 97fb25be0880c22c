//! # bencode-canon
//!
//! Canonical bencode encoding and decoding.
//!
//! ## Design principles
//!
//! - **The same document always has the same bytes.**
//!   Dictionary keys are emitted in strictly ascending byte-wise order whatever the iteration
//!   order of the source mapping, so encoded documents can be hashed into stable identifiers.
//! - **Classification is static.**
//!   [`BencodeEncode`] impls decide how a host type maps onto the four wire shapes; records use a
//!   cached [`FieldPlan`] built by `#[derive(BencodeEncode)]`.
//! - **Decoding is bounded.**
//!   Every decode runs under [`DecodeLimits`] with an explicit frame stack, so hostile nesting
//!   cannot exhaust the call stack.
//!
//! ## Wire format
//!
//! | Shape | Encoding | Example |
//! |---|---|---|
//! | integer | `i<decimal>e` | `i-42e` |
//! | byte string | `<len>:<bytes>` | `4:spam` |
//! | list | `l<items>e` | `li1ei2ee` |
//! | dictionary | `d(<key><value>)*e` | `d3:cow3:mooe` |
//!
//! Integers are signed 64-bit, with no leading zeros and no negative zero. Dictionary keys are
//! byte strings.
//!
//! ```
//! use std::collections::HashMap;
//!
//! let mut m = HashMap::new();
//! m.insert("spam", vec!["a", "b"]);
//! m.insert("cow", vec!["moo"]);
//! let bytes = bencode_canon::encode_to_vec(&m).unwrap();
//! assert_eq!(bytes, b"d3:cowl3:mooe4:spaml1:a1:bee");
//!
//! let value = bencode_canon::decode(&bytes, bencode_canon::DecodeLimits::default()).unwrap();
//! assert_eq!(value.get("cow").and_then(|v| v.as_list()).map(<[_]>::len), Some(1));
//! ```
//!
//! ## Feature flags
//!
//! - `sha2` *(default)*: SHA-256 digests for [`BencodeBytes`] and [`RawValue`].
//! - `serde`: `Serialize`/`Deserialize` for [`Value`], [`DecodeLimits`] and [`EncodeOptions`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod canonical;
mod codec;
mod encode;
mod error;
mod limits;
mod order;
mod parse;
mod plan;
mod pool;
#[cfg(feature = "serde")]
mod serde_impl;
mod stream;
mod value;
mod wire;

pub use crate::canonical::{BencodeBytes, RawValue};
pub use crate::codec::{
    decode, decode_as, decode_canonical, decode_stream, encode_into, encode_to_vec,
    encode_to_vec_with, BencodeDecode, BencodeEncode, ListElem, MapKey,
};
pub use crate::encode::{DictEncoder, Encoder, ListEncoder};
pub use crate::error::{BencodeError, ErrorCode, ErrorKind};
pub use crate::limits::{DecodeLimits, EncodeOptions, DEFAULT_MAX_DEPTH, DEFAULT_MAX_INPUT_BYTES};
pub use crate::order::{cmp_key_bytes, is_strictly_ascending, sort_keys, SMALL_SORT_THRESHOLD};
pub use crate::parse::{Decoder, Documents};
pub use crate::plan::{
    is_valid_key, FieldDecl, FieldPath, FieldPlan, FieldPlanBuilder, PlanEntry, Record,
};
pub use crate::pool::{
    BufferPool, PooledBuffer, DEFAULT_MAX_BUFFER_CAPACITY, DEFAULT_MAX_RETAINED,
};
pub use crate::stream::{Reader, Writer};
pub use crate::value::{Dictionary, Value};

pub use bencode_canon_derive::BencodeEncode;
