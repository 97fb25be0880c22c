use core::fmt;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::{Dictionary, Value};

/// Text if the bytes are UTF-8, raw bytes otherwise.
struct WireBytes<'a>(&'a [u8]);

impl Serialize for WireBytes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match core::str::from_utf8(self.0) {
            Ok(s) => serializer.serialize_str(s),
            Err(_) => serializer.serialize_bytes(self.0),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(v) => serializer.serialize_i64(*v),
            Self::ByteString(b) => WireBytes(b).serialize(serializer),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Dictionary(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(&WireBytes(k), v)?;
                }
                m.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer, string, byte string, sequence or string-keyed map")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Integer(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E>
    where
        E: serde::de::Error,
    {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| E::custom("integer outside signed 64-bit range"))
    }

    fn visit_i128<E>(self, v: i128) -> Result<Value, E>
    where
        E: serde::de::Error,
    {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| E::custom("integer outside signed 64-bit range"))
    }

    fn visit_u128<E>(self, v: u128) -> Result<Value, E>
    where
        E: serde::de::Error,
    {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| E::custom("integer outside signed 64-bit range"))
    }

    fn visit_f64<E>(self, _v: f64) -> Result<Value, E>
    where
        E: serde::de::Error,
    {
        Err(E::custom("bencode has no floating point type"))
    }

    fn visit_char<E>(self, v: char) -> Result<Value, E> {
        let mut buf = [0u8; 4];
        Ok(Value::from(&*v.encode_utf8(&mut buf)))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_bytes<E>(self, v: &[u8]) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(v) = seq.next_element::<Value>()? {
            items.push(v);
        }
        Ok(Value::List(items))
    }

    fn visit_map<M>(self, mut map: M) -> Result<Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut entries = Dictionary::new();
        while let Some((k, v)) = map.next_entry::<KeyBytes, Value>()? {
            if entries.insert(k.0, v).is_some() {
                return Err(serde::de::Error::custom("duplicate dictionary key"));
            }
        }
        Ok(Value::Dictionary(entries))
    }
}

/// A dictionary key accepted from either a string or a byte string.
struct KeyBytes(Vec<u8>);

impl<'de> Deserialize<'de> for KeyBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = KeyBytes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or byte string key")
            }

            fn visit_str<E>(self, v: &str) -> Result<KeyBytes, E> {
                Ok(KeyBytes(v.as_bytes().to_vec()))
            }

            fn visit_string<E>(self, v: String) -> Result<KeyBytes, E> {
                Ok(KeyBytes(v.into_bytes()))
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<KeyBytes, E> {
                Ok(KeyBytes(v.to_vec()))
            }

            fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<KeyBytes, E> {
                Ok(KeyBytes(v))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}
