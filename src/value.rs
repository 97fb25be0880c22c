use std::collections::BTreeMap;

/// A bencode dictionary: byte-string keys in canonical (byte-wise ascending) order.
pub type Dictionary = BTreeMap<Vec<u8>, Value>;

/// A dynamic bencode document.
///
/// This is what [`crate::decode`] produces and what every encodable host value reduces to on the
/// wire. Dictionary keys are raw byte strings; `BTreeMap` keeps them in canonical order, so a
/// `Value` always re-encodes to the same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    /// A signed 64-bit integer.
    Integer(i64),
    /// Raw bytes. No text encoding is assumed.
    ByteString(Vec<u8>),
    /// An ordered sequence of values.
    List(Vec<Value>),
    /// A mapping from byte-string keys to values.
    Dictionary(Dictionary),
}

impl Value {
    /// Build a dictionary from key/value pairs. Later duplicates replace earlier ones.
    #[must_use]
    pub fn dict<K, I>(entries: I) -> Self
    where
        K: Into<Vec<u8>>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Dictionary(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a list.
    #[must_use]
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Build a byte string.
    #[must_use]
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Self::ByteString(b.into())
    }

    /// Return the integer if this is an `Integer`.
    #[inline]
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Return the bytes if this is a `ByteString`.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::ByteString(b) => Some(b),
            _ => None,
        }
    }

    /// Return the bytes as UTF-8 text if this is a `ByteString` holding valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| core::str::from_utf8(b).ok())
    }

    /// Return the items if this is a `List`.
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Return the entries if this is a `Dictionary`.
    #[inline]
    #[must_use]
    pub const fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Self::Dictionary(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` if this is a `Dictionary`.
    #[must_use]
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Value> {
        self.as_dict().and_then(|map| map.get(key.as_ref()))
    }

    /// Name of this value's token kind.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::ByteString(_) => "byte string",
            Self::List(_) => "list",
            Self::Dictionary(_) => "dictionary",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::ByteString(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::ByteString(s.into_bytes())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::ByteString(b.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::ByteString(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Dictionary> for Value {
    fn from(map: Dictionary) -> Self {
        Self::Dictionary(map)
    }
}
