use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use crate::encode::Encoder;
use crate::parse::{Decoder, Documents};
use crate::{BencodeError, DecodeLimits, EncodeOptions, ErrorCode, Value};

/// Map a host value onto the four bencode shapes.
///
/// Classification is static: the impl picked for a type decides whether it is written as an
/// integer, a byte string, a list or a dictionary. Hand-written impls act as self-describing
/// overrides and may splice exact bytes with [`Encoder::raw`].
///
/// The trait is object safe; record field accessors hand out `&dyn BencodeEncode`.
pub trait BencodeEncode {
    /// Encode `self` into the provided encoder.
    ///
    /// # Errors
    ///
    /// Returns an error if the value has no wire mapping or an inner value fails to encode.
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError>;

    /// Whether this value is absent (`None`) and writes nothing.
    ///
    /// Containers drop absent elements, and dictionaries drop the key of an absent value.
    fn is_absent(&self) -> bool {
        false
    }

    /// Whether this value counts as empty for `#[bencode(omit_empty)]`.
    fn is_empty_value(&self) -> bool {
        false
    }
}

/// Marker trait for values that encode as list elements.
///
/// Implemented for every encodable type except `u8`, so that `Vec<u8>` and `[u8; N]` encode as
/// byte strings while `Vec<T>` encodes as a list.
pub trait ListElem {}

/// Mapping key types.
///
/// Bencode dictionary keys are byte strings; text and byte types qualify. Integer, `bool` and
/// `char` keys compile but are rejected at encode time with `InvalidKeyType`.
pub trait MapKey {
    /// Borrow the key's wire bytes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKeyType` for key types that are not strings.
    fn key_bytes(&self) -> Result<&[u8], BencodeError>;
}

/// Decode a value from a [`Decoder`].
pub trait BencodeDecode: Sized {
    /// Decode one value at the decoder's position.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed or violates the decoder's limits.
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, BencodeError>;
}

/// Encode a value into canonical bencode bytes.
///
/// # Errors
///
/// Returns `AbsentRoot` if `value` is absent, or any error raised while encoding it.
pub fn encode_to_vec<T: BencodeEncode + ?Sized>(value: &T) -> Result<Vec<u8>, BencodeError> {
    encode_to_vec_with(value, EncodeOptions::default())
}

/// Encode a value with explicit encoder options.
///
/// # Errors
///
/// See [`encode_to_vec`].
pub fn encode_to_vec_with<T: BencodeEncode + ?Sized>(
    value: &T,
    options: EncodeOptions,
) -> Result<Vec<u8>, BencodeError> {
    if value.is_absent() {
        return Err(BencodeError::new(ErrorCode::AbsentRoot, 0));
    }
    let mut enc = Encoder::new().with_options(options);
    value.encode(&mut enc)?;
    Ok(enc.into_vec())
}

/// Append the encoding of `value` to `buf` and return the appended bytes.
///
/// `buf` keeps its capacity, which makes this the building block for buffer reuse. On error
/// `buf` is restored to its original length.
///
/// # Errors
///
/// See [`encode_to_vec`].
pub fn encode_into<'b, T: BencodeEncode + ?Sized>(
    buf: &'b mut Vec<u8>,
    value: &T,
) -> Result<&'b [u8], BencodeError> {
    let start = buf.len();
    if value.is_absent() {
        return Err(BencodeError::new(ErrorCode::AbsentRoot, start));
    }
    let mut enc = Encoder::from_vec(core::mem::take(buf));
    let res = value.encode(&mut enc);
    *buf = enc.into_vec();
    match res {
        Ok(()) => Ok(&buf[start..]),
        Err(err) => {
            buf.truncate(start);
            Err(err)
        }
    }
}

/// Decode exactly one document, accepting dictionaries with unsorted keys.
///
/// # Errors
///
/// Returns an error if the input is malformed, has trailing bytes, contains a duplicate key, or
/// exceeds `limits`.
pub fn decode(bytes: &[u8], limits: DecodeLimits) -> Result<Value, BencodeError> {
    decode_as(bytes, limits)
}

/// Decode exactly one document that must already be canonical.
///
/// # Errors
///
/// As [`decode`], plus `UnsortedKey` for dictionaries whose keys are not strictly ascending.
pub fn decode_canonical(bytes: &[u8], limits: DecodeLimits) -> Result<Value, BencodeError> {
    let mut decoder = Decoder::new(bytes, limits)?.canonical();
    let value = decoder.value()?;
    decoder.finish()?;
    Ok(value)
}

/// Decode exactly one document into `T`.
///
/// # Errors
///
/// As [`decode`], or whatever `T::decode` returns.
pub fn decode_as<T: BencodeDecode>(bytes: &[u8], limits: DecodeLimits) -> Result<T, BencodeError> {
    let mut decoder = Decoder::new(bytes, limits)?;
    let value = T::decode(&mut decoder)?;
    decoder.finish()?;
    Ok(value)
}

/// Iterate over back-to-back documents in `bytes`.
///
/// `limits.max_input_bytes` bounds the whole input. The iterator ends after the first error.
#[must_use]
pub fn decode_stream(bytes: &[u8], limits: DecodeLimits) -> Documents<'_> {
    Documents::new(bytes, limits)
}

impl BencodeDecode for Value {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, BencodeError> {
        decoder.value()
    }
}

macro_rules! impl_small_int {
    ($($t:ty),*) => {$(
        impl BencodeEncode for $t {
            fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
                enc.int(i64::from(*self))
            }

            fn is_empty_value(&self) -> bool {
                *self == 0
            }
        }
    )*};
}

impl_small_int!(i8, i16, i32, i64, u8, u16, u32);

impl BencodeEncode for u64 {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.uint(*self)
    }

    fn is_empty_value(&self) -> bool {
        *self == 0
    }
}

impl BencodeEncode for usize {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        let v = u64::try_from(*self)
            .map_err(|_| BencodeError::new(ErrorCode::IntegerOverflow, enc.len()))?;
        enc.uint(v)
    }

    fn is_empty_value(&self) -> bool {
        *self == 0
    }
}

impl BencodeEncode for isize {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        let v = i64::try_from(*self)
            .map_err(|_| BencodeError::new(ErrorCode::IntegerOverflow, enc.len()))?;
        enc.int(v)
    }

    fn is_empty_value(&self) -> bool {
        *self == 0
    }
}

impl BencodeEncode for i128 {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.wide_int(*self)
    }

    fn is_empty_value(&self) -> bool {
        *self == 0
    }
}

impl BencodeEncode for u128 {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        let v = i128::try_from(*self)
            .map_err(|_| BencodeError::new(ErrorCode::IntegerOverflow, enc.len()))?;
        enc.wide_int(v)
    }

    fn is_empty_value(&self) -> bool {
        *self == 0
    }
}

impl BencodeEncode for bool {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.bool(*self)
    }

    fn is_empty_value(&self) -> bool {
        !*self
    }
}

impl BencodeEncode for f64 {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.float(i64::from_ne_bytes(self.to_bits().to_ne_bytes()), "f64")
    }

    fn is_empty_value(&self) -> bool {
        *self == 0.0
    }
}

impl BencodeEncode for f32 {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.float(i64::from(self.to_bits()), "f32")
    }

    fn is_empty_value(&self) -> bool {
        *self == 0.0
    }
}

impl BencodeEncode for char {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        let mut buf = [0u8; 4];
        enc.str(self.encode_utf8(&mut buf))
    }
}

impl BencodeEncode for () {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        Err(BencodeError::unsupported("()", enc.len()))
    }
}

impl BencodeEncode for str {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.str(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl BencodeEncode for String {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.str(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl BencodeEncode for Cow<'_, str> {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.str(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl BencodeEncode for [u8] {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.bytes(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl BencodeEncode for Vec<u8> {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.bytes(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<const N: usize> BencodeEncode for [u8; N] {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.bytes(self)
    }

    fn is_empty_value(&self) -> bool {
        N == 0
    }
}

impl BencodeEncode for Cow<'_, [u8]> {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.bytes(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl BencodeEncode for VecDeque<u8> {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        let (head, tail) = self.as_slices();
        enc.bytes_parts(head, tail)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

fn encode_list<'a, T, I>(enc: &mut Encoder, items: I) -> Result<(), BencodeError>
where
    T: BencodeEncode + 'a,
    I: IntoIterator<Item = &'a T>,
{
    enc.list(|l| {
        for item in items {
            l.value(item)?;
        }
        Ok(())
    })
}

impl<T: BencodeEncode + ListElem> BencodeEncode for [T] {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        encode_list(enc, self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: BencodeEncode + ListElem> BencodeEncode for Vec<T> {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        encode_list(enc, self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: BencodeEncode + ListElem, const N: usize> BencodeEncode for [T; N] {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        encode_list(enc, self)
    }

    fn is_empty_value(&self) -> bool {
        N == 0
    }
}

impl<T: BencodeEncode + ListElem> BencodeEncode for VecDeque<T> {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        encode_list(enc, self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K: MapKey, V: BencodeEncode> BencodeEncode for BTreeMap<K, V> {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.map_entries(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K: MapKey, V: BencodeEncode, S: BuildHasher> BencodeEncode for HashMap<K, V, S> {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.map_entries(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: BencodeEncode> BencodeEncode for Option<T> {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        match self {
            Some(v) => v.encode(enc),
            None => Ok(()),
        }
    }

    fn is_absent(&self) -> bool {
        self.as_ref().map_or(true, BencodeEncode::is_absent)
    }

    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

macro_rules! impl_deref_encode {
    ($($ptr:ident),*) => {$(
        impl<T: BencodeEncode + ?Sized> BencodeEncode for $ptr<T> {
            fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
                (**self).encode(enc)
            }

            fn is_absent(&self) -> bool {
                (**self).is_absent()
            }

            fn is_empty_value(&self) -> bool {
                (**self).is_empty_value()
            }
        }

        impl<T: ListElem + ?Sized> ListElem for $ptr<T> {}
    )*};
}

impl_deref_encode!(Box, Rc, Arc);

impl<T: BencodeEncode + ?Sized> BencodeEncode for &T {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        (**self).encode(enc)
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }

    fn is_empty_value(&self) -> bool {
        (**self).is_empty_value()
    }
}

impl BencodeEncode for Value {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.write_value(self);
        Ok(())
    }

    fn is_empty_value(&self) -> bool {
        match self {
            Self::Integer(v) => *v == 0,
            Self::ByteString(b) => b.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Dictionary(map) => map.is_empty(),
        }
    }
}

macro_rules! impl_list_elem {
    ($($t:ty),*) => {$(
        impl ListElem for $t {}
    )*};
}

impl_list_elem!(
    i8, i16, i32, i64, i128, isize, u16, u32, u64, u128, usize, bool, f32, f64, char, (), str,
    String, [u8], Vec<u8>, VecDeque<u8>, Value
);

impl ListElem for Cow<'_, str> {}
impl ListElem for Cow<'_, [u8]> {}
impl<const N: usize> ListElem for [u8; N] {}
impl<T: ListElem> ListElem for [T] {}
impl<T: ListElem> ListElem for Vec<T> {}
impl<T: ListElem, const N: usize> ListElem for [T; N] {}
impl<T: ListElem> ListElem for VecDeque<T> {}
impl<K, V> ListElem for BTreeMap<K, V> {}
impl<K, V, S> ListElem for HashMap<K, V, S> {}
impl<T: ListElem> ListElem for Option<T> {}
impl<T: ListElem + ?Sized> ListElem for &T {}

impl MapKey for str {
    fn key_bytes(&self) -> Result<&[u8], BencodeError> {
        Ok(self.as_bytes())
    }
}

impl MapKey for String {
    fn key_bytes(&self) -> Result<&[u8], BencodeError> {
        Ok(self.as_bytes())
    }
}

impl MapKey for Cow<'_, str> {
    fn key_bytes(&self) -> Result<&[u8], BencodeError> {
        Ok(self.as_bytes())
    }
}

impl MapKey for Box<str> {
    fn key_bytes(&self) -> Result<&[u8], BencodeError> {
        Ok(self.as_bytes())
    }
}

impl MapKey for Arc<str> {
    fn key_bytes(&self) -> Result<&[u8], BencodeError> {
        Ok(self.as_bytes())
    }
}

impl MapKey for [u8] {
    fn key_bytes(&self) -> Result<&[u8], BencodeError> {
        Ok(self)
    }
}

impl MapKey for Vec<u8> {
    fn key_bytes(&self) -> Result<&[u8], BencodeError> {
        Ok(self)
    }
}

impl<K: MapKey + ?Sized> MapKey for &K {
    fn key_bytes(&self) -> Result<&[u8], BencodeError> {
        (**self).key_bytes()
    }
}

macro_rules! impl_invalid_key {
    ($($t:ty),*) => {$(
        impl MapKey for $t {
            fn key_bytes(&self) -> Result<&[u8], BencodeError> {
                Err(BencodeError::invalid_key(stringify!($t)))
            }
        }
    )*};
}

impl_invalid_key!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char
);
