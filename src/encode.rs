use smallvec::SmallVec;

use crate::codec::{BencodeEncode, MapKey};
use crate::order::{cmp_key_bytes, sort_keys, SMALL_SORT_THRESHOLD};
use crate::plan::Record;
use crate::wire::{write_decimal, write_len_prefix};
use crate::{BencodeError, EncodeOptions, ErrorCode, Value};

/// Streaming encoder that writes bencode into an owned `Vec<u8>`.
///
/// Nothing in this type sorts on your behalf except [`Encoder::map_entries`] and
/// [`Encoder::record`]; hand-built dictionaries go through [`DictEncoder`], which rejects keys
/// that are not strictly ascending.
pub struct Encoder {
    buf: Vec<u8>,
    options: EncodeOptions,
}

impl Encoder {
    /// Create a new canonical encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            options: EncodeOptions::canonical(),
        }
    }

    /// Create a canonical encoder with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_vec(Vec::with_capacity(capacity))
    }

    /// Create an encoder that appends to an existing buffer.
    #[must_use]
    pub const fn from_vec(buf: Vec<u8>) -> Self {
        Self {
            buf,
            options: EncodeOptions::canonical(),
        }
    }

    /// Replace the encoder options.
    #[must_use]
    pub const fn with_options(mut self, options: EncodeOptions) -> Self {
        self.options = options;
        self
    }

    /// The active encoder options.
    #[must_use]
    pub const fn options(&self) -> EncodeOptions {
        self.options
    }

    /// Return the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if no bytes have been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrow the bytes emitted so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume and return the encoded bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    /// Encode a signed integer.
    ///
    /// # Errors
    ///
    /// Infallible for `i64`; the `Result` keeps the signature uniform with the other writers.
    pub fn int(&mut self, v: i64) -> Result<(), BencodeError> {
        self.buf.push(b'i');
        write_decimal(&mut self.buf, v);
        self.buf.push(b'e');
        Ok(())
    }

    /// Encode an unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns `IntegerOverflow` if `v` exceeds `i64::MAX`.
    pub fn uint(&mut self, v: u64) -> Result<(), BencodeError> {
        let v = i64::try_from(v)
            .map_err(|_| BencodeError::new(ErrorCode::IntegerOverflow, self.buf.len()))?;
        self.int(v)
    }

    /// Encode a 128-bit integer that must fit the signed 64-bit range.
    ///
    /// # Errors
    ///
    /// Returns `IntegerOverflow` if `v` is outside `i64`.
    pub fn wide_int(&mut self, v: i128) -> Result<(), BencodeError> {
        let v = i64::try_from(v)
            .map_err(|_| BencodeError::new(ErrorCode::IntegerOverflow, self.buf.len()))?;
        self.int(v)
    }

    /// Encode a boolean as `i1e` / `i0e`.
    ///
    /// # Errors
    ///
    /// Infallible; see [`Encoder::int`].
    pub fn bool(&mut self, v: bool) -> Result<(), BencodeError> {
        self.int(i64::from(v))
    }

    /// Encode a byte string.
    ///
    /// # Errors
    ///
    /// Infallible; see [`Encoder::int`].
    pub fn bytes(&mut self, b: &[u8]) -> Result<(), BencodeError> {
        self.write_str_bytes(b);
        Ok(())
    }

    pub(crate) fn bytes_parts(&mut self, head: &[u8], tail: &[u8]) -> Result<(), BencodeError> {
        let len = head.len() + tail.len();
        self.buf.reserve(len + 4);
        write_len_prefix(&mut self.buf, len);
        self.buf.extend_from_slice(head);
        self.buf.extend_from_slice(tail);
        Ok(())
    }

    /// Encode text as a byte string; the length prefix counts bytes, not characters.
    ///
    /// # Errors
    ///
    /// Infallible; see [`Encoder::int`].
    pub fn str(&mut self, s: &str) -> Result<(), BencodeError> {
        self.bytes(s.as_bytes())
    }

    /// Encode a float as the integer of its IEEE-754 bit pattern.
    ///
    /// Only permitted when [`EncodeOptions::float_bits`] is set; the result is not reconstructed
    /// as a float by the decoder.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` when float encoding is not enabled.
    pub fn float(&mut self, bits: i64, shape: &'static str) -> Result<(), BencodeError> {
        if !self.options.float_bits {
            return Err(BencodeError::unsupported(shape, self.buf.len()));
        }
        self.int(bits)
    }

    /// Splice already-encoded bytes verbatim.
    ///
    /// This is the self-describing hook: the bytes are not inspected, so the caller is
    /// responsible for them forming exactly one well-formed value.
    ///
    /// # Errors
    ///
    /// Infallible; see [`Encoder::int`].
    pub fn raw(&mut self, bytes: &[u8]) -> Result<(), BencodeError> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Write a dynamic [`Value`]. Its dictionaries are already in key order, so nothing can fail.
    pub(crate) fn write_value(&mut self, value: &Value) {
        match value {
            Value::Integer(v) => {
                self.buf.push(b'i');
                write_decimal(&mut self.buf, *v);
                self.buf.push(b'e');
            }
            Value::ByteString(b) => self.write_str_bytes(b),
            Value::List(items) => {
                self.buf.push(b'l');
                for item in items {
                    self.write_value(item);
                }
                self.buf.push(b'e');
            }
            Value::Dictionary(map) => {
                self.buf.push(b'd');
                for (key, item) in map {
                    self.write_str_bytes(key);
                    self.write_value(item);
                }
                self.buf.push(b'e');
            }
        }
    }

    fn write_str_bytes(&mut self, b: &[u8]) {
        self.buf.reserve(b.len() + 4);
        write_len_prefix(&mut self.buf, b.len());
        self.buf.extend_from_slice(b);
    }

    /// Encode any value through its `BencodeEncode` impl.
    ///
    /// # Errors
    ///
    /// Returns whatever the value's impl returns.
    pub fn value<T: BencodeEncode + ?Sized>(&mut self, value: &T) -> Result<(), BencodeError> {
        value.encode(self)
    }

    /// Encode a list and fill it via the provided builder.
    ///
    /// # Errors
    ///
    /// Returns the builder's error; partial output is discarded.
    pub fn list<F>(&mut self, f: F) -> Result<(), BencodeError>
    where
        F: FnOnce(&mut ListEncoder<'_>) -> Result<(), BencodeError>,
    {
        let start = self.buf.len();
        self.buf.push(b'l');
        let mut l = ListEncoder { enc: self };
        if let Err(err) = f(&mut l) {
            self.buf.truncate(start);
            return Err(err);
        }
        self.buf.push(b'e');
        Ok(())
    }

    /// Encode a dictionary and fill it via the provided builder.
    ///
    /// Entries must arrive in strictly ascending key order.
    ///
    /// # Errors
    ///
    /// Returns the builder's error, or `UnsortedKey`/`DuplicateKey`; partial output is
    /// discarded.
    pub fn dict<F>(&mut self, f: F) -> Result<(), BencodeError>
    where
        F: FnOnce(&mut DictEncoder<'_>) -> Result<(), BencodeError>,
    {
        let start = self.buf.len();
        self.buf.push(b'd');
        let mut d = DictEncoder {
            enc: self,
            prev_key_range: None,
        };
        if let Err(err) = f(&mut d) {
            self.buf.truncate(start);
            return Err(err);
        }
        self.buf.push(b'e');
        Ok(())
    }

    /// Encode a mapping from arbitrary key/value pairs in canonical key order.
    ///
    /// Keys are gathered into an inline scratch array (heap-free up to
    /// [`SMALL_SORT_THRESHOLD`] entries), sorted, then emitted. Absent values drop their key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKeyType` for non-string keys, `DuplicateKey` if two keys share the same
    /// bytes, or any error from encoding a value.
    pub fn map_entries<'a, K, V, I>(&mut self, entries: I) -> Result<(), BencodeError>
    where
        K: MapKey + ?Sized + 'a,
        V: BencodeEncode + ?Sized + 'a,
        I: IntoIterator<Item = (&'a K, &'a V)>,
    {
        let mut scratch: SmallVec<[(&'a [u8], &'a V); SMALL_SORT_THRESHOLD]> = SmallVec::new();
        for (k, v) in entries {
            let key = k.key_bytes().map_err(|err| err.at(self.buf.len()))?;
            scratch.push((key, v));
        }
        sort_keys(&mut scratch, |entry| entry.0);

        self.dict(|d| {
            for &(key, value) in &scratch {
                d.value_entry(key, value)?;
            }
            Ok(())
        })
    }

    /// Encode a record through its field plan.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if the plan yields the same key twice, `UnsupportedType` if a plan
    /// path does not resolve, or any error from encoding a field.
    pub fn record<R: Record>(&mut self, record: &R) -> Result<(), BencodeError> {
        let plan = R::field_plan();
        self.dict(|d| {
            for entry in plan.canonical() {
                let value = record.field(entry.path()).ok_or_else(|| {
                    BencodeError::unsupported(core::any::type_name::<R>(), d.enc.len())
                })?;
                if entry.omit_empty() && value.is_empty_value() {
                    continue;
                }
                d.value_entry(entry.key().as_bytes(), value)?;
            }
            Ok(())
        })
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for writing list items.
pub struct ListEncoder<'a> {
    enc: &'a mut Encoder,
}

impl ListEncoder<'_> {
    /// Append a value. Absent values (`None`) are dropped.
    ///
    /// # Errors
    ///
    /// Returns any error from encoding the value.
    pub fn value<T: BencodeEncode + ?Sized>(&mut self, value: &T) -> Result<(), BencodeError> {
        if value.is_absent() {
            return Ok(());
        }
        value.encode(self.enc)
    }

    /// Append an item written directly on the encoder.
    ///
    /// # Errors
    ///
    /// Returns the closure's error.
    pub fn with<F>(&mut self, f: F) -> Result<(), BencodeError>
    where
        F: FnOnce(&mut Encoder) -> Result<(), BencodeError>,
    {
        f(self.enc)
    }
}

/// Builder for writing dictionary entries in canonical order.
pub struct DictEncoder<'a> {
    enc: &'a mut Encoder,
    prev_key_range: Option<(usize, usize)>,
}

impl DictEncoder<'_> {
    /// Insert an entry whose value is written by `f`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey`/`UnsortedKey` if `key` does not strictly follow the previous key,
    /// or the closure's error. The entry is removed from the output on failure.
    pub fn entry<F>(&mut self, key: &[u8], f: F) -> Result<(), BencodeError>
    where
        F: FnOnce(&mut Encoder) -> Result<(), BencodeError>,
    {
        let entry_start = self.enc.buf.len();
        write_len_prefix(&mut self.enc.buf, key.len());
        let key_start = self.enc.buf.len();
        self.enc.buf.extend_from_slice(key);
        let key_end = self.enc.buf.len();

        if let Some((ps, pe)) = self.prev_key_range {
            let prev = &self.enc.buf[ps..pe];
            let curr = &self.enc.buf[key_start..key_end];
            if let Err(code) = check_key_order(prev, curr) {
                self.enc.buf.truncate(entry_start);
                return Err(BencodeError::new(code, entry_start));
            }
        }

        if let Err(err) = f(self.enc) {
            self.enc.buf.truncate(entry_start);
            return Err(err);
        }
        self.prev_key_range = Some((key_start, key_end));
        Ok(())
    }

    /// Insert a `str`-keyed entry whose value is written by `f`.
    ///
    /// # Errors
    ///
    /// See [`DictEncoder::entry`].
    pub fn str_entry<F>(&mut self, key: &str, f: F) -> Result<(), BencodeError>
    where
        F: FnOnce(&mut Encoder) -> Result<(), BencodeError>,
    {
        self.entry(key.as_bytes(), f)
    }

    /// Insert an entry for an encodable value. Absent values are skipped together with their key.
    ///
    /// # Errors
    ///
    /// See [`DictEncoder::entry`].
    pub fn value_entry<T: BencodeEncode + ?Sized>(
        &mut self,
        key: &[u8],
        value: &T,
    ) -> Result<(), BencodeError> {
        if value.is_absent() {
            return Ok(());
        }
        self.entry(key, |enc| value.encode(enc))
    }
}

fn check_key_order(prev: &[u8], curr: &[u8]) -> Result<(), ErrorCode> {
    match cmp_key_bytes(prev, curr) {
        core::cmp::Ordering::Less => Ok(()),
        core::cmp::Ordering::Equal => Err(ErrorCode::DuplicateKey),
        core::cmp::Ordering::Greater => Err(ErrorCode::UnsortedKey),
    }
}
