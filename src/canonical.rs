use crate::codec::{BencodeDecode, BencodeEncode, ListElem};
use crate::encode::Encoder;
use crate::parse::Decoder;
use crate::{BencodeError, DecodeLimits, EncodeOptions, Value};

#[cfg(feature = "sha2")]
fn sha256(bytes: &[u8]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut h = Sha256::new();
    h.update(bytes);
    let out = h.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(out.as_slice());
    digest
}

/// The exact bytes of one bencode value.
///
/// Decoding a `RawValue` validates the framing and captures the sub-document untouched, so
/// unknown or non-canonical parts of a message can be carried through and re-emitted verbatim.
/// Encoding splices the bytes as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawValue {
    bytes: Vec<u8>,
}

impl RawValue {
    /// Validate that `bytes` hold exactly one value and wrap them.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` are malformed or contain trailing data.
    pub fn from_vec(bytes: Vec<u8>, limits: DecodeLimits) -> Result<Self, BencodeError> {
        let mut decoder = Decoder::new(&bytes, limits)?;
        decoder.raw_value()?;
        decoder.finish()?;
        Ok(Self { bytes })
    }

    /// Borrow the raw bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the raw bytes.
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    /// Decode the captured value.
    ///
    /// # Errors
    ///
    /// Returns an error if `limits` are tighter than the ones the value was captured under.
    pub fn to_value(&self, limits: DecodeLimits) -> Result<Value, BencodeError> {
        crate::decode(&self.bytes, limits)
    }

    /// Compute the SHA-256 digest of the raw bytes.
    #[cfg(feature = "sha2")]
    #[must_use]
    pub fn sha256(&self) -> [u8; 32] {
        sha256(&self.bytes)
    }
}

impl AsRef<[u8]> for RawValue {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl BencodeEncode for RawValue {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.raw(&self.bytes)
    }
}

impl BencodeDecode for RawValue {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, BencodeError> {
        Ok(Self {
            bytes: decoder.raw_value()?.to_vec(),
        })
    }
}

impl ListElem for RawValue {}

/// An owned, validated canonical bencode document.
///
/// The bytes are exactly one value with every dictionary's keys strictly ascending, so for
/// content addressing the bytes are the identity of the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BencodeBytes {
    bytes: Vec<u8>,
}

impl BencodeBytes {
    /// Validate and take ownership of canonical bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` are not exactly one canonical document.
    pub fn from_vec(bytes: Vec<u8>, limits: DecodeLimits) -> Result<Self, BencodeError> {
        let mut decoder = Decoder::new(&bytes, limits)?.canonical();
        decoder.raw_value()?;
        decoder.finish()?;
        Ok(Self { bytes })
    }

    /// Validate and copy canonical bytes.
    ///
    /// # Errors
    ///
    /// See [`BencodeBytes::from_vec`].
    pub fn from_slice(bytes: &[u8], limits: DecodeLimits) -> Result<Self, BencodeError> {
        Self::from_vec(bytes.to_vec(), limits)
    }

    /// Encode `value` and validate the result.
    ///
    /// Encoder output is canonical by construction unless a self-describing value spliced
    /// non-canonical bytes; those are rejected here.
    ///
    /// # Errors
    ///
    /// Returns any encode error, or a key-order error from a non-canonical splice.
    pub fn encode<T: BencodeEncode + ?Sized>(value: &T) -> Result<Self, BencodeError> {
        let bytes = crate::encode_to_vec_with(value, EncodeOptions::canonical())?;
        let limits = DecodeLimits::for_bytes(bytes.len()).with_max_depth(usize::MAX);
        Self::from_vec(bytes, limits)
    }

    /// Borrow the canonical bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the canonical bytes.
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false` for a valid document.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode into a dynamic value.
    ///
    /// # Errors
    ///
    /// Infallible in practice; the bytes were validated on construction.
    pub fn to_value(&self) -> Result<Value, BencodeError> {
        let limits = DecodeLimits::for_bytes(self.bytes.len()).with_max_depth(usize::MAX);
        crate::decode_canonical(&self.bytes, limits)
    }

    /// Compute the SHA-256 digest of the canonical bytes.
    #[cfg(feature = "sha2")]
    #[must_use]
    pub fn sha256(&self) -> [u8; 32] {
        sha256(&self.bytes)
    }
}

impl AsRef<[u8]> for BencodeBytes {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl TryFrom<Vec<u8>> for BencodeBytes {
    type Error = BencodeError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        let limits = DecodeLimits::for_bytes(bytes.len());
        Self::from_vec(bytes, limits)
    }
}

impl From<&Value> for BencodeBytes {
    fn from(value: &Value) -> Self {
        let mut enc = Encoder::new();
        enc.write_value(value);
        Self {
            bytes: enc.into_vec(),
        }
    }
}

impl BencodeEncode for BencodeBytes {
    fn encode(&self, enc: &mut Encoder) -> Result<(), BencodeError> {
        enc.raw(&self.bytes)
    }
}

impl BencodeDecode for BencodeBytes {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, BencodeError> {
        let start = decoder.position();
        let raw = decoder.raw_value()?;
        if !decoder.is_canonical() {
            let limits =
                DecodeLimits::for_bytes(raw.len()).with_max_depth(decoder.limits().max_depth);
            let mut strict = Decoder::new(raw, limits)?.canonical();
            strict.value().map_err(|err| {
                let offset = start + err.offset;
                err.at(offset)
            })?;
        }
        Ok(Self {
            bytes: raw.to_vec(),
        })
    }
}

impl ListElem for BencodeBytes {}

impl PartialEq<[u8]> for BencodeBytes {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}
