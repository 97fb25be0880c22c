use core::fmt;
use std::error::Error as StdError;

/// The high-level class of an error.
///
/// Decoding distinguishes malformed tokens (`Syntax`), out-of-range numbers (`Overflow`), framing
/// problems (`TrailingData`), dictionary key order violations (`KeyOrder`) and configured resource
/// limits (`Limit`). Encoding failures are `Encode`. Errors raised by self-describing values or by
/// the underlying I/O sink/source are `External`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed token or premature end of input.
    Syntax,
    /// Integer or length outside the supported range.
    Overflow,
    /// Extra bytes after a complete document.
    TrailingData,
    /// Duplicate or out-of-order dictionary key.
    KeyOrder,
    /// A configured decode limit was exceeded.
    Limit,
    /// A value could not be mapped onto the wire format.
    Encode,
    /// Error produced outside the codec (self-describing values, I/O).
    External,
}

/// A structured error code identifying why a document was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Unexpected end of input where a token or terminator was expected.
    UnexpectedEof,
    /// A byte that cannot start or continue the current token.
    UnexpectedByte,
    /// An integer or length with no digits (for example `ie` or `i-e`).
    ExpectedDigit,
    /// An integer or length with a leading zero, or a negative zero.
    LeadingZero,
    /// A dictionary key that is not a byte string.
    NonStringKey,

    /// Integer magnitude outside the signed 64-bit range.
    IntegerOverflow,
    /// Byte string length does not fit in memory addressing.
    LengthOverflow,

    /// Input contains bytes after the single document.
    TrailingData,

    /// Duplicate dictionary key.
    DuplicateKey,
    /// Dictionary keys are not in ascending byte-wise order.
    UnsortedKey,

    /// Nesting depth limit exceeded.
    DepthLimitExceeded,
    /// Input length limit exceeded.
    InputLimitExceeded,

    /// The value has no wire mapping.
    UnsupportedType,
    /// A mapping key is not a string.
    InvalidKeyType,
    /// The document root is an absent value and would encode to nothing.
    AbsentRoot,

    /// Error raised by a self-describing value, passed through unchanged.
    Custom,
    /// Error raised by the underlying reader or writer.
    Io,
}

impl ErrorCode {
    /// Classify this code.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::UnexpectedEof
            | Self::UnexpectedByte
            | Self::ExpectedDigit
            | Self::LeadingZero
            | Self::NonStringKey => ErrorKind::Syntax,
            Self::IntegerOverflow | Self::LengthOverflow => ErrorKind::Overflow,
            Self::TrailingData => ErrorKind::TrailingData,
            Self::DuplicateKey | Self::UnsortedKey => ErrorKind::KeyOrder,
            Self::DepthLimitExceeded | Self::InputLimitExceeded => ErrorKind::Limit,
            Self::UnsupportedType | Self::InvalidKeyType | Self::AbsentRoot => ErrorKind::Encode,
            Self::Custom | Self::Io => ErrorKind::External,
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Self::UnexpectedEof => "unexpected end of input",
            Self::UnexpectedByte => "unexpected byte",
            Self::ExpectedDigit => "expected a decimal digit",
            Self::LeadingZero => "leading zero or negative zero in number",
            Self::NonStringKey => "dictionary keys must be byte strings",

            Self::IntegerOverflow => "integer outside signed 64-bit range",
            Self::LengthOverflow => "length overflow",

            Self::TrailingData => "trailing bytes after single document",

            Self::DuplicateKey => "duplicate dictionary key",
            Self::UnsortedKey => "dictionary keys not in ascending order",

            Self::DepthLimitExceeded => "nesting depth limit exceeded",
            Self::InputLimitExceeded => "input length limit exceeded",

            Self::UnsupportedType => "unsupported type",
            Self::InvalidKeyType => "mapping keys must be strings",
            Self::AbsentRoot => "document root is absent",

            Self::Custom => "self-describing value failed",
            Self::Io => "i/o failure",
        }
    }
}

/// A bencode error with a stable code and a byte offset.
///
/// For decode errors `offset` is the position in the input where the problem was detected. For
/// encode errors it is the length of the output written so far.
pub struct BencodeError {
    /// The error code.
    pub code: ErrorCode,
    /// Byte offset where the error was detected.
    pub offset: usize,
    shape: Option<&'static str>,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl BencodeError {
    /// Construct an error at `offset`.
    #[inline]
    #[must_use]
    pub const fn new(code: ErrorCode, offset: usize) -> Self {
        Self {
            code,
            offset,
            shape: None,
            source: None,
        }
    }

    /// Construct an `UnsupportedType` error naming the offending shape.
    #[inline]
    #[must_use]
    pub const fn unsupported(shape: &'static str, offset: usize) -> Self {
        Self {
            code: ErrorCode::UnsupportedType,
            offset,
            shape: Some(shape),
            source: None,
        }
    }

    /// Construct an `InvalidKeyType` error naming the offending key type.
    #[inline]
    #[must_use]
    pub const fn invalid_key(shape: &'static str) -> Self {
        Self {
            code: ErrorCode::InvalidKeyType,
            offset: 0,
            shape: Some(shape),
            source: None,
        }
    }

    /// Wrap an error produced by a self-describing value.
    ///
    /// The encoder and decoder return it to the caller untouched; recover the original with
    /// [`std::error::Error::source`] and `downcast_ref`.
    #[must_use]
    pub fn custom<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            code: ErrorCode::Custom,
            offset: 0,
            shape: None,
            source: Some(Box::new(err)),
        }
    }

    /// Wrap an I/O error raised at `offset`.
    #[must_use]
    pub fn io(err: std::io::Error, offset: usize) -> Self {
        Self {
            code: ErrorCode::Io,
            offset,
            shape: None,
            source: Some(Box::new(err)),
        }
    }

    /// Classify this error.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// The type or shape name attached to encode errors, if any.
    #[inline]
    #[must_use]
    pub const fn shape(&self) -> Option<&'static str> {
        self.shape
    }

    /// Returns true iff this error is a malformed-input error.
    #[inline]
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(self.code.kind(), ErrorKind::Syntax)
    }

    /// Take the boxed cause of a `Custom` or `Io` error.
    #[must_use]
    pub fn into_source(self) -> Option<Box<dyn StdError + Send + Sync + 'static>> {
        self.source
    }

    pub(crate) fn at(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

impl fmt::Debug for BencodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("BencodeError");
        d.field("code", &self.code).field("offset", &self.offset);
        if let Some(shape) = self.shape {
            d.field("shape", &shape);
        }
        if let Some(source) = &self.source {
            d.field("source", source);
        }
        d.finish()
    }
}

impl fmt::Display for BencodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = self.code.message();
        match self.code.kind() {
            ErrorKind::Encode => match self.shape {
                Some(shape) => write!(f, "bencode encode failed: {msg}: {shape}"),
                None => write!(f, "bencode encode failed: {msg}"),
            },
            ErrorKind::External => match &self.source {
                Some(source) => write!(f, "{msg}: {source}"),
                None => f.write_str(msg),
            },
            _ => write!(f, "bencode failed at {}: {msg}", self.offset),
        }
    }
}

impl StdError for BencodeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl From<ErrorCode> for BencodeError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code, 0)
    }
}
