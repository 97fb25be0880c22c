use crate::order::cmp_key_bytes;
use crate::value::Dictionary;
use crate::wire::Cursor;
use crate::{BencodeError, DecodeLimits, ErrorCode, Value};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Mode {
    Lenient,
    Canonical,
}

enum Frame<'de> {
    List(Vec<Value>),
    Dict {
        entries: Dictionary,
        last_key: Option<&'de [u8]>,
        pending: Option<&'de [u8]>,
    },
}

impl Frame<'_> {
    fn into_value(self) -> Value {
        match self {
            Self::List(items) => Value::List(items),
            Self::Dict { entries, .. } => Value::Dictionary(entries),
        }
    }
}

/// Single-byte-lookahead decoder over a borrowed input.
///
/// Containers are tracked on an explicit frame stack, so hostile nesting is bounded by
/// [`DecodeLimits::max_depth`] rather than by the call stack.
pub struct Decoder<'de> {
    cursor: Cursor<'de>,
    limits: DecodeLimits,
    mode: Mode,
}

impl<'de> Decoder<'de> {
    /// Create a lenient decoder.
    ///
    /// # Errors
    ///
    /// Returns `InputLimitExceeded` if `bytes` is longer than `limits.max_input_bytes`.
    pub fn new(bytes: &'de [u8], limits: DecodeLimits) -> Result<Self, BencodeError> {
        if bytes.len() > limits.max_input_bytes {
            tracing::debug!(
                len = bytes.len(),
                max = limits.max_input_bytes,
                "rejecting oversized bencode input"
            );
            return Err(BencodeError::new(
                ErrorCode::InputLimitExceeded,
                limits.max_input_bytes,
            ));
        }
        Ok(Self {
            cursor: Cursor::new(bytes),
            limits,
            mode: Mode::Lenient,
        })
    }

    /// Require dictionary keys to be strictly ascending.
    #[must_use]
    pub const fn canonical(mut self) -> Self {
        self.mode = Mode::Canonical;
        self
    }

    /// Returns `true` if this decoder rejects unsorted keys.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.mode == Mode::Canonical
    }

    /// Current byte offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Returns `true` if all input has been consumed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cursor.remaining() == 0
    }

    /// The limits this decoder enforces.
    #[must_use]
    pub const fn limits(&self) -> DecodeLimits {
        self.limits
    }

    /// Fail with `TrailingData` unless all input has been consumed.
    ///
    /// # Errors
    ///
    /// Returns `TrailingData` at the first unconsumed byte.
    pub fn finish(&self) -> Result<(), BencodeError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(BencodeError::new(ErrorCode::TrailingData, self.position()))
        }
    }

    /// Decode the next document, or `None` once the input is exhausted.
    pub fn next_document(&mut self) -> Option<Result<Value, BencodeError>> {
        if self.is_empty() {
            None
        } else {
            Some(self.value())
        }
    }

    /// Validate one value and return its exact bytes.
    ///
    /// # Errors
    ///
    /// Returns any error [`Decoder::value`] would.
    pub fn raw_value(&mut self) -> Result<&'de [u8], BencodeError> {
        let start = self.position();
        self.value()?;
        Ok(&self.cursor.data()[start..self.position()])
    }

    /// Decode one value starting at the current position.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is malformed, contains a duplicate key (or, in canonical
    /// mode, an out-of-order key), or nests deeper than the depth limit.
    pub fn value(&mut self) -> Result<Value, BencodeError> {
        let mut stack: Vec<Frame<'de>> = Vec::new();
        loop {
            if let Some(Frame::Dict { pending: None, .. }) = stack.last() {
                if self.cursor.peek()? == b'e' {
                    self.cursor.advance(1);
                    let done = pop(&mut stack);
                    if let Some(root) = self.complete(&mut stack, done)? {
                        return Ok(root);
                    }
                    continue;
                }
                self.dict_key(&mut stack)?;
            }

            let off = self.position();
            let value = match self.cursor.peek()? {
                b'i' => Value::Integer(self.cursor.read_int()?),
                b'0'..=b'9' => Value::ByteString(self.cursor.read_bytes()?.to_vec()),
                b'l' => {
                    self.push(&mut stack, Frame::List(Vec::new()), off)?;
                    continue;
                }
                b'd' => {
                    let frame = Frame::Dict {
                        entries: Dictionary::new(),
                        last_key: None,
                        pending: None,
                    };
                    self.push(&mut stack, frame, off)?;
                    continue;
                }
                b'e' if matches!(stack.last(), Some(Frame::List(_))) => {
                    self.cursor.advance(1);
                    pop(&mut stack)
                }
                _ => return Err(BencodeError::new(ErrorCode::UnexpectedByte, off)),
            };
            if let Some(root) = self.complete(&mut stack, value)? {
                return Ok(root);
            }
        }
    }

    fn dict_key(&mut self, stack: &mut [Frame<'de>]) -> Result<(), BencodeError> {
        let off = self.position();
        if !self.cursor.peek()?.is_ascii_digit() {
            return Err(BencodeError::new(ErrorCode::NonStringKey, off));
        }
        let key = self.cursor.read_bytes()?;
        let canonical = self.is_canonical();
        if let Some(Frame::Dict {
            entries,
            last_key,
            pending,
        }) = stack.last_mut()
        {
            match *last_key {
                Some(prev) if canonical => match cmp_key_bytes(prev, key) {
                    core::cmp::Ordering::Less => {}
                    core::cmp::Ordering::Equal => {
                        return Err(BencodeError::new(ErrorCode::DuplicateKey, off))
                    }
                    core::cmp::Ordering::Greater => {
                        return Err(BencodeError::new(ErrorCode::UnsortedKey, off))
                    }
                },
                _ if entries.contains_key(key) => {
                    return Err(BencodeError::new(ErrorCode::DuplicateKey, off));
                }
                _ => {}
            }
            *last_key = Some(key);
            *pending = Some(key);
        }
        Ok(())
    }

    fn push(
        &mut self,
        stack: &mut Vec<Frame<'de>>,
        frame: Frame<'de>,
        off: usize,
    ) -> Result<(), BencodeError> {
        if stack.len() >= self.limits.max_depth {
            tracing::debug!(
                offset = off,
                max_depth = self.limits.max_depth,
                "bencode nesting depth limit exceeded"
            );
            return Err(BencodeError::new(ErrorCode::DepthLimitExceeded, off));
        }
        self.cursor.advance(1);
        stack.push(frame);
        Ok(())
    }

    /// Attach a finished value to its parent; returns the root once the stack unwinds.
    fn complete(
        &self,
        stack: &mut [Frame<'de>],
        value: Value,
    ) -> Result<Option<Value>, BencodeError> {
        match stack.last_mut() {
            None => Ok(Some(value)),
            Some(Frame::List(items)) => {
                items.push(value);
                Ok(None)
            }
            Some(Frame::Dict {
                entries, pending, ..
            }) => match pending.take() {
                Some(key) => {
                    entries.insert(key.to_vec(), value);
                    Ok(None)
                }
                None => Err(BencodeError::new(
                    ErrorCode::UnexpectedByte,
                    self.position(),
                )),
            },
        }
    }
}

fn pop(stack: &mut Vec<Frame<'_>>) -> Value {
    stack.pop().map_or(Value::List(Vec::new()), Frame::into_value)
}

/// Iterator over back-to-back documents; see [`crate::decode_stream`].
pub struct Documents<'de> {
    decoder: Option<Decoder<'de>>,
    error: Option<BencodeError>,
}

impl<'de> Documents<'de> {
    pub(crate) fn new(bytes: &'de [u8], limits: DecodeLimits) -> Self {
        match Decoder::new(bytes, limits) {
            Ok(decoder) => Self {
                decoder: Some(decoder),
                error: None,
            },
            Err(err) => Self {
                decoder: None,
                error: Some(err),
            },
        }
    }

    /// Byte offset of the next document.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.decoder.as_ref().map(Decoder::position)
    }
}

impl Iterator for Documents<'_> {
    type Item = Result<Value, BencodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.error.take() {
            return Some(Err(err));
        }
        let decoder = self.decoder.as_mut()?;
        match decoder.next_document() {
            Some(Err(err)) => {
                self.decoder = None;
                Some(Err(err))
            }
            other => other,
        }
    }
}

impl core::iter::FusedIterator for Documents<'_> {}
