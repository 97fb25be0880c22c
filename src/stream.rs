use std::io::{self, Read, Write};

use crate::codec::{encode_into, BencodeDecode, BencodeEncode};
use crate::parse::Decoder;
use crate::pool::{BufferPool, PooledBuffer};
use crate::{BencodeError, DecodeLimits, ErrorCode, Value};

const READ_CHUNK: usize = 8 * 1024;

/// Writes one document per [`Writer::write`] call to an `io::Write` sink.
///
/// Each document is encoded into a pooled scratch buffer first, so a failed encode never leaves
/// a partial document in the sink.
pub struct Writer<'p, W: Write> {
    inner: W,
    buf: PooledBuffer<'p>,
    written: usize,
}

impl<W: Write> Writer<'static, W> {
    /// Create a writer that borrows its scratch buffer from [`BufferPool::global`].
    pub fn new(inner: W) -> Self {
        Self::with_pool(inner, BufferPool::global())
    }
}

impl<'p, W: Write> Writer<'p, W> {
    /// Create a writer that borrows its scratch buffer from `pool`.
    pub fn with_pool(inner: W, pool: &'p BufferPool) -> Self {
        Self {
            inner,
            buf: pool.checkout(),
            written: 0,
        }
    }

    /// Encode `value` and write it to the sink.
    ///
    /// # Errors
    ///
    /// Returns any encode error, or an `Io` error if the sink fails.
    pub fn write<T: BencodeEncode + ?Sized>(&mut self, value: &T) -> Result<(), BencodeError> {
        self.buf.clear();
        let doc = encode_into(&mut self.buf, value)?;
        self.inner
            .write_all(doc)
            .map_err(|err| BencodeError::io(err, self.written))?;
        self.written += doc.len();
        tracing::trace!(len = doc.len(), total = self.written, "wrote bencode document");
        Ok(())
    }

    /// Flush the sink.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the sink fails.
    pub fn flush(&mut self) -> Result<(), BencodeError> {
        self.inner
            .flush()
            .map_err(|err| BencodeError::io(err, self.written))
    }

    /// Total bytes written so far.
    #[must_use]
    pub const fn bytes_written(&self) -> usize {
        self.written
    }

    /// Borrow the sink.
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Return the sink; the scratch buffer goes back to its pool.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Reads one document per [`Reader::read`] call from an `io::Read` source.
///
/// Input is buffered in chunks. A document split across chunks is parsed again only once the
/// pending bytes have doubled, so a large document costs amortized linear work.
/// `limits.max_input_bytes` bounds each document, not the whole stream.
pub struct Reader<R: Read> {
    inner: R,
    limits: DecodeLimits,
    buf: Vec<u8>,
    start: usize,
    consumed: usize,
    eof: bool,
}

impl<R: Read> Reader<R> {
    /// Create a reader with default limits.
    pub fn new(inner: R) -> Self {
        Self::with_limits(inner, DecodeLimits::default())
    }

    /// Create a reader with explicit limits.
    pub const fn with_limits(inner: R, limits: DecodeLimits) -> Self {
        Self {
            inner,
            limits,
            buf: Vec::new(),
            start: 0,
            consumed: 0,
            eof: false,
        }
    }

    /// Read the next document, or `None` at a clean end of input.
    ///
    /// # Errors
    ///
    /// Returns a syntax error for malformed or truncated documents, `InputLimitExceeded` for a
    /// document larger than the limit, or `Io` if the source fails.
    pub fn read(&mut self) -> Result<Option<Value>, BencodeError> {
        self.read_as()
    }

    /// Read the next document into `T`.
    ///
    /// # Errors
    ///
    /// See [`Reader::read`].
    pub fn read_as<T: BencodeDecode>(&mut self) -> Result<Option<T>, BencodeError> {
        let max = self.limits.max_input_bytes;
        // Pending length required before the next parse attempt; doubles after each short parse.
        let mut target = 1;
        loop {
            let pending = &self.buf[self.start..];
            if pending.len() >= target || (self.eof && !pending.is_empty()) {
                let view = &pending[..pending.len().min(max)];
                let base = self.consumed + self.start;
                let mut decoder = Decoder::new(view, self.limits)?;
                match T::decode(&mut decoder) {
                    Ok(value) => {
                        self.start += decoder.position();
                        return Ok(Some(value));
                    }
                    Err(err) if err.code == ErrorCode::UnexpectedEof && !self.eof => {
                        if view.len() >= max {
                            tracing::debug!(max, "bencode document exceeds input limit");
                            return Err(BencodeError::new(
                                ErrorCode::InputLimitExceeded,
                                base + max,
                            ));
                        }
                        target = view.len().saturating_mul(2).min(max);
                    }
                    Err(err) => {
                        let offset = base + err.offset;
                        return Err(err.at(offset));
                    }
                }
            } else if self.eof {
                return Ok(None);
            }
            self.fill()?;
        }
    }

    /// Total bytes consumed by completed documents.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.consumed + self.start
    }

    /// Return the source; buffered but unread bytes are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self) -> Result<(), BencodeError> {
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.consumed += self.start;
            self.start = 0;
        }
        let old = self.buf.len();
        self.buf.resize(old + READ_CHUNK, 0);
        let n = loop {
            match self.inner.read(&mut self.buf[old..]) {
                Ok(n) => break n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    self.buf.truncate(old);
                    return Err(BencodeError::io(err, self.consumed + old));
                }
            }
        };
        self.buf.truncate(old + n);
        if n == 0 {
            tracing::debug!(pending = old, "bencode reader reached end of input");
            self.eof = true;
        }
        Ok(())
    }
}

impl<R: Read> Iterator for Reader<R> {
    type Item = Result<Value, BencodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}
