use crate::{BencodeError, ErrorCode};

/// Longest decimal rendering of an `i64` (`-9223372036854775808`).
const MAX_INT_DIGITS: usize = 20;

/// Append the canonical decimal form of `n`: no leading zeros, single `-` for negatives.
pub fn write_decimal(out: &mut Vec<u8>, n: i64) {
    let mut buf = [0u8; MAX_INT_DIGITS];
    let mut pos = buf.len();
    let mut mag = n.unsigned_abs();
    loop {
        pos -= 1;
        // `mag % 10` is always a single digit.
        buf[pos] = b'0' + (mag % 10) as u8;
        mag /= 10;
        if mag == 0 {
            break;
        }
    }
    if n < 0 {
        pos -= 1;
        buf[pos] = b'-';
    }
    out.extend_from_slice(&buf[pos..]);
}

/// Append `<len>:` for a byte string of `len` bytes.
pub fn write_len_prefix(out: &mut Vec<u8>, len: usize) {
    let mut buf = [0u8; MAX_INT_DIGITS];
    let mut pos = buf.len();
    let mut n = len;
    loop {
        pos -= 1;
        buf[pos] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    out.extend_from_slice(&buf[pos..]);
    out.push(b':');
}

/// Read cursor over a borrowed input.
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    pub const fn position(&self) -> usize {
        self.pos
    }

    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn peek(&self) -> Result<u8, BencodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| BencodeError::new(ErrorCode::UnexpectedEof, self.pos))
    }

    pub fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn expect(&mut self, byte: u8) -> Result<(), BencodeError> {
        let off = self.pos;
        if self.peek()? != byte {
            return Err(BencodeError::new(ErrorCode::UnexpectedByte, off));
        }
        self.pos += 1;
        Ok(())
    }

    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], BencodeError> {
        let off = self.pos;
        let end = self
            .pos
            .checked_add(n)
            .ok_or_else(|| BencodeError::new(ErrorCode::LengthOverflow, off))?;
        if end > self.data.len() {
            return Err(BencodeError::new(ErrorCode::UnexpectedEof, self.data.len()));
        }
        let s = &self.data[self.pos..end];
        self.pos = end;
        Ok(s)
    }

    /// Scan a run of ASCII digits starting at the cursor.
    ///
    /// Rejects empty runs and leading zeros (a lone `0` is accepted).
    fn digits(&mut self) -> Result<&'a [u8], BencodeError> {
        let start = self.pos;
        let run = self.data[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if run == 0 {
            return Err(match self.data.get(start) {
                None => BencodeError::new(ErrorCode::UnexpectedEof, start),
                Some(_) => BencodeError::new(ErrorCode::ExpectedDigit, start),
            });
        }
        let digits = &self.data[start..start + run];
        if run > 1 && digits[0] == b'0' {
            return Err(BencodeError::new(ErrorCode::LeadingZero, start));
        }
        self.pos += run;
        Ok(digits)
    }

    /// Read `i[-]<digits>e`, with the cursor on the `i`.
    pub fn read_int(&mut self) -> Result<i64, BencodeError> {
        let start = self.pos;
        self.expect(b'i')?;
        let negative = self.peek()? == b'-';
        if negative {
            self.pos += 1;
        }
        let digits_at = self.pos;
        let digits = self.digits()?;
        if negative && digits == b"0" {
            return Err(BencodeError::new(ErrorCode::LeadingZero, digits_at));
        }
        let magnitude = accumulate(digits)
            .ok_or_else(|| BencodeError::new(ErrorCode::IntegerOverflow, start))?;
        self.expect(b'e')?;

        let value = if negative {
            0i64.checked_sub_unsigned(magnitude)
        } else {
            i64::try_from(magnitude).ok()
        };
        value.ok_or_else(|| BencodeError::new(ErrorCode::IntegerOverflow, start))
    }

    /// Read `<len>:<bytes>`, with the cursor on the first length digit.
    pub fn read_bytes(&mut self) -> Result<&'a [u8], BencodeError> {
        let start = self.pos;
        let digits = self.digits()?;
        let len = accumulate(digits)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| BencodeError::new(ErrorCode::LengthOverflow, start))?;
        self.expect(b':')?;
        if len > self.remaining() {
            return Err(BencodeError::new(ErrorCode::UnexpectedEof, self.data.len()));
        }
        self.read_exact(len)
    }
}

fn accumulate(digits: &[u8]) -> Option<u64> {
    digits.iter().try_fold(0u64, |acc, &d| {
        acc.checked_mul(10)?.checked_add(u64::from(d - b'0'))
    })
}
