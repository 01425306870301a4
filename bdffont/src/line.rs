use std::io::{BufRead, Read};

use crate::error::Error;


/// The default upper bound on the length of a single input line, in bytes.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;


/// Reads a text stream line by line into a reusable buffer, refusing lines longer than a limit.
///
/// Lines are handled as raw bytes; BDF keywords and numbers are ASCII, but property values such as
/// `COPYRIGHT` are not guaranteed to be valid UTF-8.
#[derive(Debug)]
pub(crate) struct LineReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    line_number: usize,
    max_line_length: usize,
}
impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R, max_line_length: usize) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_number: 0,
            max_line_length,
        }
    }

    /// Reads the next line, returning `Ok(None)` at EOF.
    ///
    /// The returned slice includes the line terminator if there was one.
    pub fn next_line(&mut self) -> Result<Option<&[u8]>, Error> {
        self.buf.clear();

        // two extra bytes for a CR LF terminator
        let limit = u64::try_from(self.max_line_length)
            .unwrap_or(u64::MAX)
            .saturating_add(2);
        let bytes_read = self.reader
            .by_ref()
            .take(limit)
            .read_until(b'\n', &mut self.buf)?;
        if bytes_read == 0 {
            // EOF
            return Ok(None);
        }
        self.line_number += 1;

        let mut content = &self.buf[..];
        if let Some(rest) = content.strip_suffix(b"\n") {
            content = rest;
        }
        if let Some(rest) = content.strip_suffix(b"\r") {
            content = rest;
        }
        let content_length = content.len();
        if content_length > self.max_line_length {
            return Err(Error::LineTooLong {
                line_number: self.line_number,
                limit: self.max_line_length,
            });
        }

        Ok(Some(&self.buf))
    }

    pub fn line_number(&self) -> usize { self.line_number }
}


fn is_separator(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n' || b == b'\r'
}

/// Splits a line into whitespace-delimited tokens.
pub(crate) fn tokens(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line
        .split(|&b| is_separator(b))
        .filter(|t| !t.is_empty())
}

/// Converts a token into an integer the way C's `atoi` does.
///
/// An optional sign is followed by the longest run of decimal digits; anything after it is ignored.
/// A missing token or one without leading digits yields 0. Values outside the `i32` range
/// saturate.
pub(crate) fn lenient_int(token: Option<&[u8]>) -> i32 {
    let Some(token) = token else {
        return 0;
    };
    let (negative, digits) = match token.first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    // one past i32::MAX so that i32::MIN survives negation
    let cap = i64::from(i32::MAX) + 1;
    let mut value: i64 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        value = (value * 10 + i64::from(b - b'0')).min(cap);
    }
    if negative {
        value = -value;
    }
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}


#[cfg(test)]
mod tests {
    use super::{lenient_int, tokens, LineReader};
    use crate::error::Error;
    use std::io::Cursor;

    #[test]
    fn test_tokens() {
        let collected: Vec<&[u8]> = tokens(b"  BBX\t8 16  0 -2\r\n").collect();
        assert_eq!(collected, vec![&b"BBX"[..], &b"8"[..], &b"16"[..], &b"0"[..], &b"-2"[..]]);

        assert_eq!(tokens(b" \t\r\n").count(), 0);
    }

    #[test]
    fn test_lenient_int() {
        assert_eq!(lenient_int(Some(b"65")), 65);
        assert_eq!(lenient_int(Some(b"-1")), -1);
        assert_eq!(lenient_int(Some(b"+7")), 7);
        assert_eq!(lenient_int(Some(b"12abc")), 12);
        assert_eq!(lenient_int(Some(b"abc")), 0);
        assert_eq!(lenient_int(Some(b"-")), 0);
        assert_eq!(lenient_int(None), 0);
        assert_eq!(lenient_int(Some(b"99999999999")), i32::MAX);
        assert_eq!(lenient_int(Some(b"-2147483648")), i32::MIN);
        assert_eq!(lenient_int(Some(b"-99999999999")), i32::MIN);
    }

    #[test]
    fn test_line_reader() {
        let mut reader = LineReader::new(Cursor::new(&b"first\nsecond\r\nlast"[..]), 16);
        assert_eq!(reader.next_line().unwrap(), Some(&b"first\n"[..]));
        assert_eq!(reader.next_line().unwrap(), Some(&b"second\r\n"[..]));
        assert_eq!(reader.next_line().unwrap(), Some(&b"last"[..]));
        assert_eq!(reader.line_number(), 3);
        assert_eq!(reader.next_line().unwrap(), None);
    }

    #[test]
    fn test_line_reader_limit() {
        // exactly at the limit, with and without a newline
        let mut reader = LineReader::new(Cursor::new(&b"abcd\nabcd"[..]), 4);
        assert_eq!(reader.next_line().unwrap(), Some(&b"abcd\n"[..]));
        assert_eq!(reader.next_line().unwrap(), Some(&b"abcd"[..]));

        // the terminator does not count, whether LF or CR LF
        let mut reader = LineReader::new(Cursor::new(&b"abcd\r\nnext\r\nabcd\r"[..]), 4);
        assert_eq!(reader.next_line().unwrap(), Some(&b"abcd\r\n"[..]));
        assert_eq!(reader.next_line().unwrap(), Some(&b"next\r\n"[..]));
        assert_eq!(reader.next_line().unwrap(), Some(&b"abcd\r"[..]));
        assert_eq!(reader.next_line().unwrap(), None);

        let mut reader = LineReader::new(Cursor::new(&b"abcde\r\n"[..]), 4);
        assert!(matches!(reader.next_line(), Err(Error::LineTooLong { line_number: 1, limit: 4 })));

        let mut reader = LineReader::new(Cursor::new(&b"ok\nabcde\n"[..]), 4);
        assert_eq!(reader.next_line().unwrap(), Some(&b"ok\n"[..]));
        match reader.next_line() {
            Err(Error::LineTooLong { line_number, limit }) => {
                assert_eq!(line_number, 2);
                assert_eq!(limit, 4);
            },
            other => panic!("unexpected result {:?}", other),
        }
    }
}
