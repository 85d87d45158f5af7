use std::io::BufRead;

use crate::error::{ParserError, Result};

///
/// A buffered, line-numbered reader over a text stream, automatically
/// skipping blank lines and supporting one line of pushback.
///
/// Whitespace-only lines are not blank and are returned as-is; line
/// terminators are stripped.
///
pub struct LineReader<R> {
    reader: R,
    lineno: u64,
    pushback: Option<String>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        LineReader {
            reader,
            lineno: 0,
            pushback: None,
        }
    }

    /// The 1-based number of the last line returned.
    pub fn lineno(&self) -> u64 {
        self.lineno
    }

    ///
    /// Read the next non-blank line, failing on end of input.
    ///
    /// # Arguments
    /// - context: what the caller was expecting, attached to the
    ///   [`ParserError::UnexpectedEof`] raised if the stream ends.
    ///
    pub fn read_line(&mut self, context: &str) -> Result<String> {
        match self.next_line()? {
            Some(line) => Ok(line),
            None => Err(ParserError::UnexpectedEof {
                line: self.lineno,
                context: context.to_string(),
            }),
        }
    }

    ///
    /// Read the next non-blank line, returning `None` on a legitimate end
    /// of the stream.
    ///
    pub fn read_line_or_eof(&mut self) -> Result<Option<String>> {
        self.next_line()
    }

    ///
    /// Push one line back; the next read returns it again. Only a single
    /// line of pushback is supported at a time.
    ///
    pub fn unread(&mut self, line: String) {
        debug_assert!(self.pushback.is_none(), "only one line of pushback");
        self.lineno -= 1;
        self.pushback = Some(line);
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.pushback.take() {
            self.lineno += 1;
            return Ok(Some(line));
        }

        loop {
            let mut buf = String::new();
            let bytes_read = self.reader.read_line(&mut buf)?;
            if bytes_read == 0 {
                return Ok(None);
            }

            self.lineno += 1;
            if buf.ends_with('\n') {
                buf.pop();
                if buf.ends_with('\r') {
                    buf.pop();
                }
            }

            if !buf.is_empty() {
                return Ok(Some(buf));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn reader(text: &str) -> LineReader<&[u8]> {
        LineReader::new(text.as_bytes())
    }

    #[rstest]
    fn test_skips_blank_lines_and_counts() {
        let mut rd = reader("first\n\n\nsecond\n");
        assert_eq!(rd.read_line("ctx").unwrap(), "first");
        assert_eq!(rd.lineno(), 1);
        assert_eq!(rd.read_line("ctx").unwrap(), "second");
        assert_eq!(rd.lineno(), 4);
    }

    #[rstest]
    fn test_whitespace_only_lines_are_returned() {
        let mut rd = reader("   \nnext\n");
        assert_eq!(rd.read_line("ctx").unwrap(), "   ");
    }

    #[rstest]
    fn test_unread_round_trip() {
        let mut rd = reader("first\nsecond\n");
        let line = rd.read_line("ctx").unwrap();
        rd.unread(line);
        assert_eq!(rd.lineno(), 0);
        assert_eq!(rd.read_line("ctx").unwrap(), "first");
        assert_eq!(rd.lineno(), 1);
        assert_eq!(rd.read_line("ctx").unwrap(), "second");
    }

    #[rstest]
    fn test_hard_eof_carries_context() {
        let mut rd = reader("only\n");
        rd.read_line("ctx").unwrap();
        let err = rd.read_line("was expecting details").unwrap_err();
        match err {
            ParserError::UnexpectedEof { line, context } => {
                assert_eq!(line, 1);
                assert_eq!(context, "was expecting details");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    fn test_soft_eof() {
        let mut rd = reader("only\n");
        rd.read_line("ctx").unwrap();
        assert!(rd.read_line_or_eof().unwrap().is_none());
    }

    #[rstest]
    fn test_strips_crlf() {
        let mut rd = reader("first\r\nsecond\r\n");
        assert_eq!(rd.read_line("ctx").unwrap(), "first");
        assert_eq!(rd.read_line("ctx").unwrap(), "second");
    }
}
