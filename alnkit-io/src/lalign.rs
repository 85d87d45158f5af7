//! Parser for LALIGN output.

use std::io::BufRead;
use std::sync::LazyLock;

use regex::Regex;

use alnkit_core::models::{Alignment, Strand};

use crate::error::{ParserError, Result};
use crate::gap_scanner::GapScanner;
use crate::line_reader::LineReader;

static HEADER_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*Comparison of:").unwrap());

static SUMMARY_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(\d+\.\d+)% identity in (\d+) nt overlap \((\d+)-(\d+):(\d+)-(\d+)\); score:\s+(\d+) E\(\d+\):\s+(\d+(?:\.\d+)?(?:e[+-]\d+)?)",
    )
    .unwrap()
});

///
/// A parser for LALIGN output.
///
/// Comparison headers are optional before each alignment; the labels,
/// strand and query length they declare persist for every following
/// alignment until superseded by a later header. A `(rev-comp)` tag on the
/// `(A)` line marks a reverse-complemented query, whose summary coordinates
/// are mirrored against the declared query length.
///
/// # Example
///
/// ```no_run
/// use std::io::BufReader;
/// use alnkit_io::lalign::LalignParser;
///
/// let file = std::fs::File::open("report.lalign").unwrap();
/// for alignment in LalignParser::new(BufReader::new(file)) {
///     let alignment = alignment.unwrap();
///     println!("{:?} {:?}", alignment.query_start, alignment.query_stop);
/// }
/// ```
pub struct LalignParser<R> {
    reader: LineReader<R>,
    query_label: Option<String>,
    target_label: Option<String>,
    strand: Option<Strand>,
    query_len: Option<u64>,
    done: bool,
}

impl<R: BufRead> LalignParser<R> {
    pub fn new(reader: R) -> Self {
        LalignParser {
            reader: LineReader::new(reader),
            query_label: None,
            target_label: None,
            strand: None,
            query_len: None,
            done: false,
        }
    }

    fn next_alignment(&mut self) -> Result<Option<Alignment>> {
        loop {
            let line = match self.reader.read_line_or_eof()? {
                Some(line) => line,
                None => return Ok(None),
            };

            let is_header = HEADER_RX.is_match(&line);
            if is_header {
                self.parse_header()?;
            } else {
                self.reader.unread(line);
            }

            match self.parse_alignment()? {
                Some(alignment) => return Ok(Some(alignment)),
                None => {
                    if !is_header {
                        return Err(ParserError::syntax(
                            self.reader.lineno() + 1,
                            "unexpected content",
                        ));
                    }
                    // a header followed by no summary line: let the outer
                    // loop decide whether the stream simply ended
                }
            }
        }
    }

    fn parse_header(&mut self) -> Result<()> {
        for tag in ["(A)", "(B)"] {
            let line = self.reader.read_line("was expecting an header")?;
            let lineno = self.reader.lineno();
            let tokens: Vec<&str> = line.split_whitespace().collect();

            if tokens.first() != Some(&tag) {
                return Err(ParserError::syntax(lineno, "unexpected header"));
            }

            if tag == "(A)" {
                if tokens.get(2) == Some(&"(rev-comp)") {
                    let label = tokens
                        .get(3)
                        .ok_or_else(|| ParserError::syntax(lineno, "unexpected header"))?;
                    self.query_label = Some(label.to_string());
                    self.strand = Some(Strand::Reverse);

                    let declared_len = tokens
                        .len()
                        .checked_sub(2)
                        .and_then(|i| tokens.get(i))
                        .and_then(|t| t.parse::<u64>().ok());
                    self.query_len = Some(declared_len.ok_or_else(|| {
                        ParserError::syntax(lineno, "invalid query length")
                    })?);
                } else {
                    let label = tokens
                        .get(2)
                        .ok_or_else(|| ParserError::syntax(lineno, "unexpected header"))?;
                    self.query_label = Some(label.to_string());
                    self.strand = Some(Strand::Forward);
                }
            } else {
                let label = tokens
                    .get(2)
                    .ok_or_else(|| ParserError::syntax(lineno, "unexpected header"))?;
                self.target_label = Some(label.to_string());
            }
        }

        let line = self.reader.read_line("was expecting an header")?;
        if !line.starts_with(" using matrix file:") {
            return Err(ParserError::syntax(self.reader.lineno(), "unexpected header"));
        }

        Ok(())
    }

    fn parse_alignment(&mut self) -> Result<Option<Alignment>> {
        let line = match self.reader.read_line_or_eof()? {
            Some(line) => line,
            None => return Ok(None),
        };
        let lineno = self.reader.lineno();

        let caps = match SUMMARY_RX.captures(&line) {
            Some(caps) => caps,
            None => {
                self.reader.unread(line);
                return Ok(None);
            }
        };

        let invalid = |what: &str| ParserError::syntax(lineno, format!("invalid {} in summary", what));

        let mut alignment = Alignment {
            query_label: self.query_label.clone(),
            target_label: self.target_label.clone(),
            identity: Some(caps[1].parse().map_err(|_| invalid("identity"))?),
            length: Some(caps[2].parse().map_err(|_| invalid("overlap length"))?),
            strand: self.strand,
            score: Some(caps[7].parse().map_err(|_| invalid("score"))?),
            evalue: Some(caps[8].parse().map_err(|_| invalid("e-value"))?),
            ..Alignment::default()
        };

        let mut query_start = parse_one_based(&caps[3], "query start", lineno)?;
        let mut query_stop: u64 = caps[4].parse().map_err(|_| invalid("query stop"))?;

        if self.strand == Some(Strand::Reverse) {
            let query_len = self
                .query_len
                .filter(|len| *len >= query_stop)
                .ok_or_else(|| invalid("query length for reverse strand"))?;
            (query_start, query_stop) = (query_len - query_stop, query_len - query_start);
        }
        alignment.query_start = Some(query_start);
        alignment.query_stop = Some(query_stop);

        alignment.target_start = Some(parse_one_based(&caps[5], "target start", lineno)?);
        alignment.target_stop = Some(caps[6].parse().map_err(|_| invalid("target stop"))?);

        self.parse_strand_gaps(&mut alignment)?;
        Ok(Some(alignment))
    }

    /// Consumes the interleaved detail blocks following a summary line and
    /// collects the gaps of both axes.
    fn parse_strand_gaps(&mut self, alignment: &mut Alignment) -> Result<()> {
        let mut query_gap_scanner = GapScanner::new();
        let mut target_gap_scanner = GapScanner::new();

        loop {
            let line = self.reader.read_line("was expecting alignment details")?;
            if line.starts_with('-') {
                break;
            }

            let mut details = Vec::with_capacity(4);
            for _ in 0..4 {
                details.push(self.reader.read_line("was expecting alignment details")?);
            }

            for (idx, scanner) in [
                (0, &mut query_gap_scanner),
                (2, &mut target_gap_scanner),
            ] {
                let detail: &str = &details[idx];
                let space = detail.find(' ').ok_or_else(|| {
                    ParserError::syntax(self.reader.lineno(), "unexpected alignment details")
                })?;
                scanner.feed(detail[space + 1..].trim());
            }
        }

        alignment.query_gaps = Some(query_gap_scanner.finalize());
        alignment.target_gaps = Some(target_gap_scanner.finalize());
        Ok(())
    }
}

impl<R: BufRead> Iterator for LalignParser<R> {
    type Item = Result<Alignment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_alignment() {
            Ok(Some(alignment)) => Some(Ok(alignment)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

fn parse_one_based(text: &str, what: &str, lineno: u64) -> Result<u64> {
    text.parse::<u64>()
        .ok()
        .and_then(|v| v.checked_sub(1))
        .ok_or_else(|| ParserError::syntax(lineno, format!("invalid {} in summary: {}", what, text)))
}
