//! Parser for WU BLAST output.

use std::io::BufRead;
use std::sync::LazyLock;

use regex::Regex;

use alnkit_core::models::{Alignment, Strand};

use crate::error::{ParserError, Result};
use crate::gap_scanner::GapScanner;
use crate::line_reader::LineReader;

const PLUS_STRAND_LABEL: &str = "Plus Strand HSPs:";
const MINUS_STRAND_LABEL: &str = "Minus Strand HSPs:";

static QUERY_LABEL_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Query=\s*(\S+)").unwrap());
static TARGET_LABEL_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^>(\S+)").unwrap());

static HEADER1_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Score = (\d+) \([^)]+\), Expect = ([^,]+)").unwrap());
static GROUP_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Group = (\d+)").unwrap());
static LINKS_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*Links = (.+)").unwrap());

static HEADER2_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*Identities = \d+/\d+ \((\d+)%\), Positives = \d+/\d+ \(\d+%\), (?:Strand = (Plus|Minus) / Plus|Frame = ([+-]\d+))",
    )
    .unwrap()
});

static QUERY_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Query:\s+(\d+)\s+(\S+)\s+(\d+)").unwrap());
static SBJCT_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Sbjct:\s+(\d+)\s+(\S+)\s+(\d+)").unwrap());

///
/// A parser for WU BLAST output.
///
/// The current query label (`Query=`), target label (`>` marker) and
/// strand section (`Plus Strand HSPs:`/`Minus Strand HSPs:`) persist
/// across HSPs until a new marker appears. Every HSP found is checked
/// against this tracked state; an HSP appearing before both labels, or a
/// nucleotide HSP whose declared strand contradicts the current strand
/// section, is a format violation rather than an ordinary parse error.
///
pub struct WuBlastParser<R> {
    reader: LineReader<R>,
    query_label: Option<String>,
    target_label: Option<String>,
    strand: Strand,
    done: bool,
}

impl<R: BufRead> WuBlastParser<R> {
    pub fn new(reader: R) -> Self {
        WuBlastParser {
            reader: LineReader::new(reader),
            query_label: None,
            target_label: None,
            strand: Strand::Forward,
            done: false,
        }
    }

    fn next_alignment(&mut self) -> Result<Option<Alignment>> {
        loop {
            let line = match self.reader.read_line_or_eof()? {
                Some(line) => line,
                None => return Ok(None),
            };
            let lineno = self.reader.lineno();

            if line.contains(PLUS_STRAND_LABEL) {
                self.strand = Strand::Forward;
            } else if line.contains(MINUS_STRAND_LABEL) {
                self.strand = Strand::Reverse;
            } else if let Some(caps) = HEADER1_RX.captures(&line) {
                let query_label = self.query_label.clone().ok_or_else(|| {
                    ParserError::format_violation(lineno, "missing query label before HSP")
                })?;
                let target_label = self.target_label.clone().ok_or_else(|| {
                    ParserError::format_violation(lineno, "missing target label before HSP")
                })?;

                let mut alignment = Alignment {
                    query_label: Some(query_label),
                    target_label: Some(target_label),
                    score: Some(caps[1].parse().map_err(|_| {
                        ParserError::syntax(lineno, format!("invalid score: {}", &caps[1]))
                    })?),
                    evalue: Some(caps[2].trim().parse().map_err(|_| {
                        ParserError::syntax(lineno, format!("invalid expect value: {}", &caps[2]))
                    })?),
                    ..Alignment::default()
                };

                if let Some(group) = GROUP_RX
                    .captures(&line[caps.get(0).map_or(0, |m| m.end())..])
                    .and_then(|caps| caps[1].parse().ok())
                {
                    alignment.group = Some(group);
                }

                self.parse_alignment(&mut alignment)?;
                return Ok(Some(alignment));
            } else if let Some(caps) = QUERY_LABEL_RX.captures(&line) {
                self.query_label = Some(caps[1].to_string());
            } else if let Some(caps) = TARGET_LABEL_RX.captures(&line) {
                self.target_label = Some(caps[1].to_string());
            }
        }
    }

    /// Parses the second header line and everything below it.
    fn parse_alignment(&mut self, alignment: &mut Alignment) -> Result<()> {
        let line = self
            .reader
            .read_line("was expecting second line of alignment header")?;
        let lineno = self.reader.lineno();

        let caps = HEADER2_RX.captures(&line).ok_or_else(|| {
            ParserError::syntax(lineno, "was expecting second line of alignment header")
        })?;

        alignment.identity = Some(caps[1].parse().map_err(|_| {
            ParserError::syntax(lineno, format!("invalid identity: {}", &caps[1]))
        })?);

        if let Some(strand_name) = caps.get(2) {
            let strand = match strand_name.as_str() {
                "Plus" => Strand::Forward,
                _ => Strand::Reverse,
            };
            if strand != self.strand {
                return Err(ParserError::format_violation(
                    lineno,
                    format!(
                        "unexpected strand {} (the preceding strand section says {})",
                        strand, self.strand
                    ),
                ));
            }
            alignment.strand = Some(strand);
        } else {
            alignment.strand = Some(self.strand);
            alignment.frame = Some(caps[3].parse().map_err(|_| {
                ParserError::syntax(lineno, format!("invalid frame: {}", &caps[3]))
            })?);
        }

        let line = self.reader.read_line("was expecting alignment details")?;
        let first_line = match LINKS_RX.captures(&line) {
            Some(caps) => {
                alignment.links = Some(caps[1].to_string());
                None
            }
            None => Some(line),
        };

        self.parse_details(first_line, alignment)
    }

    /// Parses the repeated `Query:`/`Sbjct:` detail line pairs.
    fn parse_details(
        &mut self,
        mut first_line: Option<String>,
        alignment: &mut Alignment,
    ) -> Result<()> {
        let mut query_start: Option<u64> = None;
        let mut query_stop: Option<u64> = None;
        let mut target_start: Option<u64> = None;
        let mut target_stop: Option<u64> = None;
        let mut query_gap_scanner = GapScanner::new();
        let mut target_gap_scanner = GapScanner::new();
        let mut length: u64 = 0;

        loop {
            let line = match first_line.take() {
                Some(line) => line,
                None => self.reader.read_line("was expecting query details")?,
            };

            let caps = match QUERY_RX.captures(&line) {
                Some(caps) => caps,
                None => {
                    self.reader.unread(line);
                    break;
                }
            };
            let lineno = self.reader.lineno();

            if query_start.is_none() {
                query_start = Some(parse_coord(&caps[1], lineno)?);
            }

            let seq = &caps[2];
            length += seq.len() as u64;
            query_gap_scanner.feed(seq);
            query_stop = Some(parse_coord(&caps[3], lineno)?);

            // the match-mark row between the two detail lines
            self.reader.read_line("was expecting alignment details")?;

            let line = self.reader.read_line("was expecting target details")?;
            let lineno = self.reader.lineno();
            let caps = SBJCT_RX
                .captures(&line)
                .ok_or_else(|| ParserError::syntax(lineno, "was expecting target details"))?;

            if target_start.is_none() {
                let declared = parse_coord(&caps[1], lineno)?;
                target_start = Some(declared.checked_sub(1).ok_or_else(|| {
                    ParserError::syntax(lineno, format!("invalid target start: {}", declared))
                })?);
            }

            target_gap_scanner.feed(&caps[2]);
            target_stop = Some(parse_coord(&caps[3], lineno)?);
        }

        let lineno = self.reader.lineno();
        let (Some(query_start), Some(query_stop), Some(target_start), Some(target_stop)) =
            (query_start, query_stop, target_start, target_stop)
        else {
            return Err(ParserError::syntax(
                lineno + 1,
                "was expecting alignment details",
            ));
        };

        match alignment.strand {
            Some(Strand::Reverse) => {
                // descending query coordinates: first start is the stop
                alignment.query_start = Some(query_stop.saturating_sub(1));
                alignment.query_stop = Some(query_start);
            }
            _ => {
                alignment.query_start = Some(query_start.saturating_sub(1));
                alignment.query_stop = Some(query_stop);
            }
        }

        alignment.target_start = Some(target_start);
        alignment.target_stop = Some(target_stop);
        alignment.length = Some(length);
        alignment.query_gaps = Some(query_gap_scanner.finalize());
        alignment.target_gaps = Some(target_gap_scanner.finalize());

        check_span(
            "query",
            alignment.query_start,
            alignment.query_stop,
            lineno,
        )?;
        check_span(
            "target",
            alignment.target_start,
            alignment.target_stop,
            lineno,
        )?;

        Ok(())
    }
}

impl<R: BufRead> Iterator for WuBlastParser<R> {
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

fn parse_coord(text: &str, lineno: u64) -> Result<u64> {
    text.parse()
        .map_err(|_| ParserError::syntax(lineno, format!("invalid coordinate: {}", text)))
}

fn check_span(axis: &str, start: Option<u64>, stop: Option<u64>, lineno: u64) -> Result<()> {
    if let (Some(start), Some(stop)) = (start, stop) {
        if start >= stop {
            return Err(ParserError::format_violation(
                lineno,
                format!("{}_start ({}) >= {}_stop ({})", axis, start, axis, stop),
            ));
        }
    }
    Ok(())
}
