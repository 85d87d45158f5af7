//! Parser for BLASTZ (lav) output.

use std::io::BufRead;

use alnkit_core::models::{Alignment, Gap, Strand};

use crate::error::{ParserError, Result};
use crate::line_reader::LineReader;

/// Default maximum skip between two co-linear HSPs still merged into one
/// alignment.
pub const DEFAULT_MAX_GAP: u64 = 10;

const REVERSE_COMPLEMENT_LABEL: &str = " (reverse complement)";

/// An alignment being stitched together out of consecutive co-linear HSPs.
struct OpenAlignment {
    query_start: u64,
    query_stop: u64,
    target_start: u64,
    target_stop: u64,
    length: u64,
    query_gaps: Vec<Gap>,
    target_gaps: Vec<Gap>,
}

///
/// A parser for BLASTZ output.
///
/// The lav format carries `s { }` (sequence metadata), `h { }` (header)
/// and `a { }` (alignment) sections. Consecutive co-linear HSPs inside an
/// `a` section are merged into a single alignment as long as the skip
/// between them stays within `max_gap` on both axes and their spans do not
/// overlap; larger skips and overlaps split the output. A skip on one axis
/// is recorded as a gap entry on the *other* axis's gap list, at the
/// cumulative aligned length reached so far; this mirrors how the columns
/// of the stitched alignment line up and is preserved exactly.
///
pub struct BlastzParser<R> {
    reader: LineReader<R>,
    max_gap: u64,
    query_label: Option<String>,
    target_label: Option<String>,
    target_sequence_length: Option<u64>,
    strand: Option<Strand>,
    traceback: Option<Vec<String>>,
    in_alignment_block: bool,
    done: bool,
}

impl<R: BufRead> BlastzParser<R> {
    pub fn new(reader: R) -> Self {
        Self::with_max_gap(reader, DEFAULT_MAX_GAP)
    }

    ///
    /// # Arguments
    /// - reader: the lav text stream.
    /// - max_gap: split alignments having gaps larger than this.
    ///
    pub fn with_max_gap(reader: R, max_gap: u64) -> Self {
        BlastzParser {
            reader: LineReader::new(reader),
            max_gap,
            query_label: None,
            target_label: None,
            target_sequence_length: None,
            strand: None,
            traceback: None,
            in_alignment_block: false,
            done: false,
        }
    }

    fn next_alignment(&mut self) -> Result<Option<Alignment>> {
        loop {
            if self.in_alignment_block {
                match self.parse_alignment()? {
                    Some(alignment) => return Ok(Some(alignment)),
                    None => {
                        self.in_alignment_block = false;
                        continue;
                    }
                }
            }

            let line = match self.reader.read_line_or_eof()? {
                Some(line) => line,
                None => return Ok(None),
            };

            if line.starts_with("s {") {
                self.parse_sequence_info()?;
            } else if line.starts_with("h {") {
                self.parse_header()?;
            } else if line.starts_with("a {") {
                if self.query_label.is_none() {
                    return Err(ParserError::syntax(
                        self.reader.lineno(),
                        "found alignment details, but was expecting an header",
                    ));
                }
                self.skip_alignment_header()?;
                self.in_alignment_block = true;
            }
        }
    }

    /// The target sequence length in the `s` section is needed later to
    /// mirror reverse-strand coordinates.
    fn parse_sequence_info(&mut self) -> Result<()> {
        self.reader.read_line("was expecting query sequence info")?;

        let info = self.reader.read_line("was expecting target sequence info")?;
        let lineno = self.reader.lineno();
        let malformed = || ParserError::syntax(lineno, "malformed target sequence info");

        let pos = info.rfind('"').ok_or_else(malformed)?;
        let tokens: Vec<&str> = info[pos + 1..].split_whitespace().collect();
        if tokens.len() != 4 {
            return Err(malformed());
        }

        self.target_sequence_length = Some(tokens[1].parse().map_err(|_| malformed())?);
        Ok(())
    }

    fn parse_header(&mut self) -> Result<()> {
        self.query_label = Some(self.read_label("query")?);

        let target_label = self.read_label("target")?;
        match target_label.strip_suffix(REVERSE_COMPLEMENT_LABEL) {
            Some(stripped) => {
                self.strand = Some(Strand::Reverse);
                self.target_label = Some(stripped.to_string());
            }
            None => {
                self.strand = Some(Strand::Forward);
                self.target_label = Some(target_label);
            }
        }

        let line = self.reader.read_line("was expecting header end mark")?;
        if !line.starts_with('}') {
            return Err(ParserError::syntax(
                self.reader.lineno(),
                "was expecting header end mark",
            ));
        }
        Ok(())
    }

    /// Header labels are quoted FASTA-style names, e.g. `">hg16.chr1"`.
    fn read_label(&mut self, name: &str) -> Result<String> {
        let line = self
            .reader
            .read_line(&format!("was expecting {} label", name))?;
        let label = line.trim().replace('"', "");
        Ok(label.get(1..).unwrap_or("").to_string())
    }

    /// Skips the `s`/`b`/`e` fields opening an `a` section; the first line
    /// tagged otherwise belongs to the HSP loop and goes into the
    /// lookahead slot.
    fn skip_alignment_header(&mut self) -> Result<()> {
        loop {
            let line = self.reader.read_line("was expecting alignment header")?;
            let tokens: Vec<String> = line.split_whitespace().map(String::from).collect();
            match tokens.first().map(String::as_str) {
                Some("s") | Some("b") | Some("e") => continue,
                Some(_) => {
                    self.traceback = Some(tokens);
                    return Ok(());
                }
                None => {
                    return Err(ParserError::syntax(
                        self.reader.lineno(),
                        "was expecting alignment header",
                    ));
                }
            }
        }
    }

    fn parse_alignment(&mut self) -> Result<Option<Alignment>> {
        let mut open: Option<OpenAlignment> = None;

        loop {
            let tokens = match self.traceback.take() {
                Some(tokens) => tokens,
                None => {
                    let line = self.reader.read_line("was expecting alignment details")?;
                    line.split_whitespace().map(String::from).collect()
                }
            };
            let lineno = self.reader.lineno();

            match tokens.first().map(String::as_str) {
                Some("l") => {
                    let hsp = parse_hsp(&tokens, lineno)?;

                    // meaningless lines force the output of the alignment
                    if hsp.query_start == hsp.query_stop || hsp.target_start == hsp.target_stop {
                        match open.take() {
                            Some(acc) => return self.finalize_alignment(acc, lineno).map(Some),
                            None => continue,
                        }
                    }

                    let acc = match open.take() {
                        None => {
                            open = Some(OpenAlignment {
                                query_start: hsp.query_start,
                                query_stop: hsp.query_stop,
                                target_start: hsp.target_start,
                                target_stop: hsp.target_stop,
                                length: hsp.query_stop - hsp.query_start,
                                query_gaps: Vec::new(),
                                target_gaps: Vec::new(),
                            });
                            continue;
                        }
                        Some(acc) => acc,
                    };

                    let query_skip = hsp.query_start as i64 - acc.query_stop as i64;
                    let target_skip = hsp.target_start as i64 - acc.target_stop as i64;

                    if query_skip > 0 && target_skip > 0 {
                        return Err(ParserError::format_violation(
                            lineno,
                            format!(
                                "gaps on both the query ({}) and the target ({})",
                                query_skip, target_skip
                            ),
                        ));
                    }

                    let within_max_gap = query_skip <= self.max_gap as i64
                        && target_skip <= self.max_gap as i64;
                    let overlapped = is_overlapped(
                        acc.query_start,
                        acc.query_stop,
                        hsp.query_start,
                        hsp.query_stop,
                    ) || is_overlapped(
                        acc.target_start,
                        acc.target_stop,
                        hsp.target_start,
                        hsp.target_stop,
                    );

                    if within_max_gap && !overlapped {
                        let mut acc = acc;
                        if query_skip > 0 {
                            acc.target_gaps.push(Gap::new(acc.length, query_skip as u64));
                            acc.length += query_skip as u64;
                        }
                        if target_skip > 0 {
                            acc.query_gaps.push(Gap::new(acc.length, target_skip as u64));
                            acc.length += target_skip as u64;
                        }
                        acc.query_stop = hsp.query_stop;
                        acc.target_stop = hsp.target_stop;
                        acc.length += hsp.query_stop - hsp.query_start;
                        open = Some(acc);
                    } else {
                        self.traceback = Some(tokens);
                        return self.finalize_alignment(acc, lineno).map(Some);
                    }
                }
                Some("}") => match open.take() {
                    Some(acc) => {
                        self.traceback = Some(tokens);
                        return self.finalize_alignment(acc, lineno).map(Some);
                    }
                    None => return Ok(None),
                },
                _ => return Err(ParserError::syntax(lineno, "unexpected field")),
            }
        }
    }

    fn finalize_alignment(&self, acc: OpenAlignment, lineno: u64) -> Result<Alignment> {
        let (target_start, target_stop) = match self.strand {
            Some(Strand::Reverse) => {
                let length = self
                    .target_sequence_length
                    .filter(|len| *len >= acc.target_stop)
                    .ok_or_else(|| {
                        ParserError::format_violation(
                            lineno,
                            format!(
                                "cannot mirror reverse-strand target span {}..{}: no valid target sequence length",
                                acc.target_start, acc.target_stop
                            ),
                        )
                    })?;
                (length - acc.target_stop, length - acc.target_start)
            }
            _ => (acc.target_start, acc.target_stop),
        };

        Ok(Alignment {
            query_label: self.query_label.clone(),
            target_label: self.target_label.clone(),
            query_start: Some(acc.query_start),
            query_stop: Some(acc.query_stop),
            target_start: Some(target_start),
            target_stop: Some(target_stop),
            strand: self.strand,
            length: Some(acc.length),
            query_gaps: Some(acc.query_gaps),
            target_gaps: Some(acc.target_gaps),
            ..Alignment::default()
        })
    }
}

impl<R: BufRead> Iterator for BlastzParser<R> {
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

struct Hsp {
    query_start: u64,
    query_stop: u64,
    target_start: u64,
    target_stop: u64,
}

/// An `l` line carries 1-based `query_start target_start query_stop
/// target_stop score`; the score of individual HSPs is not kept on merged
/// alignments.
fn parse_hsp(tokens: &[String], lineno: u64) -> Result<Hsp> {
    let invalid = || ParserError::syntax(lineno, "invalid HSP");

    if tokens.len() < 6 {
        return Err(invalid());
    }

    let field = |idx: usize| -> Result<u64> { tokens[idx].parse().map_err(|_| invalid()) };
    tokens[5].parse::<i64>().map_err(|_| invalid())?;

    Ok(Hsp {
        query_start: field(1)?.checked_sub(1).ok_or_else(invalid)?,
        target_start: field(2)?.checked_sub(1).ok_or_else(invalid)?,
        query_stop: field(3)?,
        target_stop: field(4)?,
    })
}

fn is_overlapped(start1: u64, stop1: u64, start2: u64, stop2: u64) -> bool {
    !(stop1 <= start2 || stop2 <= start1)
}
