//! Reading and writing the tabular ADB alignment format.
//!
//! One alignment per line, tab-separated. Column layout (0-based): query
//! label, query start, query stop, strand, target label, target start,
//! target stop, length, three unused columns, query gap list, target gap
//! list. Gap lists use the `pos,len;pos,len;...` grammar with the empty
//! string meaning no gaps.

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use flate2::Compression;
use flate2::write::GzEncoder;

use alnkit_core::models::{Alignment, Strand, parse_gap_list};

use crate::error::{ParserError, Result};
use crate::line_reader::LineReader;

const ADB_COLUMNS: usize = 13;

///
/// Parser for ADB files, yielding one [`Alignment`] per input line.
///
/// Only the coordinate, strand, length and gap columns are interpreted;
/// `score`, `identity`, `evalue`, `frame`, `group` and `links` are left
/// unset.
///
pub struct AdbParser<R> {
    reader: LineReader<R>,
    done: bool,
}

impl<R: BufRead> AdbParser<R> {
    pub fn new(reader: R) -> Self {
        AdbParser {
            reader: LineReader::new(reader),
            done: false,
        }
    }

    fn next_alignment(&mut self) -> Result<Option<Alignment>> {
        let line = match self.reader.read_line_or_eof()? {
            Some(line) => line,
            None => return Ok(None),
        };
        let lineno = self.reader.lineno();

        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() < ADB_COLUMNS {
            return Err(ParserError::syntax(
                lineno,
                format!(
                    "expected at least {} columns, found {}",
                    ADB_COLUMNS,
                    columns.len()
                ),
            ));
        }

        let query_start = parse_column(columns[1], "query start coordinate", lineno)?;
        let query_stop = parse_column(columns[2], "query stop coordinate", lineno)?;
        let target_start = parse_column(columns[5], "target start coordinate", lineno)?;
        let target_stop = parse_column(columns[6], "target stop coordinate", lineno)?;
        let length: u64 = parse_column(columns[7], "length", lineno)?;

        if query_stop <= query_start {
            return Err(ParserError::validation(
                lineno,
                format!("invalid query stop coordinate: {}", query_stop),
            ));
        }

        let strand = Strand::from_str(columns[3]).map_err(|_| {
            ParserError::validation(lineno, format!("invalid strand: {}", columns[3]))
        })?;

        if target_stop <= target_start {
            return Err(ParserError::validation(
                lineno,
                format!("invalid target stop coordinate: {}", target_stop),
            ));
        }

        let query_gaps = parse_gap_list(columns[11]).map_err(|_| {
            ParserError::validation(lineno, format!("invalid query gaps: {}", columns[11]))
        })?;
        let target_gaps = parse_gap_list(columns[12]).map_err(|_| {
            ParserError::validation(lineno, format!("invalid target gaps: {}", columns[12]))
        })?;

        Ok(Some(Alignment {
            query_label: Some(columns[0].to_string()),
            query_start: Some(query_start),
            query_stop: Some(query_stop),
            target_label: Some(columns[4].to_string()),
            target_start: Some(target_start),
            target_stop: Some(target_stop),
            strand: Some(strand),
            length: Some(length),
            query_gaps: Some(query_gaps),
            target_gaps: Some(target_gaps),
            ..Alignment::default()
        }))
    }
}

impl<R: BufRead> Iterator for AdbParser<R> {
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

fn parse_column<T: FromStr>(text: &str, what: &str, lineno: u64) -> Result<T> {
    text.parse()
        .map_err(|_| ParserError::validation(lineno, format!("invalid {}: {}", what, text)))
}

pub trait AdbWrite {
    ///
    /// Write data to disk as an ADB file
    ///
    /// # Arguments
    /// - path: the path to the file to dump to
    fn write_adb<T: AsRef<Path>>(&self, path: T) -> std::io::Result<()>;

    ///
    /// Write data to disk as an adb.gz file
    ///
    /// # Arguments
    /// - path: the path to the file to dump to
    fn write_adb_gz<T: AsRef<Path>>(&self, path: T) -> std::io::Result<()>;
}

impl AdbWrite for [Alignment] {
    fn write_adb<T: AsRef<Path>>(&self, path: T) -> std::io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;

        for alignment in self {
            writeln!(file, "{}", alignment.as_adb_line())?;
        }
        Ok(())
    }

    fn write_adb_gz<T: AsRef<Path>>(&self, path: T) -> std::io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::best());

        for alignment in self {
            writeln!(encoder, "{}", alignment.as_adb_line())?;
        }

        encoder.finish()?;
        Ok(())
    }
}
