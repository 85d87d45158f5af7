use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// The parsers in `alnkit-io` only accept already-open streams; this is the
/// helper callers use to produce one from a path.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };
    Ok(BufReader::new(file))
}

///
/// Collect the lines of a readable stream, for quick inspection of small
/// inputs.
///
pub fn read_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line.context("Failed to read line")?);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_get_dynamic_reader_plain() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("alignments.adb");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "q1\t0\t10").unwrap();

        let reader = get_dynamic_reader(&path).unwrap();
        let lines = read_lines(reader).unwrap();
        assert_eq!(lines, vec!["q1\t0\t10".to_string()]);
    }

    #[rstest]
    fn test_get_dynamic_reader_gz() {
        use flate2::Compression;
        use flate2::write::GzEncoder;

        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("alignments.adb.gz");
        let file = File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        writeln!(encoder, "q1\t0\t10").unwrap();
        encoder.finish().unwrap();

        let reader = get_dynamic_reader(&path).unwrap();
        let lines = read_lines(reader).unwrap();
        assert_eq!(lines, vec!["q1\t0\t10".to_string()]);
    }

    #[rstest]
    fn test_missing_file_is_an_error() {
        let result = get_dynamic_reader(Path::new("/nonexistent/alignments.adb"));
        assert!(result.is_err());
    }
}
