use pretty_assertions::assert_eq;
use rstest::rstest;

use alnkit_core::models::{Gap, Strand};
use alnkit_io::error::ParserError;
use alnkit_io::lalign::LalignParser;

const FORWARD_REPORT: &str = "\
 Comparison of:
(A) ./query.fa seq1 - 1000 nt
(B) ./target.fa seq2 - 800 nt
 using matrix file: DNA (5/-4), gap penalties: -14/-4

 42.3% identity in 10 nt overlap (101-110:301-310); score:  180 E(10000):   2.1e-08

              110       120
seq1     ACGTAC--GTAC
         ::::::  ::::
seq2     ACGTACGGGTAC
              310       320
----------
";

const REVERSE_REPORT: &str = "\
 Comparison of:
(A) ./query.fa (rev-comp) seq1 - 1000 nt
(B) ./target.fa seq2 - 800 nt
 using matrix file: DNA (5/-4), gap penalties: -14/-4

 88.0% identity in 100 nt overlap (101-200:301-400); score:  420 E(10000):   0.5

              110       120
seq1     ACGTACGTACGT
         ::::::::::::
seq2     ACGTACGTACGT
              310       320
----------
";

#[rstest]
fn test_forward_strand_report() {
    let records: Vec<_> = LalignParser::new(FORWARD_REPORT.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(records.len(), 1);

    let alignment = &records[0];
    assert_eq!(alignment.query_label.as_deref(), Some("seq1"));
    assert_eq!(alignment.target_label.as_deref(), Some("seq2"));
    assert_eq!(alignment.strand, Some(Strand::Forward));
    assert_eq!(alignment.identity, Some(42.3));
    assert_eq!(alignment.length, Some(10));
    assert_eq!(alignment.score, Some(180));
    assert_eq!(alignment.evalue, Some(2.1e-08));

    // 1-based inclusive 101-110 becomes 0-based half-open
    assert_eq!(alignment.query_start, Some(100));
    assert_eq!(alignment.query_stop, Some(110));
    assert_eq!(alignment.target_start, Some(300));
    assert_eq!(alignment.target_stop, Some(310));

    assert_eq!(alignment.query_gaps, Some(vec![Gap::new(6, 2)]));
    assert_eq!(alignment.target_gaps, Some(vec![]));
}

#[rstest]
fn test_reverse_strand_mirrors_query_coordinates() {
    let records: Vec<_> = LalignParser::new(REVERSE_REPORT.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(records.len(), 1);

    let alignment = &records[0];
    assert_eq!(alignment.strand, Some(Strand::Reverse));
    // declared query length 1000, summary span 101-200: the converted
    // 0-based half-open (100, 200) mirrors to (800, 900)
    assert_eq!(alignment.query_start, Some(800));
    assert_eq!(alignment.query_stop, Some(900));
    assert_eq!(alignment.target_start, Some(300));
    assert_eq!(alignment.target_stop, Some(400));
}

#[rstest]
fn test_header_state_persists_across_alignments() {
    let report = format!(
        "{}\n 50.0% identity in 12 nt overlap (11-22:41-52); score:   90 E(10000):   1.5\n\
\n\
              10        20\n\
seq1     ACGTACGTACGT\n\
         ::::::::::::\n\
seq2     ACGTACGTACGT\n\
              40        50\n\
----------\n",
        FORWARD_REPORT.trim_end()
    );

    let records: Vec<_> = LalignParser::new(report.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(records.len(), 2);

    // labels declared by the single header apply to both alignments
    assert_eq!(records[1].query_label.as_deref(), Some("seq1"));
    assert_eq!(records[1].target_label.as_deref(), Some("seq2"));
    assert_eq!(records[1].query_start, Some(10));
    assert_eq!(records[1].query_stop, Some(22));
}

#[rstest]
fn test_unexpected_content_is_a_syntax_error() {
    let mut parser = LalignParser::new(&b"this is not a lalign report\n"[..]);
    let err = parser.next().unwrap().unwrap_err();
    assert!(matches!(err, ParserError::Syntax { line: 1, .. }));
}

#[rstest]
fn test_truncated_details_raise_unexpected_eof() {
    // report cut off in the middle of a detail group
    let truncated: String = FORWARD_REPORT
        .lines()
        .take(8)
        .collect::<Vec<_>>()
        .join("\n");

    let mut parser = LalignParser::new(truncated.as_bytes());
    let err = parser.next().unwrap().unwrap_err();
    match err {
        ParserError::UnexpectedEof { context, .. } => {
            assert_eq!(context, "was expecting alignment details");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn test_malformed_header_is_a_syntax_error() {
    let report = " Comparison of:\n(X) ./query.fa seq1 - 1000 nt\n";
    let mut parser = LalignParser::new(report.as_bytes());
    let err = parser.next().unwrap().unwrap_err();
    assert!(matches!(err, ParserError::Syntax { line: 2, .. }));
}

#[rstest]
fn test_empty_input_yields_nothing() {
    let mut parser = LalignParser::new(&b""[..]);
    assert!(parser.next().is_none());
}
