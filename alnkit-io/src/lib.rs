//! # Parsers for the output of various pairwise alignment tools.
//!
//! This crate normalizes the loosely structured, line-oriented reports of
//! LALIGN, WU BLAST and BLASTZ, plus the simple tabular ADB format, into
//! the unified [`alnkit_core::models::Alignment`] record: 0-based
//! half-open coordinates on both axes, an explicit strand, and
//! per-axis gap lists reconstructed from the textual alignment tracks.
//!
//! Each parser wraps an already-open [`std::io::BufRead`] stream and
//! yields records lazily as an iterator; the first error aborts the
//! stream and the iterator fuses.
//!
//! # Example
//!
//! ```
//! use alnkit_io::adb::AdbParser;
//!
//! let input = "q1\t0\t10\t+\tt1\t5\t15\t10\t\t\t\t\t\n";
//! for alignment in AdbParser::new(input.as_bytes()) {
//!     let alignment = alignment.unwrap();
//!     assert_eq!(alignment.query_stop, Some(10));
//! }
//! ```

pub mod adb;
pub mod blastz;
pub mod error;
pub mod gap_scanner;
pub mod lalign;
pub mod line_reader;
pub mod wublast;

// re-expose the main entry points
pub use adb::{AdbParser, AdbWrite};
pub use blastz::BlastzParser;
pub use error::{ParserError, Result};
pub use gap_scanner::GapScanner;
pub use lalign::LalignParser;
pub use line_reader::LineReader;
pub use wublast::WuBlastParser;
