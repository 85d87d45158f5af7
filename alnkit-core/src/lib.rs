//! # Core library for alnkit.
//!
//! This crate holds the format-independent representation of a pairwise
//! alignment ([`models::Alignment`]) together with the support types shared
//! by the format parsers in `alnkit-io`: strand and gap primitives, the
//! aligned-pair reconstruction helpers, and small file-reading utilities.
//!
//! # Example
//!
//! ```
//! use alnkit_core::models::{Alignment, Strand};
//!
//! let mut alignment = Alignment::default();
//! alignment.query_label = Some("chr1".to_string());
//! alignment.query_start = Some(100);
//! alignment.query_stop = Some(200);
//! alignment.strand = Some(Strand::Forward);
//! ```

pub mod errors;
pub mod models;
pub mod utils;

// re-export for cleaner imports
pub use errors::*;
pub use models::*;
