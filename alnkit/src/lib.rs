//! # alnkit: tools for normalizing pairwise alignment program output.
//!
//! Facade crate re-exporting the alnkit workspace members behind feature
//! flags:
//!
//! - `core`: the unified alignment record and shared support types.
//! - `io`: parsers for LALIGN, WU BLAST, BLASTZ and tabular ADB reports.

#[cfg(feature = "core")]
#[doc(inline)]
pub use alnkit_core as core;

#[cfg(feature = "io")]
#[doc(inline)]
pub use alnkit_io as io;
