use thiserror::Error;

/// Error raised when a textual gap list does not follow the
/// `pos,len;pos,len;...` grammar.
#[derive(Error, Debug)]
#[error("malformed gap list: {0}")]
pub struct GapListError(pub String);

/// Errors raised while reconstructing the aligned text of a record.
#[derive(Error, Debug)]
pub enum AlignedPairError {
    #[error("missing required alignment field: {0}")]
    MissingField(&'static str),

    #[error("mismatch between aligned query and target lengths")]
    LengthMismatch,

    #[error("disorder found in gaps: {0}")]
    GapDisorder(String),

    #[error("slice {start}..{stop} out of bounds for sequence of length {len}")]
    OutOfBounds { start: u64, stop: u64, len: u64 },
}
