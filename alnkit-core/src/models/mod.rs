pub mod aligned_pair;
pub mod alignment;
pub mod sequence;

// re-export for cleaner imports
pub use self::aligned_pair::{AlignedPair, SequenceSlice};
pub use self::alignment::{Alignment, Gap, Strand, parse_gap_list};
pub use self::sequence::{complement, reverse_complement};
