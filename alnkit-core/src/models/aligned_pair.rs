use crate::errors::AlignedPairError;
use crate::models::alignment::{Alignment, Gap, Strand};
use crate::models::sequence::reverse_complement;

///
/// Random access into a stored sequence by half-open coordinate range.
///
/// Sequence storage itself (FASTA indexing, compression, caching) lives in
/// external collaborators; this trait is the only capability the alignment
/// machinery needs from them.
///
pub trait SequenceSlice {
    /// Length of the whole sequence.
    fn sequence_len(&self) -> u64;

    /// Extract the text of the half-open range `[start, stop)`.
    fn slice(&self, start: u64, stop: u64) -> Result<String, AlignedPairError>;
}

impl SequenceSlice for str {
    fn sequence_len(&self) -> u64 {
        self.len() as u64
    }

    fn slice(&self, start: u64, stop: u64) -> Result<String, AlignedPairError> {
        let range = start as usize..stop as usize;
        match self.get(range) {
            Some(text) => Ok(text.to_string()),
            None => Err(AlignedPairError::OutOfBounds {
                start,
                stop,
                len: self.sequence_len(),
            }),
        }
    }
}

impl SequenceSlice for String {
    fn sequence_len(&self) -> u64 {
        self.as_str().sequence_len()
    }

    fn slice(&self, start: u64, stop: u64) -> Result<String, AlignedPairError> {
        self.as_str().slice(start, stop)
    }
}

///
/// The two aligned sequences of a finalized [`Alignment`], reconstructed
/// from the record's coordinates and gap lists.
///
/// The target text is reverse-complemented first when the record is on the
/// reverse strand, matching how the producing tools print their reports.
///
#[derive(Debug, Clone)]
pub struct AlignedPair {
    pub alignment: Alignment,
    pub query_sequence: String,
    pub target_sequence: String,
    pub aligned_query: String,
    pub aligned_target: String,
    pub match_marks: String,
}

impl AlignedPair {
    ///
    /// Extract the aligned region from `query` and `target` and rebuild the
    /// gapped alignment text.
    ///
    /// # Arguments
    /// - alignment: a finalized alignment record.
    /// - query: random access into the query sequence.
    /// - target: random access into the target sequence.
    ///
    pub fn new<Q, T>(
        alignment: &Alignment,
        query: &Q,
        target: &T,
    ) -> Result<AlignedPair, AlignedPairError>
    where
        Q: SequenceSlice + ?Sized,
        T: SequenceSlice + ?Sized,
    {
        let query_start = require(alignment.query_start, "query_start")?;
        let query_stop = require(alignment.query_stop, "query_stop")?;
        let target_start = require(alignment.target_start, "target_start")?;
        let target_stop = require(alignment.target_stop, "target_stop")?;
        let strand = require(alignment.strand, "strand")?;

        let query_gaps = alignment.query_gaps.as_deref().unwrap_or(&[]);
        let target_gaps = alignment.target_gaps.as_deref().unwrap_or(&[]);

        if query_stop - query_start + alignment.query_gap_size()
            != target_stop - target_start + alignment.target_gap_size()
        {
            return Err(AlignedPairError::LengthMismatch);
        }

        let query_sequence = query.slice(query_start, query_stop)?;
        let target_sequence = target.slice(target_start, target_stop)?;

        let aligned_query = insert_gaps(&query_sequence, query_gaps)?;
        let aligned_target = match strand {
            Strand::Forward => insert_gaps(&target_sequence, target_gaps)?,
            Strand::Reverse => insert_gaps(&reverse_complement(&target_sequence), target_gaps)?,
        };
        let match_marks = match_marks(&aligned_query, &aligned_target);

        Ok(AlignedPair {
            alignment: alignment.clone(),
            query_sequence,
            target_sequence,
            aligned_query,
            aligned_target,
            match_marks,
        })
    }
}

fn require<T: Copy>(field: Option<T>, name: &'static str) -> Result<T, AlignedPairError> {
    field.ok_or(AlignedPairError::MissingField(name))
}

fn insert_gaps(sequence: &str, gaps: &[Gap]) -> Result<String, AlignedPairError> {
    let mut out = String::with_capacity(sequence.len());
    let mut cursor = 0usize;

    for gap in gaps {
        let position = gap.position as usize;
        if position < cursor {
            return Err(AlignedPairError::GapDisorder(format!("{:?}", gaps)));
        }
        let chunk = sequence
            .get(cursor..position)
            .ok_or(AlignedPairError::OutOfBounds {
                start: cursor as u64,
                stop: gap.position,
                len: sequence.len() as u64,
            })?;
        out.push_str(chunk);
        out.extend(std::iter::repeat_n('-', gap.length as usize));
        cursor = position;
    }

    out.push_str(&sequence[cursor..]);
    Ok(out)
}

fn match_marks(query: &str, target: &str) -> String {
    query
        .bytes()
        .zip(target.bytes())
        .map(|(q, t)| if q == t && q != b'-' { '|' } else { ' ' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn alignment() -> Alignment {
        Alignment {
            query_start: Some(2),
            query_stop: Some(8),
            target_start: Some(1),
            target_stop: Some(9),
            strand: Some(Strand::Forward),
            query_gaps: Some(vec![Gap::new(4, 2)]),
            target_gaps: Some(vec![]),
            ..Alignment::default()
        }
    }

    #[rstest]
    fn test_reconstruction(alignment: Alignment) {
        let query = "GGACGTACGG";
        let target = "GACGTTTACG";

        let pair = AlignedPair::new(&alignment, query, target).unwrap();
        assert_eq!(pair.aligned_query, "ACGT--AC");
        assert_eq!(pair.aligned_target, "ACGTTTAC");
        assert_eq!(pair.match_marks, "||||  ||");
    }

    #[rstest]
    fn test_reverse_strand_reconstruction(alignment: Alignment) {
        let mut alignment = alignment;
        alignment.strand = Some(Strand::Reverse);

        let query = "GGACGTACGG";
        let target = "GCGTAAACGT";

        let pair = AlignedPair::new(&alignment, query, target).unwrap();
        // target[1..9] = CGTAAACG, reverse complement = CGTTTACG
        assert_eq!(pair.aligned_target, "CGTTTACG");
    }

    #[rstest]
    fn test_length_mismatch(alignment: Alignment) {
        let mut alignment = alignment;
        alignment.target_stop = Some(12);

        let result = AlignedPair::new(&alignment, "GGACGTACGGAAAA", "GACGTTTACGAAAA");
        assert!(matches!(result, Err(AlignedPairError::LengthMismatch)));
    }

    #[rstest]
    fn test_gap_disorder(alignment: Alignment) {
        let mut alignment = alignment;
        alignment.query_gaps = Some(vec![Gap::new(4, 1), Gap::new(2, 1)]);

        let result = AlignedPair::new(&alignment, "GGACGTACGG", "GACGTTTACG");
        assert!(matches!(result, Err(AlignedPairError::GapDisorder(_))));
    }

    #[rstest]
    fn test_missing_field() {
        let alignment = Alignment::default();
        let result = AlignedPair::new(&alignment, "ACGT", "ACGT");
        assert!(matches!(result, Err(AlignedPairError::MissingField(_))));
    }
}
