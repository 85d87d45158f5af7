//! Basic tools to handle nucleotide sequences.

fn complement_base(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b'N' => b'N',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' => b'a',
        b'n' => b'n',
        other => other,
    }
}

///
/// Compute the complement of the given sequence.
///
/// Characters outside `ACGTNacgtn` pass through unchanged.
///
pub fn complement(sequence: &str) -> String {
    sequence
        .bytes()
        .map(|b| complement_base(b) as char)
        .collect()
}

///
/// Compute the reverse complement of the given sequence.
///
pub fn reverse_complement(sequence: &str) -> String {
    sequence
        .bytes()
        .rev()
        .map(|b| complement_base(b) as char)
        .collect()
}
