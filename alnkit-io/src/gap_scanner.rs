use alnkit_core::models::Gap;

///
/// Incremental scanner turning the dash-padded text of one alignment axis
/// into a list of gap runs.
///
/// The aligned sequence may arrive in arbitrary consecutive chunks; a dash
/// run touching the right edge of a chunk stays provisionally open and is
/// merged with a continuation at the start of the next chunk. Gap positions
/// are counted in aligned columns fed so far, so callers must feed text in
/// the coordinate space they want gaps reported in.
///
/// # Example
///
/// ```
/// use alnkit_io::gap_scanner::GapScanner;
/// use alnkit_core::models::Gap;
///
/// let mut scanner = GapScanner::new();
/// scanner.feed("AC--GT");
/// assert_eq!(scanner.finalize(), vec![Gap::new(2, 2)]);
/// ```
#[derive(Debug, Default)]
pub struct GapScanner {
    pos: u64,
    gap_open: Option<u64>,
    gaps: Vec<Gap>,
}

impl GapScanner {
    pub fn new() -> Self {
        GapScanner::default()
    }

    ///
    /// Feed the scanner with the next chunk of the aligned sequence.
    ///
    pub fn feed(&mut self, seq: &str) {
        let bytes = seq.as_bytes();

        // a run left open by the previous chunk ends here unless this
        // chunk starts with a dash
        if let Some(open) = self.gap_open {
            if !bytes.is_empty() && bytes[0] != b'-' {
                self.gaps.push(Gap::new(open, self.pos - open));
                self.gap_open = None;
            }
        }

        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != b'-' {
                i += 1;
                continue;
            }

            let start = i;
            while i < bytes.len() && bytes[i] == b'-' {
                i += 1;
            }
            let end = i;

            if end != bytes.len() {
                match self.gap_open.take() {
                    Some(open) => self.gaps.push(Gap::new(open, end as u64 + self.pos - open)),
                    None => {
                        self.gaps
                            .push(Gap::new(start as u64 + self.pos, (end - start) as u64))
                    }
                }
            } else if self.gap_open.is_none() {
                self.gap_open = Some(start as u64 + self.pos);
            }
        }

        self.pos += bytes.len() as u64;
    }

    ///
    /// End the scan and return the ordered gap list.
    ///
    pub fn finalize(mut self) -> Vec<Gap> {
        if let Some(open) = self.gap_open.take() {
            self.gaps.push(Gap::new(open, self.pos - open));
        }
        self.gaps
    }
}
