use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::GapListError;

///
/// Orientation of the aligned sequence relative to its stored coordinates.
///
/// `Reverse` means the target (or, for LALIGN reports, the query) is
/// reverse-complemented before alignment.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strand {
    Forward,
    Reverse,
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(format!("invalid strand: {}", s)),
        }
    }
}

///
/// A run of gap columns on one alignment axis.
///
/// `position` is expressed in that axis's ungapped coordinate space and
/// `length` counts the inserted columns.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gap {
    pub position: u64,
    pub length: u64,
}

impl Gap {
    pub fn new(position: u64, length: u64) -> Self {
        Gap { position, length }
    }
}

impl Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.position, self.length)
    }
}

///
/// Parse a semicolon-joined gap list in `pos,len;pos,len;...` form.
///
/// The empty string denotes an empty gap list.
///
/// # Arguments
/// - text: the textual gap list, e.g. `"12,3;40,1"`.
///
pub fn parse_gap_list(text: &str) -> Result<Vec<Gap>, GapListError> {
    let mut gaps = Vec::new();
    if text.is_empty() {
        return Ok(gaps);
    }

    for gap in text.split(';') {
        let mut tokens = gap.split(',');
        let position = tokens.next();
        let length = tokens.next();
        if tokens.next().is_some() {
            return Err(GapListError(text.to_string()));
        }

        match (position, length) {
            (Some(p), Some(l)) => {
                let position = p
                    .parse::<u64>()
                    .map_err(|_| GapListError(text.to_string()))?;
                let length = l
                    .parse::<u64>()
                    .map_err(|_| GapListError(text.to_string()))?;
                gaps.push(Gap { position, length });
            }
            _ => return Err(GapListError(text.to_string())),
        }
    }

    Ok(gaps)
}

///
/// The unified, format-independent description of a single pairwise
/// alignment.
///
/// A fresh instance has every field unset; parsers fill the fields their
/// format provides before yielding. Coordinates are 0-based half-open and
/// satisfy `stop > start` on both axes once a record is finalized.
///
#[derive(PartialEq, Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alignment {
    pub query_label: Option<String>,
    pub query_start: Option<u64>,
    pub query_stop: Option<u64>,
    pub target_label: Option<String>,
    pub target_start: Option<u64>,
    pub target_stop: Option<u64>,
    pub strand: Option<Strand>,
    pub frame: Option<i32>,
    pub length: Option<u64>,
    pub score: Option<i64>,
    pub identity: Option<f64>,
    pub evalue: Option<f64>,
    pub query_gaps: Option<Vec<Gap>>,
    pub target_gaps: Option<Vec<Gap>>,
    pub group: Option<u64>,
    pub links: Option<String>,
}

impl Alignment {
    ///
    /// Render the record as one tab-separated ADB line.
    ///
    /// Column layout: query label, query start, query stop, strand, target
    /// label, target start, target stop, length, score, identity, e-value,
    /// query gaps, target gaps. Unset fields render as empty columns and
    /// empty gap lists render as empty strings.
    ///
    pub fn as_adb_line(&self) -> String {
        let columns = [
            opt_string(&self.query_label),
            opt_string(&self.query_start),
            opt_string(&self.query_stop),
            opt_string(&self.strand),
            opt_string(&self.target_label),
            opt_string(&self.target_start),
            opt_string(&self.target_stop),
            opt_string(&self.length),
            opt_string(&self.score),
            opt_string(&self.identity),
            opt_string(&self.evalue),
            gap_list_string(&self.query_gaps),
            gap_list_string(&self.target_gaps),
        ];
        columns.join("\t")
    }

    ///
    /// Total number of gap columns recorded on the query axis.
    ///
    pub fn query_gap_size(&self) -> u64 {
        cumulative_gap_size(&self.query_gaps)
    }

    ///
    /// Total number of gap columns recorded on the target axis.
    ///
    pub fn target_gap_size(&self) -> u64 {
        cumulative_gap_size(&self.target_gaps)
    }
}

impl Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_adb_line())
    }
}

fn opt_string<T: Display>(value: &Option<T>) -> String {
    value.as_ref().map_or(String::new(), |v| v.to_string())
}

fn gap_list_string(gaps: &Option<Vec<Gap>>) -> String {
    gaps.as_deref().map_or(String::new(), |gaps| {
        gaps.iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(";")
    })
}

fn cumulative_gap_size(gaps: &Option<Vec<Gap>>) -> u64 {
    gaps.as_deref()
        .map_or(0, |gaps| gaps.iter().map(|g| g.length).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", vec![])]
    #[case("2,2", vec![Gap::new(2, 2)])]
    #[case("2,2;10,1;40,5", vec![Gap::new(2, 2), Gap::new(10, 1), Gap::new(40, 5)])]
    fn test_parse_gap_list(#[case] text: &str, #[case] expected: Vec<Gap>) {
        assert_eq!(parse_gap_list(text).unwrap(), expected);
    }

    #[rstest]
    #[case("2")]
    #[case("2,2,2")]
    #[case("2,x")]
    #[case("2,2;")]
    #[case(";")]
    fn test_parse_gap_list_rejects(#[case] text: &str) {
        assert!(parse_gap_list(text).is_err());
    }

    #[rstest]
    fn test_strand_round_trip() {
        assert_eq!("+".parse::<Strand>().unwrap(), Strand::Forward);
        assert_eq!("-".parse::<Strand>().unwrap(), Strand::Reverse);
        assert_eq!(Strand::Forward.to_string(), "+");
        assert_eq!(Strand::Reverse.to_string(), "-");
        assert!("*".parse::<Strand>().is_err());
    }

    #[rstest]
    fn test_fresh_alignment_is_unset() {
        let alignment = Alignment::default();
        assert_eq!(alignment.query_label, None);
        assert_eq!(alignment.strand, None);
        assert_eq!(alignment.query_gaps, None);
    }

    #[rstest]
    fn test_as_adb_line() {
        let alignment = Alignment {
            query_label: Some("q1".to_string()),
            query_start: Some(10),
            query_stop: Some(20),
            target_label: Some("t1".to_string()),
            target_start: Some(100),
            target_stop: Some(112),
            strand: Some(Strand::Forward),
            length: Some(12),
            query_gaps: Some(vec![Gap::new(4, 2)]),
            target_gaps: Some(vec![]),
            ..Alignment::default()
        };
        assert_eq!(
            alignment.as_adb_line(),
            "q1\t10\t20\t+\tt1\t100\t112\t12\t\t\t\t4,2\t"
        );
    }
}
