use core::fmt;
use core::str::FromStr;
use std::io::BufRead;

use crate::FixedPoint;

/// Upper bound on the encoded length of one record, newline included.
///
/// This is a format-size budget used for sizing reads and buffers, not the
/// measured length of a line. Generated records encode to at most 28 bytes,
/// and even arbitrary `i32` components stay under 64.
pub const RECORD_BUDGET: usize = 64;

/// Errors produced while reading records back from their text form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A field is not of the form `[-]<digits>.<two digits>` or does not fit
    /// an `i32`.
    #[error("malformed fixed-point value `{value}`")]
    InvalidValue { value: String },

    /// A line does not hold exactly four fields.
    #[error("expected 4 fields, found {found}")]
    FieldCount { found: usize },

    /// The underlying reader failed.
    #[error("read failed: {reason}")]
    Io { reason: String },

    /// A record on the given (1-based) line failed to parse.
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<ParseError>,
    },
}

/// One generated record: the coefficients of `h + i·î + j·ĵ + k·k̂`.
///
/// Records are plain values; no algebra is defined on them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Quaternion {
    pub h: FixedPoint,
    pub i: FixedPoint,
    pub j: FixedPoint,
    pub k: FixedPoint,
}

impl Quaternion {
    pub const fn new(h: FixedPoint, i: FixedPoint, j: FixedPoint, k: FixedPoint) -> Self {
        Self { h, i, j, k }
    }

    /// Components in `h, i, j, k` order.
    pub const fn components(&self) -> [FixedPoint; 4] {
        [self.h, self.i, self.j, self.k]
    }

    /// Appends one encoded line (`"h i j k\n"`) to `buf` and returns the number
    /// of bytes appended.
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> usize {
        let start = buf.len();
        for (idx, component) in self.components().into_iter().enumerate() {
            if idx > 0 {
                buf.push(b' ');
            }
            component.encode_into(buf);
        }
        buf.push(b'\n');

        let written = buf.len() - start;
        debug_assert!(written <= RECORD_BUDGET);
        written
    }

    /// Returns the encoded line, trailing newline included.
    pub fn encode(&self) -> String {
        format!("{self}\n")
    }
}

impl From<[FixedPoint; 4]> for Quaternion {
    fn from([h, i, j, k]: [FixedPoint; 4]) -> Self {
        Self::new(h, i, j, k)
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.h, self.i, self.j, self.k)
    }
}

impl FromStr for Quaternion {
    type Err = ParseError;

    /// Parses one line, with or without its trailing newline. Fields may be
    /// separated by any run of ASCII whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_ascii_whitespace().collect();
        let [h, i, j, k] = fields.as_slice() else {
            return Err(ParseError::FieldCount {
                found: fields.len(),
            });
        };
        Ok(Self::new(h.parse()?, i.parse()?, j.parse()?, k.parse()?))
    }
}

/// Reads records from a text stream, one per line.
///
/// Blank lines are skipped. Each failure is reported as
/// [`ParseError::AtLine`] and does not stop the iterator.
///
/// # Example
/// ```
/// use quaternion::{FixedPoint, parse_stream};
///
/// let text = "1.00 -2.50 0.05 16.00\n\n-16.00 0.00 3.14 -1.01\n";
/// let records = parse_stream(text.as_bytes())
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].i, FixedPoint::from_raw(-250));
/// ```
pub fn parse_stream<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<Quaternion, ParseError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let at_line = |source: ParseError| ParseError::AtLine {
                line: idx + 1,
                source: Box::new(source),
            };
            match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(line.parse::<Quaternion>().map_err(at_line)),
                Err(e) => Some(Err(at_line(ParseError::Io {
                    reason: e.to_string(),
                }))),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(raw: [i32; 4]) -> Quaternion {
        Quaternion::from(raw.map(FixedPoint::from_raw))
    }

    #[test]
    fn encodes_one_line() {
        let q = record([-150, 5, 1600, -1600]);
        let mut buf = Vec::new();
        let written = q.encode_into(&mut buf);

        assert_eq!(buf, b"-1.50 0.05 16.00 -16.00\n");
        assert_eq!(written, buf.len());
        assert_eq!(q.encode(), "-1.50 0.05 16.00 -16.00\n");
    }

    #[test]
    fn encode_into_appends() {
        let mut buf = b"prefix".to_vec();
        let written = record([0, 0, 0, 0]).encode_into(&mut buf);

        assert_eq!(written, "0.00 0.00 0.00 0.00\n".len());
        assert_eq!(buf, b"prefix0.00 0.00 0.00 0.00\n");
    }

    #[test]
    fn widest_records_fit_the_budget() {
        let widest_generated = record([-1600; 4]);
        assert_eq!(widest_generated.encode().len(), 28);

        let widest = record([i32::MIN; 4]);
        assert!(widest.encode().len() <= RECORD_BUDGET);
    }

    #[test]
    fn parses_lines() {
        let q = record([-150, 5, 1600, -1600]);
        assert_eq!(q.encode().parse::<Quaternion>(), Ok(q));
        assert_eq!(
            "1.00\t2.00  3.00 4.00".parse::<Quaternion>(),
            Ok(record([100, 200, 300, 400]))
        );
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(
            "1.00 2.00 3.00".parse::<Quaternion>(),
            Err(ParseError::FieldCount { found: 3 })
        );
        assert_eq!(
            "1.00 2.00 3.00 4.00 5.00".parse::<Quaternion>(),
            Err(ParseError::FieldCount { found: 5 })
        );
    }

    #[test]
    fn stream_reports_line_numbers() {
        let text = "1.00 2.00 3.00 4.00\n\nbad line\n0.01 0.02 0.03 0.04\n";
        let parsed: Vec<_> = parse_stream(text.as_bytes()).collect();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0], Ok(record([100, 200, 300, 400])));
        assert_eq!(
            parsed[1],
            Err(ParseError::AtLine {
                line: 3,
                source: Box::new(ParseError::FieldCount { found: 2 }),
            })
        );
        assert_eq!(parsed[2], Ok(record([1, 2, 3, 4])));
        assert_eq!(
            parsed[1].as_ref().unwrap_err().to_string(),
            "line 3: expected 4 fields, found 2"
        );
    }
}
