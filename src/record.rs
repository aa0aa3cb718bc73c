//! Raw text records and fixed-width column extraction.

use std::fmt;

use crate::schema::{FieldDef, FieldEnd};

/// One raw input line.
///
/// Records are never edited after loading; a record's identity is its
/// position in the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record(String);

/// Byte offset of the `n`th character, or `s.len()` when `s` is shorter.
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

impl Record {
    pub fn new(line: impl Into<String>) -> Self {
        Self(line.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters. Column offsets count characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the line reaches the field's first column.
    pub fn covers(&self, field: &FieldDef) -> bool {
        self.0.chars().nth(field.start() - 1).is_some()
    }

    /// The untrimmed characters of `field`.
    ///
    /// Empty when the line is shorter than the field start; cut at end of
    /// line when the field is open or extends past the line.
    pub fn field_slice(&self, field: &FieldDef) -> &str {
        let line = self.0.as_str();
        let from = byte_offset(line, field.start() - 1);
        let to = match field.end() {
            FieldEnd::At(end) => from + byte_offset(&line[from..], end + 1 - field.start()),
            FieldEnd::Open => line.len(),
        };
        &line[from..to]
    }

    /// The trimmed value of `field`, borrowed from the line.
    pub fn value(&self, field: &FieldDef) -> &str {
        self.field_slice(field).trim()
    }

    /// The trimmed value of `field`. Never fails; out-of-range columns
    /// degrade to an empty or truncated value.
    pub fn extract(&self, field: &FieldDef) -> String {
        self.value(field).to_string()
    }
}

impl From<&str> for Record {
    fn from(line: &str) -> Self {
        Self::new(line)
    }
}

impl From<String> for Record {
    fn from(line: String) -> Self {
        Self(line)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(start: i64, end: i64) -> FieldDef {
        FieldDef::new("F", start, end).unwrap()
    }

    #[test]
    fn test_extract_closed_field() {
        let r = Record::new("REC0101234567INSRT");
        assert_eq!(r.extract(&field(6, 13)), "01234567");
        assert_eq!(r.extract(&field(1, 3)), "REC");
    }

    #[test]
    fn test_extract_trims() {
        let r = Record::new("AB   XY   CD");
        assert_eq!(r.field_slice(&field(3, 10)), "   XY   ");
        assert_eq!(r.extract(&field(3, 10)), "XY");
    }

    #[test]
    fn test_extract_open_field() {
        let r = Record::new("ABCDE");
        assert_eq!(r.extract(&field(3, -1)), "CDE");
    }

    #[test]
    fn test_extract_open_field_trims_trailing_space() {
        let r = Record::new("AB  payload  ");
        assert_eq!(r.extract(&field(3, -1)), "payload");
    }

    #[test]
    fn test_extract_line_shorter_than_start() {
        let r = Record::new("ABC");
        assert_eq!(r.extract(&field(5, 8)), "");
        assert_eq!(r.extract(&field(5, -1)), "");
        assert!(!r.covers(&field(5, 8)));
    }

    #[test]
    fn test_extract_line_exactly_start() {
        let r = Record::new("ABCDE");
        assert!(r.covers(&field(5, 9)));
        assert_eq!(r.extract(&field(5, 9)), "E");
    }

    #[test]
    fn test_extract_end_past_line() {
        let r = Record::new("AB");
        assert_eq!(r.extract(&field(1, 3)), "AB");
    }

    #[test]
    fn test_extract_blank_field() {
        let r = Record::new("AB      CD");
        assert_eq!(r.extract(&field(3, 8)), "");
        assert!(r.covers(&field(3, 8)));
    }

    #[test]
    fn test_extract_counts_characters() {
        let r = Record::new("ÄÖÜ12");
        assert_eq!(r.len(), 5);
        assert_eq!(r.extract(&field(2, 3)), "ÖÜ");
        assert_eq!(r.extract(&field(4, -1)), "12");
    }

    #[test]
    fn test_empty_record() {
        let r = Record::new("");
        assert!(r.is_empty());
        assert_eq!(r.extract(&field(1, -1)), "");
    }

    #[test]
    fn test_display_is_raw_line() {
        let r = Record::from("  raw line  ");
        assert_eq!(r.to_string(), "  raw line  ");
    }
}
