//! Labelled field extraction from plain text.

pub mod patterns;

use tracing::{debug, trace};

use crate::models::record::{Field, FieldSet};
use patterns::FIELD_PATTERNS;

/// Line-oriented `Label: value` parser over the fixed field vocabulary.
///
/// Assumes one flat label block per document: for every field the first
/// matching line wins, and a field with no matching line stays absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldParser;

impl FieldParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse all vocabulary fields from text.
    pub fn parse(&self, text: &str) -> FieldSet {
        let lines: Vec<&str> = text.trim().split('\n').map(str::trim).collect();

        let fields: FieldSet = FIELD_PATTERNS
            .iter()
            .filter_map(|(field, pattern)| {
                let value = lines
                    .iter()
                    .find_map(|line| pattern.captures(line))
                    .map(|caps| caps[1].trim().to_string())?;
                trace!("Matched {} = {:?}", field, value);
                Some((*field, value))
            })
            .collect();

        debug!(
            "Parsed {}/{} fields from {} lines",
            fields.present_count(),
            Field::COUNT,
            lines.len()
        );
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "Sr no.: S001\nName: Hemanshu Kasar\nCity: Nagpur\nAge: 23\nCountry: India\nAddress: 7, gurudeo nagar";

    #[test]
    fn test_parse_full_block() {
        let fields = FieldParser::new().parse(SAMPLE);

        assert_eq!(fields.record_id(), Some("S001"));
        assert_eq!(fields.get(Field::Name), Some("Hemanshu Kasar"));
        assert_eq!(fields.get(Field::City), Some("Nagpur"));
        assert_eq!(fields.get(Field::Age), Some("23"));
        assert_eq!(fields.get(Field::Country), Some("India"));
        assert_eq!(fields.get(Field::Address), Some("7, gurudeo nagar"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = FieldParser::new();
        assert_eq!(parser.parse(SAMPLE), parser.parse(SAMPLE));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let reordered = "Address: 7, gurudeo nagar\nAge: 23\nCountry: India\nCity: Nagpur\nName: Hemanshu Kasar\nSr no.: S001";
        let parser = FieldParser::new();
        assert_eq!(parser.parse(reordered), parser.parse(SAMPLE));
    }

    #[test]
    fn test_missing_label_is_absent() {
        let fields = FieldParser::new().parse("Name: John Doe\nCity: New York");
        assert_eq!(fields.record_id(), None);
        assert_eq!(fields.get(Field::Age), None);
    }

    #[test]
    fn test_empty_value_is_present() {
        let fields = FieldParser::new().parse("Name:   \nCity: Cairo");
        assert_eq!(fields.get(Field::Name), Some(""));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let fields = FieldParser::new().parse("Age: 23\nAge: 99");
        assert_eq!(fields.get(Field::Age), Some("23"));
    }

    #[test]
    fn test_case_insensitive_labels_and_spacing() {
        let fields = FieldParser::new().parse("  SR NO.  :  S004  \r\ncountry:india\r\n");
        assert_eq!(fields.record_id(), Some("S004"));
        assert_eq!(fields.get(Field::Country), Some("india"));
    }

    #[test]
    fn test_label_inside_value_does_not_match() {
        let fields = FieldParser::new().parse("Address: Near City: Mall\nName: Ahmed Hassan");
        assert_eq!(fields.get(Field::Address), Some("Near City: Mall"));
        assert_eq!(fields.get(Field::City), None);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(FieldParser::new().parse(""), FieldSet::empty());
    }
}
