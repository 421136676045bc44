//! Field vocabulary, parsed field sets and reference records.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A labelled field of a person record.
///
/// Variants are declared in extraction order; `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Serial number identifying the reference record.
    #[serde(rename = "Sr no.")]
    RecordId,
    Name,
    City,
    Age,
    Country,
    Address,
}

impl Field {
    /// Number of fields in the vocabulary.
    pub const COUNT: usize = 6;

    /// All fields in declared order.
    pub const ALL: [Field; Self::COUNT] = [
        Field::RecordId,
        Field::Name,
        Field::City,
        Field::Age,
        Field::Country,
        Field::Address,
    ];

    /// Label as it appears in documents ("Sr no.", "Name", ...).
    pub fn label(&self) -> &'static str {
        match self {
            Field::RecordId => "Sr no.",
            Field::Name => "Name",
            Field::City => "City",
            Field::Age => "Age",
            Field::Country => "Country",
            Field::Address => "Address",
        }
    }

    /// Look up a field by its exact label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.label() == label)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values parsed from a document, one slot per vocabulary field.
///
/// A slot is `None` when the document never mentioned the field, which is
/// distinct from a label followed by an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    values: [Option<String>; Field::COUNT],
}

impl FieldSet {
    /// A field set with every field absent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Value of a field, if present.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values[field.index()].as_deref()
    }

    /// The record id, if present.
    pub fn record_id(&self) -> Option<&str> {
        self.get(Field::RecordId)
    }

    /// Iterate over all fields in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, Option<&str>)> + '_ {
        Field::ALL.into_iter().map(|f| (f, self.get(f)))
    }

    /// Number of fields holding a value.
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

impl FromIterator<(Field, String)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (Field, String)>>(iter: I) -> Self {
        let mut set = Self::empty();
        for (field, value) in iter {
            set.values[field.index()] = Some(value);
        }
        set
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Field::COUNT))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.label(), &value)?;
        }
        map.end()
    }
}

/// An authoritative record fetched from a reference store.
///
/// Holds any subset of the vocabulary. The fields it holds define what a
/// comparison scores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceRecord {
    fields: BTreeMap<Field, String>,
}

impl ReferenceRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    /// Value of a field, if the record holds it.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// The record id, if the record holds it.
    pub fn record_id(&self) -> Option<&str> {
        self.get(Field::RecordId)
    }

    /// Iterate over held fields in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        self.fields.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// Number of fields held.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(Field, String)> for ReferenceRecord {
    fn from_iter<I: IntoIterator<Item = (Field, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_labels_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_label(field.label()), Some(field));
        }
        assert_eq!(Field::from_label("sr no."), None);
    }

    #[test]
    fn test_field_set_absent_vs_empty() {
        let set: FieldSet = [(Field::Name, String::new())].into_iter().collect();
        assert_eq!(set.get(Field::Name), Some(""));
        assert_eq!(set.get(Field::City), None);
        assert_eq!(set.present_count(), 1);
    }

    #[test]
    fn test_field_set_serializes_in_declared_order() {
        let set: FieldSet = [
            (Field::Age, "23".to_string()),
            (Field::RecordId, "S001".to_string()),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(
            json,
            r#"{"Sr no.":"S001","Name":null,"City":null,"Age":"23","Country":null,"Address":null}"#
        );
    }

    #[test]
    fn test_reference_record_from_json() {
        let record: ReferenceRecord =
            serde_json::from_str(r#"{"Name": "John Doe", "Sr no.": "S002"}"#).unwrap();

        assert_eq!(record.len(), 2);
        assert_eq!(record.record_id(), Some("S002"));
        let order: Vec<Field> = record.iter().map(|(f, _)| f).collect();
        assert_eq!(order, vec![Field::RecordId, Field::Name]);
    }

    #[test]
    fn test_reference_record_rejects_unknown_label() {
        let result = serde_json::from_str::<ReferenceRecord>(r#"{"Skills": "Rust"}"#);
        assert!(result.is_err());
    }
}
