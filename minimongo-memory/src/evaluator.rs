//! Filter evaluation for in-memory records.
//!
//! [`Comparator`] implements the loose equality and the type-aware ordering used
//! by filters and sorts; [`RecordEvaluator`] applies a filter or a text search to
//! one type-erased record.

use std::{cmp::Ordering, mem::discriminant};

use bson::Bson;

use minimongo_core::{
    query::{Filter, SortDirection},
    record::AnyRecord,
    value::Value,
};

/// Equality and ordering over heterogeneous [`Value`]s.
pub struct Comparator;

impl Comparator {
    /// Loose equality between a filter value and a field value.
    ///
    /// Values of the same representation compare structurally. Integers of
    /// different widths compare by numeric value. Anything else is unequal, including
    /// a wall-clock time against a structured timestamp for the same instant.
    pub fn equal(expected: &Value<'_>, actual: &Value<'_>) -> bool {
        if Self::same_representation(expected, actual) {
            return expected == actual;
        }

        match (expected, actual) {
            (Value::Int(left, _), Value::Int(right, _)) => left == right,
            _ => false,
        }
    }

    /// Returns `true` if `a` sorts strictly before `b` in the given direction.
    ///
    /// Integers compare numerically, strings lexicographically, timestamps of either
    /// representation chronologically. Every other pairing, and a zero timestamp or
    /// `Null` on the left, is "not less", which leaves the pair in input order.
    pub fn less(a: &Value<'_>, b: &Value<'_>, direction: SortDirection) -> bool {
        let ordering = match (a, b) {
            (Value::Int(left, _), Value::Int(right, _)) => left.cmp(right),
            (Value::String(left), Value::String(right)) => left.cmp(right),
            _ if a.is_unset() => return false,
            _ => match (a.as_datetime(), b.as_datetime()) {
                (Some(left), Some(right)) => left.cmp(&right),
                _ => return false,
            },
        };

        match direction {
            SortDirection::Asc => ordering == Ordering::Less,
            SortDirection::Desc => ordering == Ordering::Greater,
        }
    }

    fn same_representation(a: &Value<'_>, b: &Value<'_>) -> bool {
        match (a, b) {
            (Value::Int(_, left), Value::Int(_, right)) => left == right,
            _ => discriminant(a) == discriminant(b),
        }
    }
}

/// Evaluates filters and searches against a single record.
pub(crate) struct RecordEvaluator<'a> {
    record: &'a dyn AnyRecord,
}

impl<'a> RecordEvaluator<'a> {
    pub fn new(record: &'a dyn AnyRecord) -> Self {
        Self { record }
    }

    /// Returns `true` if every filter entry resolves on the record and equals the
    /// field's value. A field the record does not have is a non-match.
    pub fn matches(&self, filter: &Filter) -> bool {
        filter.iter().all(|(key, expected)| {
            match self.record.record_field(key) {
                Some(actual) => Comparator::equal(expected, &actual),
                None => false,
            }
        })
    }

    /// Returns `true` if any of `fields` contains `term_lowercase` in its string form,
    /// ignoring case. `term_lowercase` must already be lower-cased.
    ///
    /// Only scalar fields are searched; nested documents and arrays never match.
    pub fn contains_text(&self, term_lowercase: &str, fields: &[&str]) -> bool {
        fields.iter().any(|field| {
            self.record
                .record_field(field)
                .filter(|value| {
                    !matches!(value, Value::Other(Bson::Document(_) | Bson::Array(_)))
                })
                .map(|value| {
                    value
                        .to_string()
                        .to_lowercase()
                        .contains(term_lowercase)
                })
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{Bson, DateTime as BsonDateTime, doc};
    use chrono::{DateTime, TimeZone, Utc};
    use minimongo_core::filter;
    use minimongo_macros::Record;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Record)]
    struct Item {
        name: String,
        value: i32,
        time: DateTime<Utc>,
        note: Option<String>,
    }

    fn item() -> Item {
        Item {
            name: "Some Name".into(),
            value: 123,
            time: Utc.timestamp_opt(1000, 0).unwrap(),
            note: None,
        }
    }

    #[test]
    fn test_equal_same_representation() {
        assert!(Comparator::equal(&Value::from("a"), &Value::from("a".to_string())));
        assert!(!Comparator::equal(&Value::from("a"), &Value::from("b")));
        assert!(Comparator::equal(&Value::from(true), &Value::from(true)));
        assert!(Comparator::equal(
            &Value::from(Bson::Document(doc! { "x": 1 })),
            &Value::Other(Bson::Document(doc! { "x": 1 })),
        ));
    }

    #[test]
    fn test_equal_widens_integers() {
        assert!(Comparator::equal(&Value::from(123i64), &Value::from(123i32)));
        assert!(Comparator::equal(&Value::from(7u8), &Value::from(7i128)));
        assert!(!Comparator::equal(&Value::from(-1i64), &Value::from(255u8)));
    }

    #[test]
    fn test_equal_mismatched_representations() {
        let dt = Utc.timestamp_opt(1000, 0).unwrap();

        assert!(!Comparator::equal(&Value::from("123"), &Value::from(123i32)));
        assert!(!Comparator::equal(&Value::from(1.0f64), &Value::from(1i32)));
        assert!(!Comparator::equal(
            &Value::from(dt),
            &Value::from(BsonDateTime::from_chrono(dt)),
        ));
    }

    #[test]
    fn test_less_by_kind_and_direction() {
        assert!(Comparator::less(&Value::from(1i32), &Value::from(2i64), SortDirection::Asc));
        assert!(!Comparator::less(&Value::from(1i32), &Value::from(2i64), SortDirection::Desc));
        assert!(Comparator::less(&Value::from("b"), &Value::from("a"), SortDirection::Desc));

        let early = Utc.timestamp_opt(1000, 0).unwrap();
        let late = Utc.timestamp_opt(3000, 0).unwrap();
        assert!(Comparator::less(&Value::from(early), &Value::from(late), SortDirection::Asc));
        assert!(Comparator::less(
            &Value::from(BsonDateTime::from_chrono(late)),
            &Value::from(early),
            SortDirection::Desc,
        ));
    }

    #[test]
    fn test_less_incomparable_is_not_less() {
        let late = Utc.timestamp_opt(3000, 0).unwrap();

        assert!(!Comparator::less(&Value::from(1.0f64), &Value::from(2.0f64), SortDirection::Asc));
        assert!(!Comparator::less(&Value::from("1"), &Value::from(2i32), SortDirection::Asc));
        assert!(!Comparator::less(&Value::Null, &Value::from(1i32), SortDirection::Asc));
        assert!(!Comparator::less(
            &Value::from(DateTime::<Utc>::default()),
            &Value::from(late),
            SortDirection::Asc,
        ));
    }

    #[test]
    fn test_empty_filter_matches() {
        assert!(RecordEvaluator::new(&item()).matches(&Filter::new()));
    }

    #[test]
    fn test_filter_keys_are_normalized() {
        let item = item();

        for key in ["value", "Value", "VALUE", "va_lue"] {
            assert!(RecordEvaluator::new(&item).matches(&filter! { key => 123 }));
        }
    }

    #[test]
    fn test_filter_is_a_conjunction() {
        let item = item();
        let evaluator = RecordEvaluator::new(&item);

        assert!(evaluator.matches(&filter! { "name" => "Some Name", "value" => 123i64 }));
        assert!(!evaluator.matches(&filter! { "name" => "Some Name", "value" => 124 }));
    }

    #[test]
    fn test_filter_on_missing_field_never_matches() {
        assert!(!RecordEvaluator::new(&item()).matches(&filter! { "color" => "red" }));
    }

    #[test]
    fn test_filter_on_null_field() {
        let item = item();

        assert!(RecordEvaluator::new(&item).matches(&filter! { "note" => None::<String> }));
        assert!(!RecordEvaluator::new(&item).matches(&filter! { "note" => "x" }));
    }

    #[test]
    fn test_contains_text() {
        let item = item();
        let evaluator = RecordEvaluator::new(&item);

        assert!(evaluator.contains_text("some", &["name"]));
        assert!(evaluator.contains_text("name", &["value", "Name"]));
        assert!(evaluator.contains_text("12", &["value"]));
        assert!(!evaluator.contains_text("other", &["name", "value"]));
        assert!(!evaluator.contains_text("some", &["missing"]));
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Meta {
        x: i32,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, Record)]
    struct Tagged {
        label: String,
        #[record(serde)]
        meta: Meta,
    }

    #[test]
    fn test_contains_text_skips_nested_documents() {
        let tagged = Tagged {
            label: "plain".into(),
            meta: Meta { x: 1 },
        };
        let evaluator = RecordEvaluator::new(&tagged);

        assert!(!evaluator.contains_text("x", &["meta"]));
        assert!(!evaluator.contains_text("1", &["meta"]));
        assert!(evaluator.contains_text("plain", &["meta", "label"]));
        assert!(evaluator.matches(&filter! { "meta" => Bson::Document(doc! { "x": 1 }) }));
    }
}
