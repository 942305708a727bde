//! Translation of minimongo filters and options into MongoDB query syntax.
//!
//! Filter keys are passed through as given, so they must match the stored
//! (serialized) field names; the key normalization of the in-memory backend does
//! not apply here.
//!
//! Filter values are converted to the form the driver stores them in. In
//! particular a `chrono::DateTime<Utc>` serializes to an RFC 3339 string, so a
//! timestamp filter is sent as that string rather than as a BSON date.

use bson::{Bson, Document, doc, ser::serialize_to_bson};
use mongodb::options::{FindOneOptions, FindOptions};

use minimongo_core::{
    query::{Filter, Options, SortOption},
    value::Value,
};

/// Converts an equality filter into a query document. `None` matches everything.
pub fn to_document(filter: Option<&Filter>) -> Document {
    match filter {
        Some(filter) => filter
            .iter()
            .map(|(key, value)| (key.clone(), stored_form(value)))
            .collect(),
        None => Document::new(),
    }
}

/// The BSON a record field holding `value` is stored as.
fn stored_form(value: &Value<'_>) -> Bson {
    match value {
        Value::DateTime(dt) => serialize_to_bson(dt).unwrap_or_else(|err| {
            log::warn!("Failed to serialize filter timestamp: {}", err);
            value.to_bson()
        }),
        _ => value.to_bson(),
    }
}

/// Builds driver options for `find`: limit, skip and sort.
pub fn find_options(options: Option<&Options>) -> FindOptions {
    let mut find = FindOptions::default();

    if let Some(options) = options {
        if options.limit > 0 {
            find.limit = Some(options.limit);
        }
        if options.skip > 0 {
            find.skip = Some(options.skip as u64);
        }
        find.sort = options.sort.as_ref().map(sort_document);
    }

    find
}

/// Builds driver options for `find_one`. The limit is meaningless for a single
/// result and is dropped.
pub fn find_one_options(options: Option<&Options>) -> FindOneOptions {
    let mut find = FindOneOptions::default();

    if let Some(options) = options {
        if options.skip > 0 {
            find.skip = Some(options.skip as u64);
        }
        find.sort = options.sort.as_ref().map(sort_document);
    }

    find
}

fn sort_document(sort: &SortOption) -> Document {
    doc! { sort.key.clone(): sort.value }
}

/// Builds a filter matching records where any of `fields` contains `term`,
/// ignoring case. Returns `None` when there is no field to search.
pub fn search_filter(term: &str, fields: &[&str]) -> Option<Document> {
    if fields.is_empty() {
        return None;
    }

    let pattern = escape_regex(term);

    Some(doc! {
        "$or": fields
            .iter()
            .map(|field| doc! {
                field.to_string(): { "$regex": pattern.clone(), "$options": "i" }
            })
            .collect::<Vec<_>>(),
    })
}

fn escape_regex(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());

    for c in term.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use bson::ser::serialize_to_document;
    use chrono::{TimeZone, Utc};
    use minimongo_core::filter;

    #[test]
    fn test_to_document() {
        assert!(to_document(None).is_empty());

        let document = to_document(Some(&filter! { "Name" => "alice", "age" => 30u8 }));

        assert_eq!(document.len(), 2);
        assert_eq!(document.get("Name"), Some(&Bson::String("alice".into())));
        assert_eq!(document.get("age"), Some(&Bson::Int32(30)));
    }

    #[test]
    fn test_to_document_matches_stored_timestamps() {
        let time = Utc.timestamp_opt(1500, 0).unwrap();
        let stored = serialize_to_document(&HashMap::from([("time", time)])).unwrap();

        let query = to_document(Some(&filter! { "time" => time }));

        assert_eq!(query.get("time"), stored.get("time"));
        assert_eq!(
            query.get("time"),
            Some(&Bson::String("1970-01-01T00:25:00Z".into()))
        );
    }

    #[test]
    fn test_to_document_keeps_bson_dates() {
        let at = bson::DateTime::from_millis(1_500_000);
        let query = to_document(Some(&filter! { "at" => at }));

        assert_eq!(query.get("at"), Some(&Bson::DateTime(at)));
    }

    #[test]
    fn test_find_options() {
        let options = Options::new().limit(10).skip(5).sort("time", 0);
        let find = find_options(Some(&options));

        assert_eq!(find.limit, Some(10));
        assert_eq!(find.skip, Some(5));
        assert_eq!(find.sort, Some(doc! { "time": -1 }));
    }

    #[test]
    fn test_find_options_ignore_non_positive_values() {
        let find = find_options(Some(&Options::new().limit(0).skip(-3)));

        assert_eq!(find.limit, None);
        assert_eq!(find.skip, None);
        assert_eq!(find.sort, None);
    }

    #[test]
    fn test_find_one_options_drop_limit() {
        let options = Options::new().limit(10).skip(2).sort("name", 1);
        let find = find_one_options(Some(&options));

        assert_eq!(find.skip, Some(2));
        assert_eq!(find.sort, Some(doc! { "name": 1 }));
    }

    #[test]
    fn test_search_filter() {
        assert!(search_filter("x", &[]).is_none());

        let filter = search_filter("a.b", &["name", "note"]);

        assert_eq!(
            filter,
            Some(doc! {
                "$or": [
                    { "name": { "$regex": "a\\.b", "$options": "i" } },
                    { "note": { "$regex": "a\\.b", "$options": "i" } },
                ]
            })
        );
    }

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("plain text"), "plain text");
        assert_eq!(escape_regex("1+1=(2)"), "1\\+1=\\(2\\)");
    }
}
