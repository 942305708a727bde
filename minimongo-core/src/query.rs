//! Filters and query options.
//!
//! A [`Filter`] is an unordered map from logical field name to expected value.
//! All entries must match (logical AND); an empty filter matches every record.
//!
//! [`Options`] carries the read modifiers: `limit` (non-positive means unlimited),
//! `skip` and a single [`SortOption`]. Both are built fluently:
//!
//! ```ignore
//! use minimongo_core::{filter, query::Options};
//!
//! let filter = filter! { "name" => "Alice", "age" => 30 };
//! let options = Options::new()
//!     .skip(10)
//!     .limit(5)
//!     .sort("created_at", -1);
//! ```

use std::collections::{HashMap, hash_map};

use crate::value::Value;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// Sort specification: a field key and a signed direction value.
///
/// Positive values sort ascending, negative values descending. A value of zero
/// means "no sort" when it reaches the sort engine; [`Options::sort`] never
/// produces it because it maps zero to descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOption {
    /// The logical field key to sort by.
    pub key: String,
    /// The direction value: `> 0` ascending, `< 0` descending, `0` unset.
    pub value: i32,
}

impl SortOption {
    /// Creates a sort option with the value exactly as given.
    pub fn new(key: impl Into<String>, value: i32) -> Self {
        Self { key: key.into(), value }
    }

    /// Returns the direction, or `None` when the value is zero.
    pub fn direction(&self) -> Option<SortDirection> {
        match self.value {
            0 => None,
            v if v > 0 => Some(SortDirection::Asc),
            _ => Some(SortDirection::Desc),
        }
    }
}

/// Read modifiers for `find_one` and `find_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Maximum number of records to return; `<= 0` means unlimited.
    pub limit: i64,
    /// Number of records to skip; negative values count as zero.
    pub skip: i64,
    /// Optional sort specification.
    pub sort: Option<SortOption>,
}

impl Options {
    /// Creates options with no limit, no skip and no sort.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of records to return; `<= 0` means unlimited.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the number of records to skip.
    pub fn skip(mut self, skip: i64) -> Self {
        self.skip = skip;
        self
    }

    /// Sets the sort key and direction. A direction of `0` is stored as `-1` (descending).
    pub fn sort(mut self, key: impl Into<String>, value: i32) -> Self {
        let value = if value == 0 { -1 } else { value };
        self.sort = Some(SortOption::new(key, value));
        self
    }

    /// The limit as a count, or `None` when unlimited.
    pub fn effective_limit(&self) -> Option<usize> {
        if self.limit > 0 {
            Some(usize::try_from(self.limit).unwrap_or(usize::MAX))
        } else {
            None
        }
    }

    /// The skip as a count.
    pub fn effective_skip(&self) -> usize {
        usize::try_from(self.skip.max(0)).unwrap_or(usize::MAX)
    }
}

/// Equality constraints on record fields, ANDed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    entries: HashMap<String, Value<'static>>,
}

impl Filter {
    /// Creates an empty filter, which matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `key == value` constraint and returns the filter.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value<'static>>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a `key == value` constraint.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value<'static>>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns the expected value for `key` exactly as it was inserted.
    pub fn get(&self, key: &str) -> Option<&Value<'static>> {
        self.entries.get(key)
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the filter has no constraints and so matches everything.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the `(key, value)` constraints in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, Value<'static>> {
        self.entries.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Filter
where
    K: Into<String>,
    V: Into<Value<'static>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Filter::new();

        for (key, value) in iter {
            filter.insert(key, value);
        }

        filter
    }
}

impl<'a> IntoIterator for &'a Filter {
    type Item = (&'a String, &'a Value<'static>);
    type IntoIter = hash_map::Iter<'a, String, Value<'static>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builds a [`Filter`] from `key => value` pairs.
///
/// ```ignore
/// let filter = minimongo_core::filter! { "name" => "objName", "value" => 123 };
/// ```
#[macro_export]
macro_rules! filter {
    () => {
        $crate::query::Filter::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::query::Filter::new()$(.field($key, $value))+
    };
}
