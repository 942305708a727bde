//! In-memory storage implementation of the [`Database`] contract.
//!
//! Collections are ordered lists of type-erased records keyed by name. Reads run
//! a filter, paginate and sort pipeline over those lists; writes act on the first
//! record matching a filter.

use std::{any::type_name, collections::HashMap};

use async_trait::async_trait;
use log::{debug, trace, warn};

use minimongo_core::{
    backend::{Database, DatabaseBuilder},
    error::{DatabaseError, DatabaseResult},
    query::{Filter, Options},
    record::{AnyRecord, RecordSlot},
};

use crate::{evaluator::RecordEvaluator, sort::sort_records};

type Collection = Vec<Box<dyn AnyRecord>>;
type CollectionMap = HashMap<String, Collection>;

/// How skip, limit and sort combine on reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaginationOrder {
    /// Skip counts raw records from the start of the collection, the limit bounds
    /// the number of matches collected after that, and the sort only reorders the
    /// collected window.
    #[default]
    Compatible,
    /// Filter the whole collection, sort every match, then skip and limit the
    /// sorted matches, the way a real document database pages results.
    SortFirst,
}

/// An in-memory document store.
///
/// `MemoryDb` does no locking of its own: writes take `&mut self`. Wrap it in a
/// [`SharedDatabase`](minimongo_core::shared::SharedDatabase) to share it
/// between tasks.
///
/// # Example
///
/// ```ignore
/// use minimongo::{prelude::*, memory::MemoryDb};
///
/// let mut db = MemoryDb::new();
/// db.open().await?;
/// db.insert("users", User { name: "Alice".into(), age: 30 }).await?;
///
/// let mut alice: Option<User> = None;
/// db.find_one("users", &mut alice, Some(&filter! { "name" => "Alice" }), None).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDb {
    collections: CollectionMap,
    pagination: PaginationOrder,
}

impl MemoryDb {
    /// Creates an empty store using [`PaginationOrder::Compatible`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for a store with custom options or seeded collections.
    pub fn builder() -> MemoryDbBuilder {
        MemoryDbBuilder::default()
    }

    pub fn pagination_order(&self) -> PaginationOrder {
        self.pagination
    }

    /// Returns the number of records in a collection, or `None` if it does not exist.
    pub fn collection_len(&self, collection: &str) -> Option<usize> {
        self.collections.get(collection).map(Vec::len)
    }

    /// Returns the names of all existing collections, in no particular order.
    pub fn collection_names(&self) -> Vec<String> {
        self.collections.keys().cloned().collect()
    }

    fn collection(&self, collection: &str) -> DatabaseResult<&Collection> {
        if collection.is_empty() {
            return Err(DatabaseError::EmptyArgument("collection"));
        }

        self.collections
            .get(collection)
            .ok_or_else(|| DatabaseError::CollectionNotFound(collection.to_string()))
    }

    /// Runs the read pipeline over a collection.
    fn select<'a>(
        &self,
        records: &'a [Box<dyn AnyRecord>],
        filter: Option<&Filter>,
        options: Option<&Options>,
    ) -> Vec<&'a dyn AnyRecord> {
        let defaults = Options::default();
        let options = options.unwrap_or(&defaults);
        let skip = options.effective_skip();
        let limit = options.effective_limit().unwrap_or(usize::MAX);

        let selected = match self.pagination {
            PaginationOrder::Compatible => {
                let window = records
                    .iter()
                    .skip(skip)
                    .map(|record| &**record)
                    .filter(|record| Self::matches_filter(*record, filter))
                    .take(limit)
                    .collect::<Vec<_>>();

                match &options.sort {
                    Some(sort) => sort_records(window, sort),
                    None => window,
                }
            }
            PaginationOrder::SortFirst => {
                let matched = records
                    .iter()
                    .map(|record| &**record)
                    .filter(|record| Self::matches_filter(*record, filter))
                    .collect::<Vec<_>>();

                let sorted = match &options.sort {
                    Some(sort) => sort_records(matched, sort),
                    None => matched,
                };

                sorted.into_iter().skip(skip).take(limit).collect()
            }
        };

        trace!("Selected {} of {} records", selected.len(), records.len());

        selected
    }

    fn matches_filter(record: &dyn AnyRecord, filter: Option<&Filter>) -> bool {
        filter.is_none_or(|filter| RecordEvaluator::new(record).matches(filter))
    }

    /// Clones a stored record into the caller's slot kind.
    fn emit<S: RecordSlot>(record: &dyn AnyRecord) -> DatabaseResult<S> {
        match record.downcast_ref::<S::Record>() {
            Some(record) => Ok(S::from_record(record.clone())),
            None => {
                let expected = type_name::<S::Record>();
                let found = record.record_type_name();

                warn!("Cannot read a {} record into a {} container", found, expected);
                Err(DatabaseError::TypeMismatch { expected, found })
            }
        }
    }

    fn emit_all<S: RecordSlot>(records: Vec<&dyn AnyRecord>) -> DatabaseResult<Vec<S>> {
        records.into_iter().map(Self::emit).collect()
    }

    fn position(records: &[Box<dyn AnyRecord>], filter: &Filter) -> Option<usize> {
        records
            .iter()
            .position(|record| RecordEvaluator::new(record.as_ref()).matches(filter))
    }

    fn check_write_arguments(collection: &str, filter: &Filter) -> DatabaseResult<()> {
        if collection.is_empty() {
            return Err(DatabaseError::EmptyArgument("collection"));
        }

        if filter.is_empty() {
            return Err(DatabaseError::EmptyArgument("filter"));
        }

        Ok(())
    }

    fn unwrap_record<S: RecordSlot>(record: S) -> DatabaseResult<Box<dyn AnyRecord>> {
        match record.into_record() {
            Some(record) => Ok(Box::new(record)),
            None => Err(DatabaseError::EmptyArgument("record")),
        }
    }

    fn push(&mut self, collection: &str, record: Box<dyn AnyRecord>) {
        self.collections
            .entry(collection.to_string())
            .or_insert_with(|| {
                debug!("Creating collection {}", collection);
                Collection::new()
            })
            .push(record);
    }
}

#[async_trait]
impl Database for MemoryDb {
    async fn open(&mut self) -> DatabaseResult<()> {
        debug!("Opening in-memory database");
        self.collections = CollectionMap::new();

        Ok(())
    }

    async fn close(&mut self) -> DatabaseResult<()> {
        debug!("Closing in-memory database, dropping {} collections", self.collections.len());
        self.collections = CollectionMap::new();

        Ok(())
    }

    async fn insert<S: RecordSlot>(&mut self, collection: &str, record: S) -> DatabaseResult<()> {
        if collection.is_empty() {
            return Err(DatabaseError::EmptyArgument("collection"));
        }

        let record = Self::unwrap_record(record)?;

        debug!("Inserting {} record into {}", record.record_type_name(), collection);
        self.push(collection, record);

        Ok(())
    }

    async fn find_one<S: RecordSlot>(
        &self,
        collection: &str,
        out: &mut S,
        filter: Option<&Filter>,
        options: Option<&Options>,
    ) -> DatabaseResult<()> {
        let records = self.collection(collection)?;

        match self.select(records, filter, options).first() {
            Some(record) => {
                *out = Self::emit(*record)?;
                Ok(())
            }
            None => Err(DatabaseError::NoDocumentsFound(collection.to_string())),
        }
    }

    async fn find_all<S: RecordSlot>(
        &self,
        collection: &str,
        out: &mut Vec<S>,
        filter: Option<&Filter>,
        options: Option<&Options>,
    ) -> DatabaseResult<()> {
        let records = self.collection(collection)?;
        let found = Self::emit_all(self.select(records, filter, options))?;

        out.clear();
        out.extend(found);

        Ok(())
    }

    async fn update<S: RecordSlot>(
        &mut self,
        collection: &str,
        record: S,
        filter: &Filter,
    ) -> DatabaseResult<()> {
        Self::check_write_arguments(collection, filter)?;
        let record = Self::unwrap_record(record)?;

        let records = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| DatabaseError::CollectionNotFound(collection.to_string()))?;
        let position = Self::position(records, filter)
            .ok_or_else(|| DatabaseError::NoDocumentsFound(collection.to_string()))?;

        debug!("Replacing record {} in {}", position, collection);
        records[position] = record;

        Ok(())
    }

    async fn upsert<S: RecordSlot>(
        &mut self,
        collection: &str,
        record: S,
        filter: &Filter,
    ) -> DatabaseResult<()> {
        Self::check_write_arguments(collection, filter)?;
        let record = Self::unwrap_record(record)?;

        let existing = self
            .collections
            .get_mut(collection)
            .and_then(|records| Self::position(records, filter).map(|position| (records, position)));

        if let Some((records, position)) = existing {
            debug!("Replacing record {} in {}", position, collection);
            records[position] = record;

            return Ok(());
        }

        debug!("No match in {}, inserting {} record", collection, record.record_type_name());
        self.push(collection, record);

        Ok(())
    }

    async fn delete(&mut self, collection: &str, filter: &Filter) -> DatabaseResult<()> {
        Self::check_write_arguments(collection, filter)?;

        let records = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| DatabaseError::CollectionNotFound(collection.to_string()))?;
        let position = Self::position(records, filter)
            .ok_or_else(|| DatabaseError::NoDocumentsFound(collection.to_string()))?;

        debug!("Deleting record {} from {}", position, collection);
        records.remove(position);

        Ok(())
    }

    async fn search<S: RecordSlot>(
        &self,
        collection: &str,
        term: &str,
        fields: &[&str],
        out: &mut Vec<S>,
    ) -> DatabaseResult<()> {
        let records = self.collection(collection)?;
        let term = term.to_lowercase();

        let found = records
            .iter()
            .map(|record| &**record)
            .filter(|record| RecordEvaluator::new(*record).contains_text(&term, fields))
            .collect::<Vec<_>>();

        trace!("Search for {:?} matched {} records in {}", term, found.len(), collection);
        out.extend(Self::emit_all(found)?);

        Ok(())
    }
}

/// Builder for constructing [`MemoryDb`] instances.
///
/// # Example
///
/// ```ignore
/// use minimongo::{prelude::*, memory::{MemoryDb, PaginationOrder}};
///
/// let db = MemoryDb::builder()
///     .pagination_order(PaginationOrder::SortFirst)
///     .initial_collection("users", vec![alice, bob])
///     .build()
///     .await?;
/// ```
#[derive(Debug, Default)]
pub struct MemoryDbBuilder {
    pagination: PaginationOrder,
    collections: CollectionMap,
}

impl MemoryDbBuilder {
    pub fn pagination_order(mut self, order: PaginationOrder) -> Self {
        self.pagination = order;
        self
    }

    /// Seeds a collection with records, appended in iteration order.
    ///
    /// Absent records (empty `Option`s) are skipped. Calling [`Database::open`]
    /// on the built store discards seeded collections.
    pub fn initial_collection<S, I>(mut self, collection: impl Into<String>, records: I) -> Self
    where
        S: RecordSlot,
        I: IntoIterator<Item = S>,
    {
        self.collections
            .entry(collection.into())
            .or_default()
            .extend(
                records
                    .into_iter()
                    .filter_map(RecordSlot::into_record)
                    .map(|record| Box::new(record) as Box<dyn AnyRecord>),
            );
        self
    }
}

#[async_trait]
impl DatabaseBuilder for MemoryDbBuilder {
    type Database = MemoryDb;

    /// Builds the store. This always succeeds.
    async fn build(self) -> DatabaseResult<Self::Database> {
        debug!(
            "Building in-memory database with {} seeded collections ({:?} pagination)",
            self.collections.len(),
            self.pagination,
        );

        Ok(MemoryDb {
            collections: self.collections,
            pagination: self.pagination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minimongo_core::filter;
    use minimongo_macros::Record;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
    struct Letter {
        name: String,
        rank: i32,
    }

    fn letter(name: &str, rank: i32) -> Letter {
        Letter { name: name.into(), rank }
    }

    fn letters(db: &MemoryDb, collection: &str) -> Vec<String> {
        db.collections[collection]
            .iter()
            .filter_map(|record| record.downcast_ref::<Letter>())
            .map(|letter| letter.name.clone())
            .collect()
    }

    fn seeded(order: PaginationOrder) -> MemoryDb {
        MemoryDb {
            collections: CollectionMap::from([(
                "letters".to_string(),
                vec![
                    Box::new(letter("c", 3)) as Box<dyn AnyRecord>,
                    Box::new(letter("a", 1)),
                    Box::new(letter("d", 4)),
                    Box::new(letter("b", 2)),
                ],
            )]),
            pagination: order,
        }
    }

    fn names(records: Vec<&dyn AnyRecord>) -> Vec<String> {
        records
            .into_iter()
            .filter_map(|record| record.downcast_ref::<Letter>())
            .map(|letter| letter.name.clone())
            .collect()
    }

    #[test]
    fn test_compatible_skips_raw_records_then_sorts_window() {
        let db = seeded(PaginationOrder::Compatible);
        let options = Options::new().skip(1).limit(2).sort("rank", 1);

        let selected = db.select(&db.collections["letters"], None, Some(&options));

        assert_eq!(names(selected), vec!["a", "d"]);
    }

    #[test]
    fn test_sort_first_pages_sorted_matches() {
        let db = seeded(PaginationOrder::SortFirst);
        let options = Options::new().skip(1).limit(2).sort("rank", 1);

        let selected = db.select(&db.collections["letters"], None, Some(&options));

        assert_eq!(names(selected), vec!["b", "c"]);
    }

    #[test]
    fn test_skip_with_filter_depends_on_pagination_order() {
        let filter = filter! { "name" => "b" };
        let options = Options::new().skip(1);

        let db = seeded(PaginationOrder::Compatible);
        let selected = db.select(&db.collections["letters"], Some(&filter), Some(&options));
        assert_eq!(names(selected), vec!["b"]);

        let db = seeded(PaginationOrder::SortFirst);
        let selected = db.select(&db.collections["letters"], Some(&filter), Some(&options));
        assert!(selected.is_empty());
    }

    #[test]
    fn test_zero_direction_sort_option_is_ignored() {
        let db = seeded(PaginationOrder::Compatible);
        let options = Options {
            sort: Some(minimongo_core::query::SortOption::new("rank", 0)),
            ..Options::default()
        };

        let selected = db.select(&db.collections["letters"], None, Some(&options));

        assert_eq!(names(selected), vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn test_write_argument_checks() {
        assert!(matches!(
            MemoryDb::check_write_arguments("", &filter! { "a" => 1 }),
            Err(DatabaseError::EmptyArgument("collection"))
        ));
        assert!(matches!(
            MemoryDb::check_write_arguments("letters", &Filter::new()),
            Err(DatabaseError::EmptyArgument("filter"))
        ));
        assert!(MemoryDb::check_write_arguments("letters", &filter! { "a" => 1 }).is_ok());
    }

    #[test]
    fn test_position_finds_first_match() {
        let db = seeded(PaginationOrder::Compatible);
        let records = &db.collections["letters"];

        assert_eq!(MemoryDb::position(records, &filter! { "rank" => 4 }), Some(2));
        assert_eq!(MemoryDb::position(records, &filter! { "rank" => 9 }), None);
    }

    #[test]
    fn test_push_creates_collection() {
        let mut db = MemoryDb::new();
        db.push("letters", Box::new(letter("x", 0)));
        db.push("letters", Box::new(letter("y", 0)));

        assert_eq!(letters(&db, "letters"), vec!["x", "y"]);
        assert_eq!(db.collection_names(), vec!["letters".to_string()]);
    }
}
