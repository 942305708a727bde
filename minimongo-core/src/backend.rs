//! The database contract.
//!
//! [`Database`] is the collaborator interface shared by the in-memory store and
//! the real document-database adapter, so one can be swapped for the other in
//! tests. Records are moved in and out through [`RecordSlot`]s: the caller picks
//! the element kind of the output container (`R`, `Box<R>`, `Arc<R>`,
//! `Option<R>`) and the backend fills it.
//!
//! # Example
//!
//! ```ignore
//! use minimongo::{prelude::*, memory::MemoryDb};
//!
//! async fn first_admin<D: Database>(db: &D) -> DatabaseResult<User> {
//!     let mut user: Option<User> = None;
//!     db.find_one("users", &mut user, Some(&filter! { "role" => "admin" }), None).await?;
//!     user.ok_or(DatabaseError::NoDocumentsFound("users".into()))
//! }
//! ```

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::DatabaseResult,
    query::{Filter, Options},
    record::RecordSlot,
};

/// Abstract interface for document databases.
///
/// # Mutability
///
/// Writes take `&mut self`. Implementations are not required to synchronize
/// internally; wrap a backend in [`SharedDatabase`](crate::shared::SharedDatabase)
/// to share it between tasks.
///
/// # Errors
///
/// Implementations report blank arguments as
/// [`EmptyArgument`](crate::error::DatabaseError::EmptyArgument), missing
/// collections and records as
/// [`CollectionNotFound`](crate::error::DatabaseError::CollectionNotFound) /
/// [`NoDocumentsFound`](crate::error::DatabaseError::NoDocumentsFound).
#[async_trait]
pub trait Database: Send + Sync + Debug {
    /// Prepares the backend for use. For the in-memory store this resets all collections.
    async fn open(&mut self) -> DatabaseResult<()>;

    /// Releases the backend's resources. For the in-memory store this drops all collections.
    async fn close(&mut self) -> DatabaseResult<()>;

    /// Appends a record to a collection, creating the collection if needed.
    ///
    /// Fails with `EmptyArgument` if the collection name is empty or the record is
    /// absent (an empty `Option`).
    async fn insert<S: RecordSlot>(&mut self, collection: &str, record: S) -> DatabaseResult<()>;

    /// Writes the first record matching `filter` into `out`.
    ///
    /// `options` may skip records or sort the candidates; the limit only bounds the
    /// candidate window.
    async fn find_one<S: RecordSlot>(
        &self,
        collection: &str,
        out: &mut S,
        filter: Option<&Filter>,
        options: Option<&Options>,
    ) -> DatabaseResult<()>;

    /// Replaces the contents of `out` with every record matching `filter`,
    /// paginated and sorted according to `options`.
    async fn find_all<S: RecordSlot>(
        &self,
        collection: &str,
        out: &mut Vec<S>,
        filter: Option<&Filter>,
        options: Option<&Options>,
    ) -> DatabaseResult<()>;

    /// Replaces the first record matching `filter` with `record`.
    async fn update<S: RecordSlot>(
        &mut self,
        collection: &str,
        record: S,
        filter: &Filter,
    ) -> DatabaseResult<()>;

    /// Like [`update`](Database::update), but inserts `record` when nothing matches.
    async fn upsert<S: RecordSlot>(
        &mut self,
        collection: &str,
        record: S,
        filter: &Filter,
    ) -> DatabaseResult<()>;

    /// Removes the first record matching `filter`.
    async fn delete(&mut self, collection: &str, filter: &Filter) -> DatabaseResult<()>;

    /// Appends to `out` every record where any of `fields` contains `term`,
    /// compared case-insensitively.
    async fn search<S: RecordSlot>(
        &self,
        collection: &str,
        term: &str,
        fields: &[&str],
        out: &mut Vec<S>,
    ) -> DatabaseResult<()>;
}

/// Factory trait for creating database instances.
#[async_trait]
pub trait DatabaseBuilder {
    type Database: Database;

    async fn build(self) -> DatabaseResult<Self::Database>;
}
