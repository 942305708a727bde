//! Shared access to a [`Database`].
//!
//! Backends take `&mut self` for writes and do no locking of their own.
//! [`SharedDatabase`] puts one behind an `Arc`'d async read-write lock so clones
//! can be handed to several tasks: reads share the lock, writes hold it exclusively
//! for the whole operation.

use std::sync::Arc;

use async_trait::async_trait;
use mea::rwlock::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    backend::Database,
    error::DatabaseResult,
    query::{Filter, Options},
    record::RecordSlot,
};

/// A cloneable, lock-guarded handle to a database.
///
/// All clones share the same underlying database.
#[derive(Debug)]
pub struct SharedDatabase<D> {
    inner: Arc<RwLock<D>>,
}

impl<D> Clone for SharedDatabase<D> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<D: Database> SharedDatabase<D> {
    pub fn new(database: D) -> Self {
        Self { inner: Arc::new(RwLock::new(database)) }
    }

    /// Locks the database for reading, for direct access to backend-specific methods.
    pub async fn read(&self) -> RwLockReadGuard<'_, D> {
        self.inner.read().await
    }

    /// Locks the database for writing.
    pub async fn write(&self) -> RwLockWriteGuard<'_, D> {
        self.inner.write().await
    }
}

#[async_trait]
impl<D: Database> Database for SharedDatabase<D> {
    async fn open(&mut self) -> DatabaseResult<()> {
        self.inner.write().await.open().await
    }

    async fn close(&mut self) -> DatabaseResult<()> {
        self.inner.write().await.close().await
    }

    async fn insert<S: RecordSlot>(&mut self, collection: &str, record: S) -> DatabaseResult<()> {
        self.inner
            .write()
            .await
            .insert(collection, record)
            .await
    }

    async fn find_one<S: RecordSlot>(
        &self,
        collection: &str,
        out: &mut S,
        filter: Option<&Filter>,
        options: Option<&Options>,
    ) -> DatabaseResult<()> {
        self.inner
            .read()
            .await
            .find_one(collection, out, filter, options)
            .await
    }

    async fn find_all<S: RecordSlot>(
        &self,
        collection: &str,
        out: &mut Vec<S>,
        filter: Option<&Filter>,
        options: Option<&Options>,
    ) -> DatabaseResult<()> {
        self.inner
            .read()
            .await
            .find_all(collection, out, filter, options)
            .await
    }

    async fn update<S: RecordSlot>(
        &mut self,
        collection: &str,
        record: S,
        filter: &Filter,
    ) -> DatabaseResult<()> {
        self.inner
            .write()
            .await
            .update(collection, record, filter)
            .await
    }

    async fn upsert<S: RecordSlot>(
        &mut self,
        collection: &str,
        record: S,
        filter: &Filter,
    ) -> DatabaseResult<()> {
        self.inner
            .write()
            .await
            .upsert(collection, record, filter)
            .await
    }

    async fn delete(&mut self, collection: &str, filter: &Filter) -> DatabaseResult<()> {
        self.inner
            .write()
            .await
            .delete(collection, filter)
            .await
    }

    async fn search<S: RecordSlot>(
        &self,
        collection: &str,
        term: &str,
        fields: &[&str],
        out: &mut Vec<S>,
    ) -> DatabaseResult<()> {
        self.inner
            .read()
            .await
            .search(collection, term, fields, out)
            .await
    }
}
