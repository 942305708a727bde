use async_trait::async_trait;
use bson::{Document, doc};
use futures::TryStreamExt;
use log::debug;
use mongodb::{Client, Collection as MongoCollection, options::ClientOptions};

use minimongo_core::{
    backend::{Database, DatabaseBuilder},
    error::{DatabaseError, DatabaseResult},
    query::{Filter, Options},
    record::RecordSlot,
};

use crate::query::{find_one_options, find_options, search_filter, to_document};

/// [`Database`] implementation over a MongoDB deployment.
///
/// Records are stored as their serde form, one MongoDB collection per
/// collection name. Writes act on the first match, like the in-memory store.
#[derive(Debug, Clone)]
pub struct MongoDb {
    client: Client,
    database: String,
}

impl MongoDb {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbBuilder {
        MongoDbBuilder::new(dsn, database)
    }

    fn collection<T: Send + Sync>(&self, collection: &str) -> DatabaseResult<MongoCollection<T>> {
        if collection.is_empty() {
            return Err(DatabaseError::EmptyArgument("collection"));
        }

        Ok(self.client.database(&self.database).collection(collection))
    }

    fn write_filter(filter: &Filter) -> DatabaseResult<Document> {
        if filter.is_empty() {
            return Err(DatabaseError::EmptyArgument("filter"));
        }

        Ok(to_document(Some(filter)))
    }
}

#[async_trait]
impl Database for MongoDb {
    /// Verifies the connection with a ping.
    async fn open(&mut self) -> DatabaseResult<()> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DatabaseError::Initialization(e.to_string()))?;

        debug!("Connected to MongoDB database {}", self.database);

        Ok(())
    }

    async fn close(&mut self) -> DatabaseResult<()> {
        debug!("Shutting down MongoDB client");
        self.client.clone().shutdown().await;

        Ok(())
    }

    async fn insert<S: RecordSlot>(&mut self, collection: &str, record: S) -> DatabaseResult<()> {
        let target = self.collection::<S::Record>(collection)?;
        let record = record
            .into_record()
            .ok_or(DatabaseError::EmptyArgument("record"))?;

        target
            .insert_one(record)
            .await
            .map_err(|e| DatabaseError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn find_one<S: RecordSlot>(
        &self,
        collection: &str,
        out: &mut S,
        filter: Option<&Filter>,
        options: Option<&Options>,
    ) -> DatabaseResult<()> {
        let found = self
            .collection::<S::Record>(collection)?
            .find_one(to_document(filter))
            .with_options(find_one_options(options))
            .await
            .map_err(|e| DatabaseError::Backend(e.to_string()))?;

        match found {
            Some(record) => {
                *out = S::from_record(record);
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
        let records = self
            .collection::<S::Record>(collection)?
            .find(to_document(filter))
            .with_options(find_options(options))
            .await
            .map_err(|e| DatabaseError::Backend(e.to_string()))?
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| DatabaseError::Backend(e.to_string()))?;

        out.clear();
        out.extend(records.into_iter().map(S::from_record));

        Ok(())
    }

    async fn update<S: RecordSlot>(
        &mut self,
        collection: &str,
        record: S,
        filter: &Filter,
    ) -> DatabaseResult<()> {
        let target = self.collection::<S::Record>(collection)?;
        let query = Self::write_filter(filter)?;
        let record = record
            .into_record()
            .ok_or(DatabaseError::EmptyArgument("record"))?;

        let result = target
            .replace_one(query, record)
            .await
            .map_err(|e| DatabaseError::Backend(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(DatabaseError::NoDocumentsFound(collection.to_string()));
        }

        Ok(())
    }

    async fn upsert<S: RecordSlot>(
        &mut self,
        collection: &str,
        record: S,
        filter: &Filter,
    ) -> DatabaseResult<()> {
        let target = self.collection::<S::Record>(collection)?;
        let query = Self::write_filter(filter)?;
        let record = record
            .into_record()
            .ok_or(DatabaseError::EmptyArgument("record"))?;

        target
            .replace_one(query, record)
            .upsert(true)
            .await
            .map_err(|e| DatabaseError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn delete(&mut self, collection: &str, filter: &Filter) -> DatabaseResult<()> {
        let target = self.collection::<Document>(collection)?;
        let query = Self::write_filter(filter)?;

        let result = target
            .delete_one(query)
            .await
            .map_err(|e| DatabaseError::Backend(e.to_string()))?;

        if result.deleted_count == 0 {
            return Err(DatabaseError::NoDocumentsFound(collection.to_string()));
        }

        Ok(())
    }

    async fn search<S: RecordSlot>(
        &self,
        collection: &str,
        term: &str,
        fields: &[&str],
        out: &mut Vec<S>,
    ) -> DatabaseResult<()> {
        let target = self.collection::<S::Record>(collection)?;

        let Some(query) = search_filter(term, fields) else {
            return Ok(());
        };

        let records = target
            .find(query)
            .await
            .map_err(|e| DatabaseError::Backend(e.to_string()))?
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| DatabaseError::Backend(e.to_string()))?;

        out.extend(records.into_iter().map(S::from_record));

        Ok(())
    }
}

/// Builder for [`MongoDb`], connecting with a connection string.
#[derive(Debug, Clone)]
pub struct MongoDbBuilder {
    dsn: String,
    database: String,
}

impl MongoDbBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl DatabaseBuilder for MongoDbBuilder {
    type Database = MongoDb;

    async fn build(self) -> DatabaseResult<Self::Database> {
        Ok(MongoDb::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| DatabaseError::Initialization(e.to_string()))?,
            )
            .map_err(|e| DatabaseError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}
