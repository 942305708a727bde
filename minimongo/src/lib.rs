//! Main minimongo crate: an in-memory stand-in for a document database.
//!
//! This crate is the primary entry point. It re-exports the core types, the
//! `Record` derive and the available backends, so application code can be written
//! against the [`Database`](backend::Database) trait and tested without a server.
//!
//! # Features
//!
//! - **Typed records** - `#[derive(Record)]` gives a struct a cached, name-addressable field table
//! - **Mongo-like reads** - equality filters, skip, limit and single-field sorting
//! - **First-match writes** - update, upsert and delete act on the first matching record
//! - **Substring search** - case-insensitive, OR-ed across fields
//! - **Swappable backends** - the same trait over the in-memory store and MongoDB
//!
//! # Quick Start
//!
//! ```ignore
//! use minimongo::{prelude::*, memory::MemoryDb};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Record)]
//! #[record(crate = "minimongo::minimongo_core")]
//! pub struct User {
//!     pub name: String,
//!     pub age: i32,
//! }
//!
//! #[tokio::main]
//! async fn main() -> DatabaseResult<()> {
//!     let mut db = MemoryDb::builder().build().await?;
//!     db.open().await?;
//!
//!     db.insert("users", User { name: "Alice".into(), age: 30 }).await?;
//!     db.insert("users", User { name: "Bob".into(), age: 25 }).await?;
//!
//!     // Everyone, youngest first
//!     let mut users: Vec<User> = Vec::new();
//!     db.find_all("users", &mut users, None, Some(&Options::new().sort("age", 1))).await?;
//!
//!     // Keys are matched case- and underscore-insensitively
//!     db.update("users", User { name: "Bob".into(), age: 26 }, &filter! { "Name" => "Bob" }).await?;
//!
//!     db.close().await
//! }
//! ```
//!
//! # Sharing
//!
//! Backends take `&mut self` for writes. To share one between tasks, wrap it in
//! [`SharedDatabase`](shared::SharedDatabase):
//!
//! ```ignore
//! let db = SharedDatabase::new(MemoryDb::new());
//! let mut writer = db.clone();
//! tokio::spawn(async move { writer.insert("users", user).await });
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - MongoDB backend (requires `mongodb` feature)

pub mod prelude;

pub use minimongo_core::{backend, error, filter, query, record, shared, value};

/// Path target for `#[record(crate = "minimongo::minimongo_core")]`.
pub use minimongo_core;
pub use minimongo_macros::Record;

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend.
pub mod memory {
    pub use minimongo_memory::{MemoryDb, MemoryDbBuilder, PaginationOrder, evaluator::Comparator};
}

/// MongoDB storage backend.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use minimongo_mongodb::{MongoDb, MongoDbBuilder};
}
