//! MongoDB backend for minimongo.
//!
//! This crate implements the `Database` trait over the official MongoDB driver,
//! so code written and tested against the in-memory backend runs unchanged
//! against a real deployment.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! minimongo = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Differences from the in-memory backend
//!
//! - Filter and sort keys are used as given and must match the serialized field names
//! - Search uses a case-insensitive `$regex` per field instead of substring matching on
//!   formatted values, so only string fields can match
//! - Pagination follows the server: matches are sorted before skip and limit apply
//!
//! # Example
//!
//! ```ignore
//! use minimongo::{prelude::*, mongodb::MongoDb};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut db = MongoDb::builder("mongodb://localhost:27017", "my_database")
//!         .build()
//!         .await?;
//!     db.open().await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as minimongo_mongodb;

pub mod query;
pub mod store;

pub use store::{MongoDb, MongoDbBuilder};
