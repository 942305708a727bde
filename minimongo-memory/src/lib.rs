//! In-memory backend for minimongo.
//!
//! This crate provides [`MemoryDb`], an implementation of the `Database` trait
//! that keeps typed records in ordered, named collections. It is meant to stand in
//! for a real document database in tests.
//!
//! # Features
//!
//! - **Equality filters** - loose, width-agnostic integer equality on normalized field keys
//! - **Type-aware sorting** - stable sort over integers, strings and timestamps
//! - **Pagination** - skip and limit, window-then-sort or sort-first ([`PaginationOrder`])
//! - **Substring search** - case-insensitive, across several fields
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
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut db = MemoryDb::builder().build().await?;
//!     db.insert("users", User { name: "Alice".into(), age: 30 }).await?;
//!
//!     let mut users: Vec<User> = Vec::new();
//!     db.find_all("users", &mut users, None, Some(&Options::new().sort("age", 1))).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as minimongo_memory;

pub mod evaluator;
mod sort;
pub mod store;

pub use store::{MemoryDb, MemoryDbBuilder, PaginationOrder};
