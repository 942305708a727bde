//! Core types of minimongo, an in-memory stand-in for a document database.
//!
//! This crate provides:
//!
//! - **Records** ([`record`]) - the `Record` trait, the cached per-type field table and type-erased records
//! - **Values** ([`value`]) - the tagged `Value` every field is read as
//! - **Queries** ([`query`]) - equality filters and skip/limit/sort options
//! - **Database contract** ([`backend`]) - the `Database` trait shared by all backends
//! - **Shared access** ([`shared`]) - a lock-guarded, cloneable database handle
//! - **Error handling** ([`error`]) - error and result types
//!
//! # Example
//!
//! ```ignore
//! use minimongo_core::{filter, query::Options};
//! use minimongo_macros::Record;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Record)]
//! pub struct User {
//!     pub name: String,
//!     pub age: i32,
//! }
//!
//! let adults = filter! { "age" => 18 };
//! let page = Options::new().skip(20).limit(10).sort("name", 1);
//! ```

#[allow(unused_extern_crates)]
extern crate self as minimongo_core;

pub mod backend;
pub mod error;
pub mod query;
pub mod record;
pub mod shared;
pub mod value;
