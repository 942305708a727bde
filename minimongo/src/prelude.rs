//! Convenient re-exports of commonly used types from minimongo.
//!
//! ```ignore
//! use minimongo::prelude::*;
//! ```
//!
//! This provides access to:
//! - The `Record` derive and record traits
//! - The database traits and the shared handle
//! - Filters, options and sort types
//! - Error types

pub use minimongo_core::{
    backend::{Database, DatabaseBuilder},
    error::{DatabaseError, DatabaseResult},
    filter,
    query::{Filter, Options, SortDirection, SortOption},
    record::{AnyRecord, Record, RecordSlot},
    shared::SharedDatabase,
    value::Value,
};
pub use minimongo_macros::Record;
