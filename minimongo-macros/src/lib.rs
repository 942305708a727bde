//! Procedural macros for the minimongo project.
//!
//! # `Record`
//!
//! Derives `minimongo_core::record::Record` (and the plain-value `RecordSlot`) for a
//! struct with named fields. The generated `field_table()` builds the type's field
//! accessor table on first use and caches it in a static.
//!
//! Field attributes:
//!
//! - `#[record(skip)]` leaves the field out of the table, so filters on it never match
//! - `#[record(serde)]` reads the field through serde instead of `FieldValue`, for
//!   nested structs and other types without a `FieldValue` impl
//!
//! Container attribute:
//!
//! - `#[record(crate = "path")]` overrides the path to `minimongo_core` in the
//!   generated code (default `::minimongo_core`)
//!
//! ```ignore
//! use minimongo_macros::Record;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Record)]
//! pub struct Article {
//!     pub title: String,
//!     pub views: u64,
//!     #[record(serde)]
//!     pub author: Author,
//! }
//! ```
//!
//! Generic structs are rejected: the cached table is a per-type static.

#[allow(unused_extern_crates)]
extern crate self as minimongo_macros;

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, Data, DeriveInput};

use crate::record::generate_record_for_struct;

/// Derives `Record` for a struct with named fields.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_record_for_struct(&ast, data) {
            Ok(token_stream) => token_stream.into(),
            Err(e) => e.to_compile_error().into(),
        },
        Data::Enum(_) => syn::Error::new_spanned(
            &ast,
            "Cannot derive Record for enums. Only structs with named fields are supported.",
        )
        .to_compile_error()
        .into(),
        Data::Union(_) => syn::Error::new_spanned(
            &ast,
            "Cannot derive Record for unions. Only structs with named fields are supported.",
        )
        .to_compile_error()
        .into(),
    }
}
