//! Records and dynamic field access.
//!
//! A record is any struct the store keeps in a collection. The query engine never
//! sees the concrete type: it reads fields by *logical key* through a per-type
//! [`FieldTable`], built once and cached, that maps the normalized field name to an
//! accessor pair. Key normalization lower-cases and strips underscores, so
//! `"user_name"`, `"UserName"` and `"username"` all resolve to the same field.
//!
//! The table is normally generated by `#[derive(Record)]`:
//!
//! ```ignore
//! use minimongo::prelude::*;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Record)]
//! pub struct User {
//!     pub user_name: String,
//!     pub age: i32,
//! }
//!
//! let user = User { user_name: "alice".into(), age: 30 };
//! assert_eq!(user.field("UserName").unwrap().as_str(), Some("alice"));
//! ```
//!
//! Two fields whose names collide after normalization are not supported; the
//! first declared field wins.

use std::{any::Any, collections::HashMap, fmt::Debug, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};

use crate::value::Value;

/// Normalizes a logical field key: lower-case, underscores removed.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Reads one field of `R` as a [`Value`].
pub type FieldGetter<R> = for<'r> fn(&'r R) -> Value<'r>;

/// Exposes one field of `R` for in-place writes.
pub type FieldGetterMut<R> = fn(&mut R) -> &mut dyn Any;

/// Getter/setter pair for a single named field of a record type.
pub struct FieldAccessor<R> {
    name: &'static str,
    get: FieldGetter<R>,
    get_mut: FieldGetterMut<R>,
}

impl<R> FieldAccessor<R> {
    /// Creates an accessor for the field declared as `name`.
    pub fn new(name: &'static str, get: FieldGetter<R>, get_mut: FieldGetterMut<R>) -> Self {
        Self { name, get, get_mut }
    }

    /// The field's declared name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Reads the field of `record`.
    pub fn get<'r>(&self, record: &'r R) -> Value<'r> {
        (self.get)(record)
    }

    /// Borrows the field of `record` for writing.
    pub fn get_mut<'r>(&self, record: &'r mut R) -> &'r mut dyn Any {
        (self.get_mut)(record)
    }
}

impl<R> Debug for FieldAccessor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("name", &self.name)
            .finish()
    }
}

/// The field-accessor registry of one record type.
#[derive(Debug)]
pub struct FieldTable<R> {
    fields: Vec<FieldAccessor<R>>,
    index: HashMap<String, usize>,
}

impl<R> FieldTable<R> {
    /// Builds the table, indexing every accessor by its normalized name.
    pub fn new(fields: Vec<FieldAccessor<R>>) -> Self {
        let mut index = HashMap::with_capacity(fields.len());

        for (position, field) in fields.iter().enumerate() {
            index
                .entry(normalize_key(field.name))
                .or_insert(position);
        }

        Self { fields, index }
    }

    /// Finds the accessor for a logical key, or `None` if the record type has no such field.
    pub fn resolve(&self, key: &str) -> Option<&FieldAccessor<R>> {
        self.index
            .get(&normalize_key(key))
            .map(|position| &self.fields[*position])
    }

    /// Reads the field of `record` named by the logical `key`.
    pub fn get<'r>(&self, record: &'r R, key: &str) -> Option<Value<'r>> {
        self.resolve(key).map(|field| field.get(record))
    }

    /// Borrows the field of `record` named by the logical `key` for writing.
    pub fn get_mut<'r>(&self, record: &'r mut R, key: &str) -> Option<&'r mut dyn Any> {
        self.resolve(key).map(|field| field.get_mut(record))
    }

    /// Declared field names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    /// Number of resolvable fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record type exposes no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Core trait for every type that can be stored in a collection.
///
/// Use `#[derive(Record)]` rather than implementing it by hand. The serde bounds
/// let the same types be stored by a real document database adapter.
pub trait Record:
    Serialize + DeserializeOwned + Clone + Debug + Send + Sync + Unpin + 'static
{
    /// Returns the cached field table of this type.
    fn field_table() -> &'static FieldTable<Self>;

    /// Reads a field by logical key.
    fn field(&self, key: &str) -> Option<Value<'_>> {
        Self::field_table().get(self, key)
    }

    /// Borrows a field by logical key for writing. Downcast the result to the field's type.
    fn field_mut(&mut self, key: &str) -> Option<&mut dyn Any> {
        Self::field_table().get_mut(self, key)
    }
}

/// Type-erased record, the form in which the store keeps records.
///
/// A collection may hold records of several types; the engine only ever asks a
/// record for fields by key and, when handing results back, downcasts to the type
/// the caller asked for.
pub trait AnyRecord: Send + Sync + Debug {
    /// Reads a field by logical key.
    fn record_field(&self, key: &str) -> Option<Value<'_>>;

    /// Borrows a field by logical key for writing.
    fn record_field_mut(&mut self, key: &str) -> Option<&mut dyn Any>;

    /// Name of the concrete record type.
    fn record_type_name(&self) -> &'static str;

    /// Returns `self` as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns `self` as mutable `Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Clones the record behind the trait object.
    fn clone_box(&self) -> Box<dyn AnyRecord>;
}

impl<'a> dyn AnyRecord + 'a {
    /// Attempts to downcast to a specific record type.
    pub fn downcast_ref<R: Record>(&self) -> Option<&R> {
        self.as_any().downcast_ref::<R>()
    }

    /// Attempts to downcast to a specific record type, mutably.
    pub fn downcast_mut<R: Record>(&mut self) -> Option<&mut R> {
        self.as_any_mut().downcast_mut::<R>()
    }

    /// Returns `true` if the record is of type `R`.
    pub fn is<R: Record>(&self) -> bool {
        self.as_any().is::<R>()
    }

    /// Overwrites a field by logical key.
    ///
    /// Returns `false` if the key does not resolve or `value` is not of the field's type.
    pub fn set_field<T: Any>(&mut self, key: &str, value: T) -> bool {
        match self
            .record_field_mut(key)
            .and_then(|field| field.downcast_mut::<T>())
        {
            Some(field) => {
                *field = value;
                true
            }
            None => false,
        }
    }
}

impl<R: Record> AnyRecord for R {
    fn record_field(&self, key: &str) -> Option<Value<'_>> {
        self.field(key)
    }

    fn record_field_mut(&mut self, key: &str) -> Option<&mut dyn Any> {
        self.field_mut(key)
    }

    fn record_type_name(&self) -> &'static str {
        std::any::type_name::<R>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn AnyRecord> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn AnyRecord> {
    fn clone(&self) -> Box<dyn AnyRecord> {
        self.clone_box()
    }
}

/// A place a record can be moved into or out of: the element kind of an output
/// container, or the argument of a write.
///
/// Implemented for `Box<R>`, `Arc<R>` and `Option<R>` here, and for `R` itself by
/// `#[derive(Record)]`. Reads wrap each result in the slot's kind, so
/// `Vec<R>` receives values and `Vec<Box<R>>` receives boxes. Writes unwrap one
/// level, so a stored record is always a plain value; an empty `Option` is the
/// absent record.
pub trait RecordSlot: Send + Sync + 'static {
    /// The record type held by the slot.
    type Record: Record;

    /// Wraps a record read from the store.
    fn from_record(record: Self::Record) -> Self;

    /// Unwraps the record to store, or `None` for an absent record.
    fn into_record(self) -> Option<Self::Record>;
}

impl<R: Record> RecordSlot for Box<R> {
    type Record = R;

    fn from_record(record: R) -> Self {
        Box::new(record)
    }

    fn into_record(self) -> Option<R> {
        Some(*self)
    }
}

impl<R: Record> RecordSlot for Arc<R> {
    type Record = R;

    fn from_record(record: R) -> Self {
        Arc::new(record)
    }

    fn into_record(self) -> Option<R> {
        Some(Arc::unwrap_or_clone(self))
    }
}

impl<R: Record> RecordSlot for Option<R> {
    type Record = R;

    fn from_record(record: R) -> Self {
        Some(record)
    }

    fn into_record(self) -> Option<R> {
        self
    }
}
