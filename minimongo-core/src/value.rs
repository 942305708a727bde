//! Tagged field values.
//!
//! Records never expose their fields as concrete Rust types to the query engine.
//! Every field is read through its [`FieldValue`] implementation, which produces a
//! [`Value`]: a small variant that keeps both the logical kind of the value
//! (integer, string, timestamp, ...) and, for integers, the original width so that
//! "same representation" can be told apart from "same number".
//!
//! Filter values are `Value<'static>` and are usually built through the `From`
//! conversions in this module:
//!
//! ```ignore
//! use minimongo_core::value::Value;
//!
//! let by_name: Value = "Alice".into();
//! let by_age: Value = 42i32.into();
//! ```

use std::{borrow::Cow, fmt, sync::Arc};

use bson::{Bson, DateTime as BsonDateTime, ser::serialize_to_bson};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The declared width and signedness of an integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
}

/// A field value as seen by the query engine.
///
/// Deriving `PartialEq` gives exactly the "identical representation" equality:
/// `Int(5, I32)` and `Int(5, I64)` are different values here, and it is up to the
/// comparator to decide that they are numerically equal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// A missing optional value.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer of any width up to 64 bits (and `i128`), widened to `i128`.
    Int(i128, IntKind),
    /// A floating point number.
    Float(f64),
    /// A string, borrowed from the record whenever possible.
    String(Cow<'a, str>),
    /// A wall-clock time.
    DateTime(DateTime<Utc>),
    /// A structured timestamp (BSON date-time).
    Timestamp(BsonDateTime),
    /// Anything else, held in its BSON form.
    Other(Bson),
}

impl<'a> Value<'a> {
    /// Returns a short name of the value's representational type, for logs and errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_, kind) => match kind {
                IntKind::I8 => "i8",
                IntKind::I16 => "i16",
                IntKind::I32 => "i32",
                IntKind::I64 => "i64",
                IntKind::I128 => "i128",
                IntKind::Isize => "isize",
                IntKind::U8 => "u8",
                IntKind::U16 => "u16",
                IntKind::U32 => "u32",
                IntKind::U64 => "u64",
                IntKind::Usize => "usize",
            },
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Timestamp(_) => "timestamp",
            Value::Other(_) => "other",
        }
    }

    /// Returns `true` for values that carry no information for ordering:
    /// `Null` and the zero timestamp (the Unix epoch, which is what `Default` yields).
    pub fn is_unset(&self) -> bool {
        match self {
            Value::Null => true,
            Value::DateTime(dt) => *dt == DateTime::<Utc>::UNIX_EPOCH,
            Value::Timestamp(ts) => ts.timestamp_millis() == 0,
            _ => false,
        }
    }

    /// Returns the string content if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Returns the point in time for either timestamp representation.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::Timestamp(ts) => Some(ts.to_chrono()),
            _ => None,
        }
    }

    /// Detaches the value from the record it was read from.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(b),
            Value::Int(i, kind) => Value::Int(i, kind),
            Value::Float(f) => Value::Float(f),
            Value::String(s) => Value::String(Cow::Owned(s.into_owned())),
            Value::DateTime(dt) => Value::DateTime(dt),
            Value::Timestamp(ts) => Value::Timestamp(ts),
            Value::Other(b) => Value::Other(b),
        }
    }

    /// Converts the value into its BSON form, as a real document database would store it.
    ///
    /// Integers narrower than 64 bits become `Int32`, wider ones `Int64`; an `i128`
    /// or `u64` that does not fit into `i64` falls back to `Double`.
    pub fn to_bson(&self) -> Bson {
        match self {
            Value::Null => Bson::Null,
            Value::Bool(b) => Bson::Boolean(*b),
            Value::Int(i, kind) => match kind {
                IntKind::I8 | IntKind::I16 | IntKind::I32 | IntKind::U8 | IntKind::U16 => {
                    Bson::Int32(*i as i32)
                }
                _ => match i64::try_from(*i) {
                    Ok(i) => Bson::Int64(i),
                    Err(_) => Bson::Double(*i as f64),
                },
            },
            Value::Float(f) => Bson::Double(*f),
            Value::String(s) => Bson::String(s.to_string()),
            Value::DateTime(dt) => Bson::DateTime(BsonDateTime::from_chrono(*dt)),
            Value::Timestamp(ts) => Bson::DateTime(*ts),
            Value::Other(b) => b.clone(),
        }
    }
}

/// String form used by text search: strings as-is, scalars through their usual
/// formatting, timestamps as RFC 3339 and `Null` as the empty string.
impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i, _) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
            Value::Timestamp(ts) => f.write_str(&ts.to_chrono().to_rfc3339()),
            Value::Other(b) => write!(f, "{}", b),
        }
    }
}

macro_rules! int_value {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value<'static> {
                fn from(value: $ty) -> Self {
                    Value::Int(value as i128, IntKind::$kind)
                }
            }

            impl FieldValue for $ty {
                fn to_value(&self) -> Value<'_> {
                    Value::Int(*self as i128, IntKind::$kind)
                }
            }
        )*
    };
}

int_value! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
}

impl From<bool> for Value<'static> {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value<'static> {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value<'static> {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Value::String(Cow::Borrowed(value))
    }
}

impl From<String> for Value<'static> {
    fn from(value: String) -> Self {
        Value::String(Cow::Owned(value))
    }
}

impl From<DateTime<Utc>> for Value<'static> {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl From<BsonDateTime> for Value<'static> {
    fn from(value: BsonDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Bson> for Value<'static> {
    fn from(value: Bson) -> Self {
        match value {
            Bson::Null => Value::Null,
            Bson::Boolean(b) => Value::Bool(b),
            Bson::Int32(i) => Value::Int(i as i128, IntKind::I32),
            Bson::Int64(i) => Value::Int(i as i128, IntKind::I64),
            Bson::Double(f) => Value::Float(f),
            Bson::String(s) => Value::String(Cow::Owned(s)),
            Bson::DateTime(ts) => Value::Timestamp(ts),
            other => Value::Other(other),
        }
    }
}

impl<T> From<Option<T>> for Value<'static>
where
    T: Into<Value<'static>>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Conversion of a record field into a [`Value`].
///
/// Implemented for the integer types, `bool`, floats, `String`, `chrono::DateTime<Utc>`,
/// `bson::DateTime`, `bson::Bson`, and transparently through `Option`, `Box` and `Arc`.
/// Fields of any other type can be annotated with `#[record(serde)]`, which reads them
/// through [`serialized`].
pub trait FieldValue {
    /// Reads the field as a [`Value`], borrowing from `self` where possible.
    fn to_value(&self) -> Value<'_>;
}

impl FieldValue for bool {
    fn to_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl FieldValue for f32 {
    fn to_value(&self) -> Value<'_> {
        Value::Float(*self as f64)
    }
}

impl FieldValue for f64 {
    fn to_value(&self) -> Value<'_> {
        Value::Float(*self)
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value<'_> {
        Value::String(Cow::Borrowed(self.as_str()))
    }
}

impl FieldValue for str {
    fn to_value(&self) -> Value<'_> {
        Value::String(Cow::Borrowed(self))
    }
}

impl FieldValue for DateTime<Utc> {
    fn to_value(&self) -> Value<'_> {
        Value::DateTime(*self)
    }
}

impl FieldValue for BsonDateTime {
    fn to_value(&self) -> Value<'_> {
        Value::Timestamp(*self)
    }
}

impl FieldValue for Bson {
    fn to_value(&self) -> Value<'_> {
        Value::from(self.clone())
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value<'_> {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FieldValue + ?Sized> FieldValue for Box<T> {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

impl<T: FieldValue + ?Sized> FieldValue for Arc<T> {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

/// Reads an arbitrary serializable field as [`Value::Other`].
///
/// Used by `#[record(serde)]` fields. A value that fails to serialize reads as
/// [`Value::Null`] and therefore never matches a filter.
pub fn serialized<T: Serialize + ?Sized>(field: &T) -> Value<'static> {
    match serialize_to_bson(field) {
        Ok(bson) => Value::Other(bson),
        Err(err) => {
            log::warn!("Failed to serialize field value: {}", err);
            Value::Null
        }
    }
}
