//! Error types and result types for database operations.
//!
//! Every operation of the [`Database`](crate::backend::Database) contract returns a
//! [`DatabaseResult<T>`]. Errors fall into three groups:
//!
//! - caller-contract violations ([`DatabaseError::EmptyArgument`], [`DatabaseError::TypeMismatch`]),
//! - "not found" conditions ([`DatabaseError::CollectionNotFound`], [`DatabaseError::NoDocumentsFound`]),
//! - backend and conversion failures.
//!
//! Nothing is retried. Use [`DatabaseError::is_not_found`] and
//! [`DatabaseError::is_invalid_argument`] to tell the groups apart.

use bson::error::Error as BsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a database.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// A required argument was blank: the collection name, the filter or the record.
    #[error("{0} cannot be empty")]
    EmptyArgument(&'static str),
    /// The requested collection does not exist in the store.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    /// No record in the collection matched the filter.
    #[error("No documents found in collection {0}")]
    NoDocumentsFound(String),
    /// A stored record could not be written into the caller's output container
    /// because its type differs from the container's record type.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The record type the output container holds.
        expected: &'static str,
        /// The type of the stored record.
        found: &'static str,
    },
    /// Serialization/deserialization error when converting records to or from BSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during backend initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl DatabaseError {
    /// Returns `true` for the "nothing there" family: missing collection or no matching record.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DatabaseError::CollectionNotFound(_) | DatabaseError::NoDocumentsFound(_)
        )
    }

    /// Returns `true` when the caller passed arguments the operation can never accept.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            DatabaseError::EmptyArgument(_) | DatabaseError::TypeMismatch { .. }
        )
    }
}

/// A specialized `Result` type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

impl From<BsonError> for DatabaseError {
    fn from(err: BsonError) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert!(DatabaseError::CollectionNotFound("users".into()).is_not_found());
        assert!(DatabaseError::NoDocumentsFound("users".into()).is_not_found());
        assert!(!DatabaseError::EmptyArgument("filter").is_not_found());

        assert!(DatabaseError::EmptyArgument("collection").is_invalid_argument());
        assert!(
            DatabaseError::TypeMismatch { expected: "A", found: "B" }.is_invalid_argument()
        );
        assert!(!DatabaseError::Backend("boom".into()).is_invalid_argument());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DatabaseError::EmptyArgument("collection").to_string(),
            "collection cannot be empty"
        );
        assert_eq!(
            DatabaseError::NoDocumentsFound("foo".into()).to_string(),
            "No documents found in collection foo"
        );
    }
}
