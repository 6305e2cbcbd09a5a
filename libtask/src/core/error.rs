//! Objects related to reporting errors from this library

/// A list of error types that can occur within this library
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("can't insert the object, it already exists in the database with id = {}", .0)]
    InvalidInsertObjectAlreadyExists(i64),

    #[error("validation failed for '{collection}': missing required field(s) {}", .missing.join(", "))]
    Validation {
        /// The collection the rejected document was meant for
        collection: &'static str,
        /// Required fields that were absent or empty, in declaration order
        missing: Vec<&'static str>,
    },

    #[error(transparent)]
    DatabaseError(#[from] sqlx::Error),

    #[error(transparent)]
    DatabaseMigrationError(#[from] sqlx::migrate::MigrateError),
}

/// A convenience type alias for a [Result] with [Error] as its error type
pub type Result<T, E = Error> = std::result::Result<T, E>;
