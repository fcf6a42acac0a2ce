//! Error types for enlist records and queries.

/// Errors raised when reading a typed value out of a schema-free record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The field is not present in the record.
    #[error("field not found: {field}")]
    Missing {
        /// The (possibly dotted) field path.
        field: String,
    },

    /// The field is present but holds a value of another type.
    #[error("field {field} is not a {expected}")]
    WrongType {
        /// The (possibly dotted) field path.
        field: String,
        /// The expected JSON type.
        expected: &'static str,
    },

    /// A value meant to become a record did not serialize to a JSON object.
    #[error("record data must be an object")]
    NotAnObject,

    /// The record could not be decoded into (or encoded from) a typed value.
    #[error("record decode error: {0}")]
    Decode(String),
}

/// Errors raised when building a query filter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The comparison operator is not one of `==`, `!=`, `<`, `<=`, `>`, `>=`.
    #[error("unsupported query operator: {0}")]
    UnknownOperator(String),

    /// The field path is empty.
    #[error("query field must not be empty")]
    EmptyField,
}
