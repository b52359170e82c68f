//! Errors surfaced by the model layer.
//!
//! Nothing here is recovered from locally: construction and lifecycle
//! operations hand every failure back to the caller.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A timestamp field held text that is not ISO-8601.
    #[error("Invalid timestamp '{value}' for field '{field}': {source}")]
    Parse {
        field: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A timestamp field held something other than a string.
    #[error("Field '{field}' must be an ISO-8601 timestamp string")]
    TimestampType { field: String },

    /// A backend needs a field the entity does not carry.
    #[error("{class} is missing required field '{field}'")]
    MissingField { class: String, field: String },

    #[error("Unknown model class '{0}'")]
    UnknownClass(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}
