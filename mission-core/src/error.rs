//! Error types for Mission Control operations

use crate::Collection;
use thiserror::Error;

/// Caller-side errors: a required argument is missing or a value is unrecognized.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Ambiguous {collection} reference '{input}': matches {}", .matches.join(", "))]
    AmbiguousReference {
        collection: Collection,
        input: String,
        matches: Vec<String>,
    },

    #[error("An agent named '{name}' already exists")]
    DuplicateName { name: String },
}

/// An identifier, fragment or name did not resolve to a stored record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("{} not found: {id}", .collection.label())]
    Record { collection: Collection, id: String },

    #[error("{} not found: {fragment}", .collection.label())]
    Fragment {
        collection: Collection,
        fragment: String,
    },

    #[error("agent not found: {name}")]
    AgentName { name: String },

    #[error("calendar entry not found: {title}")]
    CalendarTitle { title: String },
}

/// The underlying store call failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store transport failed: {message}")]
    Transport { message: String },

    #[error("Store request failed ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Store error: {message}")]
    Remote { message: String },

    #[error("Store IO failed: {message}")]
    Io { message: String },

    #[error("Store data is corrupt: {reason}")]
    Corrupt { reason: String },

    #[error("Unknown index {index} on {collection}")]
    UnknownIndex { collection: Collection, index: String },

    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization {
            reason: err.to_string(),
        }
    }
}

/// Master error type for all Mission Control errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MissionError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl MissionError {
    /// Shorthand for a missing record by identifier.
    pub fn record_not_found(collection: Collection, id: impl Into<String>) -> Self {
        MissionError::NotFound(NotFoundError::Record {
            collection,
            id: id.into(),
        })
    }

    /// Shorthand for a missing required argument.
    pub fn required(field: impl Into<String>) -> Self {
        MissionError::Validation(ValidationError::RequiredFieldMissing {
            field: field.into(),
        })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MissionError::NotFound(_))
    }
}

impl From<serde_json::Error> for MissionError {
    fn from(err: serde_json::Error) -> Self {
        MissionError::Store(err.into())
    }
}

/// Result type alias for Mission Control operations.
pub type MissionResult<T> = Result<T, MissionError>;

// =============================================================================
// TESTS
// =============================================================================
