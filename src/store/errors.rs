//! # Store Errors
//!
//! Error types for the document store module.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A client-supplied value failed to parse as its target type
    #[error("invalid {path}: {value}")]
    Cast { path: String, value: String },

    /// A unique-field constraint was violated
    #[error("duplicate {field} value: {value}")]
    Duplicate { field: String, value: String },

    /// A document violated its declared rules
    #[error("validation failed: {}", .messages.join(". "))]
    Validation { messages: Vec<String> },

    /// No document with the requested id
    #[error("no {entity} with that id")]
    NotFound { entity: String },

    /// Storage-side failure
    #[error("store error: {0}")]
    Internal(String),
}
