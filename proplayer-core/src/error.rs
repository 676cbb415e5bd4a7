//! Error types and result types for document facade operations.
//!
//! Every failure a request can hit maps onto exactly one [`ProplayerError`] variant,
//! and every variant is terminal for the request. Use [`ProplayerResult<T>`] as the
//! return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur while serving a document request.
#[derive(Error, Debug)]
pub enum ProplayerError {
    /// The caller identity credential was missing, invalid or could not be resolved.
    #[error("Unauthorized: {0}")]
    Auth(String),
    /// The resource address could not be parsed.
    #[error("Invalid path: {0}")]
    Path(String),
    /// A list query parameter (limit, filter) was malformed.
    #[error("Invalid query: {0}")]
    Query(String),
    /// The requested entity does not exist.
    /// `kind` is the tenant-qualified storage kind.
    #[error("Entity {id} not found in {kind}")]
    NotFound { kind: String, id: i64 },
    /// The request body was not a JSON object, or held a value the codec cannot represent.
    #[error("Encoding error: {0}")]
    Encoding(String),
    /// An error occurred in the underlying property store.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl ProplayerError {
    pub fn not_found(kind: impl Into<String>, id: i64) -> Self {
        ProplayerError::NotFound { kind: kind.into(), id }
    }
}

/// A specialized `Result` type for facade operations.
pub type ProplayerResult<T> = Result<T, ProplayerError>;

impl From<SerdeJsonError> for ProplayerError {
    fn from(err: SerdeJsonError) -> Self {
        ProplayerError::Encoding(err.to_string())
    }
}

impl From<BsonError> for ProplayerError {
    fn from(err: BsonError) -> Self {
        ProplayerError::Backend(err.to_string())
    }
}
