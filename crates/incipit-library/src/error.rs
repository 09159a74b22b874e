//! Error types for the library service and its collaborators.

use thiserror::Error;

/// Convenience alias for library results.
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Errors surfaced by the library service and its collaborators.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// A query failed shape validation.
    #[error("query error: {0}")]
    Query(#[from] incipit_core::QueryError),

    /// The catalogue source could not produce records.
    ///
    /// Recoverable: the service keeps its previous snapshot, or stays empty
    /// if it never had one.
    #[error("catalogue source unavailable ({source_name}): {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// The service worker has stopped; the instance must be recreated.
    #[error("library service unavailable")]
    ServiceUnavailable,

    /// An I/O error outside the catalogue source itself.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A catalogue record could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LibraryError {
    /// Returns `true` when the instance cannot recover and must be rebuilt.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ServiceUnavailable)
    }
}
