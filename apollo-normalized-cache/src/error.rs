//! Cache errors.
use displaydoc::Display;
use thiserror::Error;

/// Errors raised while preparing a query document for the cache.
///
/// Missing data is never an error: normalization stores `null` for absent values and
/// denormalization reports unresolved data through [`crate::Denormalized::partial`].
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidDocument {
    /// parsing error: {0}
    ParsingError(String),
    /// the document does not contain any operation
    NoOperation,
    /// unknown operation named "{0}"
    UnknownOperation(String),
    /// the document contains several operations, an operation name is required
    OperationNameRequired,
    /// unknown fragment named "{0}"
    UnknownFragment(String),
    /// selection processing recursion limit exceeded
    RecursionLimitExceeded,
}

/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// {message}: {error}
    InvalidConfiguration {
        message: &'static str,
        error: String,
    },
}
