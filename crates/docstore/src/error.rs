use thiserror::Error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors this layer classifies itself, plus a transparent pass-through for
/// everything the store surfaces. Nothing here is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller supplied no params, no query, or no data where one is required.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The derived key has no corresponding entity.
    #[error("not found: {0}")]
    NotFound(String),

    /// A field's operator mapping contains a key the compiler cannot translate.
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// The filter has a shape the compiler cannot translate.
    #[error("malformed filter: {0}")]
    MalformedFilter(String),

    /// Anything else the store client reports, propagated unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    #[inline]
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Error::BadRequest(msg.into())
    }

    #[inline]
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    #[inline]
    pub fn unsupported_operator(msg: impl Into<String>) -> Self {
        Error::UnsupportedOperator(msg.into())
    }

    #[inline]
    pub fn malformed_filter(msg: impl Into<String>) -> Self {
        Error::MalformedFilter(msg.into())
    }
}
