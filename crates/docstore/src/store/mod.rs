pub mod mem;

use async_trait::async_trait;
use serde_json::Value as Json;
use thiserror::Error;

use crate::consistency::ScanConsistency;

/// Errors surfaced by a store client. Only `KeyNotFound` is interpreted by
/// the service layer; everything else passes through to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The key has no corresponding document.
    #[error("key not found")]
    KeyNotFound,

    /// An insert targeted a key that already holds a document.
    #[error("key already exists")]
    KeyExists,

    /// Anything else the store reports: network failure, statement syntax
    /// error, authorization failure.
    #[error("store error: {0}")]
    Backend(String),
}

/// Metadata accompanying a read statement's rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMeta {
    /// Total count available for the executed statement.
    pub result_count: u64,
}

/// Result of executing a read statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    pub rows: Vec<Json>,
    pub meta: QueryMeta,
}

/// Opaque document store client: point operations keyed by string plus a
/// parameterized read statement evaluated over a secondary index.
///
/// Always injected at service construction; no default implementation is
/// ever resolved implicitly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Fetch the document at `key`.
    async fn get(&self, key: &str) -> Result<Json, StoreError>;

    /// Store a new document at `key`; fails if the key exists.
    async fn insert(&self, key: &str, entity: &Json) -> Result<(), StoreError>;

    /// Overwrite the document at `key`; fails if the key is absent.
    async fn replace(&self, key: &str, entity: &Json) -> Result<(), StoreError>;

    /// Delete the document at `key`.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Execute a read statement with positional parameters at the given
    /// scan consistency.
    async fn query(
        &self,
        statement: &str,
        params: &[Json],
        consistency: ScanConsistency,
    ) -> Result<QueryOutput, StoreError>;
}
