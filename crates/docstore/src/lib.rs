//! Document CRUD and filtered search over a key-value bucket with a
//! secondary query index.
//!
//! The store itself is an opaque client (point get/insert/replace/remove
//! plus a parameterized read-statement language); this crate supplies the
//! layer applications talk to:
//!
//! - **[`DocumentService`]**: `find`, `get`, `create`, `update`, `patch`,
//!   `remove` over one collection, with the collection discriminator and id
//!   field managed for the caller.
//! - **Query compilation**: a dynamically shaped filter object (field
//!   predicates, `$or`, `$sort`, `$limit`/`$skip`, `$select`,
//!   `$consistency`) is compiled into one statement whose predicate values
//!   are all positional bound parameters.
//! - **Pagination**: a per-collection default/max policy, clamped before
//!   the statement executes, with a `{total, limit, skip, data}` envelope.
//!
//! # Example
//!
//! ```ignore
//! use docstore::{DocumentService, Params, ServiceOptions};
//! use serde_json::json;
//!
//! let service = DocumentService::new(client, ServiceOptions::new("app", "messages"));
//!
//! let created = service.create(json!({ "text": "hi", "roomId": 5 }), None).await?;
//! let found = service
//!     .find(Some(Params::with_query(json!({
//!         "roomId": 5,
//!         "$sort": { "createdAt": -1 },
//!         "$limit": 20
//!     }))))
//!     .await?;
//! ```
//!
//! Field and key names are concatenated into statement text verbatim; only
//! predicate values are parameterized. Keep field names out of untrusted
//! hands.

pub mod consistency;
pub mod error;
pub mod key;
pub mod pagination;
pub mod query;
pub mod service;
pub mod store;

pub use consistency::{ConsistencyLevel, ScanConsistency};
pub use error::{Error, Result};
pub use key::KeyCodec;
pub use pagination::{FindResult, Page, Paginate};
pub use query::{interpret, CompiledStatement, Directives, Interpretation};
pub use service::{DocumentService, Params, ServiceOptions};
pub use store::mem::MemStore;
pub use store::{QueryMeta, QueryOutput, StoreClient, StoreError};
