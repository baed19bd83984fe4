use serde_json::Value as Json;
use tracing::debug;

use crate::consistency;
use crate::error::{Error, Result};
use crate::key::KeyCodec;
use crate::pagination::{self, FindResult, Paginate};
use crate::query::{compile, parse_filter, ParsedFilter};
use crate::store::{StoreClient, StoreError};

/// Construction configuration for a [`DocumentService`].
///
/// Everything here is read-only after construction; the service takes no
/// locks and keeps no other state across calls.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Bucket the read statements select from.
    pub bucket: String,
    /// Collection name; doubles as the `_type` discriminator value.
    pub name: String,
    /// Storage-key separator between collection name and id.
    pub separator: String,
    /// Entity field holding the id.
    pub id_field: String,
    /// Pagination policy; absent means `find` returns bare sequences.
    pub paginate: Option<Paginate>,
}

impl ServiceOptions {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
            separator: "::".to_string(),
            id_field: "uuid".to_string(),
            paginate: None,
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    pub fn with_paginate(mut self, paginate: Paginate) -> Self {
        self.paginate = Some(paginate);
        self
    }
}

/// Per-call parameters. Point operations thread these through their internal
/// re-reads; only `find` consumes the fields.
#[derive(Debug, Clone, Default)]
pub struct Params {
    pub query: Option<Json>,
    /// Overrides the constructed pagination policy for this call.
    pub paginate: Option<Paginate>,
}

impl Params {
    pub fn with_query(query: Json) -> Self {
        Self {
            query: Some(query),
            ..Self::default()
        }
    }
}

/// CRUD and filtered search over one collection in a document store.
///
/// Point operations go straight to the store by derived key; `find` compiles
/// the filter into a parameterized read statement. No operation retries, and
/// nothing here is transactional: `patch` is get → merge → replace with no
/// concurrency token, so concurrent patches to one id race and the last
/// replace wins.
pub struct DocumentService<S> {
    store: S,
    bucket: String,
    name: String,
    keys: KeyCodec,
    paginate: Option<Paginate>,
}

impl<S: StoreClient> DocumentService<S> {
    pub fn new(store: S, options: ServiceOptions) -> Self {
        let keys = KeyCodec::new(&options.name, &options.separator, &options.id_field);
        Self {
            store,
            bucket: options.bucket,
            name: options.name,
            keys,
            paginate: options.paginate,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compile and execute a filtered search.
    pub async fn find(&self, params: Option<Params>) -> Result<FindResult> {
        let params = params.ok_or_else(|| Error::bad_request("find requires params"))?;
        let mut query = params
            .query
            .ok_or_else(|| Error::bad_request("find requires a query"))?;

        // Establish the collection scope on the filter itself. The compiler
        // emits the authoritative predicate either way.
        if let Some(obj) = query.as_object_mut() {
            obj.insert("_type".to_string(), Json::String(self.name.clone()));
        }

        let ParsedFilter {
            predicates,
            mut directives,
        } = parse_filter(&query)?;

        // Limit substitution and clamping happen before compilation so the
        // statement's LIMIT parameter carries the clamped value.
        let policy = params.paginate.or(self.paginate);
        if let Some(policy) = policy {
            directives.limit = Some(policy.clamp(directives.limit));
        }

        let statement = compile(&self.bucket, &self.name, &predicates, &directives);
        let consistency = consistency::resolve(directives.consistency);
        debug!(
            collection = %self.name,
            statement = statement.text(),
            consistency = ?consistency,
            "executing find"
        );

        let output = self
            .store
            .query(statement.text(), statement.params(), consistency)
            .await?;

        let rows = match &directives.select {
            Some(fields) => output
                .rows
                .into_iter()
                .map(|row| project(row, fields))
                .collect(),
            None => output.rows,
        };

        Ok(pagination::wrap(
            policy.as_ref(),
            &directives,
            output.meta.result_count,
            rows,
        ))
    }

    /// Fetch one entity by id.
    pub async fn get(&self, id: &str, _params: Option<Params>) -> Result<Json> {
        let key = self.keys.derive_key(id);
        match self.store.get(&key).await {
            Ok(Json::Null) => Err(Error::not_found(id)),
            Ok(entity) => Ok(entity),
            Err(StoreError::KeyNotFound) => Err(Error::not_found(id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Store a new entity, generating an id when the data lacks one.
    /// Resolves with a fresh read so the result matches a subsequent `get`.
    pub async fn create(&self, data: Json, params: Option<Params>) -> Result<Json> {
        let mut data = data;
        match data.as_object_mut() {
            Some(obj) => {
                obj.insert("_type".to_string(), Json::String(self.name.clone()));
            }
            None => return Err(Error::bad_request("create requires a data object")),
        }

        let id = self.keys.ensure_id(&mut data)?;
        let key = self.keys.derive_key(&id);
        debug!(collection = %self.name, key = %key, "inserting entity");
        self.store.insert(&key, &data).await?;

        self.get(&id, params).await
    }

    /// Full update shares the merge-then-replace path with `patch`.
    pub async fn update(&self, id: &str, data: Json, params: Option<Params>) -> Result<Json> {
        self.patch(id, data, params).await
    }

    /// Shallow-merge `data` over the stored entity and replace it.
    ///
    /// Read-modify-write with no concurrency token: concurrent patches to
    /// the same id race, and the losing write is silently discarded.
    pub async fn patch(&self, id: &str, data: Json, params: Option<Params>) -> Result<Json> {
        let patch = match data {
            Json::Object(map) => map,
            _ => return Err(Error::bad_request("patch requires a data object")),
        };

        let mut current = self.get(id, params.clone()).await?;
        let obj = current
            .as_object_mut()
            .ok_or_else(|| StoreError::Backend("stored entity is not an object".into()))?;
        for (field, value) in patch {
            obj.insert(field, value);
        }
        obj.insert("_type".to_string(), Json::String(self.name.clone()));

        let key = self.keys.derive_key(id);
        debug!(collection = %self.name, key = %key, "replacing entity");
        self.store.replace(&key, &current).await?;

        self.get(id, params).await
    }

    /// Delete one entity, resolving with it as read before deletion.
    pub async fn remove(&self, id: &str, params: Option<Params>) -> Result<Json> {
        // The read establishes existence: removing a missing id is NotFound
        // before any removal attempt reaches the store.
        let entity = self.get(id, params).await?;

        let key = self.keys.derive_key(id);
        debug!(collection = %self.name, key = %key, "removing entity");
        self.store.remove(&key).await?;
        Ok(entity)
    }
}

/// Project a row to exactly the selected fields; absent fields are omitted,
/// never defaulted. Non-object rows pass through untouched.
fn project(row: Json, fields: &[String]) -> Json {
    match row {
        Json::Object(mut map) => {
            let mut out = serde_json::Map::new();
            for field in fields {
                if let Some(value) = map.remove(field) {
                    out.insert(field.clone(), value);
                }
            }
            Json::Object(out)
        }
        other => other,
    }
}
