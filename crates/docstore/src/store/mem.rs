use async_trait::async_trait;
use serde_json::Value as Json;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{QueryMeta, QueryOutput, StoreClient, StoreError};
use crate::consistency::ScanConsistency;

/// A read statement as the store received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub statement: String,
    pub params: Vec<Json>,
    pub consistency: ScanConsistency,
}

/// In-memory store.
///
/// Point operations are real and keyed by the full storage key. The query
/// path does not evaluate statement text: it serves a scripted result set
/// and records what was executed, which is what the integration tests need.
/// Primarily a reference implementation and test harness.
#[derive(Debug, Default)]
pub struct MemStore {
    docs: Mutex<HashMap<String, Json>>,
    query_rows: Mutex<Vec<Json>>,
    last_query: Mutex<Option<RecordedQuery>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows the next `query` calls will return.
    pub async fn script_query_rows(&self, rows: Vec<Json>) {
        *self.query_rows.lock().await = rows;
    }

    /// The most recently executed read statement, if any.
    pub async fn last_query(&self) -> Option<RecordedQuery> {
        self.last_query.lock().await.clone()
    }

    /// Peek at a stored document without going through the client trait.
    pub async fn doc(&self, key: &str) -> Option<Json> {
        self.docs.lock().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.docs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.lock().await.is_empty()
    }
}

#[async_trait]
impl StoreClient for MemStore {
    async fn get(&self, key: &str) -> Result<Json, StoreError> {
        self.docs
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or(StoreError::KeyNotFound)
    }

    async fn insert(&self, key: &str, entity: &Json) -> Result<(), StoreError> {
        let mut docs = self.docs.lock().await;
        if docs.contains_key(key) {
            return Err(StoreError::KeyExists);
        }
        docs.insert(key.to_string(), entity.clone());
        Ok(())
    }

    async fn replace(&self, key: &str, entity: &Json) -> Result<(), StoreError> {
        let mut docs = self.docs.lock().await;
        if !docs.contains_key(key) {
            return Err(StoreError::KeyNotFound);
        }
        docs.insert(key.to_string(), entity.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.docs
            .lock()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or(StoreError::KeyNotFound)
    }

    async fn query(
        &self,
        statement: &str,
        params: &[Json],
        consistency: ScanConsistency,
    ) -> Result<QueryOutput, StoreError> {
        *self.last_query.lock().await = Some(RecordedQuery {
            statement: statement.to_string(),
            params: params.to_vec(),
            consistency,
        });

        let rows = self.query_rows.lock().await.clone();
        let result_count = rows.len() as u64;
        Ok(QueryOutput {
            rows,
            meta: QueryMeta { result_count },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ─────────────────────────────────────────────────────────────
    // point operations
    // ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn get_missing_key_is_key_not_found() {
        let store = MemStore::new();
        assert_eq!(store.get("nope").await, Err(StoreError::KeyNotFound));
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = MemStore::new();
        store
            .insert("messages::1", &json!({ "text": "hi" }))
            .await
            .expect("insert failed");

        let doc = store.get("messages::1").await.expect("get failed");
        assert_eq!(doc, json!({ "text": "hi" }));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn insert_on_existing_key_is_key_exists() {
        let store = MemStore::new();
        store.insert("k", &json!({ "v": 1 })).await.unwrap();

        let err = store.insert("k", &json!({ "v": 2 })).await.unwrap_err();
        assert_eq!(err, StoreError::KeyExists);
        // Original document is untouched.
        assert_eq!(store.doc("k").await, Some(json!({ "v": 1 })));
    }

    #[tokio::test]
    async fn replace_requires_an_existing_key() {
        let store = MemStore::new();
        let err = store.replace("k", &json!({ "v": 1 })).await.unwrap_err();
        assert_eq!(err, StoreError::KeyNotFound);

        store.insert("k", &json!({ "v": 1 })).await.unwrap();
        store.replace("k", &json!({ "v": 2 })).await.unwrap();
        assert_eq!(store.doc("k").await, Some(json!({ "v": 2 })));
    }

    #[tokio::test]
    async fn remove_deletes_or_reports_missing() {
        let store = MemStore::new();
        store.insert("k", &json!({ "v": 1 })).await.unwrap();

        store.remove("k").await.expect("remove failed");
        assert!(store.is_empty().await);
        assert_eq!(store.remove("k").await, Err(StoreError::KeyNotFound));
    }

    // ─────────────────────────────────────────────────────────────
    // scripted query path
    // ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn query_serves_scripted_rows_and_counts_them() {
        let store = MemStore::new();
        store
            .script_query_rows(vec![json!({ "a": 1 }), json!({ "a": 2 })])
            .await;

        let out = store
            .query("SELECT 1", &[], ScanConsistency::Bounded)
            .await
            .expect("query failed");
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.meta.result_count, 2);
    }

    #[tokio::test]
    async fn query_records_statement_params_and_consistency() {
        let store = MemStore::new();
        store
            .query(
                "SELECT `b`.* FROM `b` WHERE _type = ?",
                &[json!("messages")],
                ScanConsistency::RequestPlus,
            )
            .await
            .unwrap();

        let recorded = store.last_query().await.expect("no query recorded");
        assert_eq!(recorded.statement, "SELECT `b`.* FROM `b` WHERE _type = ?");
        assert_eq!(recorded.params, vec![json!("messages")]);
        assert_eq!(recorded.consistency, ScanConsistency::RequestPlus);
    }

    #[tokio::test]
    async fn unscripted_query_returns_no_rows() {
        let store = MemStore::new();
        let out = store
            .query("SELECT 1", &[], ScanConsistency::Bounded)
            .await
            .unwrap();
        assert!(out.rows.is_empty());
        assert_eq!(out.meta.result_count, 0);
    }
}
