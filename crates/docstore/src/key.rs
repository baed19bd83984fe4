use serde_json::Value as Json;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Derives storage keys from a collection name and id value, and generates
/// ids for entities that lack one.
///
/// Keys are a pure string join of `<collection><separator><id>`; the id value
/// is never validated or normalized beyond stringification.
#[derive(Debug, Clone)]
pub struct KeyCodec {
    collection: String,
    separator: String,
    id_field: String,
}

impl KeyCodec {
    pub fn new(
        collection: impl Into<String>,
        separator: impl Into<String>,
        id_field: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            separator: separator.into(),
            id_field: id_field.into(),
        }
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Storage key for an id value within this codec's collection.
    pub fn derive_key(&self, id: &str) -> String {
        format!("{}{}{}", self.collection, self.separator, id)
    }

    /// Return the entity's id, generating and writing one when absent.
    ///
    /// A generated id is a random UUID v4. Non-string id values are kept as
    /// stored and stringified only for key derivation.
    pub fn ensure_id(&self, entity: &mut Json) -> Result<String> {
        let obj = entity
            .as_object_mut()
            .ok_or_else(|| Error::bad_request("entity must be an object"))?;

        match obj.get(&self.id_field) {
            Some(Json::String(s)) => Ok(s.clone()),
            Some(other) => Ok(other.to_string()),
            None => {
                let id = Uuid::new_v4().to_string();
                obj.insert(self.id_field.clone(), Json::String(id.clone()));
                Ok(id)
            }
        }
    }
}
