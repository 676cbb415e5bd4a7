//! Document operations over a property store.
//!
//! [`DocumentService`] is the main interface of the crate. Each operation scopes the
//! logical kind to the caller identity, runs the codec, and makes exactly the backend
//! calls it needs. Nothing is retried and nothing is cached.
//!
//! # Example
//!
//! ```ignore
//! use proplayer_core::{identity::Identity, service::DocumentService};
//!
//! let service = DocumentService::new(backend);
//! let user = Identity::new("u1")?;
//!
//! let created = service.insert(&user, "contact", br#"{"name":"Alice"}"#).await?;
//! let id = created["_id"].as_i64().unwrap();
//! let fetched = service.get(&user, "contact", id).await?;
//! ```

use serde_json::Value;
use tracing::debug;

use crate::{
    backend::PropertyStore,
    clock::{Clock, SystemClock},
    codec::{self, CREATED_KEY, Document, ID_KEY, KIND_KEY, UPDATED_KEY},
    error::{ProplayerError, ProplayerResult},
    identity::Identity,
    namespace::StorageKind,
    page::ListPage,
    query::ListQuery,
    translator,
};

/// CRUD and list operations for schema-less JSON documents.
///
/// # Type Parameters
///
/// * `S` - The property store backend
/// * `C` - The time source for `_created` / `_updated`
#[derive(Debug)]
pub struct DocumentService<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: PropertyStore> DocumentService<S, SystemClock> {
    /// Creates a service stamping documents with wall-clock time.
    pub fn new(store: S) -> Self {
        Self { store, clock: SystemClock }
    }
}

impl<S: PropertyStore, C: Clock> DocumentService<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a new entity from a JSON object body.
    ///
    /// Caller-supplied `_id`, `_updated` and `_kind` are discarded and `_created` is
    /// overwritten with the current time. The returned document is the stored body plus
    /// `_id` and `_kind`.
    ///
    /// # Errors
    ///
    /// - [`ProplayerError::Encoding`] if the body is not a JSON object or holds a value
    ///   the codec cannot store
    /// - [`ProplayerError::Backend`] if the write fails
    pub async fn insert(&self, identity: &Identity, kind: &str, body: &[u8]) -> ProplayerResult<Document> {
        let storage_kind = StorageKind::new(identity.as_str(), kind);
        debug!(kind = %storage_kind, "insert");

        let mut document = parse_body(body)?;
        strip(&mut document, &[ID_KEY, UPDATED_KEY, KIND_KEY]);
        document.insert(CREATED_KEY.to_string(), Value::from(self.clock.now()));

        let properties = codec::encode(&document)?;
        let id = self
            .store
            .put(storage_kind.as_str(), None, properties)
            .await?;

        document.insert(ID_KEY.to_string(), Value::from(id));
        document.insert(KIND_KEY.to_string(), Value::from(kind));
        Ok(document)
    }

    /// Reads one entity.
    ///
    /// # Errors
    ///
    /// - [`ProplayerError::NotFound`] if no entity exists at `id`
    /// - [`ProplayerError::Backend`] if the read fails
    pub async fn get(&self, identity: &Identity, kind: &str, id: i64) -> ProplayerResult<Document> {
        let storage_kind = StorageKind::new(identity.as_str(), kind);
        debug!(kind = %storage_kind, id, "get");

        let entity = self.store.get(storage_kind.as_str(), id).await?;

        let mut document = codec::decode(&entity.properties, entity.id);
        document.insert(KIND_KEY.to_string(), Value::from(kind));
        Ok(document)
    }

    /// Replaces every property of an existing entity with the given body.
    ///
    /// Fields missing from `body` are removed. `_created` is carried over from the stored
    /// entity, never taken from the body, and `_updated` is set to the current time.
    /// There is no version check: concurrent updates are last-write-wins. The existence
    /// check and the write are separate backend calls, so a delete that lands between
    /// them is overwritten and the entity comes back under its old id.
    ///
    /// # Errors
    ///
    /// - [`ProplayerError::Encoding`] if the body is not a JSON object or holds a value
    ///   the codec cannot store
    /// - [`ProplayerError::NotFound`] if no entity exists at `id`
    /// - [`ProplayerError::Backend`] if the read or write fails
    pub async fn update(
        &self,
        identity: &Identity,
        kind: &str,
        id: i64,
        body: &[u8],
    ) -> ProplayerResult<Document> {
        let storage_kind = StorageKind::new(identity.as_str(), kind);
        debug!(kind = %storage_kind, id, "update");

        let mut document = parse_body(body)?;
        strip(&mut document, &[ID_KEY, CREATED_KEY, KIND_KEY]);

        let existing = self.store.get(storage_kind.as_str(), id).await?;
        if let Some(created) = existing.first_value(CREATED_KEY) {
            document.insert(CREATED_KEY.to_string(), created.to_json());
        }
        document.insert(UPDATED_KEY.to_string(), Value::from(self.clock.now()));

        let properties = codec::encode(&document)?;
        self.store
            .put(storage_kind.as_str(), Some(id), properties)
            .await?;

        document.insert(ID_KEY.to_string(), Value::from(id));
        document.insert(KIND_KEY.to_string(), Value::from(kind));
        Ok(document)
    }

    /// Deletes one entity. Its id is never handed out again.
    ///
    /// # Errors
    ///
    /// - [`ProplayerError::NotFound`] if no entity exists at `id`
    /// - [`ProplayerError::Backend`] if the delete fails
    pub async fn delete(&self, identity: &Identity, kind: &str, id: i64) -> ProplayerResult<()> {
        let storage_kind = StorageKind::new(identity.as_str(), kind);
        debug!(kind = %storage_kind, id, "delete");

        self.store.delete(storage_kind.as_str(), id).await
    }

    /// Lists entities of one kind, one page per call.
    ///
    /// Pass the returned `next_start_token` as the next query's start token to continue.
    ///
    /// # Errors
    ///
    /// - [`ProplayerError::Backend`] if the query fails at any row; no partial page is
    ///   returned
    pub async fn list(&self, identity: &Identity, kind: &str, query: &ListQuery) -> ProplayerResult<ListPage> {
        let storage_kind = StorageKind::new(identity.as_str(), kind);
        debug!(kind = %storage_kind, ?query, "list");

        let backend_query = translator::translate(&self.store, query);
        let mut page = translator::execute(&self.store, &storage_kind, backend_query).await?;

        for item in &mut page.items {
            item.insert(KIND_KEY.to_string(), Value::from(kind));
        }
        Ok(page)
    }
}

fn parse_body(body: &[u8]) -> ProplayerResult<Document> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(document) => Ok(document),
        _ => Err(ProplayerError::Encoding("expected a JSON object".to_string())),
    }
}

fn strip(document: &mut Document, keys: &[&str]) {
    for key in keys {
        document.remove(*key);
    }
}
