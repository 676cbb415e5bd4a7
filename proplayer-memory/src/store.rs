//! In-memory property store.
//!
//! Entities live in per-kind ordered maps behind an async-aware read-write lock.
//! Identifiers come from one store-wide sequence, so an id is never handed out twice,
//! not even after a delete.

use async_trait::async_trait;
use bson::{deserialize_from_slice, serialize_to_vec};
use mea::rwlock::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
};
use tracing::trace;

use proplayer_core::{
    backend::{PropertyStore, PropertyStoreBuilder, QueryRun},
    cursor::Cursor,
    error::{ProplayerError, ProplayerResult},
    property::{Entity, Property},
    query::Query,
};

use crate::evaluator::EntityEvaluator;

type KindMap = BTreeMap<i64, Vec<Property>>;
type StoreMap = HashMap<String, KindMap>;

/// Thread-safe in-memory property store.
///
/// `InMemoryPropertyStore` is cloneable and every clone shares the same underlying
/// data, so it can be handed to as many tasks as needed.
///
/// Queries scan the whole kind; there are no indexes. Without a sort, rows come back in
/// ascending id order. Cursors are row offsets into the query's ordering, so they stay
/// meaningful only while the kind is not written to between pages.
///
/// # Example
///
/// ```ignore
/// use proplayer_core::{backend::PropertyStore, property::Property};
/// use proplayer_memory::InMemoryPropertyStore;
///
/// let store = InMemoryPropertyStore::new();
/// let id = store.put("u1--contact", None, vec![Property::single("name", "Alice")]).await?;
/// let entity = store.get("u1--contact", id).await?;
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryPropertyStore {
    /// kind -> (id -> properties)
    store: Arc<RwLock<StoreMap>>,
    /// Last identifier handed out.
    last_id: Arc<AtomicI64>,
    /// Page size applied when a query carries no limit of its own.
    default_limit: Option<usize>,
}

impl InMemoryPropertyStore {
    /// Creates an empty store with unbounded pages.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InMemoryPropertyStoreBuilder {
        InMemoryPropertyStoreBuilder::default()
    }

    pub fn default_limit(&self) -> Option<usize> {
        self.default_limit
    }

    fn next_id(&self) -> i64 {
        self.last_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn window(&self, query: &Query, len: usize) -> (usize, usize) {
        let start = query
            .start
            .as_ref()
            .and_then(MemoryCursor::offset_of)
            .unwrap_or(0)
            .min(len);

        let mut end = query
            .end
            .as_ref()
            .and_then(MemoryCursor::offset_of)
            .unwrap_or(len)
            .clamp(start, len);

        if let Some(limit) = query.limit.or(self.default_limit) {
            end = end.min(start.saturating_add(limit));
        }

        (start, end)
    }
}

#[async_trait]
impl PropertyStore for InMemoryPropertyStore {
    async fn put(
        &self,
        kind: &str,
        id: Option<i64>,
        properties: Vec<Property>,
    ) -> ProplayerResult<i64> {
        let id = match id {
            Some(id) => id,
            None => self.next_id(),
        };

        let mut store = self.store.write().await;
        store
            .entry(kind.to_string())
            .or_default()
            .insert(id, properties);

        trace!(kind, id, "stored entity");
        Ok(id)
    }

    async fn get(&self, kind: &str, id: i64) -> ProplayerResult<Entity> {
        let store = self.store.read().await;

        store
            .get(kind)
            .and_then(|entities| entities.get(&id))
            .map(|properties| Entity::new(id, properties.clone()))
            .ok_or_else(|| ProplayerError::not_found(kind, id))
    }

    async fn delete(&self, kind: &str, id: i64) -> ProplayerResult<()> {
        let mut store = self.store.write().await;

        match store.get_mut(kind).and_then(|entities| entities.remove(&id)) {
            Some(_) => Ok(()),
            None => Err(ProplayerError::not_found(kind, id)),
        }
    }

    async fn run_query(&self, kind: &str, query: Query) -> ProplayerResult<Box<dyn QueryRun>> {
        let entities = {
            let store = self.store.read().await;
            match store.get(kind) {
                Some(entities) => entities
                    .iter()
                    .map(|(id, properties)| Entity::new(*id, properties.clone()))
                    .collect::<Vec<_>>(),
                None => Vec::new(),
            }
        };

        let selected = EntityEvaluator::select(&entities, &query.filters, query.sort.as_ref());
        let (start, end) = self.window(&query, selected.len());
        trace!(kind, start, end, matched = selected.len(), "running query");

        let rows = selected
            .into_iter()
            .skip(start)
            .take(end - start)
            .collect::<Vec<_>>();

        Ok(Box::new(MemoryQueryRun::new(rows, start)))
    }

    fn decode_cursor(&self, token: &str) -> ProplayerResult<Cursor> {
        let cursor = Cursor::from_token(token)?;
        MemoryCursor::decode(&cursor)?;
        Ok(cursor)
    }
}

/// Cursor payload: the number of rows of the query ordering that precede the position.
#[derive(Debug, Serialize, Deserialize)]
struct MemoryCursor {
    offset: i64,
}

impl MemoryCursor {
    fn encode(offset: usize) -> ProplayerResult<Cursor> {
        let offset = i64::try_from(offset)
            .map_err(|_| ProplayerError::Backend("cursor offset overflow".to_string()))?;

        Ok(Cursor::from_bytes(serialize_to_vec(&MemoryCursor { offset })?))
    }

    fn decode(cursor: &Cursor) -> ProplayerResult<usize> {
        let decoded: MemoryCursor = deserialize_from_slice(cursor.as_bytes())
            .map_err(|e| ProplayerError::Query(format!("malformed cursor: {e}")))?;

        usize::try_from(decoded.offset)
            .map_err(|_| ProplayerError::Query(format!("negative cursor offset {}", decoded.offset)))
    }

    fn offset_of(cursor: &Cursor) -> Option<usize> {
        Self::decode(cursor).ok()
    }
}

/// A snapshot of one query's rows, taken when the query was started.
struct MemoryQueryRun {
    rows: std::vec::IntoIter<Entity>,
    /// Offset of the first row of `rows` in the query ordering.
    base: usize,
    yielded: usize,
}

impl MemoryQueryRun {
    fn new(rows: Vec<Entity>, base: usize) -> Self {
        Self {
            rows: rows.into_iter(),
            base,
            yielded: 0,
        }
    }
}

#[async_trait]
impl QueryRun for MemoryQueryRun {
    async fn next(&mut self) -> ProplayerResult<Option<Entity>> {
        let row = self.rows.next();
        if row.is_some() {
            self.yielded += 1;
        }
        Ok(row)
    }

    fn cursor(&self) -> ProplayerResult<Cursor> {
        MemoryCursor::encode(self.base + self.yielded)
    }
}

/// Builder for [`InMemoryPropertyStore`].
///
/// # Example
///
/// ```ignore
/// use proplayer_core::backend::PropertyStoreBuilder;
/// use proplayer_memory::InMemoryPropertyStore;
///
/// let store = InMemoryPropertyStore::builder()
///     .with_default_limit(Some(100))
///     .build()
///     .await?;
/// ```
#[derive(Default, Debug)]
pub struct InMemoryPropertyStoreBuilder {
    default_limit: Option<usize>,
}

impl InMemoryPropertyStoreBuilder {
    /// Sets the page size used when a query has no limit. `None` means unbounded.
    pub fn with_default_limit(mut self, limit: Option<usize>) -> Self {
        self.default_limit = limit;
        self
    }
}

#[async_trait]
impl PropertyStoreBuilder for InMemoryPropertyStoreBuilder {
    type Backend = InMemoryPropertyStore;

    async fn build(self) -> ProplayerResult<Self::Backend> {
        Ok(InMemoryPropertyStore {
            default_limit: self.default_limit,
            ..InMemoryPropertyStore::default()
        })
    }
}
