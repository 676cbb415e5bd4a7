//! Property store abstraction consumed by the document facade.
//!
//! The facade needs only a narrow contract from its backend: put, get and delete a
//! property list by `(kind, id)`, and run a forward-only query that reports a
//! continuation cursor after every row.
//!
//! # Traits
//!
//! - [`PropertyStore`]: The core trait for storage backends
//! - [`QueryRun`]: A single forward pass over a query's results
//! - [`PropertyStoreBuilder`]: Factory trait for creating backend instances
//!
//! # Examples
//!
//! ```ignore
//! use proplayer_core::{backend::PropertyStore, property::Property};
//!
//! let id = backend
//!     .put("u1--contact", None, vec![Property::single("name", "Alice")])
//!     .await?;
//! let entity = backend.get("u1--contact", id).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    cursor::Cursor,
    error::ProplayerResult,
    property::{Entity, Property},
    query::Query,
};

/// One forward-only pass over the results of a backend query.
///
/// Cursor state is single-threaded: a run is consumed by exactly one caller, in order.
#[async_trait]
pub trait QueryRun: Send {
    /// Yields the next row, or `None` once the query is exhausted.
    async fn next(&mut self) -> ProplayerResult<Option<Entity>>;

    /// The position just after the last row yielded by [`next`](Self::next).
    ///
    /// Before the first row this is the position the query started from, so a query
    /// with no results still produces a usable (if inert) cursor.
    fn cursor(&self) -> ProplayerResult<Cursor>;
}

/// Abstract interface for property storage backends.
///
/// A backend stores entities as flat property lists, grouped by kind. Kinds are opaque
/// strings to the backend; tenant scoping happens before they get here.
///
/// # Thread Safety
///
/// Implementations must be thread-safe. The facade performs no locking of its own, and
/// writes to the same entity are last-write-wins.
///
/// # Error Handling
///
/// [`get`](Self::get) and [`delete`](Self::delete) must report a missing entity as
/// [`ProplayerError::NotFound`](crate::error::ProplayerError::NotFound). Any other failure
/// should be reported as [`ProplayerError::Backend`](crate::error::ProplayerError::Backend).
#[async_trait]
pub trait PropertyStore: Send + Sync + Debug {
    /// Writes an entity and returns its identifier.
    ///
    /// With `id` set to `None` the backend allocates a fresh identifier that has never
    /// been used in this kind. With `Some(id)` the stored property set is replaced
    /// entirely; properties absent from `properties` are gone afterwards.
    async fn put(
        &self,
        kind: &str,
        id: Option<i64>,
        properties: Vec<Property>,
    ) -> ProplayerResult<i64>;

    /// Reads the entity stored at `(kind, id)`.
    async fn get(&self, kind: &str, id: i64) -> ProplayerResult<Entity>;

    /// Removes the entity stored at `(kind, id)`.
    async fn delete(&self, kind: &str, id: i64) -> ProplayerResult<()>;

    /// Starts a query over one kind.
    ///
    /// Rows are produced lazily through the returned [`QueryRun`].
    async fn run_query(&self, kind: &str, query: Query) -> ProplayerResult<Box<dyn QueryRun>>;

    /// Validates a caller-supplied cursor token against this backend's cursor format.
    fn decode_cursor(&self, token: &str) -> ProplayerResult<Cursor>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> ProplayerResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> PropertyStore for &B
where
    B: PropertyStore + ?Sized,
{
    async fn put(
        &self,
        kind: &str,
        id: Option<i64>,
        properties: Vec<Property>,
    ) -> ProplayerResult<i64> {
        (**self).put(kind, id, properties).await
    }

    async fn get(&self, kind: &str, id: i64) -> ProplayerResult<Entity> {
        (**self).get(kind, id).await
    }

    async fn delete(&self, kind: &str, id: i64) -> ProplayerResult<()> {
        (**self).delete(kind, id).await
    }

    async fn run_query(&self, kind: &str, query: Query) -> ProplayerResult<Box<dyn QueryRun>> {
        (**self).run_query(kind, query).await
    }

    fn decode_cursor(&self, token: &str) -> ProplayerResult<Cursor> {
        (**self).decode_cursor(token)
    }
}

#[async_trait]
impl<B> PropertyStore for Arc<B>
where
    B: PropertyStore + ?Sized,
{
    async fn put(
        &self,
        kind: &str,
        id: Option<i64>,
        properties: Vec<Property>,
    ) -> ProplayerResult<i64> {
        (**self).put(kind, id, properties).await
    }

    async fn get(&self, kind: &str, id: i64) -> ProplayerResult<Entity> {
        (**self).get(kind, id).await
    }

    async fn delete(&self, kind: &str, id: i64) -> ProplayerResult<()> {
        (**self).delete(kind, id).await
    }

    async fn run_query(&self, kind: &str, query: Query) -> ProplayerResult<Box<dyn QueryRun>> {
        (**self).run_query(kind, query).await
    }

    fn decode_cursor(&self, token: &str) -> ProplayerResult<Cursor> {
        (**self).decode_cursor(token)
    }
}

#[async_trait]
pub trait PropertyStoreBuilder {
    type Backend: PropertyStore;

    async fn build(self) -> ProplayerResult<Self::Backend>;
}
