//! Translation of caller list queries into backend query execution.
//!
//! [`translate`] turns a [`ListQuery`] into backend [`Query`] parameters, decoding the
//! start/end tokens with the backend's own cursor format. [`execute`] then drives a single
//! forward pass over the backend results, decoding each row into a document and keeping
//! the cursor after every row.
//!
//! A backend error at any point fails the whole call. Rows decoded before the failure are
//! discarded, never returned as a short page.

use tracing::{debug, warn};

use crate::{
    backend::PropertyStore,
    codec,
    cursor::Cursor,
    error::ProplayerResult,
    namespace::StorageKind,
    page::ListPage,
    query::{ListQuery, Query, Sort},
};

/// Builds backend query parameters from a caller query.
///
/// Start and end tokens the backend cannot decode are dropped: the query then runs
/// without that bound instead of failing.
pub fn translate<S>(store: &S, list: &ListQuery) -> Query
where
    S: PropertyStore + ?Sized,
{
    Query {
        filters: list.filters.clone(),
        sort: list.sort.as_deref().and_then(Sort::parse),
        limit: list.limit,
        start: decode_bound(store, "start", list.start.as_deref()),
        end: decode_bound(store, "end", list.end.as_deref()),
    }
}

fn decode_bound<S>(store: &S, bound: &'static str, token: Option<&str>) -> Option<Cursor>
where
    S: PropertyStore + ?Sized,
{
    let token = token.filter(|t| !t.is_empty())?;

    match store.decode_cursor(token) {
        Ok(cursor) => Some(cursor),
        // Malformed cursor: treated as absent, never surfaced as a query error.
        Err(err) => {
            warn!(bound, error = %err, "ignoring undecodable cursor");
            None
        }
    }
}

/// Runs `query` against `kind` and collects one page of decoded documents.
///
/// # Errors
///
/// Propagates the first backend error. No partial page is returned.
pub async fn execute<S>(store: &S, kind: &StorageKind, query: Query) -> ProplayerResult<ListPage>
where
    S: PropertyStore + ?Sized,
{
    let mut run = store.run_query(kind.as_str(), query).await?;

    let mut items = Vec::new();
    let mut cursor = run.cursor()?;

    while let Some(entity) = run.next().await? {
        items.push(codec::decode(&entity.properties, entity.id));
        cursor = run.cursor()?;
    }

    debug!(kind = %kind, rows = items.len(), "list query finished");

    Ok(ListPage::builder(items)
        .with_next_start_token(cursor.to_token())
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::QueryRun,
        error::ProplayerError,
        property::{Entity, Property},
        query::SortDirection,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays a fixed script of rows; `fail_at` injects a backend error at that row.
    #[derive(Debug, Default)]
    struct ScriptedStore {
        rows: Vec<Entity>,
        fail_at: Option<usize>,
        seen: Mutex<Option<Query>>,
    }

    struct ScriptedRun {
        rows: Vec<Entity>,
        fail_at: Option<usize>,
        position: usize,
    }

    #[async_trait]
    impl QueryRun for ScriptedRun {
        async fn next(&mut self) -> ProplayerResult<Option<Entity>> {
            if self.fail_at == Some(self.position) {
                return Err(ProplayerError::Backend("connection reset".to_string()));
            }
            let row = self.rows.get(self.position).cloned();
            if row.is_some() {
                self.position += 1;
            }
            Ok(row)
        }

        fn cursor(&self) -> ProplayerResult<Cursor> {
            Ok(Cursor::from_bytes(vec![self.position as u8]))
        }
    }

    #[async_trait]
    impl PropertyStore for ScriptedStore {
        async fn put(&self, _: &str, _: Option<i64>, _: Vec<Property>) -> ProplayerResult<i64> {
            unimplemented!()
        }

        async fn get(&self, _: &str, _: i64) -> ProplayerResult<Entity> {
            unimplemented!()
        }

        async fn delete(&self, _: &str, _: i64) -> ProplayerResult<()> {
            unimplemented!()
        }

        async fn run_query(&self, _: &str, query: Query) -> ProplayerResult<Box<dyn QueryRun>> {
            *self.seen.lock().unwrap() = Some(query);
            Ok(Box::new(ScriptedRun {
                rows: self.rows.clone(),
                fail_at: self.fail_at,
                position: 0,
            }))
        }

        fn decode_cursor(&self, token: &str) -> ProplayerResult<Cursor> {
            let cursor = Cursor::from_token(token)?;
            if cursor.as_bytes().len() != 1 {
                return Err(ProplayerError::Query("not a scripted cursor".to_string()));
            }
            Ok(cursor)
        }
    }

    fn rows(n: i64) -> Vec<Entity> {
        (1..=n)
            .map(|id| Entity::new(id, vec![Property::single("n", id)]))
            .collect()
    }

    fn kind() -> StorageKind {
        StorageKind::new("u1", "contact")
    }

    #[test]
    fn translate_parses_sort_and_keeps_filters() {
        let store = ScriptedStore::default();
        let list = ListQuery::builder()
            .sort("-name")
            .filter("city", "X")
            .limit(5)
            .build();

        let query = translate(&store, &list);
        assert_eq!(query.sort.as_ref().map(|s| s.direction), Some(SortDirection::Desc));
        assert_eq!(query.sort.map(|s| s.field), Some("name".to_string()));
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn undecodable_cursors_are_treated_as_absent() {
        let store = ScriptedStore::default();
        let list = ListQuery::builder()
            .start("%%%not-base64%%%")
            .end(Cursor::from_bytes(vec![1, 2, 3]).to_token())
            .build();

        let query = translate(&store, &list);
        assert_eq!(query.start, None);
        assert_eq!(query.end, None);
    }

    #[test]
    fn valid_cursor_is_passed_through() {
        let store = ScriptedStore::default();
        let token = Cursor::from_bytes(vec![2]).to_token();
        let query = translate(&store, &ListQuery::builder().start(token).build());
        assert_eq!(query.start, Some(Cursor::from_bytes(vec![2])));
    }

    #[tokio::test]
    async fn execute_decodes_rows_and_returns_last_cursor() {
        let store = ScriptedStore { rows: rows(3), ..Default::default() };

        let page = execute(&store, &kind(), Query::new()).await.unwrap();

        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[0]["_id"], json!(1));
        assert_eq!(page.items[2]["n"], json!(3));
        assert_eq!(page.next_start_token, Cursor::from_bytes(vec![3]).to_token());
    }

    #[tokio::test]
    async fn empty_result_still_carries_a_token() {
        let store = ScriptedStore::default();

        let page = execute(&store, &kind(), Query::new()).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.next_start_token, Cursor::from_bytes(vec![0]).to_token());
        assert!(!page.next_start_token.is_empty());
    }

    #[tokio::test]
    async fn mid_iteration_failure_discards_partial_rows() {
        let store = ScriptedStore { rows: rows(3), fail_at: Some(2), ..Default::default() };

        let err = execute(&store, &kind(), Query::new()).await.unwrap_err();
        assert!(matches!(err, ProplayerError::Backend(_)));
    }

    #[tokio::test]
    async fn execute_forwards_translated_query() {
        let store = ScriptedStore::default();
        let query = translate(&store, &ListQuery::builder().filter("a", "b").build());

        execute(&store, &kind(), query.clone()).await.unwrap();
        assert_eq!(store.seen.lock().unwrap().clone(), Some(query));
    }
}
