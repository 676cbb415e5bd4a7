//! Query construction for list operations.
//!
//! Two layers of query live here:
//!
//! - [`ListQuery`] - what a caller asks for: an optional limit, an optional sort key with
//!   a leading `-` for descending order, opaque start/end tokens and equality filters.
//! - [`Query`] - what a backend executes: the same filters and limit, a parsed [`Sort`],
//!   and cursors already decoded by that backend.
//!
//! The [`translator`](crate::translator) turns the first into the second.
//!
//! # Query Building
//!
//! ```ignore
//! use proplayer_core::query::ListQuery;
//!
//! let query = ListQuery::builder()
//!     .filter("status", "active")
//!     .sort("-name")
//!     .limit(10)
//!     .build();
//! ```

use crate::cursor::Cursor;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// Sort specification for query results.
///
/// Only a single sort key is supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// The property name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Desc }
    }

    /// Parses a caller sort key. A leading `-` selects descending order.
    ///
    /// Returns `None` for an empty key (or a bare `-`).
    pub fn parse(key: &str) -> Option<Self> {
        let (field, direction) = match key.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (key, SortDirection::Asc),
        };

        if field.is_empty() {
            None
        } else {
            Some(Self { field: field.to_string(), direction })
        }
    }
}

/// A string equality filter on one property name.
///
/// Matches an entity when any value stored under `field` is the string `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqFilter {
    pub field: String,
    pub value: String,
}

impl EqFilter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self { field: field.into(), value: value.into() }
    }
}

/// Backend query parameters.
///
/// All filters are combined with logical AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<EqFilter>,
    pub sort: Option<Sort>,
    /// Maximum number of rows to yield. `None` leaves the page size to the backend.
    pub limit: Option<usize>,
    pub start: Option<Cursor>,
    pub end: Option<Cursor>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A caller's list request, before any cursor has been decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: Option<usize>,
    /// Sort key, `-` prefixed for descending order.
    pub sort: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub filters: Vec<EqFilter>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> ListQueryBuilder {
        ListQueryBuilder::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListQueryBuilder {
    query: ListQuery,
}

impl ListQueryBuilder {
    pub fn new() -> Self {
        Self { query: ListQuery::default() }
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Sets the sort key (`name` or `-name`).
    pub fn sort(mut self, key: impl Into<String>) -> Self {
        self.query.sort = Some(key.into());
        self
    }

    /// Resumes after the position marked by `token`.
    pub fn start(mut self, token: impl Into<String>) -> Self {
        self.query.start = Some(token.into());
        self
    }

    /// Stops before the position marked by `token`.
    pub fn end(mut self, token: impl Into<String>) -> Self {
        self.query.end = Some(token.into());
        self
    }

    /// Adds an equality filter. Repeated calls are combined with AND.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.filters.push(EqFilter::new(field, value));
        self
    }

    pub fn build(self) -> ListQuery {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_dash_means_descending() {
        assert_eq!(Sort::parse("-name"), Some(Sort::desc("name")));
        assert_eq!(Sort::parse("name"), Some(Sort::asc("name")));
    }

    #[test]
    fn empty_sort_key_is_no_sort() {
        assert_eq!(Sort::parse(""), None);
        assert_eq!(Sort::parse("-"), None);
    }

    #[test]
    fn builder_accumulates_filters() {
        let query = ListQuery::builder()
            .filter("a", "1")
            .filter("b", "2")
            .limit(3)
            .build();

        assert_eq!(query.filters, vec![EqFilter::new("a", "1"), EqFilter::new("b", "2")]);
        assert_eq!(query.limit, Some(3));
    }
}
