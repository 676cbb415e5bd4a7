//! Convenient re-exports of commonly used types from proplayer.
//!
//! ```ignore
//! use proplayer::prelude::*;
//! ```
//!
//! This provides access to the document service, the backend traits, list queries and
//! pages, identities and the error types.

pub use proplayer_core::{
    backend::{PropertyStore, PropertyStoreBuilder, QueryRun},
    clock::{Clock, FixedClock, SystemClock},
    codec::Document,
    cursor::Cursor,
    error::{ProplayerError, ProplayerResult},
    identity::{Identity, IdentityProvider, StaticIdentityProvider},
    page::ListPage,
    property::{Entity, Property, PropertyValue},
    query::{EqFilter, ListQuery, ListQueryBuilder, Sort, SortDirection},
    service::DocumentService,
};
