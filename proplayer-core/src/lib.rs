//! A multi-tenant JSON document facade over a property-oriented backend store.
//!
//! Callers hand in arbitrary JSON objects; the facade stores them as flat lists of named,
//! typed, possibly repeated properties and rebuilds the JSON on read. This crate is the
//! core of the proplayer project and provides:
//!
//! - **Document codec** ([`codec`]) - Flattening of nested documents into properties and back
//! - **Property model** ([`property`]) - Scalar values, properties and stored entities
//! - **Backend abstraction** ([`backend`]) - The put/get/delete/query contract of a property store
//! - **Queries** ([`query`], [`translator`]) - Caller list queries and their translation into backend runs
//! - **Cursors** ([`cursor`]) - Opaque continuation tokens
//! - **Tenant scoping** ([`namespace`]) - Per-identity storage kinds
//! - **Identity** ([`identity`]) - Resolved caller identities and the provider contract
//! - **Document service** ([`service`]) - Insert, get, update, delete and list
//! - **Error handling** ([`error`]) - Error taxonomy and result type
//!
//! # Example
//!
//! ```ignore
//! use proplayer_core::{identity::Identity, query::ListQuery, service::DocumentService};
//!
//! let service = DocumentService::new(backend);
//! let user = Identity::new("u1")?;
//!
//! service.insert(&user, "contact", br#"{"name":"Alice","tags":["a","b"]}"#).await?;
//! let page = service
//!     .list(&user, "contact", &ListQuery::builder().filter("name", "Alice").build())
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as proplayer_core;

pub mod backend;
pub mod clock;
pub mod codec;
pub mod cursor;
pub mod error;
pub mod identity;
pub mod namespace;
pub mod page;
pub mod property;
pub mod query;
pub mod service;
pub mod translator;
