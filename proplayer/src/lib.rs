//! Main proplayer crate: a multi-tenant JSON document facade over a property store.
//!
//! This crate is the primary entry point. It re-exports the core types and the
//! document service from `proplayer-core` and gives access to the bundled backends.
//!
//! # Features
//!
//! - **Schema-less documents** - Store arbitrary JSON objects without declaring a schema
//! - **Tenant scoping** - Every kind is private to the identity that wrote it
//! - **Simple listing** - Equality filters, a single sort key and cursor pagination
//! - **Pluggable backends** - Anything implementing [`backend::PropertyStore`]
//!
//! # Quick Start
//!
//! ```ignore
//! use proplayer::{prelude::*, memory::InMemoryPropertyStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = DocumentService::new(InMemoryPropertyStore::builder().build().await?);
//!     let user = Identity::new("u1")?;
//!
//!     // Insert a document
//!     let created = service
//!         .insert(&user, "contact", br#"{"name":"Alice","address":{"city":"Paris"}}"#)
//!         .await?;
//!     let id = created["_id"].as_i64().unwrap_or_default();
//!
//!     // Replace it
//!     service
//!         .update(&user, "contact", id, br#"{"name":"Alice","address":{"city":"Lyon"}}"#)
//!         .await?;
//!
//!     // List it back, filtered on a nested field
//!     let page = service
//!         .list(
//!             &user,
//!             "contact",
//!             &ListQuery::builder().filter("address.city", "Lyon").limit(10).build(),
//!         )
//!         .await?;
//!
//!     println!("{}", serde_json::to_string(&page)?);
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-process storage for development and testing

pub mod prelude;

pub use proplayer_core::{
    backend, clock, codec, cursor, error, identity, namespace, page, property, query, service,
    translator,
};

// Re-export the JSON types documents are made of
pub use serde_json;

/// In-memory storage backend implementations.
pub mod memory {
    pub use proplayer_memory::{InMemoryPropertyStore, InMemoryPropertyStoreBuilder};
}
