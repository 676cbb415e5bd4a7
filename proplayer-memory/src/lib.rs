//! In-memory property store backend for proplayer.
//!
//! This crate provides a thread-safe, in-memory implementation of the `PropertyStore`
//! trait. It uses async-aware read-write locks for concurrent access and is meant for
//! development, testing and single-process deployments.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Store-wide id sequence** - Identifiers are never reused, even after deletes
//! - **Full query support** - Equality filters, single-key sort, limits and cursors
//!
//! # Quick Start
//!
//! ```ignore
//! use proplayer::{identity::Identity, memory::InMemoryPropertyStore, service::DocumentService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = DocumentService::new(InMemoryPropertyStore::new());
//!     let user = Identity::new("u1")?;
//!
//!     let created = service.insert(&user, "contact", br#"{"name":"Alice"}"#).await?;
//!     println!("{}", serde_json::Value::Object(created));
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as proplayer_memory;

mod evaluator;
pub mod store;

pub use store::{InMemoryPropertyStore, InMemoryPropertyStoreBuilder};
