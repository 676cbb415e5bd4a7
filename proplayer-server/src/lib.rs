//! HTTP server for the proplayer document facade.
//!
//! Maps `/{kind}` and `/{kind}/{id}` requests onto the document service, resolving the
//! caller identity from a bearer token (or, in development mode, a `user_id`
//! parameter).

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod params;
pub mod path;
pub mod routes;
pub mod startup;

pub use startup::run;
