//! Tenant isolation for the shared backend namespace.
//!
//! Every backend kind is prefixed with the caller identity, so two callers using the same
//! logical kind and the same numeric id address different entities. The identity must
//! already be resolved; nothing here authenticates.
//!
//! A logical kind that itself contains the separator can collide with another tenant's
//! kind (`a--b` + `c` and `a` + `b--c`). This is a known limitation.

use std::fmt;

/// Joins the tenant identity and the logical kind.
pub const SEPARATOR: &str = "--";

/// Tenant-qualified backend kind, `{identity}--{logical_kind}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKind(String);

impl StorageKind {
    pub fn new(identity: &str, logical_kind: &str) -> Self {
        Self(storage_kind(identity, logical_kind))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StorageKind {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn storage_kind(identity: &str, logical_kind: &str) -> String {
    format!("{identity}{SEPARATOR}{logical_kind}")
}
