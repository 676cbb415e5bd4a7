//! Caller identity.
//!
//! Exchanging a bearer credential for an identity is delegated to an external provider
//! behind [`IdentityProvider`]. The resolved [`Identity`] is an opaque, stable string used
//! only to scope storage kinds.

use async_trait::async_trait;
use std::{collections::HashMap, fmt, fmt::Debug};

use crate::error::{ProplayerError, ProplayerResult};

/// A resolved, non-empty caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// # Errors
    ///
    /// Returns [`ProplayerError::Auth`] for an empty identity.
    pub fn new(id: impl Into<String>) -> ProplayerResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(ProplayerError::Auth("empty identity".to_string()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves bearer tokens into identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync + Debug {
    /// # Errors
    ///
    /// Returns [`ProplayerError::Auth`] for an invalid or expired token.
    async fn resolve(&self, token: &str) -> ProplayerResult<Identity>;
}

#[async_trait]
impl<P> IdentityProvider for std::sync::Arc<P>
where
    P: IdentityProvider + ?Sized,
{
    async fn resolve(&self, token: &str) -> ProplayerResult<Identity> {
        (**self).resolve(token).await
    }
}

/// A fixed token table, for tests and local setups.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    tokens: HashMap<String, Identity>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` as resolving to `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`ProplayerError::Auth`] for an empty identity.
    pub fn with_token(mut self, token: impl Into<String>, identity: impl Into<String>) -> ProplayerResult<Self> {
        self.tokens.insert(token.into(), Identity::new(identity)?);
        Ok(self)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn resolve(&self, token: &str) -> ProplayerResult<Identity> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| ProplayerError::Auth("unknown token".to_string()))
    }
}
