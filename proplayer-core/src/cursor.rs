//! Opaque continuation cursors.
//!
//! The payload of a [`Cursor`] belongs to the backend that issued it; this layer only
//! moves it across the wire as URL-safe, unpadded base64.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use std::fmt;

use crate::error::{ProplayerError, ProplayerResult};

/// A resumable position within a query's result ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor(Vec<u8>);

impl Cursor {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the cursor as a caller-facing token. An empty cursor renders as `""`.
    pub fn to_token(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.0)
    }

    /// Parses a caller-supplied token.
    ///
    /// # Errors
    ///
    /// Returns [`ProplayerError::Query`] if the token is empty or not valid base64.
    pub fn from_token(token: &str) -> ProplayerResult<Self> {
        if token.is_empty() {
            return Err(ProplayerError::Query("empty cursor".to_string()));
        }

        URL_SAFE_NO_PAD
            .decode(token)
            .map(Self)
            .map_err(|e| ProplayerError::Query(format!("malformed cursor: {e}")))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}
