//! Caller authentication.
//!
//! In production mode the bearer token is exchanged for a user id at an OAuth2
//! userinfo endpoint. In development mode the `user_id` query parameter is trusted.

use async_trait::async_trait;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use proplayer_core::{
    error::{ProplayerError, ProplayerResult},
    identity::{Identity, IdentityProvider},
};

use crate::{config::AuthMode, params::RequestParams};

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves tokens with `GET {userinfo_url}?access_token={token}`, reading the `id`
/// field of the JSON response.
#[derive(Debug, Clone)]
pub struct UserInfoIdentityProvider {
    client: reqwest::Client,
    userinfo_url: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    id: String,
}

impl UserInfoIdentityProvider {
    pub fn new(userinfo_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), userinfo_url)
    }

    pub fn with_client(client: reqwest::Client, userinfo_url: impl Into<String>) -> Self {
        Self { client, userinfo_url: userinfo_url.into() }
    }
}

#[async_trait]
impl IdentityProvider for UserInfoIdentityProvider {
    async fn resolve(&self, token: &str) -> ProplayerResult<Identity> {
        let url = Url::parse_with_params(&self.userinfo_url, &[("access_token", token)])
            .map_err(|e| ProplayerError::Auth(format!("invalid userinfo url: {e}")))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProplayerError::Auth(format!("userinfo request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "userinfo rejected token");
            return Err(ProplayerError::Auth(format!("userinfo returned {status}")));
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| ProplayerError::Auth(format!("invalid userinfo response: {e}")))?;

        Identity::new(info.id).map_err(|_| ProplayerError::Auth("invalid auth".to_string()))
    }
}

/// The bearer token of a request: `access_token` parameter first, then the
/// `Authorization: Bearer` header.
pub fn bearer_token(params: &RequestParams, headers: &HeaderMap) -> Option<String> {
    if let Some(token) = &params.access_token {
        return Some(token.clone());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Determines the caller identity of a request.
///
/// # Errors
///
/// Returns [`ProplayerError::Auth`] when no credential is present or the provider
/// rejects it.
pub async fn authenticate<P>(
    mode: AuthMode,
    provider: &P,
    params: &RequestParams,
    headers: &HeaderMap,
) -> ProplayerResult<Identity>
where
    P: IdentityProvider + ?Sized,
{
    match mode {
        AuthMode::Development => {
            let user_id = params
                .user_id
                .clone()
                .ok_or_else(|| ProplayerError::Auth("missing user_id".to_string()))?;
            Identity::new(user_id)
        }
        AuthMode::Production => {
            let token = bearer_token(params, headers)
                .ok_or_else(|| ProplayerError::Auth("missing access token".to_string()))?;
            provider.resolve(&token).await
        }
    }
}
