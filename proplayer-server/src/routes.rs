//! HTTP surface.
//!
//! | Method | Path          | Operation            |
//! |--------|---------------|----------------------|
//! | POST   | `/{kind}`     | insert               |
//! | GET    | `/{kind}`     | list                 |
//! | GET    | `/{kind}/{id}`| get                  |
//! | POST   | `/{kind}/{id}`| update (full replace)|
//! | DELETE | `/{kind}/{id}`| delete               |
//!
//! Every request is authenticated first, then its path is parsed, then the method is
//! checked against the path shape.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::debug;

use proplayer_core::{
    backend::PropertyStore,
    identity::IdentityProvider,
    service::DocumentService,
};

use crate::{
    auth::authenticate,
    config::AuthMode,
    error::ApiError,
    params::RequestParams,
    path::ResourcePath,
};

/// Shared per-process state handed to every request.
#[derive(Clone, Debug)]
pub struct AppState {
    pub service: Arc<DocumentService<Arc<dyn PropertyStore>>>,
    pub identity: Arc<dyn IdentityProvider>,
    pub auth_mode: AuthMode,
}

impl AppState {
    pub fn new(
        store: Arc<dyn PropertyStore>,
        identity: Arc<dyn IdentityProvider>,
        auth_mode: AuthMode,
    ) -> Self {
        Self {
            service: Arc::new(DocumentService::new(store)),
            identity,
            auth_mode,
        }
    }
}

/// Builds the application router. Any path is a resource path, so everything goes
/// through one handler.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let params = RequestParams::from_query(uri.query());
    let identity = authenticate(state.auth_mode, state.identity.as_ref(), &params, &headers).await?;
    let resource = ResourcePath::parse(uri.path())?;
    debug!(%method, kind = resource.kind(), "dispatching");

    let service = &state.service;
    let response = match (resource, method) {
        (ResourcePath::Collection { kind }, Method::POST) => {
            json(service.insert(&identity, &kind, &body).await?)
        }
        (ResourcePath::Collection { kind }, Method::GET) => {
            let query = params.list_query()?;
            let page = service.list(&identity, &kind, &query).await?;
            (StatusCode::OK, Json(page)).into_response()
        }
        (ResourcePath::Entity { kind, id }, Method::GET) => {
            json(service.get(&identity, &kind, id).await?)
        }
        (ResourcePath::Entity { kind, id }, Method::POST) => {
            json(service.update(&identity, &kind, id, &body).await?)
        }
        (ResourcePath::Entity { kind, id }, Method::DELETE) => {
            service.delete(&identity, &kind, id).await?;
            StatusCode::OK.into_response()
        }
        _ => return Err(ApiError::MethodNotAllowed),
    };

    Ok(response)
}

fn json(document: serde_json::Map<String, Value>) -> Response {
    (StatusCode::OK, Json(Value::Object(document))).into_response()
}
