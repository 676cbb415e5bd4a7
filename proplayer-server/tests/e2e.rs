use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use proplayer_core::{
    backend::PropertyStore,
    identity::{IdentityProvider, StaticIdentityProvider},
};
use proplayer_memory::InMemoryPropertyStore;
use proplayer_server::{
    auth::UserInfoIdentityProvider,
    config::AuthMode,
    routes::{AppState, build_router},
};

struct TestApp {
    base_url: String,
}

async fn serve(app: Router) -> anyhow::Result<String> {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(format!("http://{}:{}", addr.ip(), addr.port()))
}

async fn start_server(identity: Arc<dyn IdentityProvider>, mode: AuthMode) -> anyhow::Result<TestApp> {
    let store: Arc<dyn PropertyStore> = Arc::new(InMemoryPropertyStore::new());
    let base_url = serve(build_router(AppState::new(store, identity, mode))).await?;
    Ok(TestApp { base_url })
}

async fn start_with_tokens() -> anyhow::Result<TestApp> {
    let provider = StaticIdentityProvider::new()
        .with_token("tok-u1", "u1")?
        .with_token("tok-u2", "u2")?;
    start_server(Arc::new(provider), AuthMode::Production).await
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

impl TestApp {
    fn url(&self, path: &str, token: &str) -> String {
        format!("{}{}?access_token={}", self.base_url, path, token)
    }

    async fn insert(&self, kind: &str, token: &str, body: Value) -> anyhow::Result<Value> {
        let res = client()
            .post(self.url(&format!("/{kind}"), token))
            .json(&body)
            .send()
            .await?;
        assert_eq!(res.status(), HttpStatusCode::OK);
        Ok(res.json().await?)
    }
}

#[tokio::test]
async fn e2e_insert_and_get() -> anyhow::Result<()> {
    let app = start_with_tokens().await?;

    let created = app
        .insert("contact", "tok-u1", json!({"name": "Alice", "tags": ["a", "b"]}))
        .await?;
    assert!(created["_id"].is_i64());
    assert!(created["_created"].is_i64());
    assert_eq!(created["name"], "Alice");
    assert_eq!(created["tags"], json!(["a", "b"]));

    let id = created["_id"].as_i64().unwrap_or_default();
    let res = client()
        .get(app.url(&format!("/contact/{id}"), "tok-u1"))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    let fetched: Value = res.json().await?;
    assert_eq!(fetched["name"], "Alice");
    assert_eq!(fetched["_id"], id);
    Ok(())
}

#[tokio::test]
async fn e2e_get_unknown_is_404() -> anyhow::Result<()> {
    let app = start_with_tokens().await?;

    let res = client().get(app.url("/contact/999", "tok-u1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn e2e_update_replaces_and_delete_removes() -> anyhow::Result<()> {
    let app = start_with_tokens().await?;

    let created = app
        .insert("contact", "tok-u1", json!({"name": "Alice", "tags": ["a", "b"]}))
        .await?;
    let id = created["_id"].as_i64().unwrap_or_default();
    let path = format!("/contact/{id}");

    let res = client()
        .post(app.url(&path, "tok-u1"))
        .json(&json!({"name": "Bob"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let fetched: Value = client().get(app.url(&path, "tok-u1")).send().await?.json().await?;
    assert_eq!(fetched["name"], "Bob");
    assert!(fetched.get("tags").is_none());
    assert!(fetched["_updated"].is_i64());

    let res = client().delete(app.url(&path, "tok-u1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.bytes().await?.is_empty());

    let res = client().get(app.url(&path, "tok-u1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let res = client().delete(app.url(&path, "tok-u1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_nested_document() -> anyhow::Result<()> {
    let app = start_with_tokens().await?;

    let created = app
        .insert("contact", "tok-u1", json!({"address": {"city": "X"}}))
        .await?;
    let id = created["_id"].as_i64().unwrap_or_default();

    let fetched: Value = client()
        .get(app.url(&format!("/contact/{id}"), "tok-u1"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(fetched["address"], json!({"city": "X"}));

    let page: Value = client()
        .get(format!("{}&where=address.city%3DX", app.url("/contact", "tok-u1")))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(page["items"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn e2e_pagination_chains_tokens() -> anyhow::Result<()> {
    let app = start_with_tokens().await?;
    for i in 0..3 {
        app.insert("contact", "tok-u1", json!({"n": i})).await?;
    }

    let mut ids = Vec::new();
    let mut start = String::new();
    for _ in 0..3 {
        let mut url = format!("{}&limit=1", app.url("/contact", "tok-u1"));
        if !start.is_empty() {
            url.push_str(&format!("&start={start}"));
        }

        let res = client().get(url).send().await?;
        assert_eq!(res.status(), HttpStatusCode::OK);
        let page: Value = res.json().await?;

        let items = page["items"].as_array().cloned().unwrap_or_default();
        assert_eq!(items.len(), 1);
        ids.push(items[0]["_id"].as_i64().unwrap_or_default());
        start = page["nextStartToken"].as_str().unwrap_or_default().to_string();
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    Ok(())
}

#[tokio::test]
async fn e2e_tenants_are_isolated() -> anyhow::Result<()> {
    let app = start_with_tokens().await?;

    let created = app.insert("contact", "tok-u1", json!({"name": "Alice"})).await?;
    let id = created["_id"].as_i64().unwrap_or_default();

    let res = client()
        .get(app.url(&format!("/contact/{id}"), "tok-u2"))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let page: Value = client().get(app.url("/contact", "tok-u2")).send().await?.json().await?;
    assert_eq!(page["items"], json!([]));
    Ok(())
}

#[tokio::test]
async fn e2e_bearer_header_is_accepted() -> anyhow::Result<()> {
    let app = start_with_tokens().await?;

    let res = client()
        .get(format!("{}/contact", app.base_url))
        .bearer_auth("tok-u1")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn e2e_error_statuses() -> anyhow::Result<()> {
    let app = start_with_tokens().await?;

    let res = client().get(format!("{}/contact", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);

    let res = client().get(app.url("/contact", "nope")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);

    for path in ["/contact/abc", "/a/1/2", "/"] {
        let res = client().get(app.url(path, "tok-u1")).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST, "{path}");
    }

    let res = client()
        .get(format!("{}&limit=ten", app.url("/contact", "tok-u1")))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = client()
        .get(format!("{}&where=novalue", app.url("/contact", "tok-u1")))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = client().put(app.url("/contact/1", "tok-u1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::METHOD_NOT_ALLOWED);
    let res = client().delete(app.url("/contact", "tok-u1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::METHOD_NOT_ALLOWED);

    let res = client()
        .post(app.url("/contact", "tok-u1"))
        .body("[1, 2, 3]")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn e2e_malformed_start_is_ignored() -> anyhow::Result<()> {
    let app = start_with_tokens().await?;
    app.insert("contact", "tok-u1", json!({"n": 1})).await?;

    let page: Value = client()
        .get(format!("{}&start=%25%25garbage", app.url("/contact", "tok-u1")))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(page["items"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn e2e_development_mode_uses_user_id() -> anyhow::Result<()> {
    let app = start_server(Arc::new(StaticIdentityProvider::new()), AuthMode::Development).await?;

    let res = client()
        .post(format!("{}/note?user_id=dev", app.base_url))
        .json(&json!({"text": "hi"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let page: Value = client()
        .get(format!("{}/note?user_id=dev", app.base_url))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(page["items"][0]["text"], "hi");

    let res = client().get(format!("{}/note", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn e2e_encoded_kind_is_decoded() -> anyhow::Result<()> {
    let app = start_server(Arc::new(StaticIdentityProvider::new()), AuthMode::Development).await?;

    let created: Value = client()
        .post(format!("{}/caf%C3%A9?user_id=u1", app.base_url))
        .json(&json!({"text": "hi"}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(created["_kind"], "café");

    let page: Value = client()
        .get(format!("{}/caf%c3%a9?user_id=u1", app.base_url))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(page["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["items"][0]["_kind"], "café");

    let res = client()
        .get(format!("{}/%FF?user_id=u1", app.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    Ok(())
}

async fn userinfo(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    match params.get("access_token").map(String::as_str) {
        Some("remote-good") => (StatusCode::OK, Json(json!({"id": "remote-user"}))),
        Some("remote-empty") => (StatusCode::OK, Json(json!({"id": ""}))),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid_token"}))),
    }
}

#[tokio::test]
async fn e2e_userinfo_provider_resolves_identity() -> anyhow::Result<()> {
    let userinfo_url = serve(Router::new().route("/userinfo", get(userinfo))).await?;
    let provider = UserInfoIdentityProvider::new(format!("{userinfo_url}/userinfo"));
    let app = start_server(Arc::new(provider), AuthMode::Production).await?;

    let res = client().get(app.url("/contact", "remote-good")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    for token in ["remote-empty", "remote-bad"] {
        let res = client().get(app.url("/contact", token)).send().await?;
        assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED, "{token}");
    }
    Ok(())
}
