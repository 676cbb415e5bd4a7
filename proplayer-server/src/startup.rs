use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{info, warn};

use proplayer_core::{
    backend::{PropertyStore, PropertyStoreBuilder},
    identity::IdentityProvider,
};
use proplayer_memory::InMemoryPropertyStore;

use crate::{
    auth::UserInfoIdentityProvider,
    config::{AppConfig, AuthMode},
    logging::init_logging,
    routes::{AppState, build_router},
};

/// Builds the shared state from a validated configuration.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState> {
    let store = InMemoryPropertyStore::builder()
        .with_default_limit(cfg.store.default_limit)
        .build()
        .await?;
    let store: Arc<dyn PropertyStore> = Arc::new(store);
    let identity: Arc<dyn IdentityProvider> =
        Arc::new(UserInfoIdentityProvider::new(cfg.auth.userinfo_url.clone()));

    Ok(AppState::new(store, identity, cfg.auth.mode))
}

/// Public entry: load configuration, build the app and run the HTTP server
pub async fn run() -> Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_and_validate()?;
    init_logging(cfg.log.format);

    if cfg.auth.mode == AuthMode::Development {
        warn!("development auth mode: the user_id parameter is trusted without a token");
    }

    let app = build_router(build_state(&cfg).await?);

    let addr = cfg.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "proplayer server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
