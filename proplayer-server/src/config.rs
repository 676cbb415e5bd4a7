//! Server configuration.
//!
//! Read from the TOML file named by `CONFIG_PATH` (default `config.toml`). A missing
//! file means all defaults. A few settings can be overridden from the environment.

use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::{env, io::ErrorKind, net::SocketAddr};

pub const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }

/// How callers are identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Bearer tokens are resolved by the userinfo endpoint.
    #[default]
    Production,
    /// The `user_id` query parameter is trusted as the identity. Local use only.
    Development,
}

impl std::str::FromStr for AuthMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(AuthMode::Production),
            "development" | "dev" => Ok(AuthMode::Development),
            other => Err(anyhow!("unknown auth mode `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
    #[serde(default = "default_userinfo_url")]
    pub userinfo_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { mode: AuthMode::default(), userinfo_url: default_userinfo_url() }
    }
}

fn default_userinfo_url() -> String { DEFAULT_USERINFO_URL.to_string() }

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoreConfig {
    /// Page size for list calls without a `limit`. Unset means unbounded.
    #[serde(default)]
    pub default_limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
}

pub fn load_default() -> Result<AppConfig> {
    let path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

/// Parses the file at `path`, or returns defaults if there is no such file.
pub fn load_from_file(path: &str) -> Result<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse(&content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(anyhow!("cannot read {path}: {e}")),
    }
}

pub fn parse(content: &str) -> Result<AppConfig> {
    Ok(toml::from_str(content)?)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env(|key| env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Applies `PROPLAYER_HOST`, `PROPLAYER_PORT` and `PROPLAYER_AUTH_MODE`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = var("PROPLAYER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("PROPLAYER_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow!("PROPLAYER_PORT `{port}`: {e}"))?;
        }
        if let Some(mode) = var("PROPLAYER_AUTH_MODE") {
            self.auth.mode = mode.parse()?;
        }
        Ok(())
    }

    pub fn validate(&mut self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            self.server.host = default_host();
        }
        if self.server.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.auth.mode == AuthMode::Production && self.auth.userinfo_url.trim().is_empty() {
            return Err(anyhow!("auth.userinfo_url is required in production mode"));
        }
        if self.store.default_limit == Some(0) {
            self.store.default_limit = None;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.server.host, self.server.port).parse()?)
    }
}
