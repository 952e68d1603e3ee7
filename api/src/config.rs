//! Service configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file (`CONFIG_PATH`, default `config/codetix.toml`), then
//! `CODETIX_*` environment variables with `__` between sections, e.g.
//! `CODETIX_AUTH__SESSION_SECRET`.

use std::time::Duration;

use codetix_crm::{DistributionConfig, PostgrestConfig};
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config/codetix.toml";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub distribution: DistributionConfig,
    pub store: StoreConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:8080".into() }
    }
}

/// Credentials for the two guarded surfaces
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret for session tokens
    pub session_secret: String,
    /// Bearer key for the integration assignment endpoint. Unset denies all.
    pub leads_api_key: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_secret", &"<redacted>")
            .field("leads_api_key", &self.leads_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    #[default]
    Postgrest,
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgrest => "postgrest",
            Self::Memory => "memory",
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    pub url: String,
    pub service_key: String,
    pub timeout_secs: u64,
    /// Admin user seeded into the memory store
    pub memory_admin: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            url: String::new(),
            service_key: String::new(),
            timeout_secs: 30,
            memory_admin: None,
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("memory_admin", &self.memory_admin)
            .finish()
    }
}

impl StoreConfig {
    /// Connection settings, or `None` when url or key is missing
    pub fn postgrest(&self) -> Option<PostgrestConfig> {
        if self.url.trim().is_empty() || self.service_key.trim().is_empty() {
            return None;
        }
        Some(PostgrestConfig {
            url: self.url.clone(),
            service_key: self.service_key.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

impl ApiConfig {
    /// Load from `CONFIG_PATH` (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::from_builder(Config::builder().add_source(File::with_name(&path).required(false)))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .add_source(
                Environment::with_prefix("CODETIX")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
