//! CodeTix CRM API server

use std::sync::Arc;

use anyhow::{bail, Context};
use codetix_crm::{InMemoryLeadStore, LeadStore, PostgrestLeadStore};
use codetix_api::{build_router, config::StoreKind, ApiConfig, ApiState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::load().context("failed to load configuration")?;
    if config.auth.session_secret.is_empty() {
        bail!("auth.session_secret must be set");
    }
    if config.auth.leads_api_key.is_none() {
        tracing::warn!("auth.leads_api_key is not set; /api/leads/assign will refuse every request");
    }

    let store: Arc<dyn LeadStore> = match config.store.kind {
        StoreKind::Postgrest => {
            let Some(postgrest) = config.store.postgrest() else {
                bail!("store.url and store.service_key are required for the postgrest store");
            };
            tracing::info!("Using PostgREST store at {}", postgrest.url);
            Arc::new(PostgrestLeadStore::new(&postgrest).context("failed to build store client")?)
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            let store = match config.store.memory_admin.as_deref() {
                Some(admin) => InMemoryLeadStore::with_admin(admin, "Admin"),
                None => InMemoryLeadStore::new(),
            };
            Arc::new(store)
        }
    };

    tracing::info!(
        max_active_leads = config.distribution.max_active_leads,
        persistence_mode = ?config.distribution.persistence_mode,
        "Distribution settings"
    );

    let app = build_router(ApiState::new(store, &config));

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!("CodeTix API listening on {}", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}
