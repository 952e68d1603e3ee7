//! CodeTix CRM API
//!
//! HTTP surface for lead distribution, manual assignment, status changes
//! and the assignment audit trail.
//!
//! # Routes
//!
//! | method | path | guard |
//! |---|---|---|
//! | `POST` | `/api/leads/distribute` | session, admin |
//! | `PATCH` | `/api/leads/assign` | leads API key |
//! | `PATCH` | `/api/leads/status` | session |
//! | `GET` | `/api/leads/history` | session, admin |
//! | `GET` | `/health` | none |

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::{routing::get, Router};
use codetix_crm::{
    AssignmentService, AssignmentUseCases, DistributionService, DistributionUseCases, HistoryQueries, HistoryService,
    LeadStatusService, LeadStatusUseCases, LeadStore,
};
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::openapi::security::{Http, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub use config::{ApiConfig, AuthConfig};
pub use error::ApiError;
pub use models::*;

/// API state
pub struct ApiState {
    pub distribution: Arc<dyn DistributionUseCases>,
    pub assignment: Arc<dyn AssignmentUseCases>,
    pub status: Arc<dyn LeadStatusUseCases>,
    pub history: Arc<dyn HistoryQueries>,
    pub auth: AuthConfig,
    /// Held for the whole of a distribution run
    pub distribution_lock: Mutex<()>,
    pub store_kind: &'static str,
}

impl ApiState {
    pub fn new(store: Arc<dyn LeadStore>, config: &ApiConfig) -> Self {
        Self {
            distribution: Arc::new(DistributionService::new(store.clone(), &config.distribution)),
            assignment: Arc::new(AssignmentService::new(store.clone())),
            status: Arc::new(LeadStatusService::new(store.clone())),
            history: Arc::new(HistoryService::new(store)),
            auth: config.auth.clone(),
            distribution_lock: Mutex::new(()),
            store_kind: config.store.kind.as_str(),
        }
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
            components.add_security_scheme("leads_api_key", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CodeTix CRM API",
        version = "1.0.0",
        description = "Lead distribution and assignment for the CodeTix sales team",
        license(name = "Apache-2.0")
    ),
    paths(
        routes::health::health_check,
        routes::distribution::distribute,
        routes::assignment::assign,
        routes::status::update_status,
        routes::history::list_history,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            ErrorBody, MessageBody,
            AgentDetail, DistributeResponse,
            AssignmentPair, AssignRequest, AssignmentResult,
            StatusRequest, StatusResponse, LeadView,
            HistoryEntryView, HistoryResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "leads", description = "Lead distribution, assignment and history")
    )
)]
pub struct ApiDoc;

/// Build the API router
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health::health_check))
        .nest("/api/leads", lead_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(Arc::new(state))
}

fn lead_routes() -> Router<Arc<ApiState>> {
    Router::new()
        .merge(routes::distribution::router())
        .merge(routes::assignment::router())
        .merge(routes::status::router())
        .merge(routes::history::router())
}
