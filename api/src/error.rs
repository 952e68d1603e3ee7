//! HTTP error mapping
//!
//! Every failure becomes `{ "success": false, "error": ... }`, except the
//! integration assignment endpoint, which answers with a `message` key.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use codetix_crm::{DistributionError, UseCaseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No autenticado.")]
    Unauthenticated,

    #[error("No autorizado.")]
    InvalidApiKey,

    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error(transparent)]
    UseCase(#[from] UseCaseError),

    /// Failures of the integration assignment endpoint
    #[error(transparent)]
    Assignment(UseCaseError),
}

fn use_case_status(err: &UseCaseError) -> StatusCode {
    match err {
        UseCaseError::LeadNotFound | UseCaseError::AgentNotFound => StatusCode::NOT_FOUND,
        UseCaseError::ValidationError(_) => StatusCode::BAD_REQUEST,
        UseCaseError::Unauthorized(_) => StatusCode::FORBIDDEN,
        UseCaseError::LeadUpdateFailed(_)
        | UseCaseError::HistoryNotRecorded(_)
        | UseCaseError::RepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidApiKey => StatusCode::UNAUTHORIZED,
            Self::Distribution(err) => match err {
                DistributionError::Unauthorized => StatusCode::FORBIDDEN,
                DistributionError::NoAgentsAvailable => StatusCode::BAD_REQUEST,
                DistributionError::StoreReadFailed { .. } | DistributionError::DistributionFailed { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::UseCase(err) | Self::Assignment(err) => use_case_status(err),
        }
    }

    /// Client-facing text. Write failures of a distribution run are logged
    /// in full and reported generically.
    fn public_message(&self) -> String {
        match self {
            Self::Distribution(DistributionError::DistributionFailed { .. }) => {
                "No se pudo completar el reparto inteligente.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let message = self.public_message();
        let body = match self {
            Self::InvalidApiKey | Self::Assignment(_) => json!({ "success": false, "message": message }),
            _ => json!({ "success": false, "error": message }),
        };
        (status, Json(body)).into_response()
    }
}
