use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("authentication failed")]
    Auth,

    #[error("upstream data fetch failed")]
    UpstreamData { detail: String },

    #[error("upstream facet fetch failed")]
    UpstreamFacets { detail: String },

    #[error("request superseded by a newer request for this view")]
    Superseded,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    detail: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::Auth => StatusCode::UNAUTHORIZED,
            ServiceError::UpstreamData { .. } | ServiceError::UpstreamFacets { .. } => {
                StatusCode::BAD_GATEWAY
            }
            ServiceError::Superseded => StatusCode::CONFLICT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if !matches!(self, ServiceError::Auth | ServiceError::Superseded) {
            error!(error = %self, "request failed");
        }

        let detail = match &self {
            ServiceError::Auth => "missing or invalid api key".to_string(),
            ServiceError::UpstreamData { detail } | ServiceError::UpstreamFacets { detail } => {
                detail.clone()
            }
            ServiceError::Superseded => {
                "a newer request for the same view was issued before this one finished".to_string()
            }
            ServiceError::Internal(_) => "unexpected server fault".to_string(),
        };

        let body = ErrorBody {
            error: self.to_string(),
            detail,
        };
        (status, Json(body)).into_response()
    }
}
