use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hops_core::sentence_case;
use serde_json::json;

/// Failures the development backend reports to clients.
///
/// Every variant renders as the hospital error body `{success: false, message, missingFields}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{} not found", sentence_case(.label))]
    NotFound { label: &'static str },
    #[error("Missing required fields: {}", .fields.join(", "))]
    MissingFields { fields: Vec<String> },
    #[error("Cannot {action} {label} with status: {status}")]
    Conflict {
        action: &'static str,
        label: &'static str,
        status: &'static str,
    },
    #[error("{0}")]
    BadRequest(String),
    #[error("Internal error")]
    Internal,
    #[error("failed to read seed file: {0}")]
    SeedRead(#[source] std::io::Error),
    #[error("failed to parse seed file: {0}")]
    SeedParse(#[source] serde_yaml::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::MissingFields { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal | ApiError::SeedRead(_) | ApiError::SeedParse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let missing: &[String] = match &self {
            ApiError::MissingFields { fields } => fields,
            _ => &[],
        };
        let body = json!({
            "success": false,
            "message": self.to_string(),
            "missingFields": missing,
        });
        (self.status_code(), Json(body)).into_response()
    }
}
