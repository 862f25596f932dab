use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Errors surfaced by the generation and listing endpoints.
///
/// Validation problems are the caller's fault and keep their message;
/// encoding, rendering and storage failures are logged in full on the server
/// and reported to the client as a generic 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("QR payload encoding failed")]
    Encoding(#[source] anyhow::Error),

    #[error("QR image rendering failed")]
    Render(#[source] anyhow::Error),

    #[error("storage failure")]
    Storage(#[source] anyhow::Error),

    #[error("{0} not found")]
    NotFound(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Encoding(_) | ApiError::Render(_) | ApiError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": msg,
            })),
            ApiError::Unauthorized => HttpResponse::Unauthorized()
                .insert_header(("WWW-Authenticate", "Basic realm=\"promptpay\""))
                .json(serde_json::json!({
                    "success": false,
                    "error": "unauthorized",
                })),
            ApiError::Encoding(e) | ApiError::Render(e) | ApiError::Storage(e) => {
                // Full cause stays in the server log; the client only sees a
                // generic message.
                log::error!("{}: {:#}", self, e);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "success": false,
                    "error": "internal server error",
                }))
            }
            ApiError::NotFound(what) => HttpResponse::NotFound().json(serde_json::json!({
                "success": false,
                "error": format!("{} not found", what),
            })),
        }
    }
}
