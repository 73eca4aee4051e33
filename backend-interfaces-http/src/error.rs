use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use backend_application::AppError;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("too many requests")]
    RateLimited { retry_after_secs: u64 },
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error(transparent)]
    Internal(anyhow::Error),
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        match value {
            AppError::BadRequest(msg) => HttpError::BadRequest(msg),
            AppError::NotFound(msg) => HttpError::NotFound(msg),
            AppError::RateLimited { retry_after_secs } => {
                HttpError::RateLimited { retry_after_secs }
            }
            AppError::Internal(err) => HttpError::Internal(err),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
}

impl ErrorBody {
    fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
            request_id: None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            HttpError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, Json(ErrorBody::new("Unauthorized"))).into_response()
            }
            HttpError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody::new(&msg))).into_response()
            }
            HttpError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(ErrorBody::new(&msg))).into_response()
            }
            HttpError::RateLimited { retry_after_secs } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorBody::new("Too many requests. Please try again later.")),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                response
            }
            HttpError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(ErrorBody::new("Method not allowed")),
            )
                .into_response(),
            HttpError::Internal(err) => {
                let request_id = Uuid::new_v4().to_string();
                error!(request_id = %request_id, "request failed: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "Internal server error".to_string(),
                        request_id: Some(request_id),
                    }),
                )
                    .into_response()
            }
        }
    }
}
