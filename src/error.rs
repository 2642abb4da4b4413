use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse};
use thiserror::Error;

use crate::core::progress::ProgressError;
use crate::models::ErrorResponse;
use crate::services::{
    CacheError, DistanceError, PostgresError, SettingsError, SpreadsheetError, WorkbookError,
};

/// Error returned by every handler, rendered as an `ErrorResponse` body
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    BadGateway(String),
}

impl ApiError {
    pub fn not_found(entity: &str) -> Self {
        ApiError::NotFound(format!("{} not found", entity))
    }

    fn label(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "Bad request",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::Forbidden(_) => "Forbidden",
            ApiError::NotFound(_) => "Not found",
            ApiError::Internal(_) => "Internal server error",
            ApiError::BadGateway(_) => "Upstream service error",
        }
    }
}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.label().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

impl From<PostgresError> for ApiError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            PostgresError::InvalidInput(message) => ApiError::BadRequest(message),
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::Internal(format!("Database error: {}", other))
            }
        }
    }
}

impl From<DistanceError> for ApiError {
    fn from(err: DistanceError) -> Self {
        match err {
            DistanceError::MissingApiKey => {
                ApiError::Internal("Google Maps API key is not configured".to_string())
            }
            other => {
                tracing::error!("Distance lookup failed: {}", other);
                ApiError::BadGateway(other.to_string())
            }
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        tracing::error!("Cache error: {}", err);
        ApiError::Internal(err.to_string())
    }
}

impl From<WorkbookError> for ApiError {
    fn from(err: WorkbookError) -> Self {
        tracing::warn!("Rejected workbook upload: {}", err);
        ApiError::BadRequest(err.to_string())
    }
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::NotAnObject => ApiError::BadRequest(err.to_string()),
            other => {
                tracing::error!("Settings store error: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<SpreadsheetError> for ApiError {
    fn from(err: SpreadsheetError) -> Self {
        match err {
            SpreadsheetError::MissingId => ApiError::BadRequest(err.to_string()),
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

impl From<ProgressError> for ApiError {
    fn from(err: ProgressError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        tracing::info!("Validation failed: {:?}", errors);
        ApiError::BadRequest(validation_message(&errors))
    }
}

/// First message of each failing field, e.g. "Name is required"
fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages.join(", ")
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::BadRequest(format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    ApiError::BadRequest(format!("Invalid query: {}", err)).into()
}

/// Handle malformed path parameters such as a non-numeric id
pub fn handle_path_error(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Path error on {}: {}", req.path(), err);
    ApiError::BadRequest(format!("Invalid path: {}", err)).into()
}
