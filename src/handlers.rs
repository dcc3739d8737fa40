pub mod delegates;
pub mod governments;
pub mod health;
pub mod persons;
pub mod products;
pub mod regions;
pub mod reports;
pub mod samples;
pub mod specialties;

use axum::{extract::Multipart, http::StatusCode, response::Json};
use sea_orm::SqlErr;
use services::{FilterMap, ServiceError};
use tracing::{error, warn};

use crate::schemas::{ErrorResponse, ListQuery};

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, code: &str, error: String) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error,
            code: code.to_string(),
            success: false,
        }),
    )
}

/// Maps a service failure onto its HTTP status and error code.
pub fn api_error(err: ServiceError) -> ApiError {
    let message = err.to_string();
    match err {
        ServiceError::Validation(_) => {
            warn!("Rejected request: {}", message);
            error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
        }
        ServiceError::InvalidArgument(_) => {
            warn!("Rejected request: {}", message);
            error_response(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", message)
        }
        ServiceError::Parse(_) => {
            warn!("Rejected payload: {}", message);
            error_response(StatusCode::BAD_REQUEST, "PARSE_ERROR", message)
        }
        ServiceError::NotFound { .. } => {
            warn!("{}", message);
            error_response(StatusCode::NOT_FOUND, "NOT_FOUND", message)
        }
        ServiceError::Conflict(_) => {
            warn!("{}", message);
            error_response(StatusCode::CONFLICT, "CONFLICT", message)
        }
        ServiceError::PasswordHash(_) => {
            error!("{}", message);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Could not store credentials".to_string(),
            )
        }
        ServiceError::Database(db_error) => match db_error.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                warn!("Store rejected duplicate: {}", message);
                error_response(StatusCode::CONFLICT, "CONFLICT", message)
            }
            _ => {
                error!("Database failure: {}", message);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database operation failed".to_string(),
                )
            }
        },
    }
}

/// Turns the raw query pairs of a list request into filters.
pub fn query_filters(pairs: Vec<(String, String)>) -> FilterMap {
    FilterMap::from_query_pairs(pairs, &ListQuery::RESERVED)
}

/// Reads the `file` field of an import upload.
pub async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            warn!("Failed to read multipart body: {}", e);
            error_response(StatusCode::BAD_REQUEST, "INVALID_UPLOAD", e.to_string())
        })?;
        let Some(field) = field else {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "INVALID_UPLOAD",
                "Missing 'file' field".to_string(),
            ));
        };
        if field.name() != Some("file") {
            continue;
        }
        let bytes = field.bytes().await.map_err(|e| {
            warn!("Failed to read upload bytes: {}", e);
            error_response(StatusCode::BAD_REQUEST, "INVALID_UPLOAD", e.to_string())
        })?;
        return Ok(bytes.to_vec());
    }
}
