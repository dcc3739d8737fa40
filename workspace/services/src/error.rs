use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::error;

/// Error types for the services crate
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Malformed or missing input, rejected before any mutation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A discriminator or selector outside its allowed values
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced row does not exist
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// Duplicate of an existing row
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unsupported import format or unreadable payload
    #[error("Parse error: {0}")]
    Parse(String),

    /// The password could not be hashed
    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        ServiceError::NotFound { entity, id }
    }

    /// Maps a failed insert/update, turning store uniqueness violations into `Conflict`.
    pub fn from_write(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                ServiceError::Conflict(format!("Unique constraint violated: {}", detail))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                ServiceError::Conflict(format!("Foreign key constraint violated: {}", detail))
            }
            _ => ServiceError::Database(err),
        }
    }
}

impl From<csv::Error> for ServiceError {
    fn from(err: csv::Error) -> Self {
        let service_error = match err.kind() {
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => {
                let line = pos.as_ref().map(|p| p.line()).unwrap_or(0);
                ServiceError::Parse(format!(
                    "Row on line {} has {} fields, expected {}",
                    line, len, expected_len
                ))
            }
            csv::ErrorKind::Utf8 { .. } => {
                ServiceError::Parse(format!("Payload is not valid UTF-8: {}", err))
            }
            _ => ServiceError::Parse(format!("Malformed CSV: {}", err)),
        };
        error!(?service_error, "CSV parsing failed");
        service_error
    }
}

/// Type alias for Result with ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;
