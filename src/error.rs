use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repositories::RepositoryError;
use crate::services::{
    AuthServiceError, FeeServiceError, LedgerServiceError, ReportServiceError, UserServiceError,
};

pub type Result<T> = std::result::Result<T, AppError>;

/// Request-level error taxonomy. Every failure surfaces as a JSON message
/// with a status code; nothing here is fatal to the process.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn unauthenticated() -> Self {
        AppError::Unauthorized("Authentication required".to_string())
    }

    pub fn access_denied() -> Self {
        AppError::Forbidden("Access denied: you do not have permission to view this page".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Database(e) => {
                tracing::error!("database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn from_repository(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Record not found".to_string()),
        RepositoryError::AlreadyExists => AppError::Conflict("Record already exists".to_string()),
        RepositoryError::Database(e) => AppError::Database(e),
    }
}

impl From<AuthServiceError> for AppError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::InvalidCredentials | AuthServiceError::TrialExpired => {
                AppError::Unauthorized(err.to_string())
            }
            AuthServiceError::MalformedTrialWindow => AppError::Internal(err.to_string()),
            AuthServiceError::Repository(e) => from_repository(e),
        }
    }
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::MissingFields
            | UserServiceError::InvalidEmail
            | UserServiceError::PasswordMismatch
            | UserServiceError::SchoolNameRequired
            | UserServiceError::EmailTaken
            | UserServiceError::UsernameTaken => AppError::Validation(err.to_string()),
            UserServiceError::ProtectedAccount
            | UserServiceError::CannotDeleteSelf
            | UserServiceError::NotPermitted => AppError::Forbidden(err.to_string()),
            UserServiceError::UserNotFound => AppError::NotFound(err.to_string()),
            UserServiceError::HashingError(_) => AppError::Internal(err.to_string()),
            UserServiceError::Repository(e) => from_repository(e),
        }
    }
}

impl From<LedgerServiceError> for AppError {
    fn from(err: LedgerServiceError) -> Self {
        match err {
            LedgerServiceError::MissingFields
            | LedgerServiceError::UnknownMonth(_)
            | LedgerServiceError::NoMonthSelected => AppError::Validation(err.to_string()),
            LedgerServiceError::MonthAlreadyPaid(_)
            | LedgerServiceError::AnnualAlreadyPaid
            | LedgerServiceError::AdmissionAlreadyPaid => AppError::Conflict(err.to_string()),
            LedgerServiceError::RecordNotFound => AppError::NotFound(err.to_string()),
            LedgerServiceError::Repository(e) => from_repository(e),
        }
    }
}

impl From<FeeServiceError> for AppError {
    fn from(err: FeeServiceError) -> Self {
        match err {
            FeeServiceError::MissingFields => AppError::Validation(err.to_string()),
            FeeServiceError::ProfileNotFound => AppError::NotFound(err.to_string()),
            FeeServiceError::Repository(e) => from_repository(e),
        }
    }
}

impl From<ReportServiceError> for AppError {
    fn from(err: ReportServiceError) -> Self {
        match err {
            ReportServiceError::UnknownMonth(_) => AppError::Validation(err.to_string()),
            ReportServiceError::NoRecords => AppError::NotFound(err.to_string()),
            ReportServiceError::Repository(e) => from_repository(e),
        }
    }
}
