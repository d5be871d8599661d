use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No active quiz found at the moment")]
    NoActiveQuiz,

    #[error("Failed to load quiz: {0}")]
    LoadFailure(String),

    #[error("Failed to submit result: {0}")]
    SubmissionFailure(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::NoActiveQuiz => "NO_ACTIVE_QUIZ",
            AppError::LoadFailure(_) => "LOAD_FAILURE",
            AppError::SubmissionFailure(_) => "SUBMISSION_FAILURE",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::InvalidAction(_) => "INVALID_ACTION",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Load errors the user can recover from by asking for a reload.
    pub fn is_retryable_load_error(&self) -> bool {
        matches!(self, AppError::NoActiveQuiz | AppError::LoadFailure(_))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::NoActiveQuiz => StatusCode::NOT_FOUND,
            AppError::LoadFailure(_) | AppError::SubmissionFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidAction(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.error_code(),
        })
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::LoadFailure(format!("malformed question list: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
