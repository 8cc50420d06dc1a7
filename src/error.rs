use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;

use crate::models::ApiError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No eligible participants")]
    NoEligibleParticipants,

    #[error("No prizes available")]
    NoPrizesAvailable,

    #[error("State conflict: {0}")]
    StateConflict(String),

    #[error("Database error: {0}")]
    DatabaseError(DbErr),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        // 唯一索引冲突 (employee_code / email) 视为状态冲突而非 500
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                AppError::StateConflict(format!("Duplicate record: {detail}"))
            }
            _ => AppError::DatabaseError(err),
        }
    }
}

impl AppError {
    /// 对外暴露的错误码（前端据此区分错误类型）
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) | AppError::JwtError(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NoEligibleParticipants => "NO_ELIGIBLE_PARTICIPANTS",
            AppError::NoPrizesAvailable => "NO_PRIZES_AVAILABLE",
            AppError::StateConflict(_) => "STATE_CONFLICT",
            AppError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_)
            | AppError::NoEligibleParticipants
            | AppError::NoPrizesAvailable => StatusCode::BAD_REQUEST,
            AppError::StateConflict(_) => StatusCode::CONFLICT,
            AppError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Unauthorized(msg) => {
                log::warn!("Authentication error: {msg}");
                msg.clone()
            }
            AppError::JwtError(err) => {
                log::warn!("Invalid token: {err}");
                "Invalid access token".to_string()
            }
            AppError::InvalidInput(msg) => {
                log::warn!("Invalid input: {msg}");
                msg.clone()
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::NoEligibleParticipants | AppError::NoPrizesAvailable => {
                log::warn!("Raffle request rejected: {self}");
                self.to_string()
            }
            AppError::StateConflict(msg) => {
                log::warn!("State conflict: {msg}");
                msg.clone()
            }
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                msg.clone()
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            _ => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": ApiError {
                code: self.code().to_string(),
                message,
            }
        }))
    }
}
