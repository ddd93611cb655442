use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Every failure a handler can report. Rendered as `{"error": ..., "code": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("JSON body required")]
    InvalidRequest,

    #[error("{0}")]
    MissingFields(&'static str),

    #[error("Note is required")]
    MissingNote,

    #[error("Note must be at least 50 characters")]
    NoteTooShort,

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Mood must be at most 50 characters")]
    MoodTooLong,

    #[error("Invalid date format (ISO 8601 expected)")]
    InvalidDate,

    #[error("Email already exists")]
    EmailExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    AuthRequired,

    #[error("Token expired")]
    AuthExpired,

    #[error("Invalid token")]
    AuthInvalid,

    #[error("User not found")]
    UserNotFound,

    #[error("Entry not found")]
    EntryNotFound,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest
            | Self::MissingFields(_)
            | Self::MissingNote
            | Self::NoteTooShort
            | Self::InvalidEmail
            | Self::MoodTooLong
            | Self::InvalidDate
            | Self::EmailExists => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::AuthRequired | Self::AuthExpired | Self::AuthInvalid => {
                StatusCode::UNAUTHORIZED
            }
            Self::UserNotFound | Self::EntryNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::MissingFields(_) => "MISSING_FIELDS",
            Self::MissingNote => "MISSING_NOTE",
            Self::NoteTooShort => "NOTE_TOO_SHORT",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::MoodTooLong => "MOOD_TOO_LONG",
            Self::InvalidDate => "INVALID_DATE",
            Self::EmailExists => "EMAIL_EXISTS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::AuthExpired => "AUTH_EXPIRED",
            Self::AuthInvalid => "AUTH_INVALID",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::EntryNotFound => "ENTRY_NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(e) = &self {
            error!(error = ?e, "internal error");
        }
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code(),
        };
        (self.status(), Json(body)).into_response()
    }
}
