use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::utils::{error_codes, error_to_api_response};

/// A single failed form field, echoed back so the client can re-render the
/// form with the original input.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    NotFound(&'static str),
    Validation(Vec<FieldError>),
    AlreadyExists(&'static str),
    Unauthorized,
    Database(sqlx::Error),
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Not found"),
            other => AppError::Database(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Validation failures echo the failed fields so the client can
        // re-render the form with the original input.
        if let AppError::Validation(fields) = self {
            let body = axum::Json(crate::utils::ApiResponse {
                code: error_codes::VALIDATION_ERROR,
                msg: "Validation failed".to_string(),
                resp_data: Some(fields),
            });
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let (status, code, message) = match &self {
            AppError::NotFound(what) => {
                (StatusCode::NOT_FOUND, error_codes::NOT_FOUND, (*what).to_string())
            }
            AppError::Validation(_) => unreachable!(),
            AppError::AlreadyExists(what) => (
                StatusCode::CONFLICT,
                error_codes::ALREADY_EXISTS,
                (*what).to_string(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTH_FAILED,
                "Authentication required".to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, error_to_api_response::<()>(code, message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn validation_response_is_bad_request() {
        let resp = AppError::Validation(vec![FieldError::new("text", "too short")])
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
