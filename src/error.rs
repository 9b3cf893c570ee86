use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Error taxonomy for the API. Every handler failure is one of these and is
/// mapped to an HTTP status plus the `{status: "error", message, errors?}`
/// envelope at the response boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// Duplicate unique field (email, sweet name). The API reports these as
    /// 400 like any other bad request.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Access denied: admin role required")]
    Forbidden,

    #[error("Not enough stock. Only {available} items available")]
    InsufficientStock { available: i32 },

    #[error("Something went wrong")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::Conflict(_)
            | ApiError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the logs, never in the payload.
        if let ApiError::Internal(ref e) = self {
            error!(error = %e, "internal server error");
        }

        let errors = match &self {
            ApiError::Validation(fields) => Some(fields.clone()),
            _ => None,
        };

        let body = ErrorBody {
            status: "error",
            message: self.to_string(),
            errors,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            ApiError::Validation(vec!["name".into()]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("Sweet with this name already exists".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InsufficientStock { available: 3 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("Invalid credentials".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::NotFound("Sweet not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("db exploded")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn stock_error_names_available_quantity() {
        let e = ApiError::InsufficientStock { available: 7 };
        assert_eq!(e.to_string(), "Not enough stock. Only 7 items available");
    }

    #[test]
    fn internal_error_message_is_generic() {
        let e = ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3"));
        assert_eq!(e.to_string(), "Something went wrong");
    }

    #[test]
    fn validation_body_lists_failing_fields() {
        let body = ErrorBody {
            status: "error",
            message: "Validation failed".into(),
            errors: Some(vec!["Name is required".into(), "Invalid category".into()]),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"errors\""));
        assert!(json.contains("Invalid category"));
    }
}
