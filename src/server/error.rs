//! API error responses.
//!
//! Every error body has the shape `{"detail": ...}`, where `detail` is a
//! message or a list of field errors.

use crate::item::{FieldError, ValidationError};
use crate::services::ServiceError;
use crate::tasks::TaskError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Body of an error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Debug, Clone, Serialize)]
struct ErrorBody {
    detail: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: ErrorDetail,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            detail: ErrorDetail::Message(message.into()),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    #[must_use]
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    #[must_use]
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: ErrorDetail::Fields(errors),
        }
    }

    /// Log `source` and hide it from the client.
    pub fn internal(source: &dyn std::error::Error) -> Self {
        error!(error = %source, "Internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        Self::validation(error.errors)
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Validation(e) => e.into(),
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::Task(e) => e.into(),
            ServiceError::Store(_) | ServiceError::Mirror(_) | ServiceError::Storage(_) => {
                Self::internal(&error)
            }
        }
    }
}

impl From<TaskError> for ApiError {
    fn from(error: TaskError) -> Self {
        match error {
            TaskError::InvalidRequest(_) => Self::forbidden(error.to_string()),
            TaskError::UnknownFunction { .. } => Self::not_found(error.to_string()),
            TaskError::InvalidArguments(_) => Self::unprocessable(error.to_string()),
            TaskError::Handler(_) | TaskError::Serialization(_) | TaskError::Delivery(_) => {
                Self::internal(&error)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
