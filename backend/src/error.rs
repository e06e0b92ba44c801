use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Failures surfaced at the HTTP boundary. Every variant renders as
/// `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Model not loaded")]
    ModelUnavailable,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    ResultsUnavailable(String),
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::ModelUnavailable | ServiceError::ResultsUnavailable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

impl From<crate::normalize::CoercionError> for ServiceError {
    fn from(err: crate::normalize::CoercionError) -> Self {
        ServiceError::BadRequest(err.to_string())
    }
}

impl From<crate::results::ResultsError> for ServiceError {
    fn from(err: crate::results::ResultsError) -> Self {
        ServiceError::ResultsUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ServiceError::ModelUnavailable.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ServiceError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::ResultsUnavailable("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ServiceError::ModelUnavailable.to_string(), "Model not loaded");
    }
}
