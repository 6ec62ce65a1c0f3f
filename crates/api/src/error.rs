//! API error types with HTTP response mapping.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, RsvpError, ValidationError};
use guest_store::StoreError;
use serde_json::json;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Request fields failed validation.
    Validation(ValidationError),
    /// Domain logic error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, detail(msg)),
            ApiError::Validation(err) => (StatusCode::BAD_REQUEST, validation_body(&err)),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn detail(message: impl Into<String>) -> serde_json::Value {
    json!({ "detail": message.into() })
}

fn validation_body(err: &ValidationError) -> serde_json::Value {
    let errors: Vec<_> = err
        .errors
        .iter()
        .map(|e| json!({ "field": e.field, "message": e.message }))
        .collect();
    json!({ "detail": "Validation failed", "errors": errors })
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, serde_json::Value) {
    match &err {
        DomainError::Rsvp(rsvp_err) => match rsvp_err {
            RsvpError::GuestNotFound { .. } => (StatusCode::NOT_FOUND, detail("Guest not found")),
            RsvpError::AlreadyDecided { .. } => {
                (StatusCode::CONFLICT, detail(rsvp_err.to_string()))
            }
            RsvpError::DisallowedGuests { .. } => {
                (StatusCode::BAD_REQUEST, detail(rsvp_err.to_string()))
            }
        },
        DomainError::Store(StoreError::GuestNotFound(_)) => {
            (StatusCode::NOT_FOUND, detail("Guest not found"))
        }
        DomainError::Store(conflict @ StoreError::ConcurrencyConflict { .. }) => {
            (StatusCode::CONFLICT, detail(conflict.to_string()))
        }
        DomainError::Store(_) => {
            tracing::error!(error = %err, "datastore failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                detail("Internal server error"),
            )
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
