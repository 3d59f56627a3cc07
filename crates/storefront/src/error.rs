//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding. Route handlers return `Result<T, AppError>`; every
//! failure path maps to a distinguishable, actionable JSON message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::forms::FieldErrors;
use crate::services::cart::SlotError;
use crate::services::checkout::CheckoutError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Order placement failed.
    #[error("checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// The session-backed slot failed.
    #[error("session error: {0}")]
    Slot(#[from] SlotError),

    /// Field-level validation failure outside the checkout pipeline.
    #[error("invalid input: {0}")]
    Validation(FieldErrors),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Slot(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Checkout(err) => match err {
                CheckoutError::Unauthenticated => StatusCode::UNAUTHORIZED,
                CheckoutError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
                CheckoutError::OrderCreationFailed | CheckoutError::CartUnavailable(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Field errors travel in the body so the client can mark up the
        // form; internal details never leave the server.
        let body = match &self {
            Self::Checkout(CheckoutError::InvalidInput(fields)) | Self::Validation(fields) => {
                json!({
                    "error": "Please correct the highlighted fields",
                    "fields": fields,
                })
            }
            Self::Checkout(CheckoutError::Unauthenticated) => json!({
                "error": "Please sign in to place your order",
            }),
            Self::Checkout(CheckoutError::EmptyCart) => json!({
                "error": "Your cart is empty",
            }),
            Self::Checkout(CheckoutError::OrderCreationFailed | CheckoutError::CartUnavailable(_))
            | Self::Database(_)
            | Self::Slot(_) => json!({
                "error": "Something went wrong, please try again",
            }),
            Self::NotFound(what) => json!({ "error": format!("{what} not found") }),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => json!({ "error": msg }),
        };

        (status, Json(body)).into_response()
    }
}

impl AppError {
    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Slot(_)
                | Self::Checkout(
                    CheckoutError::OrderCreationFailed | CheckoutError::CartUnavailable(_)
                )
        ) || matches!(
            self,
            Self::Database(RepositoryError::Database(_) | RepositoryError::DataCorruption(_))
        )
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::forms::CheckoutForm;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn checkout_errors_map_to_distinct_statuses() {
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::Unauthenticated)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::EmptyCart)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::OrderCreationFailed)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_input_is_unprocessable() {
        let errors = CheckoutForm {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            postal_code: None,
            notes: None,
            payment_method: String::new(),
        }
        .validate()
        .expect_err("empty form must be invalid");

        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::InvalidInput(errors))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn session_slot_failures_surface_as_server_errors() {
        let err = AppError::Slot(crate::services::cart::SlotError(
            "store unreachable".to_owned(),
        ));
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_errors_are_unprocessable() {
        let errors = crate::models::forms::ContactForm {
            name: String::new(),
            email: String::new(),
            phone: None,
            message: String::new(),
        }
        .validate()
        .expect_err("empty contact form must be invalid");

        assert_eq!(
            status_of(AppError::Validation(errors)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            status_of(AppError::NotFound("order".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }
}
