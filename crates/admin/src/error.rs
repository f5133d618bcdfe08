//! Unified error handling for the installation server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::shopify::oauth::OAuthError;

/// Application-level error type for the installation server.
///
/// Responses carry a plain-text message and a status code.
#[derive(Debug, Error)]
pub enum AppError {
    /// Token exchange or authorization URL construction failed.
    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),

    /// Callback signature did not verify.
    #[error("Invalid HMAC signature")]
    InvalidSignature,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::OAuth(OAuthError::InvalidShop(_)) | Self::BadRequest(_) | Self::InvalidSignature => {
                StatusCode::BAD_REQUEST
            }
            Self::OAuth(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Install request error"
            );
        } else {
            tracing::warn!(error = %self, "Rejected install request");
        }

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_helper_core::ShopDomainError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("Missing shop parameter".to_string());
        assert_eq!(err.to_string(), "Bad request: Missing shop parameter");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(AppError::InvalidSignature), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(AppError::OAuth(OAuthError::InvalidShop(ShopDomainError::Empty))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::OAuth(OAuthError::MissingToken)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::OAuth(OAuthError::Exchange {
                status: 400,
                body: "invalid_request".to_string(),
            })),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
