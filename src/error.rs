use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::StorageError;

pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Errors surfaced by the discovery core
///
/// Every variant is local to a single request; none are retried internally.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Invalid coordinate: ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Bidder location not set; update your location before searching nearby job posts")]
    MissingLocation,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl DiscoveryError {
    /// Short machine-readable error code for response bodies
    pub fn code(&self) -> &'static str {
        match self {
            DiscoveryError::InvalidCoordinate { .. } => "invalid_coordinate",
            DiscoveryError::InvalidFilter(_) => "invalid_filter",
            DiscoveryError::NotAuthorized(_) => "not_authorized",
            DiscoveryError::MissingLocation => "missing_location",
            DiscoveryError::Storage(StorageError::Timeout(_)) => "storage_timeout",
            DiscoveryError::Storage(_) => "storage_error",
        }
    }
}

impl ResponseError for DiscoveryError {
    fn status_code(&self) -> StatusCode {
        match self {
            DiscoveryError::InvalidCoordinate { .. }
            | DiscoveryError::InvalidFilter(_)
            | DiscoveryError::MissingLocation => StatusCode::BAD_REQUEST,
            DiscoveryError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            DiscoveryError::Storage(StorageError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            DiscoveryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Storage details stay in the logs
        let message = match self {
            DiscoveryError::Storage(e) => {
                tracing::error!("Storage failure: {}", e);
                "Job post storage is unavailable".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message,
            status_code: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_client_errors_map_to_bad_request() {
        let err = DiscoveryError::InvalidCoordinate { latitude: 91.0, longitude: 0.0 };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(DiscoveryError::MissingLocation.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            DiscoveryError::InvalidFilter("radius".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_authorized_is_forbidden() {
        let err = DiscoveryError::NotAuthorized("bidders only".into());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.code(), "not_authorized");
    }

    #[test]
    fn test_storage_timeout_is_gateway_timeout() {
        let err = DiscoveryError::from(StorageError::Timeout(Duration::from_secs(3)));
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.code(), "storage_timeout");
    }
}
