use crate::models::chat::ValidationError;
use axum::http::StatusCode;
use thiserror::Error;

/// Message returned for failures whose detail must stay server-side.
pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    InvalidRequest(#[from] ValidationError),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Rate limit exceeded. Please try again in a few minutes.")]
    RateLimited,
    #[error("upstream returned status {status}")]
    Upstream {
        status: StatusCode,
    },
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Upstream { status } => *status,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the client is told. Validation failures are disclosed because
    /// naming the violated constraint is safe; upstream and internal detail
    /// is not.
    pub fn client_message(&self) -> String {
        match self {
            GatewayError::Upstream { .. } | GatewayError::Internal(_) =>
                GENERIC_ERROR.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_kinds_to_status_codes() {
        assert_eq!(
            GatewayError::InvalidRequest(ValidationError::TooManyMessages).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(GatewayError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(GatewayError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            (GatewayError::Upstream { status: StatusCode::SERVICE_UNAVAILABLE }).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            GatewayError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_and_internal_messages_stay_generic() {
        let upstream = GatewayError::Upstream { status: StatusCode::BAD_GATEWAY };
        assert_eq!(upstream.client_message(), GENERIC_ERROR);
        let internal = GatewayError::Internal("connection refused to 10.0.0.5".into());
        assert_eq!(internal.client_message(), GENERIC_ERROR);
    }

    #[test]
    fn validation_messages_name_the_constraint() {
        let err = GatewayError::InvalidRequest(ValidationError::InvalidRole);
        assert_eq!(err.client_message(), "Invalid message role");
    }
}
