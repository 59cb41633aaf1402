//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tenantgate_core::error::GateError;
use tracing::error;

/// JSON body of every error response.
///
/// ```json
/// { "error": "locked_out", "message": "...", "timeLeft": 29 }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Whole minutes until a locked-out login may retry.
    #[serde(rename = "timeLeft", skip_serializing_if = "Option::is_none")]
    pub time_left: Option<i64>,
    /// Login attempts still admitted before lockout.
    #[serde(rename = "attemptsLeft", skip_serializing_if = "Option::is_none")]
    pub attempts_left: Option<u32>,
}

/// Wrapper turning [`GateError`] into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub GateError);

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            GateError::NotFound { .. }
            | GateError::Malformed { .. }
            | GateError::Validation { .. }
            | GateError::InvalidIdentifier { .. } => StatusCode::BAD_REQUEST,
            GateError::LockedOut { .. } => StatusCode::TOO_MANY_REQUESTS,
            GateError::InvalidCredentials | GateError::Unauthorized => StatusCode::UNAUTHORIZED,
            GateError::DuplicateTenant { .. } | GateError::DuplicateUser { .. } => {
                StatusCode::CONFLICT
            }
            GateError::Connection(_)
            | GateError::StorageCreationFailed { .. }
            | GateError::PersistenceFailed { .. }
            | GateError::MigrationFailed { .. }
            | GateError::PartialProvisioning { .. }
            | GateError::Database(_)
            | GateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Respond with an `attemptsLeft` hint for a failed login.
    pub fn with_attempts_left(self, attempts_left: u32) -> Response {
        let mut body = self.body();
        body.attempts_left = Some(attempts_left);
        (self.status_code(), Json(body)).into_response()
    }

    fn body(&self) -> ErrorResponse {
        let time_left = match &self.0 {
            GateError::LockedOut { remaining_secs } => Some((*remaining_secs + 59) / 60),
            _ => None,
        };
        // Server-side details stay in the logs.
        let message = if self.0.is_client_error() {
            self.0.to_string()
        } else {
            "Something went wrong".to_string()
        };
        ErrorResponse {
            error: self.0.kind().to_string(),
            message,
            time_left,
            attempts_left: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(kind = self.0.kind(), error = %self.0, "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_errors_map_to_bad_request() {
        let not_found = ApiError(GateError::NotFound {
            identifier: "acme".into(),
        });
        let malformed = ApiError(GateError::Malformed {
            host: "example.com".into(),
        });
        assert_eq!(not_found.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(malformed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(GateError::Connection("refused".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn lockout_reports_minutes_left() {
        let err = ApiError(GateError::LockedOut {
            remaining_secs: 29 * 60 + 10,
        });
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        let json = serde_json::to_value(err.body()).unwrap();
        assert_eq!(json["error"], "locked_out");
        assert_eq!(json["timeLeft"], 30);
    }

    #[test]
    fn server_errors_hide_details() {
        let err = ApiError(GateError::PartialProvisioning {
            identifier: "acme".into(),
            descriptor: "endpoint=ws://db:8000 ns=tenants db=acme".into(),
            reason: "write failed".into(),
        });
        let body = err.body();
        assert_eq!(body.error, "partial_provisioning");
        assert!(!body.message.contains("ws://"));
        assert!(body.time_left.is_none());
    }

    #[test]
    fn duplicates_conflict() {
        assert_eq!(
            ApiError(GateError::DuplicateTenant {
                identifier: "acme".into()
            })
            .status_code(),
            StatusCode::CONFLICT
        );
    }
}
