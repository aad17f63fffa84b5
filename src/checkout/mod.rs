use axum::{http::StatusCode, response::IntoResponse};
use serde::Serialize;
use uuid::Uuid;

use crate::gateway::error::{GatewayError, PayloadError};

pub mod api;
/// Apple Pay merchant validation and widget configuration
pub mod applepay;
pub mod request;
pub mod token;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Error returned to the caller as `{ "error": "..." }`
#[derive(Debug)]
pub enum ApiError {
    /// Rejected before any processor call
    Payload(PayloadError),
    /// Inbound body is not JSON
    MalformedRequest(String),
    GatewayUnreachable {
        reason: String,
        idempotency_key: Option<Uuid>,
    },
    MethodNotAllowed,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "idempotencyKey", skip_serializing_if = "Option::is_none")]
    idempotency_key: Option<Uuid>,
}

impl ApiError {
    pub fn unreachable(error: GatewayError, idempotency_key: Option<Uuid>) -> Self {
        Self::GatewayUnreachable {
            reason: error.to_string(),
            idempotency_key,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Payload(PayloadError::MissingConfiguration(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Payload(_) => StatusCode::BAD_REQUEST,
            ApiError::MalformedRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::GatewayUnreachable { .. } => StatusCode::BAD_GATEWAY,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl From<PayloadError> for ApiError {
    fn from(value: PayloadError) -> Self {
        Self::Payload(value)
    }
}

impl std::error::Error for ApiError {}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Payload(e) => e.fmt(f),
            ApiError::MalformedRequest(e) => write!(f, "invalid request body: {e}"),
            ApiError::GatewayUnreachable { reason, .. } => f.write_str(reason),
            ApiError::MethodNotAllowed => f.write_str("Method not allowed"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, "Request failed: {self}");
        } else {
            tracing::info!(%status, "Request rejected: {self}");
        }
        let idempotency_key = match &self {
            ApiError::GatewayUnreachable {
                idempotency_key, ..
            } => *idempotency_key,
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            idempotency_key,
        };
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::json;

    use super::*;

    async fn render(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn caller_errors_are_bad_request() {
        let (status, body) = render(PayloadError::InvalidAmount.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "error": "amount (positive integer, minor units) is required" })
        );

        let (status, _) = render(PayloadError::MissingPaymentToken("x".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn configuration_errors_are_server_errors() {
        let (status, body) =
            render(PayloadError::MissingConfiguration("IQPRO_API_KEY").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "server is missing configuration: IQPRO_API_KEY");
    }

    #[tokio::test]
    async fn unreachable_carries_idempotency_key() {
        let error = ApiError::GatewayUnreachable {
            reason: "payment gateway did not respond in time".into(),
            idempotency_key: Some(Uuid::nil()),
        };
        let (status, body) = render(error).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body,
            json!({
                "error": "payment gateway did not respond in time",
                "idempotencyKey": "00000000-0000-0000-0000-000000000000"
            })
        );
    }
}
