use axum::{http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::value::RawValue;

/// Raw processor reply as read off the wire
#[derive(Debug)]
pub struct GatewayReply {
    pub status: StatusCode,
    pub text: String,
}

/// Processor body. JSON is kept as the original text and serialized back byte for byte.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GatewayBody {
    Json(Box<RawValue>),
    Raw { raw: String },
}

impl GatewayBody {
    pub fn parse(text: String) -> Self {
        match RawValue::from_string(text.clone()) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Raw { raw: text },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Success,
    /// Non-2xx status from the processor
    GatewayError,
    /// 2xx status with a body that is not JSON
    MalformedResponse,
}

/// Uniform shape of every processor outcome that produced an HTTP response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResponse {
    pub ok: bool,
    pub http_status: u16,
    pub body: GatewayBody,
}

impl NormalizedResponse {
    pub fn kind(&self) -> ResponseKind {
        match (self.ok, &self.body) {
            (false, _) => ResponseKind::GatewayError,
            (true, GatewayBody::Raw { .. }) => ResponseKind::MalformedResponse,
            (true, GatewayBody::Json(_)) => ResponseKind::Success,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status).unwrap_or(StatusCode::BAD_GATEWAY)
    }
}

impl From<GatewayReply> for NormalizedResponse {
    fn from(GatewayReply { status, text }: GatewayReply) -> Self {
        Self {
            ok: status.is_success(),
            http_status: status.as_u16(),
            body: GatewayBody::parse(text),
        }
    }
}

/// Mirrors the processor status and body to the caller
impl IntoResponse for NormalizedResponse {
    fn into_response(self) -> axum::response::Response {
        (self.status(), axum::Json(self.body)).into_response()
    }
}
