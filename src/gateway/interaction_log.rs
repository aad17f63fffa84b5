use std::time::Instant;

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::gateway::mask;

#[derive(Debug, Serialize)]
struct Request {
    url: String,
    params: serde_json::Value,
}

/// Record of one processor call. Request and response are stored masked.
#[derive(Debug, Serialize)]
pub struct InteractionLog {
    gateway: &'static str,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    idempotency_key: Option<Uuid>,
    request: Option<Request>,
    status: Option<u16>,
    response: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    duration: f32,
}

#[cfg(test)]
impl InteractionLog {
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn request_params(&self) -> Option<&serde_json::Value> {
        self.request.as_ref().map(|r| &r.params)
    }
}

#[derive(Debug)]
pub struct InteractionSpan {
    kind: &'static str,
    created: Instant,
    created_at: OffsetDateTime,
    idempotency_key: Option<Uuid>,
    request: Option<Request>,
    response: Option<serde_json::Value>,
    response_status: Option<u16>,
    error: Option<String>,
}

impl InteractionSpan {
    pub fn enter(kind: &'static str) -> Self {
        Self {
            kind,
            created: Instant::now(),
            created_at: OffsetDateTime::now_utc(),
            idempotency_key: None,
            request: None,
            response: None,
            response_status: None,
            error: None,
        }
    }

    pub fn set_idempotency_key(&mut self, key: Uuid) {
        self.idempotency_key = Some(key);
    }

    /// Params are masked before they are stored
    pub fn set_request(&mut self, url: String, params: &impl Serialize) {
        let params = mask::secure_serializable(params);
        self.request = Some(Request { url, params });
    }

    pub fn set_response(&mut self, res: &impl Serialize) {
        self.response = Some(mask::secure_serializable(res));
    }

    pub fn set_response_status(&mut self, status: u16) {
        self.response_status = Some(status);
    }

    pub fn set_error(&mut self, error: &impl std::fmt::Display) {
        self.error = Some(error.to_string());
    }

    /// Close the span and emit it as a log event
    pub fn finish(self) -> InteractionLog {
        let log = InteractionLog {
            gateway: "iqpro",
            kind: self.kind,
            idempotency_key: self.idempotency_key,
            request: self.request,
            status: self.response_status,
            response: self.response,
            error: self.error,
            created_at: self.created_at,
            duration: self.created.elapsed().as_secs_f32(),
        };
        match serde_json::to_string(&log) {
            Ok(json) => tracing::debug!(kind = log.kind, interaction = %json, "Gateway interaction"),
            Err(e) => tracing::warn!("Failed to serialize gateway interaction log: {e}"),
        }
        log
    }
}
