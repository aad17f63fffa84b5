//! Test fixtures: fake credentials, a sample Apple Pay token and a local
//! processor that records what it receives.

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
};
use serde_json::{Value, json};

use crate::config::{ApiKey, GatewayCredentials};

pub fn credentials(base_url: &str) -> GatewayCredentials {
    GatewayCredentials {
        api_base_url: base_url.trim_end_matches('/').to_string(),
        api_key: Some(ApiKey::new("test-api-key").unwrap()),
        apple_pay_key_id: Some("applepay-key-id".into()),
        apple_pay_domain: Some("shop.example.com".into()),
        public_key: Some("pub_test".into()),
        default_currency: "USD".into(),
        transaction_path: "/api/transactions".into(),
    }
}

pub fn sample_apple_token() -> Value {
    json!({
        "paymentData": {
            "data": "ZW5jcnlwdGVkLXBheW1lbnQtZGF0YQ==",
            "signature": "c2lnbmF0dXJlLWJ5dGVz",
            "header": {
                "publicKeyHash": "LbsUwAT6w1JV9tFXocU813TCHks+LSuFF0R/eBkrWnQ=",
                "ephemeralPublicKey": "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE",
                "transactionId": "d3b28af5ae40e4ee1c64e3b8b7a0bd4e"
            },
            "version": "EC_v1"
        },
        "paymentMethod": {
            "displayName": "Visa 0492",
            "network": "Visa",
            "type": "debit"
        },
        "transactionIdentifier": "D3B28AF5AE40E4EE1C64E3B8B7A0BD4E"
    })
}

/// Url of a local port nothing listens on
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Url of a local listener that accepts connections and never answers
pub async fn silent_processor_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub idempotency_key: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: &'static str,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Processor stand-in answering every request with a fixed status and body
pub struct MockProcessor {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockProcessor {
    pub async fn start(status: StatusCode, body: &'static str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            body,
            requests: requests.clone(),
        };
        let app = axum::Router::new().fallback(record).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn record(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let get = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let request = RecordedRequest {
        path: uri.path().to_string(),
        authorization: get(header::AUTHORIZATION),
        idempotency_key: get(header::HeaderName::from_static("idempotency-key")),
        content_type: get(header::CONTENT_TYPE),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    state.requests.lock().unwrap().push(request);
    (state.status, state.body)
}
