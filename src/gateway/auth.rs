use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use axum_extra::headers::{self, HeaderMapExt};
use uuid::Uuid;

use crate::config::ApiKey;

pub const IDEMPOTENCY_KEY: HeaderName = HeaderName::from_static("idempotency-key");

/// The processor takes the raw secret key, without a `Bearer` prefix
pub fn authenticated_headers(api_key: &ApiKey) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(header::AUTHORIZATION, api_key.header_value());
    map.typed_insert(headers::ContentType::json());
    map
}

pub fn idempotent_headers(api_key: &ApiKey, key: Uuid) -> HeaderMap {
    let mut map = authenticated_headers(api_key);
    map.insert(
        IDEMPOTENCY_KEY,
        HeaderValue::from_str(&key.to_string()).expect("uuid is ascii"),
    );
    map
}
