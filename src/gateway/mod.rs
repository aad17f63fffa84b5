use std::{sync::Arc, time::Duration};

use axum::http::HeaderMap;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::{ApiKey, GatewayCredentials},
    gateway::{
        auth::{authenticated_headers, idempotent_headers},
        error::GatewayError,
        interaction_log::InteractionSpan,
        response::{GatewayReply, NormalizedResponse, ResponseKind},
        transaction::{MerchantValidationRequest, OutboundTransaction},
    },
};

mod auth;
pub mod error;
/// Payload construction and validation
mod from;
pub mod interaction_log;
/// Sensitive value masking for logs
pub mod mask;
/// Processor reply normalization
pub mod response;
/// Processor request schema
pub mod transaction;

pub type Result<T> = std::result::Result<T, GatewayError>;

const MERCHANT_VALIDATION_PATH: &str = "/api/public/applepay/validatemerchant";

/// IQPro transactions API client
#[derive(Debug, Clone)]
pub struct IqProGateway {
    client: reqwest::Client,
    credentials: Arc<GatewayCredentials>,
}

impl IqProGateway {
    pub fn new(credentials: Arc<GatewayCredentials>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    pub fn credentials(&self) -> &GatewayCredentials {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.credentials.api_base_url, path)
    }

    /// Submit a validated transaction. Exactly one attempt is made.
    pub async fn submit_transaction(
        &self,
        transaction: &OutboundTransaction<'_>,
        idempotency_key: Uuid,
        span: &mut InteractionSpan,
    ) -> Result<NormalizedResponse> {
        let url = self.url(&self.credentials.transaction_path);
        let secured_request = mask::secure_serializable(&transaction.payload);
        tracing::debug!(%url, %idempotency_key, data = %secured_request, "Gateway API transaction request");
        span.set_request(url.clone(), &secured_request);
        span.set_idempotency_key(idempotency_key);

        let headers = idempotent_headers(transaction.api_key, idempotency_key);
        let response = self
            .post(url, headers, &transaction.payload, span)
            .await
            .inspect_err(|e| {
                if e.outcome_unknown() {
                    tracing::error!(
                        %idempotency_key,
                        "Transaction may have been processed, outcome unknown: {e}"
                    );
                }
            })?;
        tracing::debug!(
            status = response.http_status,
            data = %mask::secure_serializable(&response.body),
            "Gateway API transaction response"
        );
        Ok(response)
    }

    /// Forward an Apple Pay merchant validation request
    pub async fn validate_merchant(
        &self,
        api_key: &ApiKey,
        request: &MerchantValidationRequest<'_>,
        span: &mut InteractionSpan,
    ) -> Result<NormalizedResponse> {
        let url = self.url(MERCHANT_VALIDATION_PATH);
        tracing::debug!(%url, data = ?request, "Gateway API merchant validation request");
        span.set_request(url.clone(), request);
        let response = self
            .post(url, authenticated_headers(api_key), request, span)
            .await?;
        tracing::debug!(
            status = response.http_status,
            "Gateway API merchant validation response"
        );
        Ok(response)
    }

    async fn post(
        &self,
        url: String,
        headers: HeaderMap,
        body: &impl Serialize,
        span: &mut InteractionSpan,
    ) -> Result<NormalizedResponse> {
        let result = async {
            let res = self
                .client
                .post(url)
                .headers(headers)
                .json(body)
                .send()
                .await
                .map_err(GatewayError::Unreachable)?;
            let status = res.status();
            span.set_response_status(status.as_u16());
            let text = res
                .text()
                .await
                .map_err(GatewayError::ResponseInterrupted)?;
            Ok::<_, GatewayError>(NormalizedResponse::from(GatewayReply { status, text }))
        }
        .await;

        match &result {
            Ok(response) => {
                span.set_response(&response.body);
                match response.kind() {
                    ResponseKind::Success => {}
                    ResponseKind::MalformedResponse => {
                        tracing::warn!(status = response.http_status, "Gateway responded with a non JSON body")
                    }
                    ResponseKind::GatewayError => {
                        tracing::warn!(status = response.http_status, "Gateway responded with an error status")
                    }
                }
            }
            Err(e) => {
                span.set_error(e);
                tracing::error!(timeout = e.is_timeout(), "Gateway request failed: {e}");
            }
        }
        result
    }
}
