use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::{
    checkout::{ApiError, Result, api::Json},
    config::{APPLE_PAY_DOMAIN_VAR, APPLE_PAY_KEY_ID_VAR},
    gateway::{
        IqProGateway, error::PayloadError, interaction_log::InteractionSpan,
        response::NormalizedResponse, transaction::MerchantValidationRequest,
    },
};

pub mod req {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct ValidateMerchant {
        #[serde(rename = "ValidationUrl")]
        pub validation_url: Option<String>,
    }
}

pub mod res {
    use serde::Serialize;

    /// Public values the Apple Pay widget needs to render
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WidgetConfig<'a> {
        pub key_id: &'a str,
        pub domain: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub public_key: Option<&'a str>,
    }
}

#[instrument(skip_all)]
pub async fn validate_merchant(
    State(gate): State<IqProGateway>,
    Json(request): Json<req::ValidateMerchant>,
) -> Result<NormalizedResponse> {
    let (api_key, forward) =
        MerchantValidationRequest::build(request.validation_url.as_deref(), gate.credentials())?;
    let mut span = InteractionSpan::enter("validate_merchant");
    let result = gate.validate_merchant(api_key, &forward, &mut span).await;
    span.finish();
    result.map_err(|e| ApiError::unreachable(e, None))
}

fn widget_config(gate: &IqProGateway) -> Result<axum::Json<res::WidgetConfig<'_>>> {
    let credentials = gate.credentials();
    let key_id = credentials
        .apple_pay_key_id
        .as_deref()
        .ok_or(PayloadError::MissingConfiguration(APPLE_PAY_KEY_ID_VAR))?;
    let domain = credentials
        .apple_pay_domain
        .as_deref()
        .ok_or(PayloadError::MissingConfiguration(APPLE_PAY_DOMAIN_VAR))?;
    Ok(axum::Json(res::WidgetConfig {
        key_id,
        domain,
        public_key: credentials.public_key.as_deref(),
    }))
}

/// Never cached, the values follow server configuration
pub async fn echo_verify(State(gate): State<IqProGateway>) -> Response {
    ([(header::CACHE_CONTROL, "no-store")], widget_config(&gate)).into_response()
}
