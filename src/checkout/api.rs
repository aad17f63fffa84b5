use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    checkout::{
        ApiError, Result, applepay,
        request::TransactionEnvelope,
        token::{self, PaymentSource},
    },
    gateway::{
        IqProGateway, interaction_log::InteractionSpan, mask, response::NormalizedResponse,
        transaction::OutboundTransaction,
    },
    state::AppState,
};

/// Validate, reshape and forward one transaction, then relay the processor reply
#[instrument(skip_all)]
pub async fn transaction(
    State(gate): State<IqProGateway>,
    Json(body): Json<Value>,
) -> Result<NormalizedResponse> {
    let source = token::extract(&body);
    let transaction = OutboundTransaction::build(
        TransactionEnvelope::from_body(&body),
        source.as_ref(),
        gate.credentials(),
    )?;
    let method = match &source {
        Ok(PaymentSource::ApplePay(_)) => "apple_pay_token",
        _ => "temporary_token",
    };

    let idempotency_key = Uuid::new_v4();
    let mut span = InteractionSpan::enter("transaction");
    let result = gate
        .submit_transaction(&transaction, idempotency_key, &mut span)
        .await;
    span.finish();

    let payload = &transaction.payload;
    match result {
        Ok(response) => {
            tracing::info!(
                kind = %payload.kind,
                amount = payload.amount,
                currency = payload.currency,
                method,
                status = response.http_status,
                %idempotency_key,
                "Transaction forwarded"
            );
            Ok(response)
        }
        Err(e) => Err(ApiError::unreachable(e, Some(idempotency_key))),
    }
}

/// Acknowledges the wallet authorization event sent by the widget auto-pay hook
#[instrument(skip_all)]
pub async fn checkout(Json(event): Json<Value>) -> axum::Json<Value> {
    tracing::info!(data = %mask::secure_value(&event), "Received Apple Pay authorization event");
    axum::Json(json!({ "status": "success" }))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/transaction", post(transaction))
        .route("/checkout", post(checkout))
        .route("/echo-verify", get(applepay::echo_verify))
        .route(
            "/public/applepay/validatemerchant",
            post(applepay::validate_merchant),
        )
        .method_not_allowed_fallback(method_not_allowed)
}

/// `Json` extractor that accepts any content type and reports failures as [ApiError]
pub struct Json<T>(pub T);

impl<S, T> axum::extract::FromRequest<S> for Json<T>
where
    T: serde::de::DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::MalformedRequest(e.body_text()))?;
        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| ApiError::MalformedRequest(e.to_string()))
    }
}
