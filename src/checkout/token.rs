//! Payment method extraction from the inbound request body.
//!
//! Different widget and client versions put the Apple Pay token in different
//! places. Candidates are probed in a fixed order and the first one present
//! (not missing and not `null`) wins:
//!
//! 1. `payment_method.apple_pay_token`
//! 2. `payment_method.applepay.token`
//! 3. `appleToken`
//! 4. `authorizationEvent.payment.token`
//! 5. `temporary_token`
//! 6. `apple_pay_temporary_token`
//!
//! A present candidate with the wrong shape is reported as is. It does not
//! fall through to the next candidate.

use std::fmt::Display;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CandidateKind {
    ApplePay,
    Temporary,
}

const CANDIDATES: &[(&str, CandidateKind)] = &[
    ("/payment_method/apple_pay_token", CandidateKind::ApplePay),
    ("/payment_method/applepay/token", CandidateKind::ApplePay),
    ("/appleToken", CandidateKind::ApplePay),
    ("/authorizationEvent/payment/token", CandidateKind::ApplePay),
    ("/temporary_token", CandidateKind::Temporary),
    ("/apple_pay_temporary_token", CandidateKind::Temporary),
];

/// Apple `PKPaymentToken` as delivered by the wallet.
///
/// Every field is optional here, usability is decided by the payload builder.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationToken {
    pub payment_data: Option<PaymentData>,
    pub payment_method: Option<PaymentMethodInfo>,
    pub transaction_identifier: Option<String>,
}

#[derive(Default, Deserialize)]
pub struct PaymentData {
    pub data: Option<String>,
    pub signature: Option<String>,
    pub header: Option<TokenHeader>,
    pub version: Option<String>,
}

impl std::fmt::Debug for PaymentData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentData")
            .field("data", &self.data.as_ref().map(|_| "[REDACTED]"))
            .field("signature", &self.signature.as_ref().map(|_| "[REDACTED]"))
            .field("header", &self.header)
            .field("version", &self.version)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHeader {
    pub public_key_hash: Option<String>,
    pub ephemeral_public_key: Option<String>,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodInfo {
    pub display_name: Option<String>,
    pub network: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug)]
pub enum PaymentSource {
    ApplePay(AuthorizationToken),
    Temporary(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// None of the candidate locations is populated
    NotFound,
    /// Candidate is populated but has the wrong shape
    Malformed(&'static str),
}

impl std::error::Error for TokenError {}

impl Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::NotFound => f.write_str("no Apple Pay token or temporary token provided"),
            TokenError::Malformed(pointer) => write!(
                f,
                "payment token at `{}` is malformed",
                pointer.trim_start_matches('/').replace('/', ".")
            ),
        }
    }
}

pub fn extract(body: &Value) -> Result<PaymentSource, TokenError> {
    let (pointer, kind, candidate) = CANDIDATES
        .iter()
        .find_map(|(pointer, kind)| {
            body.pointer(pointer)
                .filter(|v| !v.is_null())
                .map(|v| (*pointer, *kind, v))
        })
        .ok_or(TokenError::NotFound)?;
    tracing::debug!(source = pointer, "Resolved payment method location");

    match kind {
        CandidateKind::ApplePay => {
            // Clients that already speak the processor schema send `{ key_id, pkpaymenttoken }`
            let candidate = candidate.get("pkpaymenttoken").unwrap_or(candidate);
            if !candidate.is_object() {
                return Err(TokenError::Malformed(pointer));
            }
            // Deserialization errors may quote cryptogram bytes, so they are dropped here
            AuthorizationToken::deserialize(candidate)
                .map(PaymentSource::ApplePay)
                .map_err(|_| TokenError::Malformed(pointer))
        }
        CandidateKind::Temporary => match candidate.as_str() {
            Some(token) if !token.trim().is_empty() => {
                Ok(PaymentSource::Temporary(token.to_string()))
            }
            _ => Err(TokenError::Malformed(pointer)),
        },
    }
}
