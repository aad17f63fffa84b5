use serde::Serialize;

use crate::{checkout::request::TransactionType, config::ApiKey};

/// Body of `POST /api/transactions`
#[derive(Debug, Serialize)]
pub struct TransactionPayload<'a> {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Minor units
    pub amount: u64,
    pub currency: &'a str,
    pub payment_method: PaymentMethodPayload<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodPayload<'a> {
    ApplePayToken(ApplePayTokenPayload<'a>),
    TemporaryToken(&'a str),
}

#[derive(Debug, Serialize)]
pub struct ApplePayTokenPayload<'a> {
    pub key_id: &'a str,
    pub pkpaymenttoken: PkPaymentToken<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PkPaymentToken<'a> {
    pub payment_data: PaymentDataPayload<'a>,
    pub payment_method: PaymentMethodInfoPayload<'a>,
    pub transaction_identifier: Option<&'a str>,
}

// Optional fields are sent as null, the processor expects every key to exist
#[derive(Serialize)]
pub struct PaymentDataPayload<'a> {
    pub data: &'a str,
    pub signature: &'a str,
    pub header: TokenHeaderPayload<'a>,
    pub version: Option<&'a str>,
}

impl std::fmt::Debug for PaymentDataPayload<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentDataPayload")
            .field("data", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .field("header", &self.header)
            .field("version", &self.version)
            .finish()
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHeaderPayload<'a> {
    pub public_key_hash: Option<&'a str>,
    pub ephemeral_public_key: Option<&'a str>,
    pub transaction_id: Option<&'a str>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodInfoPayload<'a> {
    pub display_name: Option<&'a str>,
    pub network: Option<&'a str>,
    #[serde(rename = "type")]
    pub kind: Option<&'a str>,
}

/// Payload that passed validation, together with the key it must be sent with
#[derive(Debug)]
pub struct OutboundTransaction<'a> {
    pub api_key: &'a ApiKey,
    pub payload: TransactionPayload<'a>,
}

/// Body of `POST /api/public/applepay/validatemerchant`
#[derive(Debug, Serialize)]
pub struct MerchantValidationRequest<'a> {
    #[serde(rename = "PKeyCompany")]
    pub key_company: &'a str,
    #[serde(rename = "DomainName")]
    pub domain_name: &'a str,
    #[serde(rename = "ValidationUrl")]
    pub validation_url: &'a str,
}
