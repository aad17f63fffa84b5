use serde_json::Value;

use crate::{
    checkout::{
        request::{TransactionEnvelope, TransactionType},
        token::{AuthorizationToken, PaymentMethodInfo, PaymentSource, TokenError, TokenHeader},
    },
    config::{
        APPLE_PAY_DOMAIN_VAR, APPLE_PAY_KEY_ID_VAR, API_KEY_VAR, ApiKey, GatewayCredentials,
    },
    gateway::{
        error::PayloadError,
        transaction::{
            ApplePayTokenPayload, MerchantValidationRequest, OutboundTransaction,
            PaymentDataPayload, PaymentMethodInfoPayload, PaymentMethodPayload, PkPaymentToken,
            TokenHeaderPayload, TransactionPayload,
        },
    },
};

impl<'a> OutboundTransaction<'a> {
    /// Validate the request and build the processor payload.
    ///
    /// Checks run in a fixed order and stop at the first failure:
    /// amount (then type and currency), credentials, payment method.
    pub fn build(
        envelope: TransactionEnvelope<'a>,
        source: Result<&'a PaymentSource, &TokenError>,
        credentials: &'a GatewayCredentials,
    ) -> Result<Self, PayloadError> {
        let amount = envelope
            .amount
            .and_then(Value::as_u64)
            .filter(|amount| *amount > 0)
            .ok_or(PayloadError::InvalidAmount)?;

        let kind = match envelope.kind {
            None => TransactionType::default(),
            Some(Value::String(kind)) => kind
                .parse::<TransactionType>()
                .map_err(|_| PayloadError::InvalidTransactionType(kind.clone()))?,
            Some(other) => return Err(PayloadError::InvalidTransactionType(describe(other))),
        };

        let currency = match envelope.currency {
            None => credentials.default_currency.as_str(),
            Some(Value::String(code)) if is_currency_code(code) => code.as_str(),
            Some(_) => return Err(PayloadError::InvalidCurrency),
        };

        let api_key = credentials
            .api_key
            .as_ref()
            .ok_or(PayloadError::MissingConfiguration(API_KEY_VAR))?;

        let payment_method = match source {
            Ok(PaymentSource::Temporary(token)) => PaymentMethodPayload::TemporaryToken(token),
            Ok(PaymentSource::ApplePay(token)) => {
                let key_id = apple_pay_key_id(credentials)?;
                PaymentMethodPayload::ApplePayToken(ApplePayTokenPayload {
                    key_id,
                    pkpaymenttoken: token.try_into()?,
                })
            }
            Err(e) => {
                // Server configuration is reported before a missing token
                apple_pay_key_id(credentials)?;
                return Err(PayloadError::MissingPaymentToken(e.to_string()));
            }
        };

        Ok(Self {
            api_key,
            payload: TransactionPayload {
                kind,
                amount,
                currency,
                payment_method,
            },
        })
    }
}

fn apple_pay_key_id(credentials: &GatewayCredentials) -> Result<&str, PayloadError> {
    credentials
        .apple_pay_key_id
        .as_deref()
        .ok_or(PayloadError::MissingConfiguration(APPLE_PAY_KEY_ID_VAR))
}

/// Short strings are echoed, anything else is reported by its JSON kind
fn describe(kind: &Value) -> String {
    const MAX_ECHO: usize = 32;
    match kind {
        Value::String(s) if s.chars().count() <= MAX_ECHO => s.clone(),
        Value::String(s) => format!("{}...", s.chars().take(MAX_ECHO).collect::<String>()),
        Value::Bool(_) => "of kind boolean".into(),
        Value::Number(_) => "of kind number".into(),
        Value::Array(_) => "of kind array".into(),
        Value::Object(_) => "of kind object".into(),
        Value::Null => "of kind null".into(),
    }
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Cryptogram parts must be present and non-empty
fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, PayloadError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| PayloadError::MissingPaymentToken(format!("paymentData.{name} is missing")))
}

impl<'a> TryFrom<&'a AuthorizationToken> for PkPaymentToken<'a> {
    type Error = PayloadError;

    fn try_from(token: &'a AuthorizationToken) -> Result<Self, Self::Error> {
        let payment_data = token.payment_data.as_ref().ok_or_else(|| {
            PayloadError::MissingPaymentToken("paymentData is missing".to_string())
        })?;
        Ok(Self {
            payment_data: PaymentDataPayload {
                data: required(&payment_data.data, "data")?,
                signature: required(&payment_data.signature, "signature")?,
                header: payment_data
                    .header
                    .as_ref()
                    .map(Into::into)
                    .unwrap_or_default(),
                version: payment_data.version.as_deref(),
            },
            payment_method: token
                .payment_method
                .as_ref()
                .map(Into::into)
                .unwrap_or_default(),
            transaction_identifier: token.transaction_identifier.as_deref(),
        })
    }
}

impl<'a> From<&'a TokenHeader> for TokenHeaderPayload<'a> {
    fn from(header: &'a TokenHeader) -> Self {
        Self {
            public_key_hash: header.public_key_hash.as_deref(),
            ephemeral_public_key: header.ephemeral_public_key.as_deref(),
            transaction_id: header.transaction_id.as_deref(),
        }
    }
}

impl<'a> From<&'a PaymentMethodInfo> for PaymentMethodInfoPayload<'a> {
    fn from(info: &'a PaymentMethodInfo) -> Self {
        Self {
            display_name: info.display_name.as_deref(),
            network: info.network.as_deref(),
            kind: info.kind.as_deref(),
        }
    }
}

impl<'a> MerchantValidationRequest<'a> {
    /// Validation url is checked before the server configuration
    pub fn build(
        validation_url: Option<&'a str>,
        credentials: &'a GatewayCredentials,
    ) -> Result<(&'a ApiKey, Self), PayloadError> {
        let validation_url = validation_url
            .filter(|url| !url.trim().is_empty())
            .ok_or(PayloadError::MissingField("ValidationUrl"))?;
        let api_key = credentials
            .api_key
            .as_ref()
            .ok_or(PayloadError::MissingConfiguration(API_KEY_VAR))?;
        let key_company = apple_pay_key_id(credentials)?;
        let domain_name = credentials
            .apple_pay_domain
            .as_deref()
            .ok_or(PayloadError::MissingConfiguration(APPLE_PAY_DOMAIN_VAR))?;
        Ok((
            api_key,
            Self {
                key_company,
                domain_name,
                validation_url,
            },
        ))
    }
}
