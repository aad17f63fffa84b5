use std::fmt::Display;

/// Transport level failure talking to the processor
#[derive(Debug)]
pub enum GatewayError {
    /// No response was received: connection refused, DNS failure, timeout
    Unreachable(reqwest::Error),
    /// Response headers arrived but the body was cut off
    ResponseInterrupted(reqwest::Error),
}

impl GatewayError {
    /// True when the request may have reached the processor.
    ///
    /// Connection and DNS failures happen before anything is sent.
    pub fn outcome_unknown(&self) -> bool {
        match self {
            GatewayError::Unreachable(e) => !e.is_connect(),
            GatewayError::ResponseInterrupted(_) => true,
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            GatewayError::Unreachable(e) | GatewayError::ResponseInterrupted(e) => e.is_timeout(),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::Unreachable(e) | GatewayError::ResponseInterrupted(e) => Some(e),
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Unreachable(e) if e.is_timeout() => {
                f.write_str("payment gateway did not respond in time")
            }
            GatewayError::Unreachable(e) => {
                write!(f, "payment gateway unreachable: {}", without_url(e))
            }
            GatewayError::ResponseInterrupted(e) => {
                write!(f, "payment gateway response interrupted: {}", without_url(e))
            }
        }
    }
}

/// Render a reqwest error without the processor url
fn without_url(e: &reqwest::Error) -> String {
    use std::error::Error;

    let mut message = match e.url() {
        Some(url) => e.to_string().replace(&format!(" ({url})"), ""),
        None => e.to_string(),
    };
    if let Some(source) = e.source() {
        message.push_str(": ");
        message.push_str(&source.to_string());
    }
    message
}

/// Validation failure while building the processor payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    InvalidAmount,
    InvalidTransactionType(String),
    InvalidCurrency,
    MissingField(&'static str),
    /// Name of the environment variable that is not set
    MissingConfiguration(&'static str),
    MissingPaymentToken(String),
}

impl std::error::Error for PayloadError {}

impl Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadError::InvalidAmount => {
                f.write_str("amount (positive integer, minor units) is required")
            }
            PayloadError::InvalidTransactionType(kind) => write!(
                f,
                "unsupported transaction type {kind}, expected one of sale, authorize, verification, credit"
            ),
            PayloadError::InvalidCurrency => f.write_str("currency must be an ISO currency code"),
            PayloadError::MissingField(name) => write!(f, "{name} is required"),
            PayloadError::MissingConfiguration(var) => {
                write!(f, "server is missing configuration: {var}")
            }
            PayloadError::MissingPaymentToken(reason) => {
                write!(f, "missing Apple Pay payment token: {reason}")
            }
        }
    }
}
