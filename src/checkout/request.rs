use std::{fmt::Display, str::FromStr};

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Sale,
    Authorize,
    Verification,
    Credit,
}

impl FromStr for TransactionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(Self::Sale),
            "authorize" => Ok(Self::Authorize),
            "verification" => Ok(Self::Verification),
            "credit" => Ok(Self::Credit),
            _ => Err(()),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sale => f.write_str("sale"),
            Self::Authorize => f.write_str("authorize"),
            Self::Verification => f.write_str("verification"),
            Self::Credit => f.write_str("credit"),
        }
    }
}

/// Caller supplied transaction fields, unvalidated.
///
/// `null` counts as absent. Validation happens in the payload builder so that
/// the order of checks stays in one place.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransactionEnvelope<'a> {
    pub kind: Option<&'a Value>,
    pub amount: Option<&'a Value>,
    pub currency: Option<&'a Value>,
}

impl<'a> TransactionEnvelope<'a> {
    pub fn from_body(body: &'a Value) -> Self {
        let field = |name: &str| body.get(name).filter(|v| !v.is_null());
        Self {
            kind: field("type"),
            amount: field("amount"),
            currency: field("currency"),
        }
    }
}
