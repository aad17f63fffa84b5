use std::{fmt::Display, sync::Arc, time::Duration};

use axum::http::HeaderValue;

const DEFAULT_API_URL: &str = "https://sandbox.basysiqpro.com";
const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_TRANSACTION_PATH: &str = "/api/transactions";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PORT: u16 = 3000;

pub const API_KEY_VAR: &str = "IQPRO_API_KEY";
pub const APPLE_PAY_KEY_ID_VAR: &str = "APPLEPAY_KEY_ID";
pub const APPLE_PAY_DOMAIN_VAR: &str = "APPLEPAY_DOMAIN";

/// Processor secret key.
///
/// Stored as a sensitive header value so it is sent verbatim in the
/// `Authorization` header and never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(HeaderValue);

impl ApiKey {
    pub fn new(key: &str) -> Result<Self, ConfigError> {
        let mut value = HeaderValue::from_str(key).map_err(|_| ConfigError::InvalidApiKey)?;
        value.set_sensitive(true);
        Ok(Self(value))
    }

    pub fn header_value(&self) -> HeaderValue {
        self.0.clone()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Processor credentials and endpoints, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct GatewayCredentials {
    /// Base url without trailing slash
    pub api_base_url: String,
    pub api_key: Option<ApiKey>,
    pub apple_pay_key_id: Option<String>,
    pub apple_pay_domain: Option<String>,
    /// Publishable tokenizer key, safe to hand to the browser
    pub public_key: Option<String>,
    pub default_currency: String,
    pub transaction_path: String,
}

#[derive(Debug, Clone)]
pub enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Arc<GatewayCredentials>,
    pub timeout: Duration,
    pub allowed_origins: AllowedOrigins,
    pub port: u16,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNumber { var: &'static str, value: String },
    InvalidUrl(String),
    InvalidApiKey,
    InvalidOrigin(String),
}

impl std::error::Error for ConfigError {}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{var} must be a positive integer, got {value:?}")
            }
            ConfigError::InvalidUrl(url) => write!(f, "IQPRO_API_URL is not a valid url: {url}"),
            ConfigError::InvalidApiKey => {
                write!(f, "{API_KEY_VAR} contains characters not allowed in a header")
            }
            ConfigError::InvalidOrigin(origin) => {
                write!(f, "ALLOWED_ORIGINS contains an invalid origin: {origin}")
            }
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Empty values are treated the same as unset ones
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_base_url = var("IQPRO_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        reqwest::Url::parse(&api_base_url)
            .map_err(|_| ConfigError::InvalidUrl(api_base_url.clone()))?;
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let api_key = var(API_KEY_VAR).as_deref().map(ApiKey::new).transpose()?;

        let transaction_path = var("IQPRO_TRANSACTION_PATH")
            .map(|path| match path.starts_with('/') {
                true => path,
                false => format!("/{path}"),
            })
            .unwrap_or_else(|| DEFAULT_TRANSACTION_PATH.to_string());

        let credentials = GatewayCredentials {
            api_base_url,
            api_key,
            apple_pay_key_id: var(APPLE_PAY_KEY_ID_VAR),
            apple_pay_domain: var(APPLE_PAY_DOMAIN_VAR),
            public_key: var("IQPRO_PUBLIC_KEY"),
            default_currency: var("CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            transaction_path,
        };

        let timeout = match var("GATEWAY_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: "GATEWAY_TIMEOUT_SECS",
                        value,
                    });
                }
            },
            None => DEFAULT_TIMEOUT,
        };

        let port = match var("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { var: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let allowed_origins = match var("ALLOWED_ORIGINS") {
            None => AllowedOrigins::Any,
            Some(list) => parse_origins(&list)?,
        };

        Ok(Self {
            credentials: Arc::new(credentials),
            timeout,
            allowed_origins,
            port,
        })
    }
}

fn parse_origins(list: &str) -> Result<AllowedOrigins, ConfigError> {
    let origins: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .collect();
    if origins.is_empty() || origins.contains(&"*") {
        return Ok(AllowedOrigins::Any);
    }
    origins
        .into_iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidOrigin(origin.into()))
        })
        .collect::<Result<_, _>>()
        .map(AllowedOrigins::List)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config(&[]).unwrap();
        let credentials = &config.credentials;
        assert_eq!(credentials.api_base_url, DEFAULT_API_URL);
        assert_eq!(credentials.default_currency, "USD");
        assert_eq!(credentials.transaction_path, "/api/transactions");
        assert!(credentials.api_key.is_none());
        assert!(credentials.apple_pay_key_id.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.port, 3000);
        assert!(matches!(config.allowed_origins, AllowedOrigins::Any));
    }

    #[test]
    fn reads_credentials_and_normalizes_values() {
        let config = config(&[
            ("IQPRO_API_URL", "https://api.example.com/"),
            ("IQPRO_API_KEY", "api_123"),
            ("APPLEPAY_KEY_ID", "d3epo0f0i47dpgrupdag"),
            ("CURRENCY", "EUR"),
            ("IQPRO_TRANSACTION_PATH", "v3/transactions/process"),
            ("GATEWAY_TIMEOUT_SECS", "5"),
            ("ALLOWED_ORIGINS", "https://shop.example.com, https://m.example.com"),
        ])
        .unwrap();
        let credentials = &config.credentials;
        assert_eq!(credentials.api_base_url, "https://api.example.com");
        assert_eq!(
            credentials.api_key.as_ref().unwrap().header_value(),
            "api_123"
        );
        assert_eq!(credentials.apple_pay_key_id.as_deref(), Some("d3epo0f0i47dpgrupdag"));
        assert_eq!(credentials.default_currency, "EUR");
        assert_eq!(credentials.transaction_path, "/v3/transactions/process");
        assert_eq!(config.timeout, Duration::from_secs(5));
        let AllowedOrigins::List(origins) = &config.allowed_origins else {
            panic!("expected explicit origin list");
        };
        assert_eq!(origins.len(), 2);
    }

    #[test]
    fn empty_secret_counts_as_missing() {
        let config = config(&[("IQPRO_API_KEY", "  ")]).unwrap();
        assert!(config.credentials.api_key.is_none());
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(
            config(&[("GATEWAY_TIMEOUT_SECS", "0")]).unwrap_err(),
            ConfigError::InvalidNumber {
                var: "GATEWAY_TIMEOUT_SECS",
                value: "0".into()
            }
        );
        assert!(matches!(
            config(&[("PORT", "http")]).unwrap_err(),
            ConfigError::InvalidNumber { var: "PORT", .. }
        ));
        assert!(matches!(
            config(&[("IQPRO_API_URL", "not a url")]).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
        assert_eq!(
            config(&[("IQPRO_API_KEY", "key\u{7f}")]).unwrap_err(),
            ConfigError::InvalidApiKey
        );
    }

    #[test]
    fn api_key_is_redacted_from_debug() {
        let config = config(&[("IQPRO_API_KEY", "api_super_secret")]).unwrap();
        let debug = format!("{:?}", config.credentials);
        assert!(!debug.contains("api_super_secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
