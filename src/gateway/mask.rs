use serde::Serialize;

const REDACTED: &str = "***";

pub trait MaskPolicy {
    fn mask(value: &str) -> String;
}

/// Keeps the last four characters visible
pub struct Masked;

impl MaskPolicy for Masked {
    fn mask(value: &str) -> String {
        let chars: Vec<char> = value.chars().collect();
        let len = chars.len();
        if len > 4 {
            "*".repeat(len - 4) + &chars[len - 4..].iter().collect::<String>()
        } else {
            REDACTED.to_string()
        }
    }
}

/// Return true if a key name holds part of the Apple Pay cryptogram.
///
/// These are never logged, not even partially.
fn is_cryptogram_key(key: &str) -> bool {
    matches!(
        key,
        "data" | "signature" | "ephemeralPublicKey" | "publicKeyHash" | "wrappedKey"
    )
}

/// Return true if a key name holds a reference that is useful to correlate in logs.
fn is_token_key(key: &str) -> bool {
    let k = key.to_lowercase();
    k.contains("token") && !k.contains("type")
        || k == "transactionid"
        || k == "transactionidentifier"
        || k == "authorization"
}

/// Return true if a key name likely holds a PAN/card number.
fn is_pan_key(key: &str) -> bool {
    let k = key.to_lowercase();
    k == "pan"
        || k.contains("card") && (k.contains("number") || k.contains("num"))
        || k == "number"
}

/// Return true if a key name likely holds a CVV/CVC.
fn is_cvv_key(key: &str) -> bool {
    let k = key.to_lowercase();
    k.contains("cvv") || k.contains("cvc") || k.contains("card_verification") || k.contains("cvn")
}

pub fn secure_serializable(v: impl Serialize) -> serde_json::Value {
    match serde_json::to_value(v) {
        Ok(value) => secure_value(&value),
        Err(_) => serde_json::Value::String(REDACTED.into()),
    }
}

pub fn secure_value(v: &serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match v {
        Value::Object(map) => {
            let mut new = serde_json::Map::with_capacity(map.len());
            for (k, val) in map {
                let new_val = match val {
                    Value::Null => Value::Null,
                    Value::String(_) | Value::Number(_) if is_cryptogram_key(k) || is_cvv_key(k) => {
                        Value::String(REDACTED.to_string())
                    }
                    Value::String(s) if is_token_key(k) || is_pan_key(k) => {
                        Value::String(Masked::mask(s))
                    }
                    Value::Number(n) if is_pan_key(k) => Value::String(Masked::mask(&n.to_string())),
                    _ => secure_value(val),
                };
                new.insert(k.clone(), new_val);
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(secure_value).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn cryptogram_is_fully_redacted() {
        let token = json!({
            "paymentData": {
                "data": "bG9uZyBjaXBoZXJ0ZXh0",
                "signature": "c2lnbmF0dXJlIGJ5dGVz",
                "header": {
                    "publicKeyHash": "LbsUwAT6w1JV9tFXocU813TCHks+LSuFF0R/eBkrWnQ=",
                    "ephemeralPublicKey": "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE",
                    "transactionId": "d3b28af5ae40e4ee1c64e3b8b7a0bd4e"
                },
                "version": "EC_v1"
            }
        });
        let masked = secure_value(&token);
        let rendered = masked.to_string();
        assert!(!rendered.contains("bG9uZyBjaXBoZXJ0ZXh0"));
        assert!(!rendered.contains("c2lnbmF0dXJlIGJ5dGVz"));
        assert!(!rendered.contains("MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE"));
        assert_eq!(masked["paymentData"]["data"], "***");
        assert_eq!(
            masked["paymentData"]["header"]["transactionId"],
            format!("{}bd4e", "*".repeat(28))
        );
        assert_eq!(masked["paymentData"]["version"], "EC_v1");
    }

    #[test]
    fn tokens_keep_last_four() {
        let masked = secure_value(&json!({
            "payment_method": { "temporary_token": "tok_1234567890" },
            "type": "sale",
            "amount": 1234,
        }));
        assert_eq!(
            masked["payment_method"]["temporary_token"],
            format!("{}7890", "*".repeat(10))
        );
        assert_eq!(masked["type"], "sale");
        assert_eq!(masked["amount"], 1234);
    }

    #[test]
    fn card_data_is_masked() {
        let masked = secure_value(&json!({
            "card": { "card_number": "4111111111111111", "cvv": 123 },
            "items": [{ "pan": 5555555555554444u64 }]
        }));
        assert_eq!(masked["card"]["card_number"], "************1111");
        assert_eq!(masked["card"]["cvv"], "***");
        assert_eq!(masked["items"][0]["pan"], "************4444");
    }

    #[test]
    fn short_values_are_not_partially_revealed() {
        assert_eq!(Masked::mask("abcd"), "***");
        assert_eq!(Masked::mask("abcde"), "*bcde");
    }

    #[test]
    fn nulls_are_preserved() {
        let masked = secure_value(&json!({ "transactionIdentifier": null, "data": null }));
        assert_eq!(masked, json!({ "transactionIdentifier": null, "data": null }));
    }
}
