//! Unverified decoding of bearer token payloads.
//!
//! Used only as a degraded source of profile data when `/auth/me` cannot be
//! reached. Nothing here checks signatures or expiry.

use crate::error::{ClientError, ClientResult};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;

/// Claims read from a token payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_admin: bool,
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(matches!(value, serde_json::Value::Bool(true)))
}

/// Decode the payload (middle segment) of a three-part dot-separated token
pub fn decode_claims(token: &str) -> ClientResult<TokenClaims> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(ClientError::decode(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| ClientError::decode(format!("invalid base64url payload: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::decode(format!("invalid JSON payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn test_decode_subject_and_admin() {
        let token = token_with_payload(&serde_json::json!({
            "sub": "alice",
            "is_admin": true,
            "exp": 1_900_000_000
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("alice"));
        assert!(claims.is_admin);
    }

    #[test]
    fn test_missing_admin_claim_is_false() {
        let token = token_with_payload(&serde_json::json!({ "sub": "bob" }));
        let claims = decode_claims(&token).unwrap();
        assert!(!claims.is_admin);

        let token = token_with_payload(&serde_json::json!({ "sub": "bob", "is_admin": "yes" }));
        assert!(!decode_claims(&token).unwrap().is_admin);
    }

    #[test]
    fn test_fractional_expiry_is_ignored() {
        let token = token_with_payload(&serde_json::json!({ "sub": "al", "exp": 1.9e9 }));
        assert_eq!(decode_claims(&token).unwrap().sub.as_deref(), Some("al"));
    }

    #[test]
    fn test_non_ascii_subject() {
        let token = token_with_payload(&serde_json::json!({ "sub": "zoë" }));
        assert_eq!(decode_claims(&token).unwrap().sub.as_deref(), Some("zoë"));
    }

    #[test]
    fn test_padded_payload() {
        let token = token_with_payload(&serde_json::json!({ "sub": "al" }));
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[1].push_str("==");
        let padded = parts.join(".");
        assert_eq!(decode_claims(&padded).unwrap().sub.as_deref(), Some("al"));
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(
            decode_claims("opaque-token"),
            Err(ClientError::Decode(_))
        ));
        assert!(decode_claims("a.b").is_err());
        assert!(decode_claims("a.!!!.c").is_err());

        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode(b"plain text"));
        assert!(decode_claims(&not_json).is_err());
    }
}
