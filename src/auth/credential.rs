//! Bearer credential decoding.
//!
//! The credential is a signed three-segment token issued by the server at
//! login. The client only reads the payload (middle) segment to learn who
//! it is signed in as; the signature is the server's business.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ManageMeError, Result};

/// Standard alphabet, padding optional. URL-safe input is normalized first.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded credential payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// ID of the signed-in user.
    pub subject: String,
    /// Expiry as unix seconds, when the issuer set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

impl Claims {
    /// Whether the credential has expired at `now` (unix seconds).
    ///
    /// Credentials without an expiry never expire on the client side.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expiry.is_some_and(|exp| now >= exp)
    }
}

/// Payload as found on the wire. Issuers name the subject differently.
#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: Option<String>,
    subject: Option<String>,
    aud: Option<Value>,
    exp: Option<Value>,
}

impl RawClaims {
    fn into_claims(self) -> Option<Claims> {
        let subject = self
            .sub
            .or(self.subject)
            .or_else(|| match self.aud {
                Some(Value::String(aud)) => Some(aud),
                _ => None,
            })
            .filter(|s| !s.is_empty())?;

        let expiry = self.exp.and_then(|v| match v {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            _ => None,
        });

        Some(Claims { subject, expiry })
    }
}

/// Decode the claims carried in a credential.
///
/// Fails with [`ManageMeError::MalformedCredential`] if the token does not
/// have three segments, the payload is not base64, not a JSON object, or
/// names no subject. Callers treat that failure as "no session".
///
/// # Examples
///
/// ```
/// use manageme::auth::decode_claims;
///
/// // {"sub":"u1"}
/// let claims = decode_claims("e30.eyJzdWIiOiJ1MSJ9.c2ln").unwrap();
/// assert_eq!(claims.subject, "u1");
///
/// assert!(decode_claims("not-a-token").is_err());
/// ```
pub fn decode_claims(credential: &str) -> Result<Claims> {
    let segments: Vec<&str> = credential.split('.').collect();
    if segments.len() != 3 {
        return Err(ManageMeError::MalformedCredential(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let normalized: String = segments[1]
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    let bytes = PAYLOAD_ENGINE
        .decode(normalized.as_bytes())
        .map_err(|e| ManageMeError::MalformedCredential(format!("payload is not base64: {e}")))?;

    let raw: RawClaims = serde_json::from_slice(&bytes)
        .map_err(|e| ManageMeError::MalformedCredential(format!("payload is not JSON: {e}")))?;

    raw.into_claims()
        .ok_or_else(|| ManageMeError::MalformedCredential("payload has no subject".to_string()))
}
