//! Unverified token inspection.
//!
//! The tenant id has to come out of the token before any signature check can
//! happen: it selects the discovery URL and the expected issuer. The payload
//! segment is decoded here without verification for exactly that purpose.
//! Nothing read from an unverified payload is trusted as proof of anything
//! until verification succeeds.

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Claims read from a token payload without signature verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Tenant id of the issuing directory
    #[serde(default)]
    pub tid: Option<String>,

    /// Issuer URL as written by the STS
    #[serde(default)]
    pub iss: Option<String>,

    /// Audience; Azure issues either a single string or an array
    #[serde(default)]
    pub aud: Option<Value>,

    /// Subject
    #[serde(default)]
    pub sub: Option<String>,

    /// Client application id
    #[serde(default)]
    pub appid: Option<String>,

    /// User principal name
    #[serde(default)]
    pub upn: Option<String>,

    /// Expiration time (Unix seconds)
    #[serde(default)]
    pub exp: Option<u64>,

    /// Not-before time (Unix seconds)
    #[serde(default)]
    pub nbf: Option<u64>,

    /// Issued-at time (Unix seconds)
    #[serde(default)]
    pub iat: Option<u64>,

    /// Any additional claims
    #[serde(flatten)]
    pub custom: serde_json::Map<String, Value>,
}

/// Decode the payload segment of a compact-serialization JWT without
/// verifying the signature.
///
/// Fails with [`ValidationError::Decode`] when the token is not three
/// dot-separated segments or the payload segment is not base64url-encoded
/// JSON.
pub fn decode_claims(token: &str) -> Result<Claims, ValidationError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(ValidationError::Decode(format!(
            "expected 3 token segments, found {}",
            segments.len()
        )));
    }

    let payload = decode_segment(segments[1])?;
    serde_json::from_slice(&payload)
        .map_err(|e| ValidationError::Decode(format!("payload is not a claims object: {}", e)))
}

/// Extract the tenant id (`tid` claim) from an unverified token.
///
/// Returns `Ok(None)` for a well-formed token that simply carries no `tid`;
/// a tenant-less token cannot have an expected issuer constructed for it.
pub fn tenant_id(token: &str) -> Result<Option<String>, ValidationError> {
    Ok(decode_claims(token)?.tid)
}

// JWS segments are unpadded base64url, but some issuers emit padded ones.
// Accept both.
fn decode_segment(segment: &str) -> Result<Vec<u8>, ValidationError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| URL_SAFE.decode(segment))
        .map_err(|e| ValidationError::Decode(format!("payload is not valid base64url: {}", e)))
}
