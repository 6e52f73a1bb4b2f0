//! Signing key set documents.
//!
//! Azure AD publishes its current signing keys as a JSON Web Key Set
//! (RFC 7517) reachable through the discovery document's `jwks_uri`. Each
//! key entry carries its certificate chain in `x5c` as bare base64 DER
//! strings; those payloads, not the JWK `n`/`e` parameters, are what the
//! verification pipeline consumes.

use serde::{Deserialize, Serialize};

use crate::certs;

/// A published set of signing keys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeySet {
    /// The key entries, in document order
    pub keys: Vec<KeyEntry>,
}

/// A single key entry in a key set
///
/// Only `x5c` matters for certificate extraction; the remaining fields are
/// kept so a full Azure AD document round-trips without loss.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyEntry {
    /// Key type (e.g. "RSA")
    #[serde(default)]
    pub kty: Option<String>,

    /// Key ID
    #[serde(default)]
    pub kid: Option<String>,

    /// Public key use ("sig" for signature keys)
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,

    /// X.509 certificate SHA-1 thumbprint
    #[serde(default)]
    pub x5t: Option<String>,

    /// RSA modulus (base64url-encoded)
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url-encoded)
    #[serde(default)]
    pub e: Option<String>,

    /// X.509 certificate chain, leaf first (base64 DER strings)
    #[serde(default)]
    pub x5c: Vec<String>,
}

impl KeySet {
    /// All candidate certificates as PEM blocks, in document order.
    ///
    /// Walks key entries in order and each entry's certificate chain in
    /// order, normalizing every payload. The resulting order is significant:
    /// it is the order the verifier tries candidates in. An empty key set
    /// (or entries without `x5c`) yields an empty collection, not an error.
    pub fn certificates(&self) -> Vec<String> {
        let mut certificates = Vec::new();
        for entry in &self.keys {
            for payload in &entry.x5c {
                certificates.push(certs::to_pem(payload));
            }
        }
        certificates
    }
}
