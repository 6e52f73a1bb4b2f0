// Error types module

use thiserror::Error;

/// Centralized error type for token validation
///
/// The variants split along the lines the verification loop cares about:
/// `SignatureMismatch` is the only recoverable failure (the loop moves on to
/// the next candidate key), everything else disqualifies the token or the
/// call as a whole.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// Network/HTTP failure while fetching discovery or key set documents
    #[error("Transport error: {0}")]
    Transport(String),

    /// Token is not well-formed enough to extract claims from
    #[error("Token decode error: {0}")]
    Decode(String),

    /// A candidate certificate could not be turned into a verification key
    #[error("Unusable key material: {0}")]
    KeyMaterial(String),

    /// Token signature does not match the candidate key
    #[error("Token signature does not match the candidate key")]
    SignatureMismatch,

    /// Token rejected on grounds other than the signing key (expired,
    /// issuer mismatch, algorithm mismatch, malformed claims, ...)
    #[error("Token rejected: {0}")]
    TokenInvalid(String),

    /// No signing keys were available to try
    #[error("No signing keys available")]
    EmptyKeySet,
}

impl ValidationError {
    /// Whether the verification loop may continue with the next candidate key
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(self, ValidationError::SignatureMismatch)
    }

    /// The error reported when a token carries no `tid` claim
    pub(crate) fn missing_tenant() -> Self {
        ValidationError::Decode(
            "token carries no tid claim; expected issuer cannot be derived".to_string(),
        )
    }
}

/// Classify a verification failure at the `jsonwebtoken` boundary.
///
/// `ErrorKind::InvalidSignature` is the wrong-key case and maps to the
/// recoverable `SignatureMismatch`. Every other kind, including kinds added
/// to the non-exhaustive enum in future versions, maps to the disqualifying
/// `TokenInvalid`.
impl From<jsonwebtoken::errors::Error> for ValidationError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                ValidationError::SignatureMismatch
            }
            _ => ValidationError::TokenInvalid(err.to_string()),
        }
    }
}
