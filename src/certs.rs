//! Certificate normalization and key material conversion.
//!
//! Azure AD publishes signing certificates as bare base64 DER strings inside
//! the key set document (`x5c` entries), without PEM framing or line
//! wrapping. The verification backend only accepts properly framed key
//! material, so every candidate goes through two steps here:
//!
//! 1. [`to_pem`] rebuilds a standard PEM block around the payload.
//! 2. [`to_decoding_key`] parses the certificate and extracts its RSA public
//!    key as a [`DecodingKey`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::DecodingKey;
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::RsaPublicKey;
use x509_cert::der::{Decode, Encode};
use x509_cert::Certificate;

use crate::error::ValidationError;

/// PEM begin marker for X.509 certificates
pub const BEGIN_CERTIFICATE: &str = "-----BEGIN CERTIFICATE-----";

/// PEM end marker for X.509 certificates
pub const END_CERTIFICATE: &str = "-----END CERTIFICATE-----";

/// PEM body line width
const LINE_WIDTH: usize = 64;

/// Rebuild a raw base64 certificate payload into a PEM block.
///
/// Any existing begin/end markers and newlines are stripped first (all
/// occurrences, so inputs that already carry partial or full PEM framing come
/// out the same as bare payloads). The cleaned body is then wrapped at 64
/// characters per line between fresh marker lines, with a trailing newline
/// after the end marker.
///
/// This function is pure and never fails: it does not check that the payload
/// is valid base64 or DER. A malformed payload produces a malformed PEM
/// block, which the key conversion step rejects later.
pub fn to_pem(raw: &str) -> String {
    let body: String = raw
        .replace(BEGIN_CERTIFICATE, "")
        .replace(END_CERTIFICATE, "")
        .replace(['\r', '\n'], "");

    let mut pem = String::with_capacity(body.len() + body.len() / LINE_WIDTH + 64);
    pem.push_str(BEGIN_CERTIFICATE);
    let chars: Vec<char> = body.chars().collect();
    for line in chars.chunks(LINE_WIDTH) {
        pem.push('\n');
        pem.extend(line);
    }
    pem.push('\n');
    pem.push_str(END_CERTIFICATE);
    pem.push('\n');
    pem
}

/// Convert a PEM certificate into a [`DecodingKey`] for RS256 verification.
///
/// `jsonwebtoken` does not consume X.509 certificates directly, so the
/// certificate is parsed and its SubjectPublicKeyInfo re-encoded as a public
/// key PEM. Every failure along the way (bad base64, unparseable DER, a
/// non-RSA key) is reported as [`ValidationError::KeyMaterial`].
pub fn to_decoding_key(pem: &str) -> Result<DecodingKey, ValidationError> {
    let body: String = pem
        .replace(BEGIN_CERTIFICATE, "")
        .replace(END_CERTIFICATE, "")
        .replace(['\r', '\n'], "");

    let der = STANDARD
        .decode(body.as_bytes())
        .map_err(|e| ValidationError::KeyMaterial(format!("invalid base64 payload: {}", e)))?;

    let certificate = Certificate::from_der(&der)
        .map_err(|e| ValidationError::KeyMaterial(format!("certificate does not parse: {}", e)))?;

    let spki_der = certificate
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| {
            ValidationError::KeyMaterial(format!("cannot encode subject public key: {}", e))
        })?;

    let public_key = RsaPublicKey::from_public_key_der(&spki_der)
        .map_err(|e| ValidationError::KeyMaterial(format!("not an RSA public key: {}", e)))?;

    let public_key_pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| ValidationError::KeyMaterial(format!("cannot encode public key: {}", e)))?;

    DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| ValidationError::KeyMaterial(format!("public key rejected: {}", e)))
}
