//! OpenID Connect discovery.
//!
//! Two documents come over the wire per tenant: the discovery document at
//! the well-known path, which names the key set URL in `jwks_uri`, and the
//! key set itself. Both fetches go through the [`Fetch`] trait so callers
//! (and tests) can inject their own HTTP capability; [`HttpFetcher`] is the
//! reqwest-backed production implementation.
//!
//! Fetches are stateless and idempotent. No caching and no retries happen
//! here; both belong to the calling application.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ValidatorConfig;
use crate::error::ValidationError;
use crate::jwks::KeySet;

/// Injected HTTP capability: GET a URL and return the parsed JSON document
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, ValidationError>;
}

/// reqwest-backed [`Fetch`] implementation
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given request timeout
    pub fn new(timeout_secs: u64) -> Result<Self, ValidationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                ValidationError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get_json(&self, url: &str) -> Result<Value, ValidationError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ValidationError::Transport("Request timed out".to_string())
                } else if e.is_connect() {
                    ValidationError::Transport(format!("Connection failed: {}", e))
                } else {
                    ValidationError::Transport(format!("Request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(ValidationError::Transport(format!(
                "HTTP {} response",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ValidationError::Transport(format!("Invalid JSON: {}", e)))
    }
}

/// Tenant OpenID Connect discovery document
///
/// Only `jwks_uri` is required; the other endpoints Azure publishes are kept
/// as optional fields and everything else lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenIdConfiguration {
    /// URL of the signing key set
    pub jwks_uri: String,

    /// Issuer template advertised by the authority
    #[serde(default)]
    pub issuer: Option<String>,

    #[serde(default)]
    pub authorization_endpoint: Option<String>,

    #[serde(default)]
    pub token_endpoint: Option<String>,

    /// Remaining document fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Fetch and parse the tenant's OpenID Connect discovery document.
pub async fn fetch_openid_configuration(
    fetcher: &dyn Fetch,
    config: &ValidatorConfig,
    tenant_id: &str,
) -> Result<OpenIdConfiguration, ValidationError> {
    let url = config.openid_configuration_url(tenant_id);
    tracing::debug!(tenant_id = %tenant_id, url = %url, "Fetching OpenID configuration");

    let document = fetcher.get_json(&url).await?;
    serde_json::from_value(document).map_err(|e| {
        ValidationError::Transport(format!("Unexpected discovery document: {}", e))
    })
}

/// Fetch and parse the signing key set from a `jwks_uri`.
pub async fn fetch_signing_keys(
    fetcher: &dyn Fetch,
    jwks_uri: &str,
) -> Result<KeySet, ValidationError> {
    tracing::debug!(url = %jwks_uri, "Fetching signing key set");

    let document = fetcher.get_json(jwks_uri).await?;
    let key_set: KeySet = serde_json::from_value(document)
        .map_err(|e| ValidationError::Transport(format!("Unexpected key set document: {}", e)))?;

    tracing::info!(keys = key_set.keys.len(), "Signing key set fetched");
    Ok(key_set)
}
