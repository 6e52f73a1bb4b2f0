//! Validator configuration types.
//!
//! Azure AD publishes per-tenant metadata under two distinct hosts: the
//! authority host serves the OpenID Connect discovery document, while token
//! `iss` claims carry the STS host. Both default to the global cloud
//! endpoints; sovereign clouds (China, US Government) override them.
//!
//! # Endpoint Layout
//!
//! - Discovery: `<authority_host>/<tenant_id>/.well-known/openid-configuration`
//! - Expected issuer: `<issuer_host>/<tenant_id>/` (trailing slash included,
//!   exactly as Azure AD writes it into tokens)

use serde::{Deserialize, Serialize};

fn default_authority_host() -> String {
    "https://login.windows.net".to_string()
}

fn default_issuer_host() -> String {
    "https://sts.windows.net".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Validator configuration
///
/// All fields have working defaults for the global Azure cloud, so
/// `ValidatorConfig::default()` is the common case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Base URL of the discovery authority (no trailing slash)
    #[serde(default = "default_authority_host")]
    pub authority_host: String,

    /// Base URL tokens carry in their `iss` claim (no trailing slash)
    #[serde(default = "default_issuer_host")]
    pub issuer_host: String,

    /// HTTP request timeout for discovery and key set fetches (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            authority_host: default_authority_host(),
            issuer_host: default_issuer_host(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ValidatorConfig {
    /// URL of the tenant's OpenID Connect discovery document
    pub fn openid_configuration_url(&self, tenant_id: &str) -> String {
        format!(
            "{}/{}/.well-known/openid-configuration",
            self.authority_host, tenant_id
        )
    }

    /// Expected `iss` value for tokens issued to the tenant
    pub fn issuer(&self, tenant_id: &str) -> String {
        format!("{}/{}/", self.issuer_host, tenant_id)
    }
}
