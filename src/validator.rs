//! Azure AD token validation manager.
//!
//! [`AzureAdValidator`] wires the pipeline together: read the tenant id from
//! the token, discover the tenant's key set URL, fetch the signing
//! certificates, and verify the token against them in order.
//!
//! # Example
//!
//! ```no_run
//! use komainu::config::ValidatorConfig;
//! use komainu::validator::AzureAdValidator;
//! use komainu::verify::VerifyOptions;
//!
//! # async fn run(bearer_token: &str) -> Result<(), komainu::error::ValidationError> {
//! let validator = AzureAdValidator::new(ValidatorConfig::default())?;
//! let claims = validator
//!     .validate(bearer_token, &VerifyOptions::default())
//!     .await?;
//! println!("token issued by tenant {:?}", claims.tid);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::config::ValidatorConfig;
use crate::discovery::{self, Fetch, HttpFetcher, OpenIdConfiguration};
use crate::error::ValidationError;
use crate::jwks::KeySet;
use crate::token::{self, Claims};
use crate::verify::{self, VerifyOptions, VerifyOutcome};

/// Validation manager for Azure AD issued tokens
pub struct AzureAdValidator {
    config: ValidatorConfig,
    fetcher: Arc<dyn Fetch>,
}

impl AzureAdValidator {
    /// Create a validator using the reqwest-backed fetcher
    pub fn new(config: ValidatorConfig) -> Result<Self, ValidationError> {
        let fetcher = HttpFetcher::new(config.timeout_secs)?;
        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
        })
    }

    /// Create a validator with an injected fetch capability
    pub fn with_fetcher(config: ValidatorConfig, fetcher: Arc<dyn Fetch>) -> Self {
        Self { config, fetcher }
    }

    /// The active configuration
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Tenant id claimed by an unverified token
    pub fn tenant_id(&self, token: &str) -> Result<Option<String>, ValidationError> {
        token::tenant_id(token)
    }

    /// Fetch the tenant's OpenID Connect discovery document
    pub async fn openid_configuration(
        &self,
        tenant_id: &str,
    ) -> Result<OpenIdConfiguration, ValidationError> {
        discovery::fetch_openid_configuration(self.fetcher.as_ref(), &self.config, tenant_id).await
    }

    /// Fetch the signing key set behind a `jwks_uri`
    pub async fn signing_keys(&self, jwks_uri: &str) -> Result<KeySet, ValidationError> {
        discovery::fetch_signing_keys(self.fetcher.as_ref(), jwks_uri).await
    }

    /// Fetch the signing key set and extract its certificates as ordered
    /// PEM blocks, ready for [`verify`](Self::verify)
    pub async fn signing_certificates(
        &self,
        jwks_uri: &str,
    ) -> Result<Vec<String>, ValidationError> {
        Ok(self.signing_keys(jwks_uri).await?.certificates())
    }

    /// Verify a token against already-fetched candidate certificates.
    ///
    /// Purely CPU-bound; see [`verify::verify`] for the trial loop rules.
    pub fn verify(
        &self,
        token: &str,
        certificates: &[String],
        options: &VerifyOptions,
    ) -> VerifyOutcome {
        verify::verify(token, certificates, options, &self.config)
    }

    /// Run the whole pipeline for one token: tenant id, discovery, key set,
    /// certificate extraction, verification.
    ///
    /// Returns the token's claims once some candidate key has verified it.
    /// An empty published key set surfaces as
    /// [`ValidationError::EmptyKeySet`].
    pub async fn validate(
        &self,
        token: &str,
        options: &VerifyOptions,
    ) -> Result<Claims, ValidationError> {
        let tenant_id = token::tenant_id(token)?.ok_or_else(ValidationError::missing_tenant)?;
        let configuration = self.openid_configuration(&tenant_id).await?;
        let certificates = self.signing_certificates(&configuration.jwks_uri).await?;

        tracing::debug!(
            tenant_id = %tenant_id,
            candidates = certificates.len(),
            "Verifying token against published certificates"
        );

        self.verify(token, &certificates, options).into_result()?;
        token::decode_claims(token)
    }
}
