// End-to-end validation tests
// Exercise the full discovery -> key extraction -> verification pipeline
// against a canned identity provider

use std::sync::Arc;

use serde_json::json;

use komainu::certs;
use komainu::config::ValidatorConfig;
use komainu::error::ValidationError;
use komainu::validator::AzureAdValidator;
use komainu::verify::VerifyOptions;

use super::test_harness::{
    authority_for, init_tracing, rs256_token, stale_exp, sts_issuer, tenant_claims, CannedFetcher,
    KEYS_URL, PRIVATE_KEY_A, RAW_CERT_A, RAW_CERT_B,
};

const TENANT: &str = "b2f98abc-3d5e-4f7a-9c11-0123456789ab";

fn validator_with(fetcher: CannedFetcher) -> AzureAdValidator {
    AzureAdValidator::with_fetcher(ValidatorConfig::default(), Arc::new(fetcher))
}

#[tokio::test]
async fn test_validate_accepts_token_from_published_certificate() -> anyhow::Result<()> {
    init_tracing();
    let validator = validator_with(authority_for(TENANT, &[RAW_CERT_A]));
    let token = rs256_token(PRIVATE_KEY_A, &tenant_claims(TENANT));

    let claims = validator.validate(&token, &VerifyOptions::default()).await?;

    assert_eq!(claims.tid.as_deref(), Some(TENANT));
    assert_eq!(claims.iss.as_deref(), Some(sts_issuer(TENANT).as_str()));
    assert_eq!(claims.upn.as_deref(), Some("user@contoso.com"));
    Ok(())
}

#[tokio::test]
async fn test_validate_tries_later_candidates_after_mismatch() -> anyhow::Result<()> {
    // Key rotation: the provider still publishes the old certificate first
    let validator = validator_with(authority_for(TENANT, &[RAW_CERT_B, RAW_CERT_A]));
    let token = rs256_token(PRIVATE_KEY_A, &tenant_claims(TENANT));

    let claims = validator.validate(&token, &VerifyOptions::default()).await?;

    assert_eq!(claims.tid.as_deref(), Some(TENANT));
    Ok(())
}

#[tokio::test]
async fn test_validate_rejects_expired_token() {
    let validator = validator_with(authority_for(TENANT, &[RAW_CERT_A]));
    let mut claims = tenant_claims(TENANT);
    claims["exp"] = json!(stale_exp());
    let token = rs256_token(PRIVATE_KEY_A, &claims);

    let result = validator.validate(&token, &VerifyOptions::default()).await;

    assert!(
        matches!(result, Err(ValidationError::TokenInvalid(_))),
        "expired token must be disqualifying, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_validate_rejects_token_issued_for_another_tenant() {
    let validator = validator_with(authority_for(TENANT, &[RAW_CERT_A]));
    let mut claims = tenant_claims(TENANT);
    claims["iss"] = json!(sts_issuer("00000000-cccc-4444-8888-ffffffffffff"));
    let token = rs256_token(PRIVATE_KEY_A, &claims);

    let result = validator.validate(&token, &VerifyOptions::default()).await;

    assert!(
        matches!(result, Err(ValidationError::TokenInvalid(_))),
        "issuer is pinned to the tid claim, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_validate_surfaces_empty_key_set() {
    let validator = validator_with(authority_for(TENANT, &[]));
    let token = rs256_token(PRIVATE_KEY_A, &tenant_claims(TENANT));

    let result = validator.validate(&token, &VerifyOptions::default()).await;

    match result {
        Err(ValidationError::EmptyKeySet) => {
            assert_eq!(
                ValidationError::EmptyKeySet.to_string(),
                "No signing keys available"
            );
        }
        other => panic!("expected EmptyKeySet, got {:?}", other),
    }
}

#[tokio::test]
async fn test_validate_requires_tenant_claim_before_any_request() {
    // An empty fetcher answers 404 to everything; a Decode error proves the
    // token was rejected before discovery started
    let validator = validator_with(CannedFetcher::new());
    let token = rs256_token(PRIVATE_KEY_A, &json!({ "sub": "someone", "exp": 4102444800u64 }));

    let result = validator.validate(&token, &VerifyOptions::default()).await;

    assert!(
        matches!(result, Err(ValidationError::Decode(_))),
        "token without tid cannot name a tenant, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_validate_propagates_discovery_failure() {
    let validator = validator_with(CannedFetcher::new());
    let token = rs256_token(PRIVATE_KEY_A, &tenant_claims(TENANT));

    let result = validator.validate(&token, &VerifyOptions::default()).await;

    assert!(
        matches!(result, Err(ValidationError::Transport(_))),
        "unreachable authority must surface as a transport error, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_discovery_document_must_carry_jwks_uri() {
    let fetcher = CannedFetcher::new().with(
        &format!(
            "https://login.windows.net/{}/.well-known/openid-configuration",
            TENANT
        ),
        json!({ "issuer": sts_issuer(TENANT) }),
    );
    let validator = validator_with(fetcher);
    let token = rs256_token(PRIVATE_KEY_A, &tenant_claims(TENANT));

    let result = validator.validate(&token, &VerifyOptions::default()).await;

    assert!(
        matches!(result, Err(ValidationError::Transport(_))),
        "discovery document without jwks_uri is unusable, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_manual_chain_mirrors_validate() -> anyhow::Result<()> {
    init_tracing();
    let validator = validator_with(authority_for(TENANT, &[RAW_CERT_B, RAW_CERT_A]));
    let token = rs256_token(PRIVATE_KEY_A, &tenant_claims(TENANT));

    let tenant = validator.tenant_id(&token)?.ok_or_else(|| {
        anyhow::anyhow!("token must carry a tid claim")
    })?;
    assert_eq!(tenant, TENANT);

    let discovery = validator.openid_configuration(&tenant).await?;
    assert_eq!(discovery.jwks_uri, KEYS_URL);

    let certificates = validator.signing_certificates(&discovery.jwks_uri).await?;
    assert_eq!(certificates.len(), 2);
    assert_eq!(certificates[0], certs::to_pem(RAW_CERT_B));
    assert_eq!(certificates[1], certs::to_pem(RAW_CERT_A));

    let outcome = validator.verify(&token, &certificates, &VerifyOptions::default());
    assert!(outcome.is_valid());
    assert!(outcome.error.is_none(), "a valid token carries no error");
    Ok(())
}

#[tokio::test]
async fn test_certificate_chains_flatten_in_key_set_order() -> anyhow::Result<()> {
    let fetcher = CannedFetcher::new()
        .with(
            &format!(
                "https://login.windows.net/{}/.well-known/openid-configuration",
                TENANT
            ),
            json!({ "jwks_uri": KEYS_URL }),
        )
        .with(
            KEYS_URL,
            json!({
                "keys": [
                    { "kty": "RSA", "kid": "rotated", "x5c": [RAW_CERT_B] },
                    { "kty": "RSA", "kid": "current", "x5c": [RAW_CERT_B, RAW_CERT_A] }
                ]
            }),
        );
    let validator = validator_with(fetcher);

    let certificates = validator.signing_certificates(KEYS_URL).await?;
    assert_eq!(certificates.len(), 3);
    assert_eq!(certificates[2], certs::to_pem(RAW_CERT_A));

    // The signing key sits third in line behind two mismatching candidates
    let token = rs256_token(PRIVATE_KEY_A, &tenant_claims(TENANT));
    let claims = validator.validate(&token, &VerifyOptions::default()).await?;
    assert_eq!(claims.tid.as_deref(), Some(TENANT));
    Ok(())
}

#[tokio::test]
async fn test_validate_accepts_aud_bearing_token_without_audience_option() -> anyhow::Result<()> {
    let validator = validator_with(authority_for(TENANT, &[RAW_CERT_A]));
    let mut claims = tenant_claims(TENANT);
    claims["aud"] = json!("api://some-unrelated-app");
    let token = rs256_token(PRIVATE_KEY_A, &claims);

    let accepted = validator.validate(&token, &VerifyOptions::default()).await?;
    assert_eq!(accepted.aud, Some(json!("api://some-unrelated-app")));
    Ok(())
}

#[tokio::test]
async fn test_audience_option_is_enforced() -> anyhow::Result<()> {
    let validator = validator_with(authority_for(TENANT, &[RAW_CERT_A]));
    let mut claims = tenant_claims(TENANT);
    claims["aud"] = json!("api://app-123");
    let token = rs256_token(PRIVATE_KEY_A, &claims);

    let options = VerifyOptions {
        audience: vec!["api://app-123".to_string()],
        ..VerifyOptions::default()
    };
    let accepted = validator.validate(&token, &options).await?;
    assert_eq!(accepted.aud, Some(json!("api://app-123")));

    let options = VerifyOptions {
        audience: vec!["api://another-app".to_string()],
        ..VerifyOptions::default()
    };
    let rejected = validator.validate(&token, &options).await;
    assert!(
        matches!(rejected, Err(ValidationError::TokenInvalid(_))),
        "audience mismatch must be disqualifying, got {:?}",
        rejected
    );
    Ok(())
}

#[tokio::test]
async fn test_sovereign_cloud_hosts_flow_through() -> anyhow::Result<()> {
    let config = ValidatorConfig {
        authority_host: "https://login.chinacloudapi.cn".to_string(),
        issuer_host: "https://sts.chinacloudapi.cn".to_string(),
        ..ValidatorConfig::default()
    };
    let keys_url = "https://login.chinacloudapi.cn/common/discovery/keys";
    let fetcher = CannedFetcher::new()
        .with(
            &format!(
                "https://login.chinacloudapi.cn/{}/.well-known/openid-configuration",
                TENANT
            ),
            json!({ "jwks_uri": keys_url }),
        )
        .with(
            keys_url,
            json!({ "keys": [{ "kty": "RSA", "kid": "cn-0", "x5c": [RAW_CERT_A] }] }),
        );
    let validator = AzureAdValidator::with_fetcher(config, Arc::new(fetcher));

    let mut claims = tenant_claims(TENANT);
    claims["iss"] = json!(format!("https://sts.chinacloudapi.cn/{}/", TENANT));
    let token = rs256_token(PRIVATE_KEY_A, &claims);

    let validated = validator.validate(&token, &VerifyOptions::default()).await?;
    assert_eq!(validated.tid.as_deref(), Some(TENANT));
    Ok(())
}
