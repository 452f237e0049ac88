use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,
    #[error("failed to fetch signing keys")]
    KeyFetchFailed,
}

/// Claims this service reads from the identity provider's access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub exp: u64,
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwksKey {
    pub kty: String,
    pub kid: String,
    pub n: Option<String>,
    pub e: Option<String>,
    pub x5c: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<JwksKey>,
}

/// Verified identity attached to a request. Handlers map the subject to a
/// stored user record by its oauth id.
#[derive(Debug, Clone)]
pub struct AuthenticatedSubject {
    pub oauth_id: String,
    pub display_name: String,
}

/// Bearer-token validation against a configured OIDC issuer. Signing keys
/// are pulled from the issuer's JWKS document and cached per key id; dev
/// mode skips signature checks and accepts `subject:email:name` tokens.
pub struct AuthService {
    client: Client,
    jwks_cache: Arc<RwLock<HashMap<String, (DecodingKey, SystemTime)>>>,
    issuer: String,
    audience: String,
    jwks_url: String,
    dev_mode: bool,
}

const KEY_CACHE_TTL: Duration = Duration::from_secs(3600);

impl AuthService {
    pub fn new(issuer: String, audience: String, jwks_url: String) -> Self {
        Self {
            client: Client::new(),
            jwks_cache: Arc::new(RwLock::new(HashMap::new())),
            issuer,
            audience,
            jwks_url,
            dev_mode: false,
        }
    }

    pub fn new_dev_mode() -> Self {
        Self {
            client: Client::new(),
            jwks_cache: Arc::new(RwLock::new(HashMap::new())),
            issuer: "dev".to_string(),
            audience: "dev".to_string(),
            jwks_url: String::new(),
            dev_mode: true,
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedSubject, AuthError> {
        if self.dev_mode {
            return self.validate_dev_token(token);
        }

        let header = decode_header(token).map_err(|err| {
            warn!("failed to decode token header: {err}");
            AuthError::InvalidToken
        })?;
        let kid = header.kid.ok_or_else(|| {
            warn!("token header missing 'kid'");
            AuthError::InvalidToken
        })?;

        let decoding_key = self.get_decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<TokenClaims>(token, &decoding_key, &validation).map_err(|err| {
            warn!("token validation failed: {err}");
            AuthError::InvalidToken
        })?;

        let claims = data.claims;
        let display_name = claims
            .name
            .or(claims.email)
            .unwrap_or_else(|| claims.sub.clone());
        Ok(AuthenticatedSubject {
            oauth_id: claims.sub,
            display_name,
        })
    }

    /// Dev tokens are `subject:email:display name`.
    fn validate_dev_token(&self, token: &str) -> Result<AuthenticatedSubject, AuthError> {
        let parts: Vec<&str> = token.splitn(3, ':').collect();
        if parts.len() != 3 || parts[0].is_empty() || parts[2].is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(AuthenticatedSubject {
            oauth_id: parts[0].to_string(),
            display_name: parts[2].to_string(),
        })
    }

    async fn get_decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cache = self.jwks_cache.read().await;
            if let Some((key, fetched_at)) = cache.get(kid) {
                if fetched_at.elapsed().unwrap_or(KEY_CACHE_TTL) < KEY_CACHE_TTL {
                    return Ok(key.clone());
                }
            }
        }

        let jwks: JwksResponse = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|err| {
                warn!("jwks fetch from {} failed: {err}", self.jwks_url);
                AuthError::KeyFetchFailed
            })?
            .json()
            .await
            .map_err(|err| {
                warn!("jwks document was not parseable: {err}");
                AuthError::KeyFetchFailed
            })?;

        let mut cache = self.jwks_cache.write().await;
        let fetched_at = SystemTime::now();
        for key in jwks.keys {
            if let Some(decoding_key) = decoding_key_from_jwk(&key) {
                cache.insert(key.kid.clone(), (decoding_key, fetched_at));
            }
        }

        cache
            .get(kid)
            .map(|(key, _)| key.clone())
            .ok_or(AuthError::InvalidToken)
    }
}

fn decoding_key_from_jwk(key: &JwksKey) -> Option<DecodingKey> {
    if let (Some(n), Some(e)) = (&key.n, &key.e) {
        return DecodingKey::from_rsa_components(n, e).ok();
    }
    // some providers only publish the certificate chain
    if let Some(cert) = key.x5c.as_ref().and_then(|certs| certs.first()) {
        let der = base64::engine::general_purpose::STANDARD.decode(cert).ok()?;
        return Some(DecodingKey::from_rsa_der(&der));
    }
    None
}
