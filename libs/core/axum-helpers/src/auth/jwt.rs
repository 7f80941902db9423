use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims carried by every access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // Subject (principal id)
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: i64, // Expiration time
    pub iat: i64, // Issued at
    #[serde(default)]
    pub jti: String, // Token id, for log correlation
}

impl JwtClaims {
    /// Whether any of the principal's roles is in `allowed`
    pub fn has_any_role<S: AsRef<str>>(&self, allowed: &[S]) -> bool {
        self.roles
            .iter()
            .any(|role| allowed.iter().any(|a| a.as_ref() == role))
    }
}

/// Stateless HS256 token verification.
///
/// Tokens are validated on signature and expiry only; there is no server-side
/// revocation list.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.as_bytes();
        tracing::info!("JWT auth initialized");
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Mint a token for `subject` holding `roles`, valid for `ttl`.
    pub fn issue_token<S: AsRef<str>>(
        &self,
        subject: &str,
        roles: &[S],
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();

        let claims = JwtClaims {
            sub: subject.to_string(),
            roles: roles.iter().map(|r| r.as_ref().to_string()).collect(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Verify signature and expiry, returning the decoded claims
    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, jsonwebtoken::errors::Error> {
        decode::<JwtClaims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}
