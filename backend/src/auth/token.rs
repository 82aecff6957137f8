use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use jwt::{Claims, Header, RegisteredClaims, SignWithKey, Token, VerifyWithKey};
use sha2::Sha256;

use super::{AuthError, AuthResult};
use crate::config::AuthConfig;
use crate::models::{User, UserId};

const FIRST_NAME_CLAIM: &str = "firstName";
const LAST_NAME_CLAIM: &str = "lastName";

/// Identity carried by a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens with a shared HMAC key.
#[derive(Clone)]
pub struct TokenService {
    key: Hmac<Sha256>,
    issuer: String,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, issuer: impl Into<String>, ttl: Duration) -> AuthResult<Self> {
        let key = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .map_err(|e| AuthError::Key(e.to_string()))?;
        Ok(Self {
            key,
            issuer: issuer.into(),
            ttl,
        })
    }

    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        Self::new(
            &config.jwt_secret,
            config.jwt_issuer.clone(),
            Duration::seconds(config.token_ttl_secs as i64),
        )
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `user`, valid from `now` for the configured lifetime.
    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> AuthResult<String> {
        let mut claims = Claims::new(RegisteredClaims {
            issuer: Some(self.issuer.clone()),
            subject: Some(user.id.to_string()),
            issued_at: Some(now.timestamp() as u64),
            expiration: Some((now + self.ttl).timestamp() as u64),
            ..Default::default()
        });
        claims.private.insert(
            FIRST_NAME_CLAIM.to_string(),
            serde_json::Value::String(user.first_name.clone()),
        );
        claims.private.insert(
            LAST_NAME_CLAIM.to_string(),
            serde_json::Value::String(user.last_name.clone()),
        );

        claims
            .sign_with_key(&self.key)
            .map_err(|e| AuthError::Key(e.to_string()))
    }

    /// Verify signature, issuer and lifetime of `token` as of `now`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> AuthResult<SessionClaims> {
        let token: Token<Header, Claims, _> = token
            .verify_with_key(&self.key)
            .map_err(|_| AuthError::InvalidToken)?;
        let claims = token.claims();

        if claims.registered.issuer.as_deref() != Some(self.issuer.as_str()) {
            return Err(AuthError::InvalidToken);
        }

        let issued_at = claims
            .registered
            .issued_at
            .and_then(timestamp)
            .ok_or(AuthError::InvalidToken)?;
        if issued_at > now {
            return Err(AuthError::InvalidToken);
        }

        let expires_at = claims
            .registered
            .expiration
            .and_then(timestamp)
            .ok_or(AuthError::InvalidToken)?;
        if expires_at < now {
            return Err(AuthError::Expired);
        }

        let user_id = claims
            .registered
            .subject
            .as_deref()
            .and_then(|s| s.parse::<UserId>().ok())
            .ok_or(AuthError::InvalidToken)?;

        Ok(SessionClaims {
            user_id,
            first_name: private_string(claims, FIRST_NAME_CLAIM),
            last_name: private_string(claims, LAST_NAME_CLAIM),
            issued_at,
            expires_at,
        })
    }
}

fn timestamp(secs: u64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs as i64, 0).single()
}

fn private_string(claims: &Claims, name: &str) -> String {
    claims
        .private
        .get(name)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}
