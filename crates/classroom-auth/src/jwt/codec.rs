//! HS256 signing and verification of token pairs.
//!
//! The codec never touches storage. Whether a verified token is still live
//! is decided by composing it with the revocation store.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use classroom_core::config::AuthConfig;
use classroom_core::error::{AppError, ErrorKind};
use classroom_entity::user::Role;

use super::claims::{Claims, TokenUse};

/// Failures while signing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The secret cannot sign tokens, or the signer failed.
    #[error("token signing failed: {0}")]
    Signing(String),
    /// The token's expiry has passed.
    #[error("token has expired")]
    Expired,
    /// Malformed, badly signed, or structurally wrong token.
    #[error("invalid token: {0}")]
    Invalid(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(_) => AppError::with_source(
                ErrorKind::Internal,
                "Failed to issue session token",
                err,
            ),
            TokenError::Expired | TokenError::Invalid(_) => {
                AppError::unauthorized(err.to_string()).with_reason("invalid_token")
            }
        }
    }
}

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct IssuedPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Revocation key shared by both tokens.
    pub token_id: String,
    /// Expiry of the access token.
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens with one shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    secret_usable: bool,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret_usable", &self.secret_usable)
            .finish()
    }
}

impl TokenCodec {
    /// Build a codec from the configured secret.
    pub fn new(config: &AuthConfig) -> Self {
        Self::from_secret(config.jwt_secret.as_bytes())
    }

    /// Build a codec from raw secret bytes.
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Refresh tokens carry no `exp`; access tokens are checked after decode.
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            secret_usable: !secret.is_empty(),
        }
    }

    /// Mint a pair for `subject_id` whose access half expires after `ttl`.
    pub fn issue(
        &self,
        subject_id: i64,
        role: Role,
        ttl: Duration,
    ) -> Result<IssuedPair, TokenError> {
        self.issue_at(subject_id, role, ttl, Utc::now())
    }

    fn issue_at(
        &self,
        subject_id: i64,
        role: Role,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedPair, TokenError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| TokenError::Signing(format!("ttl out of range: {e}")))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Signing("ttl out of range".to_string()))?;
        let token_id = token_id(subject_id, now);

        let access = Claims {
            user_id: subject_id,
            role,
            exp: Some(expires_at.timestamp()),
            iat: now.timestamp(),
            jti: token_id.clone(),
            token_use: TokenUse::Access,
        };
        let refresh = Claims {
            exp: None,
            token_use: TokenUse::Refresh,
            ..access.clone()
        };

        Ok(IssuedPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            token_id,
            expires_at,
        })
    }

    /// Sign arbitrary claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        if !self.secret_usable {
            return Err(TokenError::Signing("signing secret is empty".to_string()));
        }
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature, structure, and (for access tokens) expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;
        let claims = data.claims;

        if claims.token_use == TokenUse::Access && claims.exp.is_none() {
            return Err(TokenError::Invalid("access token without expiry".to_string()));
        }
        Ok(claims)
    }
}

/// `<subject>:<unix-seconds>:<random>`; the random suffix keeps two pairs
/// minted in the same second distinct.
fn token_id(subject_id: i64, now: DateTime<Utc>) -> String {
    format!("{subject_id}:{}:{}", now.timestamp(), Uuid::new_v4().simple())
}
