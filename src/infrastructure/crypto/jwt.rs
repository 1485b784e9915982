//! JWT handling
//!
//! Session tokens are issued by the external auth provider and signed with
//! a shared HS256 secret. The service only verifies them; `create_token`
//! exists for local development and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::{CurrentUser, UserRole};

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared signing secret
    pub secret: String,
    /// Lifetime of tokens minted by `create_token`
    pub expiration_hours: i64,
    /// Expected `iss` claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "park-eazy-dev-secret-change-me".to_string(),
            expiration_hours: 24,
            issuer: "park-eazy-auth".to_string(),
        }
    }
}

/// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// User id
    pub sub: String,
    pub email: String,
    pub name: String,
    /// `USER`, `ADMIN` or `SUPER_ADMIN`
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

impl TokenClaims {
    pub fn new(user: &CurrentUser, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    /// The session user, or `None` when `sub` or `role` is malformed.
    pub fn to_current_user(&self) -> Option<CurrentUser> {
        Some(CurrentUser {
            id: Uuid::parse_str(&self.sub).ok()?,
            email: self.email.clone(),
            name: self.name.clone(),
            role: UserRole::from_str(&self.role)?,
        })
    }
}

pub fn create_token(
    user: &CurrentUser,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        &TokenClaims::new(user, config),
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature, expiry and issuer, then decode.
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}
