//! Signed session credentials (HS256 JWT).

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::account::Role;

/// Signing settings. All values come from deployment configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_hours: i64,
}

/// Claims carried by every session credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: Uuid,
    pub email: String,
    /// Display name.
    pub name: String,
    /// Absent for admin sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<i64>,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// A freshly signed credential and its expiry.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Who the credential is issued for.
pub struct Subject<'a> {
    pub account_id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub employee_id: Option<i64>,
    pub role: Role,
}

pub fn issue_token(subject: Subject<'_>, config: &AuthConfig) -> Result<IssuedToken, TokenError> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.ttl_hours);
    let claims = Claims {
        sub: subject.account_id,
        email: subject.email.to_string(),
        name: subject.name.to_string(),
        employee_id: subject.employee_id,
        role: subject.role,
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
        iss: config.issuer.clone(),
        aud: config.audience.clone(),
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    let token = encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| TokenError::Signing(e.to_string()))?;

    Ok(IssuedToken {
        token,
        expires_at: Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .unwrap_or(expires_at),
    })
}

/// Verify signature, expiry, issuer and audience.
pub fn decode_token(token: &str, config: &AuthConfig) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);
    validation.set_required_spec_claims(&["sub", "exp", "iss", "aud"]);
    validation.leeway = 0;

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
pub(crate) fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-that-is-at-least-32-bytes-long".into(),
        issuer: "talento-api-test".into(),
        audience: "talento-clients-test".into(),
        ttl_hours: 24,
    }
}
