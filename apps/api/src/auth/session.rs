//! Session extractors. A credential is accepted from `Authorization: Bearer`
//! or from the admin console's session cookie.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tracing::debug;
use uuid::Uuid;

use crate::auth::token::{decode_token, Claims, TokenError};
use crate::errors::AppError;
use crate::models::account::Role;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "talento_session";

/// An authenticated employee calling the self-service API.
#[derive(Debug, Clone)]
pub struct EmployeeSession {
    pub account_id: Uuid,
    pub employee_id: i64,
    pub email: String,
}

/// An authenticated admin using the console.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub email: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|t| !t.is_empty())
}

/// Decodes the request's credential. Every failure collapses into
/// `Unauthorized`; the reason is only logged.
fn claims_from(parts: &Parts, state: &AppState) -> Result<Claims, AppError> {
    let token = bearer_token(&parts.headers)
        .or_else(|| cookie_token(&parts.headers))
        .ok_or(AppError::Unauthorized)?;

    decode_token(token, &state.auth).map_err(|e| {
        match e {
            TokenError::Expired => debug!("Rejected expired session on {}", parts.uri),
            other => debug!("Rejected session on {}: {other}", parts.uri),
        }
        AppError::Unauthorized
    })
}

#[async_trait]
impl FromRequestParts<AppState> for EmployeeSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = claims_from(parts, state)?;
        match (claims.role, claims.employee_id) {
            (Role::Employee, Some(employee_id)) => Ok(EmployeeSession {
                account_id: claims.sub,
                employee_id,
                email: claims.email,
            }),
            _ => Err(AppError::Forbidden),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = claims_from(parts, state)?;
        if claims.role != Role::Admin {
            return Err(AppError::Forbidden);
        }
        Ok(AdminSession {
            email: claims.email,
        })
    }
}

/// `Set-Cookie` value carrying an admin credential.
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// `Set-Cookie` value that clears the session.
pub fn cleared_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
