//! Credential checks for the employee API and the admin console.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use validator::Validate;

use crate::auth::password::{verify_dummy, verify_password};
use crate::auth::token::{issue_token, IssuedToken, Subject, TokenError};
use crate::errors::AppError;
use crate::models::account::{Account, Role};
use crate::models::employee::EmployeeStatus;
use crate::models::normalize_email;
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum LoginError {
    /// Unknown email or wrong password. Never distinguish the two.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account role cannot use this portal")]
    WrongPortal,

    #[error("no employee record references this account")]
    EmployeeRecordMissing,

    #[error("employee record is inactive")]
    AccountInactive,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Authorization failures share one generic response; the reason is logged.
impl From<LoginError> for AppError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::InvalidCredentials => AppError::InvalidCredentials,
            refused @ (LoginError::WrongPortal
            | LoginError::EmployeeRecordMissing
            | LoginError::AccountInactive) => {
                info!("Login refused: {refused}");
                AppError::Forbidden
            }
            LoginError::Store(e) => AppError::Store(e),
            LoginError::Token(e) => AppError::Internal(e.into()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub email: String,
    pub full_name: String,
}

impl AuthResponse {
    fn new(issued: IssuedToken, email: String, full_name: String) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
            email,
            full_name,
        }
    }
}

/// Looks up the account and checks the password. A malformed stored hash is
/// treated as a mismatch.
async fn authenticate(state: &AppState, email: &str, password: &str) -> Result<Account, LoginError> {
    let email = normalize_email(email);
    let Some(account) = state.accounts.find_by_email(&email).await? else {
        verify_dummy(password);
        return Err(LoginError::InvalidCredentials);
    };

    match verify_password(password, &account.password_hash) {
        Ok(true) => Ok(account),
        Ok(false) => Err(LoginError::InvalidCredentials),
        Err(e) => {
            warn!("Account {} has an unreadable password hash: {e}", account.id);
            Err(LoginError::InvalidCredentials)
        }
    }
}

/// Employee API login.
pub async fn login(state: &AppState, req: &LoginRequest) -> Result<AuthResponse, LoginError> {
    let account = authenticate(state, &req.email, &req.password).await?;
    if account.role != Role::Employee {
        return Err(LoginError::WrongPortal);
    }

    let employee = state
        .employees
        .find_by_account(account.id)
        .await?
        .ok_or(LoginError::EmployeeRecordMissing)?;
    if employee.status == EmployeeStatus::Inactive {
        return Err(LoginError::AccountInactive);
    }

    let full_name = employee.full_name();
    let issued = issue_token(
        Subject {
            account_id: account.id,
            email: &account.email,
            name: &full_name,
            employee_id: Some(employee.id),
            role: Role::Employee,
        },
        &state.auth,
    )?;
    info!("Employee {} logged in", employee.id);
    Ok(AuthResponse::new(issued, account.email, full_name))
}

/// Admin console login.
pub async fn admin_login(state: &AppState, req: &LoginRequest) -> Result<AuthResponse, LoginError> {
    let account = authenticate(state, &req.email, &req.password).await?;
    if account.role != Role::Admin {
        return Err(LoginError::WrongPortal);
    }

    let issued = issue_token(
        Subject {
            account_id: account.id,
            email: &account.email,
            name: &account.email,
            employee_id: None,
            role: Role::Admin,
        },
        &state.auth,
    )?;
    info!("Admin {} logged in", account.email);
    let name = account.email.clone();
    Ok(AuthResponse::new(issued, account.email, name))
}
