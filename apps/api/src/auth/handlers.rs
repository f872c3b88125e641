use axum::{extract::State, http::StatusCode, Json};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::auth::login::{login, AuthResponse, LoginRequest};
use crate::auth::registration::{
    register, register_strict, RegisterRequest, RegistrationMode, RegistrationResponse,
    StrictRegisterRequest,
};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

/// Parses and validates a JSON body whose shape depends on runtime config.
fn parse_body<T: DeserializeOwned + Validate>(body: Value) -> Result<T, AppError> {
    let parsed: T =
        serde_json::from_value(body).map_err(|e| AppError::Validation(e.to_string()))?;
    parsed.validate()?;
    Ok(parsed)
}

/// POST /auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<(StatusCode, Json<RegistrationResponse>), AppError> {
    let response = match state.registration {
        RegistrationMode::Reconcile => {
            let req: RegisterRequest = parse_body(body)?;
            register(&state, req).await?
        }
        RegistrationMode::Strict => {
            let req: StrictRegisterRequest = parse_body(body)?;
            register_strict(&state, &req.document).await?
        }
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()?;
    Ok(Json(login(&state, &req).await?))
}
