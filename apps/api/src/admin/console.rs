use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::auth::login::{admin_login, AuthResponse, LoginRequest};
use crate::auth::session::{cleared_cookie, session_cookie, AdminSession};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::import::{import_workbook, ImportReport};
use crate::models::employee::StatusCounts;
use crate::state::AppState;

const ACCEPTED_EXTENSIONS: &[&str] = &["xlsx", "xls", "ods"];
pub const BLANK_QUERY_REPLY: &str = "Por favor, ingresa una consulta.";

/// POST /admin/login
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let response: AuthResponse = admin_login(&state, &req).await?;
    let cookie = session_cookie(&response.token, state.auth.ttl_hours * 3600);
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(response)))
}

/// POST /admin/logout
pub async fn handle_logout() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([(SET_COOKIE, cleared_cookie())]),
    )
}

/// GET /admin/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<StatusCounts>, AppError> {
    Ok(Json(state.employees.count_by_status().await?))
}

fn has_accepted_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ACCEPTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// POST /admin/import (multipart, field `file`)
pub async fn handle_import(
    State(state): State<AppState>,
    admin: AdminSession,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportReport>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        upload = Some((file_name, bytes));
        break;
    }

    let Some((file_name, bytes)) = upload.filter(|(_, b)| !b.is_empty()) else {
        return Err(AppError::Validation("Please select a spreadsheet file".into()));
    };
    if !has_accepted_extension(&file_name) {
        return Err(AppError::Validation(
            "The file must be a spreadsheet (.xlsx, .xls or .ods)".into(),
        ));
    }

    info!("Admin {} importing {file_name} ({} bytes)", admin.email, bytes.len());
    let report = import_workbook(
        state.employees.as_ref(),
        state.departments.as_ref(),
        &bytes,
        &state.import,
    )
    .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AssistantResponse {
    pub success: bool,
    pub response: String,
}

/// POST /admin/assistant
pub async fn handle_assistant(
    State(state): State<AppState>,
    _admin: AdminSession,
    AppJson(req): AppJson<AssistantRequest>,
) -> Result<Json<AssistantResponse>, AppError> {
    if req.query.trim().is_empty() {
        return Ok(Json(AssistantResponse {
            success: false,
            response: BLANK_QUERY_REPLY.to_string(),
        }));
    }

    let employees = state.employees.list_all().await?;
    let response = state.assistant.answer(&req.query, &employees).await;
    Ok(Json(AssistantResponse {
        success: true,
        response,
    }))
}
