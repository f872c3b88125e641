use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::auth::session::AdminSession;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::department::{Department, DepartmentSummary};
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Debug, Deserialize, Validate)]
pub struct DepartmentInput {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
}

async fn summary_or_404(state: &AppState, id: i64) -> Result<DepartmentSummary, AppError> {
    state
        .departments
        .summary(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Department {id} not found")))
}

/// GET /departments
pub async fn handle_list_public(State(state): State<AppState>) -> Result<Json<Vec<Department>>, AppError> {
    Ok(Json(state.departments.list().await?))
}

/// GET /departments/:id
pub async fn handle_get_public(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<DepartmentSummary>, AppError> {
    Ok(Json(summary_or_404(&state, id).await?))
}

/// GET /admin/departments
pub async fn handle_list(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Vec<DepartmentSummary>>, AppError> {
    Ok(Json(state.departments.summaries().await?))
}

/// GET /admin/departments/:id
pub async fn handle_get(
    State(state): State<AppState>,
    _admin: AdminSession,
    AppPath(id): AppPath<i64>,
) -> Result<Json<DepartmentSummary>, AppError> {
    Ok(Json(summary_or_404(&state, id).await?))
}

/// POST /admin/departments
pub async fn handle_create(
    State(state): State<AppState>,
    admin: AdminSession,
    AppJson(input): AppJson<DepartmentInput>,
) -> Result<(StatusCode, Json<Department>), AppError> {
    input.validate()?;
    let department = match state.departments.create(input.name.trim()).await {
        Ok(d) => d,
        Err(StoreError::Conflict(_)) => {
            return Err(AppError::Conflict(format!(
                "Department '{}' already exists",
                input.name.trim()
            )))
        }
        Err(e) => return Err(e.into()),
    };
    info!("Admin {} created department {}", admin.email, department.name);
    Ok((StatusCode::CREATED, Json(department)))
}

/// DELETE /admin/departments/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    admin: AdminSession,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    match state.departments.delete(id).await {
        Ok(true) => {
            info!("Admin {} deleted department {id}", admin.email);
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(AppError::NotFound(format!("Department {id} not found"))),
        Err(StoreError::Restricted(_)) => Err(AppError::Conflict(
            "The department still has employees and cannot be deleted".into(),
        )),
        Err(e) => Err(e.into()),
    }
}
