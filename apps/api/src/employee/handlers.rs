use axum::{extract::State, response::Response, Json};
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::auth::session::EmployeeSession;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::employee::EmployeeWithDepartment;
use crate::resume;
use crate::state::AppState;

/// Only these two fields can be changed by the employee. Anything else in
/// the body is ignored.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ContactUpdateRequest {
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// The caller's record, provided it is still linked to the session's account.
async fn own_record(state: &AppState, session: &EmployeeSession) -> Result<EmployeeWithDepartment, AppError> {
    let record = state
        .employees
        .get(session.employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee record not found".into()))?;
    if record.employee.account_id != Some(session.account_id) {
        warn!(
            "Session of {} refers to employee {} which is no longer linked to it",
            session.email, session.employee_id
        );
        return Err(AppError::Forbidden);
    }
    Ok(record)
}

/// GET /employee/me
pub async fn handle_me(
    State(state): State<AppState>,
    session: EmployeeSession,
) -> Result<Json<EmployeeWithDepartment>, AppError> {
    Ok(Json(own_record(&state, &session).await?))
}

/// GET /employee/me/resume
pub async fn handle_my_resume(
    State(state): State<AppState>,
    session: EmployeeSession,
) -> Result<Response, AppError> {
    let record = own_record(&state, &session).await?;
    resume::pdf_download(record, state.resume.clone()).await
}

/// PUT /employee/me/contact
pub async fn handle_update_contact(
    State(state): State<AppState>,
    session: EmployeeSession,
    AppJson(req): AppJson<ContactUpdateRequest>,
) -> Result<Json<EmployeeWithDepartment>, AppError> {
    req.validate()?;
    own_record(&state, &session).await?;
    let address = non_blank(&req.address);
    let phone = non_blank(&req.phone);

    if address.is_some() || phone.is_some() {
        state
            .employees
            .update_contact(session.employee_id, address, phone)
            .await?
            .ok_or_else(|| AppError::NotFound("Employee record not found".into()))?;
        info!("Employee {} updated contact details", session.employee_id);
    }

    Ok(Json(own_record(&state, &session).await?))
}
