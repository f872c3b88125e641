use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};
use validator::{Validate, ValidationError};

use crate::auth::session::AdminSession;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::employee::{
    EducationLevel, Employee, EmployeeStatus, EmployeeWithDepartment, NewEmployee,
};
use crate::models::normalize_email;
use crate::resume;
use crate::state::AppState;
use crate::store::{EmployeeFilter, Page};

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative").with_message("Salary cannot be negative".into()));
    }
    Ok(())
}

/// Create/update body. The department is named either by `department_id`
/// or, for a department not yet on file, by `department_name`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmployeeInput {
    #[validate(length(min = 1, max = 50, message = "Document is required"))]
    pub document: String,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub address: String,
    #[validate(length(max = 30))]
    #[serde(default)]
    pub phone: String,
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "Position is required"))]
    pub position: String,
    #[validate(custom(function = "non_negative"))]
    pub salary: Decimal,
    pub hire_date: NaiveDate,
    pub status: EmployeeStatus,
    pub education_level: EducationLevel,
    #[serde(default)]
    pub professional_profile: String,
    pub department_id: Option<i64>,
    #[validate(length(max = 100))]
    pub department_name: Option<String>,
}

impl EmployeeInput {
    fn into_new(self, department_id: i64) -> NewEmployee {
        NewEmployee {
            document: self.document.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            date_of_birth: self.date_of_birth,
            address: self.address.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: normalize_email(&self.email),
            position: self.position.trim().to_string(),
            salary: self.salary,
            hire_date: self.hire_date,
            status: self.status,
            education_level: self.education_level,
            professional_profile: self.professional_profile.trim().to_string(),
            department_id,
            account_id: None,
        }
    }
}

/// A non-blank `department_name` wins and is created if missing.
async fn resolve_department(state: &AppState, input: &EmployeeInput) -> Result<i64, AppError> {
    if let Some(name) = input.department_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        let department = state.departments.ensure(name).await?;
        return Ok(department.id);
    }
    let id = input
        .department_id
        .ok_or_else(|| AppError::Validation("department_id: A department is required".into()))?;
    match state.departments.get(id).await? {
        Some(department) => Ok(department.id),
        None => Err(AppError::Validation(format!("department_id: Department {id} does not exist"))),
    }
}

async fn get_or_404(state: &AppState, id: i64) -> Result<EmployeeWithDepartment, AppError> {
    state
        .employees
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {id} not found")))
}

/// GET /admin/employees
pub async fn handle_list(
    State(state): State<AppState>,
    _admin: AdminSession,
    AppQuery(filter): AppQuery<EmployeeFilter>,
) -> Result<Json<Page<EmployeeWithDepartment>>, AppError> {
    Ok(Json(state.employees.search(&filter).await?))
}

/// GET /admin/employees/:id
pub async fn handle_get(
    State(state): State<AppState>,
    _admin: AdminSession,
    AppPath(id): AppPath<i64>,
) -> Result<Json<EmployeeWithDepartment>, AppError> {
    Ok(Json(get_or_404(&state, id).await?))
}

/// POST /admin/employees
pub async fn handle_create(
    State(state): State<AppState>,
    admin: AdminSession,
    AppJson(input): AppJson<EmployeeInput>,
) -> Result<(StatusCode, Json<EmployeeWithDepartment>), AppError> {
    input.validate()?;
    let department_id = resolve_department(&state, &input).await?;
    let created = state.employees.create(input.into_new(department_id)).await?;
    info!("Admin {} created employee {}", admin.email, created.id);
    Ok((StatusCode::CREATED, Json(get_or_404(&state, created.id).await?)))
}

/// PUT /admin/employees/:id
pub async fn handle_update(
    State(state): State<AppState>,
    admin: AdminSession,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<EmployeeInput>,
) -> Result<Json<EmployeeWithDepartment>, AppError> {
    input.validate()?;
    let existing = get_or_404(&state, id).await?;
    let department_id = resolve_department(&state, &input).await?;

    let mut updated = Employee::from_new(id, input.into_new(department_id));
    updated.account_id = existing.employee.account_id;
    if !state.employees.update(&updated).await? {
        return Err(AppError::NotFound(format!("Employee {id} not found")));
    }
    info!("Admin {} updated employee {id}", admin.email);
    Ok(Json(get_or_404(&state, id).await?))
}

/// DELETE /admin/employees/:id
///
/// A linked login account is removed with the record.
pub async fn handle_delete(
    State(state): State<AppState>,
    admin: AdminSession,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    let existing = get_or_404(&state, id).await?;
    if !state.employees.delete(id).await? {
        return Err(AppError::NotFound(format!("Employee {id} not found")));
    }
    if let Some(account_id) = existing.employee.account_id {
        if let Err(e) = state.accounts.delete(account_id).await {
            warn!("Employee {id} deleted but account {account_id} was not: {e}");
        }
    }
    info!("Admin {} deleted employee {id}", admin.email);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/employees/:id/resume
pub async fn handle_resume(
    State(state): State<AppState>,
    _admin: AdminSession,
    AppPath(id): AppPath<i64>,
) -> Result<Response, AppError> {
    let record = get_or_404(&state, id).await?;
    resume::pdf_download(record, state.resume.clone()).await
}
