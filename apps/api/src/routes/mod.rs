pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::admin::{console, departments, employees};
use crate::auth::handlers as auth;
use crate::employee::handlers as employee;
use crate::state::AppState;

/// Upper bound for spreadsheet uploads.
const IMPORT_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Employee self-service API
        .route("/auth/register", post(auth::handle_register))
        .route("/auth/login", post(auth::handle_login))
        .route("/employee/me", get(employee::handle_me))
        .route("/employee/me/resume", get(employee::handle_my_resume))
        .route("/employee/me/contact", put(employee::handle_update_contact))
        .route("/departments", get(departments::handle_list_public))
        .route("/departments/:id", get(departments::handle_get_public))
        // Admin console
        .route("/admin/login", post(console::handle_login))
        .route("/admin/logout", post(console::handle_logout))
        .route("/admin/dashboard", get(console::handle_dashboard))
        .route(
            "/admin/employees",
            get(employees::handle_list).post(employees::handle_create),
        )
        .route(
            "/admin/employees/:id",
            get(employees::handle_get)
                .put(employees::handle_update)
                .delete(employees::handle_delete),
        )
        .route("/admin/employees/:id/resume", get(employees::handle_resume))
        .route(
            "/admin/departments",
            get(departments::handle_list).post(departments::handle_create),
        )
        .route(
            "/admin/departments/:id",
            get(departments::handle_get).delete(departments::handle_delete),
        )
        .route(
            "/admin/import",
            post(console::handle_import).layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT)),
        )
        .route("/admin/assistant", post(console::handle_assistant))
        .with_state(state)
}
