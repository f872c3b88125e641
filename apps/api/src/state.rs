use std::sync::Arc;

use crate::assistant::QueryAssistant;
use crate::auth::registration::RegistrationMode;
use crate::auth::token::AuthConfig;
use crate::import::ImportOptions;
use crate::notify::Notifier;
use crate::resume::RenderConfig;
use crate::store::{AccountStore, DepartmentStore, EmployeeStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub employees: Arc<dyn EmployeeStore>,
    pub departments: Arc<dyn DepartmentStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub notifier: Arc<dyn Notifier>,
    pub assistant: Arc<QueryAssistant>,
    pub auth: AuthConfig,
    /// Which self-registration policy this deployment runs.
    pub registration: RegistrationMode,
    pub import: ImportOptions,
    pub resume: RenderConfig,
}

#[cfg(test)]
impl AppState {
    /// State over an in-memory store with the given notifier and no LLM.
    pub fn for_tests(
        store: Arc<crate::store::memory::MemoryStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            employees: store.clone(),
            departments: store.clone(),
            accounts: store,
            notifier,
            assistant: Arc::new(QueryAssistant::new(None)),
            auth: crate::auth::token::test_config(),
            registration: RegistrationMode::Reconcile,
            import: ImportOptions::default(),
            resume: RenderConfig::default(),
        }
    }
}
