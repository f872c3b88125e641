//! Self-registration: reconciles a registering user against the employee
//! records HR already holds, creates the login account and links the two.
//!
//! Two policies exist and a deployment runs exactly one of them
//! (see [`RegistrationMode`]):
//!
//! - `Reconcile`: match by document or email, link if found, otherwise create
//!   a placeholder employee. The user chooses the password and receives a
//!   session credential immediately.
//! - `Strict`: match by document only. The password is generated server-side
//!   and emailed; if that email cannot be sent the link is rolled back.

use std::str::FromStr;

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{check_policy, generate_password, hash_password, HashError};
use crate::auth::token::{issue_token, Subject, TokenError};
use crate::errors::AppError;
use crate::models::account::{Account, Role};
use crate::models::employee::{EducationLevel, Employee, EmployeeStatus, NewEmployee, UnknownVariant};
use crate::models::normalize_email;
use crate::state::AppState;
use crate::store::StoreError;

/// Value stored in HR fields a self-registration form does not collect.
pub const PENDING: &str = "Pendiente";

const PLACEHOLDER_AGE_MONTHS: u32 = 25 * 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationMode {
    #[default]
    Reconcile,
    Strict,
}

impl FromStr for RegistrationMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reconcile" => Ok(RegistrationMode::Reconcile),
            "strict" => Ok(RegistrationMode::Strict),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Notification failure policy
// ────────────────────────────────────────────────────────────────────────────

/// Operations that send mail after persisting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyingOperation {
    WelcomeAfterRegistration,
    CredentialsAfterLinking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnNotifyFailure {
    /// Keep the persisted result and report the unsent message.
    IgnoreAndWarn,
    /// Undo the link and fail the operation.
    RollbackAndFail,
}

/// The user can only learn a generated password from the email, so that send
/// is fatal. The welcome message is informational.
pub fn notify_failure_policy(operation: NotifyingOperation) -> OnNotifyFailure {
    match operation {
        NotifyingOperation::WelcomeAfterRegistration => OnNotifyFailure::IgnoreAndWarn,
        NotifyingOperation::CredentialsAfterLinking => OnNotifyFailure::RollbackAndFail,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("an account already exists for this email")]
    AccountExists,

    #[error("the employee record is already linked to an account")]
    AlreadyLinked,

    #[error("department not found")]
    DepartmentNotFound,

    #[error("no employee record matches this document")]
    EmployeeNotFound,

    #[error("account creation failed: {}", .0.join("; "))]
    AccountCreationFailed(Vec<String>),

    #[error("credentials email could not be sent")]
    NotificationFailed,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Hash(#[from] HashError),
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::AccountExists => {
                AppError::Conflict("An account is already registered with this email".into())
            }
            RegistrationError::AlreadyLinked => {
                AppError::Conflict("This employee already has an account".into())
            }
            RegistrationError::DepartmentNotFound => {
                AppError::NotFound("The specified department does not exist".into())
            }
            RegistrationError::EmployeeNotFound => AppError::NotFound(
                "No employee record matches this document. Please contact Human Resources.".into(),
            ),
            RegistrationError::AccountCreationFailed(reasons) => {
                AppError::Validation(reasons.join("; "))
            }
            RegistrationError::NotificationFailed => AppError::Unavailable(
                "The credentials email could not be sent. Please try again later.".into(),
            ),
            RegistrationError::Store(e) => AppError::Store(e),
            RegistrationError::Token(e) => AppError::Internal(e.into()),
            RegistrationError::Hash(e) => AppError::Internal(e.into()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Requests and responses
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "Document is required"))]
    pub document: String,
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(max = 30))]
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub department_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StrictRegisterRequest {
    #[validate(length(min = 1, max = 50, message = "Document is required"))]
    pub document: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Masked in strict mode, where the address comes from HR records.
    pub email: String,
    pub full_name: String,
    pub employee_id: i64,
    /// True when an HR record was linked instead of creating a new one.
    pub linked_existing: bool,
    pub notification_sent: bool,
    pub message: String,
}

/// `ana.perez@test.com` → `an*******@test.com`.
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return "***".to_string();
    };
    let visible = if local.chars().count() > 2 { 2 } else { 1 };
    let shown: String = local.chars().take(visible).collect();
    let hidden = local.chars().count().saturating_sub(visible).max(3);
    format!("{shown}{}@{domain}", "*".repeat(hidden))
}

fn placeholder_employee(req: &RegisterRequest, email: &str, department_id: i64, account_id: Uuid) -> NewEmployee {
    let today = Utc::now().date_naive();
    NewEmployee {
        document: req.document.trim().to_string(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        date_of_birth: today
            .checked_sub_months(Months::new(PLACEHOLDER_AGE_MONTHS))
            .unwrap_or(NaiveDate::MIN),
        address: PENDING.to_string(),
        phone: req.phone.trim().to_string(),
        email: email.to_string(),
        position: PENDING.to_string(),
        salary: Decimal::ZERO,
        hire_date: today,
        status: EmployeeStatus::Inactive,
        education_level: EducationLevel::LOWEST,
        professional_profile: PENDING.to_string(),
        department_id,
        account_id: Some(account_id),
    }
}

/// Removes an account created earlier in a registration that then failed.
async fn discard_account(state: &AppState, account: &Account) {
    match state.accounts.delete(account.id).await {
        Ok(_) => info!("Discarded account {} after failed registration", account.id),
        Err(e) => warn!("Failed to discard account {}: {e}", account.id),
    }
}

async fn create_account(state: &AppState, email: &str, password: &str) -> Result<Account, RegistrationError> {
    let hash = hash_password(password)?;
    match state.accounts.create(email, &hash, Role::Employee).await {
        Ok(account) => {
            info!("Account created for {email} ({})", account.id);
            Ok(account)
        }
        Err(StoreError::Conflict(_)) => Err(RegistrationError::AccountExists),
        Err(e) => Err(e.into()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reconcile policy
// ────────────────────────────────────────────────────────────────────────────

pub async fn register(state: &AppState, req: RegisterRequest) -> Result<RegistrationResponse, RegistrationError> {
    let email = normalize_email(&req.email);
    let document = req.document.trim();

    if state.accounts.find_by_email(&email).await?.is_some() {
        return Err(RegistrationError::AccountExists);
    }

    let existing = state
        .employees
        .find_by_document_or_email(document, &email)
        .await?;
    if existing.as_ref().is_some_and(|e| e.account_id.is_some()) {
        return Err(RegistrationError::AlreadyLinked);
    }

    let department_id = match &existing {
        Some(_) => None,
        None => {
            let id = req.department_id.ok_or(RegistrationError::DepartmentNotFound)?;
            let department = state
                .departments
                .get(id)
                .await?
                .ok_or(RegistrationError::DepartmentNotFound)?;
            Some(department.id)
        }
    };

    let violations = check_policy(&req.password);
    if !violations.is_empty() {
        return Err(RegistrationError::AccountCreationFailed(violations));
    }

    let account = create_account(state, &email, &req.password).await?;

    let linked = match existing {
        Some(employee) => link_existing(state, &account, employee, &req.phone).await,
        None => {
            let new = placeholder_employee(&req, &email, department_id.unwrap_or_default(), account.id);
            match state.employees.create(new).await {
                Ok(employee) => Ok((employee, false)),
                Err(StoreError::Conflict(_)) => Err(RegistrationError::AlreadyLinked),
                Err(e) => Err(e.into()),
            }
        }
    };
    let (employee, linked_existing) = match linked {
        Ok(linked) => linked,
        Err(e) => {
            discard_account(state, &account).await;
            return Err(e);
        }
    };
    info!(
        "Employee {} linked to account {} (existing record: {linked_existing})",
        employee.id, account.id
    );

    let full_name = employee.full_name();
    let notification_sent = state.notifier.send_welcome(&account.email, &full_name).await;
    if !notification_sent {
        match notify_failure_policy(NotifyingOperation::WelcomeAfterRegistration) {
            OnNotifyFailure::IgnoreAndWarn => {
                warn!("Welcome email to {} was not sent; registration kept", account.email)
            }
            OnNotifyFailure::RollbackAndFail => {
                discard_account(state, &account).await;
                return Err(RegistrationError::NotificationFailed);
            }
        }
    }

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

    let masked = mask_email(&account.email);
    let message = if notification_sent {
        format!("Registration complete. A welcome email was sent to {masked}.")
    } else {
        format!("Registration complete. The welcome email to {masked} could not be sent.")
    };

    Ok(RegistrationResponse {
        token: Some(issued.token),
        expires_at: Some(issued.expires_at),
        email: account.email,
        full_name,
        employee_id: employee.id,
        linked_existing,
        notification_sent,
        message,
    })
}

/// Links an unlinked HR record, replacing the phone when the request carries
/// a different non-empty one.
async fn link_existing(
    state: &AppState,
    account: &Account,
    employee: Employee,
    phone: &str,
) -> Result<(Employee, bool), RegistrationError> {
    let phone = phone.trim();
    let new_phone = (!phone.is_empty() && phone != employee.phone).then_some(phone);

    if !state.employees.link_account(employee.id, account.id, new_phone).await? {
        return Err(RegistrationError::AlreadyLinked);
    }

    let mut employee = employee;
    employee.account_id = Some(account.id);
    if let Some(phone) = new_phone {
        employee.phone = phone.to_string();
    }
    Ok((employee, true))
}

// ────────────────────────────────────────────────────────────────────────────
// Strict policy
// ────────────────────────────────────────────────────────────────────────────

pub async fn register_strict(state: &AppState, document: &str) -> Result<RegistrationResponse, RegistrationError> {
    let document = document.trim();
    let employee = state
        .employees
        .find_by_document(document)
        .await?
        .ok_or(RegistrationError::EmployeeNotFound)?;
    if employee.account_id.is_some() {
        return Err(RegistrationError::AlreadyLinked);
    }

    let password = generate_password();
    let (account, created) = match state.accounts.find_by_email(&employee.email).await? {
        Some(account) => (reset_account(state, account, &password).await?, false),
        None => (create_account(state, &employee.email, &password).await?, true),
    };

    if !state.employees.link_account(employee.id, account.id, None).await? {
        if created {
            discard_account(state, &account).await;
        }
        return Err(RegistrationError::AlreadyLinked);
    }
    info!("Employee {} linked to account {}", employee.id, account.id);

    let full_name = employee.full_name();
    let notification_sent = state
        .notifier
        .send_credentials(&employee.email, &full_name, &password)
        .await;
    if !notification_sent {
        match notify_failure_policy(NotifyingOperation::CredentialsAfterLinking) {
            OnNotifyFailure::RollbackAndFail => {
                state.employees.unlink_account(employee.id, account.id).await?;
                info!(
                    "Link of employee {} to account {} rolled back: credentials email failed",
                    employee.id, account.id
                );
                return Err(RegistrationError::NotificationFailed);
            }
            OnNotifyFailure::IgnoreAndWarn => {
                warn!("Credentials email to {} was not sent", employee.email)
            }
        }
    }

    let masked = mask_email(&employee.email);
    Ok(RegistrationResponse {
        token: None,
        expires_at: None,
        message: format!("Your access credentials were sent to {masked}."),
        email: masked,
        full_name,
        employee_id: employee.id,
        linked_existing: true,
        notification_sent,
    })
}

/// Reuses an employee account left unlinked by an earlier attempt. Admin
/// accounts and accounts that already belong to another employee are never
/// touched.
async fn reset_account(state: &AppState, account: Account, password: &str) -> Result<Account, RegistrationError> {
    if account.role != Role::Employee {
        return Err(RegistrationError::AccountExists);
    }
    if state.employees.find_by_account(account.id).await?.is_some() {
        return Err(RegistrationError::AlreadyLinked);
    }
    let hash = hash_password(password)?;
    state.accounts.set_password(account.id, &hash).await?;
    info!("Password reset for unlinked account {}", account.id);
    Ok(account)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::password::verify_password;
    use crate::auth::token::decode_token;
    use crate::notify::testing::{RecordingNotifier, Sent};
    use crate::store::memory::MemoryStore;
    use crate::store::{AccountStore, EmployeeStore};

    fn setup(notifier: RecordingNotifier) -> (AppState, Arc<MemoryStore>, Arc<RecordingNotifier>) {
        let store = Arc::new(MemoryStore::with_departments(&["Tecnología", "Finanzas"]));
        let notifier = Arc::new(notifier);
        let state = AppState::for_tests(store.clone(), notifier.clone());
        (state, store, notifier)
    }

    fn hr_record(document: &str, email: &str) -> NewEmployee {
        NewEmployee {
            document: document.into(),
            first_name: "Ana".into(),
            last_name: "Pérez".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 14).unwrap(),
            address: "Calle 10 # 20-30".into(),
            phone: "3001234567".into(),
            email: email.into(),
            position: "Desarrolladora".into(),
            salary: Decimal::new(5_000_000, 0),
            hire_date: NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
            status: EmployeeStatus::Active,
            education_level: EducationLevel::Bachelor,
            professional_profile: "Backend".into(),
            department_id: 1,
            account_id: None,
        }
    }

    async fn seed(store: &MemoryStore, record: NewEmployee) -> Employee {
        EmployeeStore::create(store, record).await.unwrap()
    }

    fn request(document: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            document: document.into(),
            email: email.into(),
            password: "Secreto123*".into(),
            first_name: "Ana".into(),
            last_name: "Pérez".into(),
            phone: String::new(),
            department_id: Some(2),
        }
    }

    #[test]
    fn test_notify_policy_table() {
        assert_eq!(
            notify_failure_policy(NotifyingOperation::WelcomeAfterRegistration),
            OnNotifyFailure::IgnoreAndWarn
        );
        assert_eq!(
            notify_failure_policy(NotifyingOperation::CredentialsAfterLinking),
            OnNotifyFailure::RollbackAndFail
        );
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("ana.perez@test.com"), "an*******@test.com");
        assert_eq!(mask_email("a@test.com"), "a***@test.com");
        assert_eq!(mask_email("broken"), "***");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Strict".parse::<RegistrationMode>().unwrap(), RegistrationMode::Strict);
        assert_eq!(" reconcile ".parse::<RegistrationMode>().unwrap(), RegistrationMode::Reconcile);
        assert!("other".parse::<RegistrationMode>().is_err());
    }

    #[tokio::test]
    async fn test_register_links_existing_employee_by_document() {
        let (state, store, notifier) = setup(RecordingNotifier::succeeding());
        let existing = seed(&store, hr_record("1001", "ana.perez@test.com")).await;

        let mut req = request("1001", "otra@test.com");
        req.phone = "3119998888".into();
        let response = register(&state, req).await.unwrap();

        assert_eq!(store.employee_count(), 1);
        assert!(response.linked_existing);
        assert_eq!(response.employee_id, existing.id);
        let stored = EmployeeStore::get(store.as_ref(), existing.id).await.unwrap().unwrap();
        assert!(stored.employee.account_id.is_some());
        assert_eq!(stored.employee.phone, "3119998888");
        assert_eq!(stored.employee.salary, Decimal::new(5_000_000, 0));
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_register_links_existing_employee_by_email() {
        let (state, store, _) = setup(RecordingNotifier::succeeding());
        let existing = seed(&store, hr_record("1001", "ana.perez@test.com")).await;

        let response = register(&state, request("", "Ana.PÉREZ@Test.com")).await.unwrap();
        assert_eq!(response.employee_id, existing.id);
        assert_eq!(response.email, "ana.perez@test.com");
        assert_eq!(store.employee_count(), 1);
    }

    #[tokio::test]
    async fn test_register_creates_placeholder_employee() {
        let (state, store, _) = setup(RecordingNotifier::succeeding());

        let response = register(&state, request("2002", "nuevo@test.com")).await.unwrap();
        assert!(!response.linked_existing);

        let created = EmployeeStore::get(store.as_ref(), response.employee_id)
            .await
            .unwrap()
            .unwrap()
            .employee;
        assert_eq!(created.status, EmployeeStatus::Inactive);
        assert_eq!(created.salary, Decimal::ZERO);
        assert_eq!(created.education_level, EducationLevel::HighSchool);
        assert_eq!(created.position, PENDING);
        assert_eq!(created.department_id, 2);
        assert!(created.account_id.is_some());

        let claims = decode_token(response.token.as_deref().unwrap(), &state.auth).unwrap();
        assert_eq!(claims.employee_id, Some(created.id));
        assert_eq!(claims.role, Role::Employee);
    }

    #[tokio::test]
    async fn test_register_rejects_already_linked_without_mutation() {
        let (state, store, _) = setup(RecordingNotifier::succeeding());
        register(&state, request("2002", "nuevo@test.com")).await.unwrap();
        let before = store.employees();

        let err = register(&state, request("2002", "otro@test.com")).await.unwrap_err();
        assert!(matches!(err, RegistrationError::AlreadyLinked));
        assert_eq!(store.employees(), before);
        assert_eq!(store.account_count(), 1);
    }

    #[tokio::test]
    async fn test_register_rejects_existing_account() {
        let (state, store, _) = setup(RecordingNotifier::succeeding());
        AccountStore::create(store.as_ref(), "nuevo@test.com", "hash", Role::Employee)
            .await
            .unwrap();

        let err = register(&state, request("2002", "NUEVO@test.com")).await.unwrap_err();
        assert!(matches!(err, RegistrationError::AccountExists));
        assert_eq!(store.employee_count(), 0);
    }

    #[tokio::test]
    async fn test_register_requires_known_department_for_new_employee() {
        let (state, store, _) = setup(RecordingNotifier::succeeding());
        let mut req = request("2002", "nuevo@test.com");
        req.department_id = Some(99);

        let err = register(&state, req).await.unwrap_err();
        assert!(matches!(err, RegistrationError::DepartmentNotFound));
        assert_eq!(store.account_count(), 0);
    }

    #[tokio::test]
    async fn test_weak_password_creates_nothing() {
        let (state, store, _) = setup(RecordingNotifier::succeeding());
        let mut req = request("2002", "nuevo@test.com");
        req.password = "short".into();

        let err = register(&state, req).await.unwrap_err();
        assert!(matches!(err, RegistrationError::AccountCreationFailed(ref v) if !v.is_empty()));
        assert_eq!(store.account_count(), 0);
        assert_eq!(store.employee_count(), 0);
    }

    #[tokio::test]
    async fn test_welcome_failure_keeps_registration() {
        let (state, store, _) = setup(RecordingNotifier::failing());

        let response = register(&state, request("2002", "nuevo@test.com")).await.unwrap();
        assert!(!response.notification_sent);
        assert!(response.token.is_some());
        assert_eq!(store.account_count(), 1);
        assert_eq!(store.employee_count(), 1);
    }

    #[tokio::test]
    async fn test_strict_links_and_emails_generated_password() {
        let (state, store, notifier) = setup(RecordingNotifier::succeeding());
        let existing = seed(&store, hr_record("1001", "ana.perez@test.com")).await;

        let response = register_strict(&state, "1001").await.unwrap();
        assert!(response.token.is_none());
        assert_eq!(response.email, "an*******@test.com");

        let sent = notifier.sent();
        let Sent::Credentials { email, password } = &sent[0] else {
            panic!("expected credentials email, got {sent:?}");
        };
        assert_eq!(email, "ana.perez@test.com");
        assert_eq!(password.len(), 12);

        let account = AccountStore::find_by_email(store.as_ref(), "ana.perez@test.com")
            .await
            .unwrap()
            .unwrap();
        assert!(verify_password(password, &account.password_hash).unwrap());
        let linked = EmployeeStore::get(store.as_ref(), existing.id).await.unwrap().unwrap();
        assert_eq!(linked.employee.account_id, Some(account.id));
    }

    #[tokio::test]
    async fn test_strict_unknown_document_creates_no_account() {
        let (state, store, notifier) = setup(RecordingNotifier::succeeding());
        seed(&store, hr_record("1001", "ana.perez@test.com")).await;

        let err = register_strict(&state, "9999").await.unwrap_err();
        assert!(matches!(err, RegistrationError::EmployeeNotFound));
        assert_eq!(store.account_count(), 0);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_strict_rolls_back_link_when_email_fails() {
        let (state, store, notifier) = setup(RecordingNotifier::failing());
        let existing = seed(&store, hr_record("1001", "ana.perez@test.com")).await;

        let err = register_strict(&state, "1001").await.unwrap_err();
        assert!(matches!(err, RegistrationError::NotificationFailed));
        let stored = EmployeeStore::get(store.as_ref(), existing.id).await.unwrap().unwrap();
        assert_eq!(stored.employee.account_id, None);

        // A retry reuses the orphaned account with a fresh password.
        notifier.set_succeed(true);
        register_strict(&state, "1001").await.unwrap();
        assert_eq!(store.account_count(), 1);
        let stored = EmployeeStore::get(store.as_ref(), existing.id).await.unwrap().unwrap();
        assert!(stored.employee.account_id.is_some());
    }

    #[tokio::test]
    async fn test_strict_rejects_already_linked() {
        let (state, store, _) = setup(RecordingNotifier::succeeding());
        seed(&store, hr_record("1001", "ana.perez@test.com")).await;
        register_strict(&state, "1001").await.unwrap();

        let err = register_strict(&state, "1001").await.unwrap_err();
        assert!(matches!(err, RegistrationError::AlreadyLinked));
    }

    #[tokio::test]
    async fn test_strict_never_resets_admin_account() {
        let (state, store, _) = setup(RecordingNotifier::succeeding());
        seed(&store, hr_record("1001", "admin@test.com")).await;
        AccountStore::create(store.as_ref(), "admin@test.com", "hash", Role::Admin)
            .await
            .unwrap();

        let err = register_strict(&state, "1001").await.unwrap_err();
        assert!(matches!(err, RegistrationError::AccountExists));
        let admin = AccountStore::find_by_email(store.as_ref(), "admin@test.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.password_hash, "hash");
    }
}
