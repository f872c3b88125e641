//! Persistence seams. Handlers and domain flows only see these traits;
//! `PgStore` is the production backend and `memory::MemoryStore` backs tests.
//!
//! Uniqueness (employee email, department name, account email, one employee
//! per account) is guaranteed by the backend, not by callers' pre-checks.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::account::{Account, Role};
use crate::models::department::{Department, DepartmentSummary};
use crate::models::employee::{
    Employee, EmployeeStatus, EmployeeWithDepartment, NewEmployee, StatusCounts, UnknownVariant,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A foreign-key constraint rejected the write or delete.
    #[error("restricted: {0}")]
    Restricted(String),

    #[error("corrupt row: {0}")]
    Corrupt(#[from] UnknownVariant),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db) = err.as_database_error() {
            let constraint = db.constraint().unwrap_or("unknown").to_string();
            if db.is_unique_violation() {
                return StoreError::Conflict(constraint);
            }
            if db.is_foreign_key_violation() {
                return StoreError::Restricted(constraint);
            }
        }
        StoreError::Database(err)
    }
}

/// Query-string values arrive as text; a blank one means the parameter was
/// left empty in the form, not that it failed to parse.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map(Some).map_err(de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// Admin list filter. Blank strings are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeFilter {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub department_id: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<EmployeeStatus>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page_size: Option<u32>,
}

impl EmployeeFilter {
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// 1-based page number.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.page_size())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, filter: &EmployeeFilter) -> Self {
        let page_size = filter.page_size();
        Self {
            items,
            total,
            page: filter.page(),
            page_size,
            total_pages: total.div_ceil(u64::from(page_size)) as u32,
        }
    }
}

#[async_trait]
pub trait DepartmentStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Department>, StoreError>;

    async fn summaries(&self) -> Result<Vec<DepartmentSummary>, StoreError>;

    async fn summary(&self, id: i64) -> Result<Option<DepartmentSummary>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Department>, StoreError>;

    /// Case-insensitive lookup.
    async fn find_by_name(&self, name: &str) -> Result<Option<Department>, StoreError>;

    /// Fails with `Conflict` when the name is taken (case-insensitive).
    async fn create(&self, name: &str) -> Result<Department, StoreError>;

    /// Returns the department with this name, creating it if missing.
    async fn ensure(&self, name: &str) -> Result<Department, StoreError>;

    /// Fails with `Restricted` while employees reference the department.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<EmployeeWithDepartment>, StoreError>;

    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, StoreError>;

    async fn find_by_document(&self, document: &str) -> Result<Option<Employee>, StoreError>;

    /// Matches `document` (when non-blank) or `email`; a document match wins.
    async fn find_by_document_or_email(
        &self,
        document: &str,
        email: &str,
    ) -> Result<Option<Employee>, StoreError>;

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<Employee>, StoreError>;

    async fn list_all(&self) -> Result<Vec<EmployeeWithDepartment>, StoreError>;

    async fn search(
        &self,
        filter: &EmployeeFilter,
    ) -> Result<Page<EmployeeWithDepartment>, StoreError>;

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError>;

    /// Fails with `Conflict` on a duplicate email and `Restricted` on an
    /// unknown department.
    async fn create(&self, new: NewEmployee) -> Result<Employee, StoreError>;

    /// Overwrites every HR field of the record. `account_id` is untouched.
    async fn update(&self, employee: &Employee) -> Result<bool, StoreError>;

    /// Self-service update: only address and phone, each only when given.
    async fn update_contact(
        &self,
        id: i64,
        address: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<Employee>, StoreError>;

    /// Atomically links an unlinked employee to `account_id`, optionally
    /// replacing the phone. Returns `false` when the employee is missing or
    /// already linked.
    async fn link_account(
        &self,
        id: i64,
        account_id: Uuid,
        phone: Option<&str>,
    ) -> Result<bool, StoreError>;

    /// Clears the link only if it still points at `account_id`.
    async fn unlink_account(&self, id: i64, account_id: Uuid) -> Result<bool, StoreError>;

    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Fails with `Conflict` when the email already has an account.
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Account, StoreError>;

    async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults() {
        let filter = EmployeeFilter::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(filter.offset(), 0);
        assert!(filter.search_term().is_none());
    }

    #[test]
    fn test_filter_clamps_page_size_and_blank_search() {
        let filter = EmployeeFilter {
            search: Some("   ".into()),
            page: Some(3),
            page_size: Some(1000),
            ..Default::default()
        };
        assert_eq!(filter.page_size(), MAX_PAGE_SIZE);
        assert_eq!(filter.offset(), 200);
        assert!(filter.search_term().is_none());
    }

    #[test]
    fn test_page_total_pages_rounds_up() {
        let filter = EmployeeFilter::default();
        let page: Page<u8> = Page::new(vec![], 21, &filter);
        assert_eq!(page.total_pages, 3);
        let empty: Page<u8> = Page::new(vec![], 0, &filter);
        assert_eq!(empty.total_pages, 0);
    }
}
