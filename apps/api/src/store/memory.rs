//! In-memory store used by tests. Enforces the same uniqueness and
//! restrict-on-delete rules as the PostgreSQL schema.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::account::{Account, Role};
use crate::models::department::{Department, DepartmentSummary};
use crate::models::employee::{Employee, EmployeeWithDepartment, NewEmployee, StatusCounts};
use crate::store::{
    AccountStore, DepartmentStore, EmployeeFilter, EmployeeStore, Page, StoreError,
};

#[derive(Default)]
struct Inner {
    departments: Vec<Department>,
    employees: Vec<Employee>,
    accounts: Vec<Account>,
    next_department_id: i64,
    next_employee_id: i64,
}

impl Inner {
    fn join(&self, employee: &Employee) -> Result<EmployeeWithDepartment, StoreError> {
        let department = self
            .departments
            .iter()
            .find(|d| d.id == employee.department_id)
            .ok_or_else(|| StoreError::Restricted("employees_department_id_fkey".into()))?;
        Ok(EmployeeWithDepartment {
            employee: employee.clone(),
            department_name: department.name.clone(),
        })
    }

    fn email_taken(&self, email: &str, except_id: Option<i64>) -> bool {
        self.employees
            .iter()
            .any(|e| e.email.eq_ignore_ascii_case(email) && Some(e.id) != except_id)
    }

    fn insert_department(&mut self, name: &str) -> Department {
        self.next_department_id += 1;
        let department = Department {
            id: self.next_department_id,
            name: name.trim().to_string(),
        };
        self.departments.push(department.clone());
        department
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_departments(names: &[&str]) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock().unwrap();
            for name in names {
                inner.insert_department(name);
            }
        }
        store
    }

    pub fn employee_count(&self) -> usize {
        self.inner.lock().unwrap().employees.len()
    }

    pub fn account_count(&self) -> usize {
        self.inner.lock().unwrap().accounts.len()
    }

    pub fn department_count(&self) -> usize {
        self.inner.lock().unwrap().departments.len()
    }

    pub fn employees(&self) -> Vec<Employee> {
        self.inner.lock().unwrap().employees.clone()
    }
}

#[async_trait]
impl DepartmentStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Department>, StoreError> {
        let mut departments = self.inner.lock().unwrap().departments.clone();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }

    async fn summaries(&self) -> Result<Vec<DepartmentSummary>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut summaries: Vec<_> = inner
            .departments
            .iter()
            .map(|d| DepartmentSummary {
                id: d.id,
                name: d.name.clone(),
                employee_count: inner
                    .employees
                    .iter()
                    .filter(|e| e.department_id == d.id)
                    .count() as i64,
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    async fn summary(&self, id: i64) -> Result<Option<DepartmentSummary>, StoreError> {
        Ok(self.summaries().await?.into_iter().find(|d| d.id == id))
    }

    async fn get(&self, id: i64) -> Result<Option<Department>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.departments.iter().find(|d| d.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Department>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let name = name.trim().to_lowercase();
        Ok(inner
            .departments
            .iter()
            .find(|d| d.name.to_lowercase() == name)
            .cloned())
    }

    async fn create(&self, name: &str) -> Result<Department, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let lowered = name.trim().to_lowercase();
        if inner.departments.iter().any(|d| d.name.to_lowercase() == lowered) {
            return Err(StoreError::Conflict("departments_name_lower_key".into()));
        }
        Ok(inner.insert_department(name))
    }

    async fn ensure(&self, name: &str) -> Result<Department, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let lowered = name.trim().to_lowercase();
        if let Some(existing) = inner
            .departments
            .iter()
            .find(|d| d.name.to_lowercase() == lowered)
        {
            return Ok(existing.clone());
        }
        Ok(inner.insert_department(name))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.employees.iter().any(|e| e.department_id == id) {
            return Err(StoreError::Restricted("employees_department_id_fkey".into()));
        }
        let before = inner.departments.len();
        inner.departments.retain(|d| d.id != id);
        Ok(inner.departments.len() < before)
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn get(&self, id: i64) -> Result<Option<EmployeeWithDepartment>, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner
            .employees
            .iter()
            .find(|e| e.id == id)
            .map(|e| inner.join(e))
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .employees
            .iter()
            .find(|e| e.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn find_by_document(&self, document: &str) -> Result<Option<Employee>, StoreError> {
        let document = document.trim();
        if document.is_empty() {
            return Ok(None);
        }
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .employees
            .iter()
            .find(|e| e.document == document)
            .cloned())
    }

    async fn find_by_document_or_email(
        &self,
        document: &str,
        email: &str,
    ) -> Result<Option<Employee>, StoreError> {
        if let Some(found) = self.find_by_document(document).await? {
            return Ok(Some(found));
        }
        EmployeeStore::find_by_email(self, email).await
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<Employee>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .employees
            .iter()
            .find(|e| e.account_id == Some(account_id))
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<EmployeeWithDepartment>, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.employees.iter().map(|e| inner.join(e)).collect()
    }

    async fn search(
        &self,
        filter: &EmployeeFilter,
    ) -> Result<Page<EmployeeWithDepartment>, StoreError> {
        let term = filter.search_term().map(str::to_lowercase);
        let mut matched: Vec<EmployeeWithDepartment> = self
            .list_all()
            .await?
            .into_iter()
            .filter(|e| {
                let emp = &e.employee;
                let term_ok = term.as_deref().map_or(true, |t| {
                    [&emp.first_name, &emp.last_name, &emp.email, &emp.document]
                        .iter()
                        .any(|f| f.to_lowercase().contains(t))
                });
                term_ok
                    && filter.department_id.map_or(true, |d| emp.department_id == d)
                    && filter.status.map_or(true, |s| emp.status == s)
            })
            .collect();
        matched.sort_by(|a, b| {
            (&a.employee.last_name, &a.employee.first_name, a.employee.id).cmp(&(
                &b.employee.last_name,
                &b.employee.first_name,
                b.employee.id,
            ))
        });
        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.page_size() as usize)
            .collect();
        Ok(Page::new(items, total, filter))
    }

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut counts = StatusCounts::default();
        for employee in &inner.employees {
            counts.add(employee.status, 1);
        }
        Ok(counts)
    }

    async fn create(&self, new: NewEmployee) -> Result<Employee, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.email_taken(&new.email, None) {
            return Err(StoreError::Conflict("employees_email_lower_key".into()));
        }
        if !inner.departments.iter().any(|d| d.id == new.department_id) {
            return Err(StoreError::Restricted("employees_department_id_fkey".into()));
        }
        if let Some(account_id) = new.account_id {
            if inner.employees.iter().any(|e| e.account_id == Some(account_id)) {
                return Err(StoreError::Conflict("employees_account_id_key".into()));
            }
        }
        inner.next_employee_id += 1;
        let employee = Employee::from_new(inner.next_employee_id, new);
        inner.employees.push(employee.clone());
        Ok(employee)
    }

    async fn update(&self, employee: &Employee) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.email_taken(&employee.email, Some(employee.id)) {
            return Err(StoreError::Conflict("employees_email_lower_key".into()));
        }
        if !inner.departments.iter().any(|d| d.id == employee.department_id) {
            return Err(StoreError::Restricted("employees_department_id_fkey".into()));
        }
        match inner.employees.iter_mut().find(|e| e.id == employee.id) {
            Some(stored) => {
                let account_id = stored.account_id;
                *stored = employee.clone();
                stored.account_id = account_id;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_contact(
        &self,
        id: i64,
        address: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<Employee>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.employees.iter_mut().find(|e| e.id == id).map(|e| {
            if let Some(address) = address {
                e.address = address.to_string();
            }
            if let Some(phone) = phone {
                e.phone = phone.to_string();
            }
            e.clone()
        }))
    }

    async fn link_account(
        &self,
        id: i64,
        account_id: Uuid,
        phone: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.employees.iter().any(|e| e.account_id == Some(account_id)) {
            return Err(StoreError::Conflict("employees_account_id_key".into()));
        }
        match inner
            .employees
            .iter_mut()
            .find(|e| e.id == id && e.account_id.is_none())
        {
            Some(e) => {
                e.account_id = Some(account_id);
                if let Some(phone) = phone {
                    e.phone = phone.to_string();
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn unlink_account(&self, id: i64, account_id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner
            .employees
            .iter_mut()
            .find(|e| e.id == id && e.account_id == Some(account_id))
        {
            Some(e) => {
                e.account_id = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.employees.len();
        inner.employees.retain(|e| e.id != id);
        Ok(inner.employees.len() < before)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Account, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .accounts
            .iter()
            .any(|a| a.email.eq_ignore_ascii_case(email.trim()))
        {
            return Err(StoreError::Conflict("accounts_email_lower_key".into()));
        }
        let account = Account {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            password_hash: password_hash.to_string(),
            role,
            email_confirmed: true,
            created_at: Utc::now(),
        };
        inner.accounts.push(account.clone());
        Ok(account)
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.accounts.iter_mut().find(|a| a.id == id) {
            Some(a) => {
                a.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.accounts.len();
        inner.accounts.retain(|a| a.id != id);
        for e in inner.employees.iter_mut().filter(|e| e.account_id == Some(id)) {
            e.account_id = None;
        }
        Ok(inner.accounts.len() < before)
    }
}
