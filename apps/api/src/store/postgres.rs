use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::account::{Account, AccountRow, Role};
use crate::models::department::{Department, DepartmentSummary};
use crate::models::employee::{
    Employee, EmployeeRow, EmployeeStatus, EmployeeWithDepartment, NewEmployee, StatusCounts,
};
use crate::store::{
    AccountStore, DepartmentStore, EmployeeFilter, EmployeeStore, Page, StoreError,
};

/// Columns of `employees` joined with the department name; every employee
/// read path selects through this so the department is never absent.
const EMPLOYEE_SELECT: &str = r#"
    SELECT e.id, e.document, e.first_name, e.last_name, e.date_of_birth,
           e.address, e.phone, e.email, e.position, e.salary, e.hire_date,
           e.status, e.education_level, e.professional_profile,
           e.department_id, e.account_id, d.name AS department_name
    FROM employees e
    JOIN departments d ON d.id = e.department_id
"#;

const SEARCH_WHERE: &str = r#"
    WHERE ($1::text IS NULL
           OR e.first_name ILIKE $1 OR e.last_name ILIKE $1
           OR e.email ILIKE $1 OR e.document ILIKE $1)
      AND ($2::bigint IS NULL OR e.department_id = $2)
      AND ($3::text IS NULL OR e.status = $3)
"#;

/// PostgreSQL implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn employee_query(tail: &str) -> String {
    format!("{EMPLOYEE_SELECT} {tail} LIMIT 1")
}

fn into_employee(row: Option<EmployeeRow>) -> Result<Option<EmployeeWithDepartment>, StoreError> {
    Ok(row.map(EmployeeWithDepartment::try_from).transpose()?)
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl DepartmentStore for PgStore {
    async fn list(&self) -> Result<Vec<Department>, StoreError> {
        Ok(
            sqlx::query_as::<_, Department>("SELECT id, name FROM departments ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn summaries(&self) -> Result<Vec<DepartmentSummary>, StoreError> {
        Ok(sqlx::query_as::<_, DepartmentSummary>(
            r#"
            SELECT d.id, d.name, COUNT(e.id) AS employee_count
            FROM departments d
            LEFT JOIN employees e ON e.department_id = d.id
            GROUP BY d.id, d.name
            ORDER BY d.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn summary(&self, id: i64) -> Result<Option<DepartmentSummary>, StoreError> {
        Ok(sqlx::query_as::<_, DepartmentSummary>(
            r#"
            SELECT d.id, d.name, COUNT(e.id) AS employee_count
            FROM departments d
            LEFT JOIN employees e ON e.department_id = d.id
            WHERE d.id = $1
            GROUP BY d.id, d.name
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get(&self, id: i64) -> Result<Option<Department>, StoreError> {
        Ok(
            sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Department>, StoreError> {
        Ok(sqlx::query_as::<_, Department>(
            "SELECT id, name FROM departments WHERE lower(name) = lower($1)",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create(&self, name: &str) -> Result<Department, StoreError> {
        let department = sqlx::query_as::<_, Department>(
            "INSERT INTO departments (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await?;
        info!("Created department {} ({})", department.name, department.id);
        Ok(department)
    }

    async fn ensure(&self, name: &str) -> Result<Department, StoreError> {
        // The unique index on lower(name) makes concurrent ensures converge.
        let inserted = sqlx::query("INSERT INTO departments (name) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(name.trim())
            .execute(&self.pool)
            .await?;
        if inserted.rows_affected() > 0 {
            info!("Created department {}", name.trim());
        }
        self.find_by_name(name)
            .await?
            .ok_or_else(|| StoreError::Conflict(format!("department '{name}' vanished")))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl EmployeeStore for PgStore {
    async fn get(&self, id: i64) -> Result<Option<EmployeeWithDepartment>, StoreError> {
        let sql = employee_query("WHERE e.id = $1");
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        into_employee(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, StoreError> {
        let sql = employee_query("WHERE lower(e.email) = lower($1)");
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(into_employee(row)?.map(|e| e.employee))
    }

    async fn find_by_document(&self, document: &str) -> Result<Option<Employee>, StoreError> {
        let sql = employee_query("WHERE e.document = $1 AND e.document <> ''");
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(document.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(into_employee(row)?.map(|e| e.employee))
    }

    async fn find_by_document_or_email(
        &self,
        document: &str,
        email: &str,
    ) -> Result<Option<Employee>, StoreError> {
        let sql = employee_query(
            r#"
            WHERE ($1 <> '' AND e.document = $1) OR lower(e.email) = lower($2)
            ORDER BY ($1 <> '' AND e.document = $1) DESC, e.id
            "#,
        );
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(document.trim())
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(into_employee(row)?.map(|e| e.employee))
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<Employee>, StoreError> {
        let sql = employee_query("WHERE e.account_id = $1");
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(into_employee(row)?.map(|e| e.employee))
    }

    async fn list_all(&self) -> Result<Vec<EmployeeWithDepartment>, StoreError> {
        let sql = format!("{EMPLOYEE_SELECT} ORDER BY e.last_name, e.first_name, e.id");
        let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|r| EmployeeWithDepartment::try_from(r).map_err(StoreError::from))
            .collect()
    }

    async fn search(
        &self,
        filter: &EmployeeFilter,
    ) -> Result<Page<EmployeeWithDepartment>, StoreError> {
        let pattern = filter.search_term().map(like_pattern);
        let status = filter.status.map(EmployeeStatus::as_str);

        let count_sql = format!("SELECT COUNT(*) FROM employees e {SEARCH_WHERE}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(pattern.as_deref())
            .bind(filter.department_id)
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        let list_sql = format!(
            "{EMPLOYEE_SELECT} {SEARCH_WHERE} ORDER BY e.last_name, e.first_name, e.id LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, EmployeeRow>(&list_sql)
            .bind(pattern.as_deref())
            .bind(filter.department_id)
            .bind(status)
            .bind(i64::from(filter.page_size()))
            .bind(filter.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(EmployeeWithDepartment::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total.max(0) as u64, filter))
    }

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM employees GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        let mut counts = StatusCounts::default();
        for (status, n) in rows {
            counts.add(status.parse()?, n);
        }
        Ok(counts)
    }

    async fn create(&self, new: NewEmployee) -> Result<Employee, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO employees
                (document, first_name, last_name, date_of_birth, address, phone, email,
                 position, salary, hire_date, status, education_level,
                 professional_profile, department_id, account_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
            "#,
        )
        .bind(&new.document)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.date_of_birth)
        .bind(&new.address)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.position)
        .bind(new.salary)
        .bind(new.hire_date)
        .bind(new.status.as_str())
        .bind(new.education_level.as_str())
        .bind(&new.professional_profile)
        .bind(new.department_id)
        .bind(new.account_id)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted employee {id} <{}>", new.email);
        Ok(Employee::from_new(id, new))
    }

    async fn update(&self, employee: &Employee) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE employees SET
                document = $2, first_name = $3, last_name = $4, date_of_birth = $5,
                address = $6, phone = $7, email = $8, position = $9, salary = $10,
                hire_date = $11, status = $12, education_level = $13,
                professional_profile = $14, department_id = $15
            WHERE id = $1
            "#,
        )
        .bind(employee.id)
        .bind(&employee.document)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(employee.date_of_birth)
        .bind(&employee.address)
        .bind(&employee.phone)
        .bind(&employee.email)
        .bind(&employee.position)
        .bind(employee.salary)
        .bind(employee.hire_date)
        .bind(employee.status.as_str())
        .bind(employee.education_level.as_str())
        .bind(&employee.professional_profile)
        .bind(employee.department_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_contact(
        &self,
        id: i64,
        address: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<Employee>, StoreError> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE employees SET
                address = COALESCE($2, address),
                phone = COALESCE($3, phone)
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(address)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => Ok(EmployeeStore::get(self, id).await?.map(|e| e.employee)),
            None => Ok(None),
        }
    }

    async fn link_account(
        &self,
        id: i64,
        account_id: Uuid,
        phone: Option<&str>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE employees SET
                account_id = $2,
                phone = COALESCE($3, phone)
            WHERE id = $1 AND account_id IS NULL
            "#,
        )
        .bind(id)
        .bind(account_id)
        .bind(phone)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn unlink_account(&self, id: i64, account_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE employees SET account_id = NULL WHERE id = $1 AND account_id = $2",
        )
        .bind(id)
        .bind(account_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT * FROM accounts WHERE lower(email) = lower($1)",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Account::try_from).transpose()?)
    }

    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Account, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, email, password_hash, role, email_confirmed)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email.trim().to_lowercase())
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;
        info!("Created {} account {}", role, row.id);
        Ok(Account::try_from(row)?)
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE accounts SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ana"), "%ana%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
