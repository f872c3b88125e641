//! Bulk employee import from a spreadsheet.
//!
//! Row 1 is a header. Every later row describes one employee in fixed
//! columns (see [`col`]). The import runs in two passes: departments named
//! anywhere in the sheet are created first, then rows are inserted one by
//! one. A bad row is skipped and never aborts the import; already-inserted
//! rows stay in place.

pub mod workbook;

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::{Days, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::employee::{EducationLevel, EmployeeStatus, NewEmployee, UnknownVariant};
use crate::models::normalize_email;
use crate::store::{DepartmentStore, EmployeeStore, StoreError};

/// 0-based column positions.
pub mod col {
    pub const DOCUMENT: usize = 0;
    pub const FIRST_NAME: usize = 1;
    pub const LAST_NAME: usize = 2;
    pub const DATE_OF_BIRTH: usize = 3;
    pub const ADDRESS: usize = 4;
    pub const PHONE: usize = 5;
    pub const EMAIL: usize = 6;
    pub const POSITION: usize = 7;
    pub const SALARY: usize = 8;
    pub const HIRE_DATE: usize = 9;
    pub const STATUS: usize = 10;
    pub const EDUCATION_LEVEL: usize = 11;
    pub const PROFESSIONAL_PROFILE: usize = 12;
    pub const DEPARTMENT: usize = 13;
}

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"];

/// Largest serial a spreadsheet can hold (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unreadable workbook: {0}")]
    Workbook(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What an unparseable date cell becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFallback {
    #[default]
    Today,
    /// 1900-01-01, easy to spot and correct later.
    Sentinel,
}

impl DateFallback {
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            DateFallback::Today => today,
            DateFallback::Sentinel => NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl FromStr for DateFallback {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(DateFallback::Today),
            "sentinel" => Ok(DateFallback::Sentinel),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub date_fallback: DateFallback,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Parses a date cell: one of [`DATE_FORMATS`] / [`DATETIME_FORMATS`], or a
/// spreadsheet serial counted from 1899-12-30.
pub fn parse_date(text: &str, fallback: DateFallback, today: NaiveDate) -> NaiveDate {
    let text = text.trim();
    if text.is_empty() {
        return fallback.resolve(today);
    }

    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| from_serial(text))
        .unwrap_or_else(|| fallback.resolve(today))
}

fn from_serial(text: &str) -> Option<NaiveDate> {
    let serial = text.parse::<f64>().ok()?;
    if !serial.is_finite() || !(1.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.trunc() as u64))
}

/// Strips `$`, thousands separators and whitespace. Unparseable or negative
/// amounts become zero.
pub fn parse_salary(text: &str) -> Decimal {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    cleaned
        .parse::<Decimal>()
        .ok()
        .filter(|d| !d.is_sign_negative())
        .unwrap_or(Decimal::ZERO)
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|s| s.trim()).unwrap_or("")
}

fn department_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Builds the record for one data row. `None` means the row is skipped:
/// blank email or unknown department.
fn parse_row(
    row: &[String],
    departments: &HashMap<String, i64>,
    options: &ImportOptions,
    today: NaiveDate,
) -> Option<NewEmployee> {
    let email = normalize_email(cell(row, col::EMAIL));
    if email.is_empty() {
        return None;
    }
    let department = cell(row, col::DEPARTMENT);
    if department.is_empty() {
        return None;
    }
    let department_id = *departments.get(&department_key(department))?;

    Some(NewEmployee {
        document: cell(row, col::DOCUMENT).to_string(),
        first_name: cell(row, col::FIRST_NAME).to_string(),
        last_name: cell(row, col::LAST_NAME).to_string(),
        date_of_birth: parse_date(cell(row, col::DATE_OF_BIRTH), options.date_fallback, today),
        address: cell(row, col::ADDRESS).to_string(),
        phone: cell(row, col::PHONE).to_string(),
        email,
        position: cell(row, col::POSITION).to_string(),
        salary: parse_salary(cell(row, col::SALARY)),
        hire_date: parse_date(cell(row, col::HIRE_DATE), options.date_fallback, today),
        status: EmployeeStatus::from_label(cell(row, col::STATUS)),
        education_level: EducationLevel::from_label(cell(row, col::EDUCATION_LEVEL)),
        professional_profile: cell(row, col::PROFESSIONAL_PROFILE).to_string(),
        department_id,
        account_id: None,
    })
}

/// Reads the uploaded workbook and imports its first worksheet.
pub async fn import_workbook(
    employees: &dyn EmployeeStore,
    departments: &dyn DepartmentStore,
    bytes: &[u8],
    options: &ImportOptions,
) -> Result<ImportReport, ImportError> {
    match workbook::read_first_sheet(bytes)? {
        Some(grid) => import_rows(employees, departments, &grid, options).await,
        None => {
            info!("Workbook has no worksheet; nothing imported");
            Ok(ImportReport::default())
        }
    }
}

/// Imports every data row of `grid` (row 0 is the header).
pub async fn import_rows(
    employees: &dyn EmployeeStore,
    departments: &dyn DepartmentStore,
    grid: &[Vec<String>],
    options: &ImportOptions,
) -> Result<ImportReport, ImportError> {
    let rows = grid.get(1..).unwrap_or_default();

    // Pass 1: departments.
    let mut seen = HashSet::new();
    for row in rows {
        let name = cell(row, col::DEPARTMENT);
        if !name.is_empty() && seen.insert(department_key(name)) {
            departments.ensure(name).await?;
        }
    }
    let lookup: HashMap<String, i64> = departments
        .list()
        .await?
        .into_iter()
        .map(|d| (department_key(&d.name), d.id))
        .collect();

    // Pass 2: employees.
    let today = Utc::now().date_naive();
    let mut report = ImportReport::default();
    for (index, row) in rows.iter().enumerate() {
        let line = index + 2;
        let Some(new) = parse_row(row, &lookup, options, today) else {
            debug!("Row {line}: missing email or department, skipped");
            report.skipped += 1;
            continue;
        };

        match employees.find_by_email(&new.email).await {
            Ok(Some(_)) => {
                debug!("Row {line}: {} already exists, skipped", new.email);
                report.skipped += 1;
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Row {line}: lookup failed: {e}");
                report.skipped += 1;
                continue;
            }
        }

        match employees.create(new).await {
            Ok(_) => report.imported += 1,
            Err(StoreError::Conflict(_)) => {
                debug!("Row {line}: email inserted concurrently, skipped");
                report.skipped += 1;
            }
            Err(e) => {
                warn!("Row {line}: insert failed: {e}");
                report.skipped += 1;
            }
        }
    }

    info!(
        "Import finished: {} imported, {} skipped",
        report.imported, report.skipped
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn row(cells: [&str; 14]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn header() -> Vec<String> {
        row([
            "Documento", "Nombres", "Apellidos", "FechaNacimiento", "Direccion", "Telefono",
            "Email", "Cargo", "Salario", "FechaIngreso", "Estado", "NivelEducativo",
            "PerfilProfesional", "Departamento",
        ])
    }

    fn employee_row(document: &str, email: &str, salary: &str, department: &str) -> Vec<String> {
        row([
            document, "Ana", "Pérez", "14/05/1990", "Calle 10", "3001234567", email,
            "Desarrolladora", salary, "2020-01-15", "En Vacaciones", "Maestría", "Backend",
            department,
        ])
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(1990, 5, 14).unwrap();
        for text in ["14/05/1990", "1990-05-14", "14-05-1990", "1990-05-14 00:00:00", "33007"] {
            assert_eq!(parse_date(text, DateFallback::Today, today()), expected, "{text}");
        }
    }

    #[test]
    fn test_parse_date_fallbacks() {
        assert_eq!(parse_date("mañana", DateFallback::Today, today()), today());
        assert_eq!(
            parse_date("", DateFallback::Sentinel, today()),
            NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()
        );
        assert_eq!(parse_date("-5", DateFallback::Today, today()), today());
    }

    #[test]
    fn test_parse_salary() {
        assert_eq!(parse_salary("$5,000,000"), Decimal::new(5_000_000, 0));
        assert_eq!(parse_salary("4500000.50"), Decimal::new(450_000_050, 2));
        assert_eq!(parse_salary("mucho"), Decimal::ZERO);
        assert_eq!(parse_salary("-10"), Decimal::ZERO);
        assert_eq!(parse_salary(""), Decimal::ZERO);
    }

    #[test]
    fn test_date_fallback_parsing() {
        assert_eq!("SENTINEL".parse::<DateFallback>().unwrap(), DateFallback::Sentinel);
        assert!("yesterday".parse::<DateFallback>().is_err());
    }

    #[tokio::test]
    async fn test_bad_salary_defaults_to_zero() {
        let store = MemoryStore::with_departments(&["Tecnología"]);
        let grid = vec![
            header(),
            employee_row("1", "uno@test.com", "$3,000,000", "Tecnología"),
            employee_row("2", "dos@test.com", "tres millones", "Tecnología"),
            employee_row("3", "tres@test.com", "2500000", "Tecnología"),
        ];

        let report = import_rows(&store, &store, &grid, &ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(report.imported, 3);

        let dos = EmployeeStore::find_by_email(&store, "dos@test.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dos.salary, Decimal::ZERO);
        assert_eq!(dos.status, EmployeeStatus::OnVacation);
        assert_eq!(dos.education_level, EducationLevel::Master);
    }

    #[tokio::test]
    async fn test_reimport_is_idempotent() {
        let store = MemoryStore::with_departments(&["Tecnología"]);
        let grid = vec![
            header(),
            employee_row("1", "uno@test.com", "1000", "Tecnología"),
            employee_row("2", "dos@test.com", "1000", "Tecnología"),
        ];
        let options = ImportOptions::default();

        assert_eq!(import_rows(&store, &store, &grid, &options).await.unwrap().imported, 2);
        let second = import_rows(&store, &store, &grid, &options).await.unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(store.employee_count(), 2);
    }

    #[tokio::test]
    async fn test_email_is_normalized_before_duplicate_check() {
        let store = MemoryStore::with_departments(&["Tecnología"]);
        let options = ImportOptions::default();

        let first = vec![header(), employee_row("1", "Ana.PÉREZ@Test.com", "1000", "Tecnología")];
        assert_eq!(import_rows(&store, &store, &first, &options).await.unwrap().imported, 1);
        assert_eq!(store.employees()[0].email, "ana.perez@test.com");

        let second = vec![header(), employee_row("1", "ana.perez@test.com", "1000", "Tecnología")];
        assert_eq!(import_rows(&store, &store, &second, &options).await.unwrap().imported, 0);
    }

    #[tokio::test]
    async fn test_departments_are_created_once_case_insensitively() {
        let store = MemoryStore::with_departments(&["Tecnología"]);
        let grid = vec![
            header(),
            employee_row("1", "uno@test.com", "1000", "Logística"),
            employee_row("2", "dos@test.com", "1000", "LOGÍSTICA"),
            employee_row("3", "tres@test.com", "1000", "tecnología"),
        ];

        let report = import_rows(&store, &store, &grid, &ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(report.imported, 3);
        assert_eq!(store.department_count(), 2);
    }

    #[tokio::test]
    async fn test_rows_without_email_or_department_are_skipped() {
        let store = MemoryStore::with_departments(&["Tecnología"]);
        let short = vec!["9".to_string(); 3];
        let grid = vec![
            header(),
            employee_row("1", "  ", "1000", "Tecnología"),
            employee_row("2", "dos@test.com", "1000", ""),
            short,
            employee_row("4", "cuatro@test.com", "1000", "Tecnología"),
        ];

        let report = import_rows(&store, &store, &grid, &ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(report, ImportReport { imported: 1, skipped: 3 });
    }

    #[tokio::test]
    async fn test_header_only_imports_nothing() {
        let store = MemoryStore::new();
        let report = import_rows(&store, &store, &[header()], &ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(report.imported, 0);
        assert_eq!(store.department_count(), 0);
    }
}
