use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::fold_diacritics;

// ────────────────────────────────────────────────────────────────────────────
// Enum lookup tables
// ────────────────────────────────────────────────────────────────────────────
//
// Each enum keeps one table: (variant, storage key, display label, import aliases).
// Storage keys are language-neutral; display labels and aliases are the Spanish
// wording used by HR spreadsheets and documents. Aliases are matched after
// lowercasing and stripping diacritics.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmployeeStatus {
    Active,
    Inactive,
    OnVacation,
}

const STATUS_TABLE: &[(EmployeeStatus, &str, &str, &[&str])] = &[
    (EmployeeStatus::Active, "Active", "Activo", &["activo"]),
    (EmployeeStatus::Inactive, "Inactive", "Inactivo", &["inactivo"]),
    (
        EmployeeStatus::OnVacation,
        "OnVacation",
        "En Vacaciones",
        &["vacaciones", "en vacaciones"],
    ),
];

impl EmployeeStatus {
    pub const ALL: [EmployeeStatus; 3] = [
        EmployeeStatus::Active,
        EmployeeStatus::Inactive,
        EmployeeStatus::OnVacation,
    ];

    fn entry(self) -> &'static (EmployeeStatus, &'static str, &'static str, &'static [&'static str]) {
        STATUS_TABLE
            .iter()
            .find(|(s, ..)| *s == self)
            .unwrap_or(&STATUS_TABLE[0])
    }

    pub fn as_str(self) -> &'static str {
        self.entry().1
    }

    /// Spanish label shown on documents and sent to the query assistant.
    pub fn label(self) -> &'static str {
        self.entry().2
    }

    /// Maps spreadsheet text to a status. Unknown or blank text is `Active`.
    pub fn from_label(text: &str) -> Self {
        let needle = fold_diacritics(text.trim()).to_lowercase();
        STATUS_TABLE
            .iter()
            .find(|(_, key, _, aliases)| {
                aliases.contains(&needle.as_str()) || key.eq_ignore_ascii_case(&needle)
            })
            .map(|(s, ..)| *s)
            .unwrap_or(EmployeeStatus::Active)
    }
}

impl FromStr for EmployeeStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        STATUS_TABLE
            .iter()
            .find(|(_, key, ..)| key.eq_ignore_ascii_case(s))
            .map(|(v, ..)| *v)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered from lowest to highest; `HighSchool` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EducationLevel {
    HighSchool,
    Technical,
    Technologist,
    Bachelor,
    Specialization,
    Master,
    Doctorate,
}

const EDUCATION_TABLE: &[(EducationLevel, &str, &str, &[&str])] = &[
    (EducationLevel::HighSchool, "HighSchool", "Bachiller", &["bachiller"]),
    (EducationLevel::Technical, "Technical", "Técnico", &["tecnico"]),
    (EducationLevel::Technologist, "Technologist", "Tecnólogo", &["tecnologo"]),
    (EducationLevel::Bachelor, "Bachelor", "Profesional", &["profesional"]),
    (
        EducationLevel::Specialization,
        "Specialization",
        "Especialización",
        &["especializacion"],
    ),
    (EducationLevel::Master, "Master", "Maestría", &["maestria"]),
    (EducationLevel::Doctorate, "Doctorate", "Doctorado", &["doctorado"]),
];

impl EducationLevel {
    pub const LOWEST: EducationLevel = EducationLevel::HighSchool;

    fn entry(self) -> &'static (EducationLevel, &'static str, &'static str, &'static [&'static str]) {
        EDUCATION_TABLE
            .iter()
            .find(|(l, ..)| *l == self)
            .unwrap_or(&EDUCATION_TABLE[0])
    }

    pub fn as_str(self) -> &'static str {
        self.entry().1
    }

    pub fn label(self) -> &'static str {
        self.entry().2
    }

    /// Maps spreadsheet text to a level. Unknown or blank text is `HighSchool`.
    pub fn from_label(text: &str) -> Self {
        let needle = fold_diacritics(text.trim()).to_lowercase();
        EDUCATION_TABLE
            .iter()
            .find(|(_, key, _, aliases)| {
                aliases.contains(&needle.as_str()) || key.eq_ignore_ascii_case(&needle)
            })
            .map(|(l, ..)| *l)
            .unwrap_or(EducationLevel::LOWEST)
    }
}

impl FromStr for EducationLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EDUCATION_TABLE
            .iter()
            .find(|(_, key, ..)| key.eq_ignore_ascii_case(s))
            .map(|(v, ..)| *v)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown enum value: {0}")]
pub struct UnknownVariant(pub String);

// ────────────────────────────────────────────────────────────────────────────
// Records
// ────────────────────────────────────────────────────────────────────────────

/// Fields an employee is created from. `email` is expected to be normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub document: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub position: String,
    pub salary: Decimal,
    pub hire_date: NaiveDate,
    pub status: EmployeeStatus,
    pub education_level: EducationLevel,
    pub professional_profile: String,
    pub department_id: i64,
    pub account_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub document: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub position: String,
    pub salary: Decimal,
    pub hire_date: NaiveDate,
    pub status: EmployeeStatus,
    pub education_level: EducationLevel,
    pub professional_profile: String,
    pub department_id: i64,
    pub account_id: Option<Uuid>,
}

impl Employee {
    pub fn from_new(id: i64, new: NewEmployee) -> Self {
        Self {
            id,
            document: new.document,
            first_name: new.first_name,
            last_name: new.last_name,
            date_of_birth: new.date_of_birth,
            address: new.address,
            phone: new.phone,
            email: new.email,
            position: new.position,
            salary: new.salary,
            hire_date: new.hire_date,
            status: new.status,
            education_level: new.education_level,
            professional_profile: new.professional_profile,
            department_id: new.department_id,
            account_id: new.account_id,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An employee joined with its department's name. Every read path that needs
/// the department name goes through this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeWithDepartment {
    #[serde(flatten)]
    pub employee: Employee,
    pub department_name: String,
}

/// Row shape of `employees` joined with `departments.name`.
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeRow {
    pub id: i64,
    pub document: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub position: String,
    pub salary: Decimal,
    pub hire_date: NaiveDate,
    pub status: String,
    pub education_level: String,
    pub professional_profile: String,
    pub department_id: i64,
    pub account_id: Option<Uuid>,
    pub department_name: String,
}

impl TryFrom<EmployeeRow> for EmployeeWithDepartment {
    type Error = UnknownVariant;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        Ok(EmployeeWithDepartment {
            employee: Employee {
                id: row.id,
                document: row.document,
                first_name: row.first_name,
                last_name: row.last_name,
                date_of_birth: row.date_of_birth,
                address: row.address,
                phone: row.phone,
                email: row.email,
                position: row.position,
                salary: row.salary,
                hire_date: row.hire_date,
                status: row.status.parse()?,
                education_level: row.education_level.parse()?,
                professional_profile: row.professional_profile,
                department_id: row.department_id,
                account_id: row.account_id,
            },
            department_name: row.department_name,
        })
    }
}

/// Employee counts per status for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub on_vacation: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: EmployeeStatus, n: i64) {
        self.total += n;
        match status {
            EmployeeStatus::Active => self.active += n,
            EmployeeStatus::Inactive => self.inactive += n,
            EmployeeStatus::OnVacation => self.on_vacation += n,
        }
    }
}
