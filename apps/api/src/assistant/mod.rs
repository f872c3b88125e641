//! Natural-language questions about the employee roster, answered by the
//! language model from a serialized snapshot of the roster.

pub mod prompts;

use std::fmt::Write;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::llm_client::LlmClient;
use crate::models::employee::EmployeeWithDepartment;

pub const MAX_CONTEXT_EMPLOYEES: usize = 500;
pub const MAX_CONTEXT_CHARS: usize = 60_000;

pub const EMPTY_ROSTER: &str = "No hay empleados registrados en el sistema.";
pub const NOT_CONFIGURED: &str = "Error: La API Key del asistente no está configurada.";

/// `5000000` → `5,000,000`. Fractions are rounded away.
pub fn format_thousands(amount: Decimal) -> String {
    let rounded = amount.round();
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn describe(record: &EmployeeWithDepartment) -> String {
    let e = &record.employee;
    format!(
        "- Nombre: {}\n  Email: {}\n  Cargo: {}\n  Departamento: {}\n  Salario: ${} COP\n  \
         Fecha de Ingreso: {}\n  Estado: {}\n  Nivel Educativo: {}\n  Teléfono: {}\n  \
         Fecha de Nacimiento: {}\n\n",
        e.full_name(),
        e.email,
        e.position,
        record.department_name,
        format_thousands(e.salary),
        e.hire_date.format("%d/%m/%Y"),
        e.status.label(),
        e.education_level.label(),
        e.phone,
        e.date_of_birth.format("%d/%m/%Y"),
    )
}

/// Serializes the roster for the model, bounded to [`MAX_CONTEXT_EMPLOYEES`]
/// entries and roughly [`MAX_CONTEXT_CHARS`] characters.
pub fn build_employee_context(employees: &[EmployeeWithDepartment]) -> String {
    if employees.is_empty() {
        return EMPTY_ROSTER.to_string();
    }

    let mut context = String::new();
    let _ = writeln!(context, "Total de empleados: {}\n", employees.len());

    let mut included = 0;
    for record in employees.iter().take(MAX_CONTEXT_EMPLOYEES) {
        let entry = describe(record);
        if context.len() + entry.len() > MAX_CONTEXT_CHARS {
            break;
        }
        context.push_str(&entry);
        included += 1;
    }

    if included < employees.len() {
        let _ = writeln!(
            context,
            "(Se muestran {included} de {} empleados; el resto no está incluido en estos datos.)",
            employees.len()
        );
    }
    context
}

/// Forwards questions to the language model. Without an API key every
/// answer is an explanatory error string.
pub struct QueryAssistant {
    llm: Option<LlmClient>,
}

impl QueryAssistant {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    /// Never fails: errors come back as a user-readable string.
    pub async fn answer(&self, query: &str, employees: &[EmployeeWithDepartment]) -> String {
        let Some(llm) = &self.llm else {
            return NOT_CONFIGURED.to_string();
        };

        let system = prompts::build_system_prompt(&build_employee_context(employees));
        match llm.call_text(query.trim(), &system).await {
            Ok(answer) => {
                info!("Assistant answered a query over {} employees", employees.len());
                answer
            }
            Err(e) => {
                warn!("Assistant query failed: {e}");
                format!("Error al procesar la consulta: {e}")
            }
        }
    }
}
