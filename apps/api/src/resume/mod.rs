//! Résumé generation. `assemble` turns one employee into a backend-neutral
//! [`ResumeDocument`]; `pdf::render` lays that document out.

pub mod metrics;
pub mod pdf;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::employee::EmployeeWithDepartment;
use crate::models::fold_diacritics;

pub use pdf::{render, RenderError};

/// Page geometry and typography for rendered résumés. Defaults: US Letter,
/// 40pt margins, 11pt body text.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub font_size_pt: f32,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_width_mm: 215.9,
            page_height_mm: 279.4,
            margin_mm: 14.1,
            font_size_pt: 11.0,
            line_spacing: 1.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Block {
    /// `Label: value` lines.
    Fields(Vec<(String, String)>),
    Paragraph(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeDocument {
    pub title: String,
    pub subtitle: String,
    pub sections: Vec<Section>,
    pub footer: String,
}

fn fields(pairs: &[(&str, String)]) -> Block {
    Block::Fields(
        pairs
            .iter()
            .map(|(label, value)| (label.to_string(), value.clone()))
            .collect(),
    )
}

pub fn assemble(record: &EmployeeWithDepartment, generated_at: NaiveDateTime) -> ResumeDocument {
    let e = &record.employee;
    let mut sections = vec![
        Section {
            title: "Información de Contacto".into(),
            block: fields(&[
                ("Email", e.email.clone()),
                ("Teléfono", e.phone.clone()),
                ("Dirección", e.address.clone()),
            ]),
        },
        Section {
            title: "Información Personal".into(),
            block: fields(&[
                ("Fecha de Nacimiento", e.date_of_birth.format("%d/%m/%Y").to_string()),
                ("Nivel Educativo", e.education_level.label().to_string()),
            ]),
        },
        Section {
            title: "Información Laboral".into(),
            block: fields(&[
                ("Departamento", record.department_name.clone()),
                ("Cargo", e.position.clone()),
                ("Fecha de Ingreso", e.hire_date.format("%d/%m/%Y").to_string()),
                ("Estado", e.status.label().to_string()),
            ]),
        },
    ];

    let profile = e.professional_profile.trim();
    if !profile.is_empty() {
        sections.push(Section {
            title: "Perfil Profesional".into(),
            block: Block::Paragraph(profile.to_string()),
        });
    }

    ResumeDocument {
        title: e.full_name(),
        subtitle: e.position.clone(),
        sections,
        footer: format!(
            "Generado por TalentoPlus - {}",
            generated_at.format("%d/%m/%Y %H:%M")
        ),
    }
}

/// `CV_Ana_Perez.pdf`. Names are reduced to ASCII letters, digits and `_`.
pub fn file_name(first_name: &str, last_name: &str) -> String {
    let clean = |s: &str| -> String {
        fold_diacritics(s.trim())
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    };
    format!("CV_{}_{}.pdf", clean(first_name), clean(last_name))
}

/// Assembles and renders on the blocking pool, returning the PDF as a
/// downloadable response.
pub async fn pdf_download(
    record: EmployeeWithDepartment,
    config: RenderConfig,
) -> Result<Response, AppError> {
    let name = file_name(&record.employee.first_name, &record.employee.last_name);
    let employee_id = record.employee.id;
    let bytes = tokio::task::spawn_blocking(move || {
        let document = assemble(&record, Utc::now().naive_utc());
        render(&document, &config)
    })
    .await
    .map_err(|e| RenderError::Pdf(format!("render task failed: {e}")))??;

    tracing::info!("Rendered résumé for employee {employee_id} ({} bytes)", bytes.len());
    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{name}\"")),
        ],
        bytes,
    )
        .into_response())
}
