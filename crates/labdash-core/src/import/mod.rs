//! Bulk user import from spreadsheets.
//!
//! An uploaded file becomes a [`Sheet`]; an [`ImportResolver`] then runs an
//! ordered chain of [`ColumnStrategy`]s over it:
//!
//! 1. [`SynonymHeaders`]: header names matched against a bilingual synonym
//!    table (needs user name, email and password columns).
//! 2. [`LooseHeaders`]: substring guesses when that triad is incomplete.
//! 3. [`PositionalColumns`]: fixed column order, optional header row.
//!
//! The first mapping that produces at least one valid [`ImportRow`] wins; its
//! invalid rows are reported as [`ImportRejection`]s. Submitting the rows is
//! the caller's job (see `labdash_api::import`), and the outcome is folded
//! into an [`ImportSummary`].

pub mod sheet;
pub mod strategy;

pub use sheet::{Cell, Sheet};
pub use strategy::{ColumnMapping, ColumnStrategy, LooseHeaders, PositionalColumns, SynonymHeaders};

use crate::types::CreateUserInput;
use serde::Serialize;
use std::fmt;

/// Failure messages quoted in the summary line.
const SUMMARY_FAILURE_LIMIT: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("formato de archivo no soportado: {0}")]
    UnsupportedFormat(String),
    #[error("no se pudo leer el CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("no se pudo leer la hoja de cálculo: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("el libro no contiene hojas")]
    EmptyWorkbook,
    #[error("No se encontraron filas válidas en el archivo")]
    NoValidRows,
}

/// A user-creation field an import column can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ImportField {
    UserName,
    Password,
    Email,
    Name,
    ApellidoPaterno,
    ApellidoMaterno,
}

impl ImportField {
    pub const COUNT: usize = 6;

    /// Positional column order.
    pub const ALL: [ImportField; ImportField::COUNT] = [
        ImportField::UserName,
        ImportField::Password,
        ImportField::Email,
        ImportField::Name,
        ImportField::ApellidoPaterno,
        ImportField::ApellidoMaterno,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn is_required(self) -> bool {
        !matches!(self, ImportField::Email)
    }

    pub fn label(self) -> &'static str {
        match self {
            ImportField::UserName => "usuario",
            ImportField::Password => "contraseña",
            ImportField::Email => "correo",
            ImportField::Name => "nombre",
            ImportField::ApellidoPaterno => "apellido paterno",
            ImportField::ApellidoMaterno => "apellido materno",
        }
    }
}

/// A candidate user read from one spreadsheet row. All values are trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    pub user_name: String,
    pub password: String,
    pub email: String,
    pub name: String,
    pub apellido_paterno: String,
    pub apellido_materno: String,
}

impl ImportRow {
    pub fn get(&self, field: ImportField) -> &str {
        match field {
            ImportField::UserName => &self.user_name,
            ImportField::Password => &self.password,
            ImportField::Email => &self.email,
            ImportField::Name => &self.name,
            ImportField::ApellidoPaterno => &self.apellido_paterno,
            ImportField::ApellidoMaterno => &self.apellido_materno,
        }
    }

    /// Required fields left empty. Email is optional.
    pub fn missing_fields(&self) -> Vec<ImportField> {
        ImportField::ALL
            .into_iter()
            .filter(|f| f.is_required() && self.get(*f).is_empty())
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }

    fn read(sheet: &Sheet, mapping: &ColumnMapping, row: usize) -> Self {
        let value = |field| mapping.value(sheet, row, field);
        Self {
            user_name: value(ImportField::UserName),
            password: value(ImportField::Password),
            email: value(ImportField::Email),
            name: value(ImportField::Name),
            apellido_paterno: value(ImportField::ApellidoPaterno),
            apellido_materno: value(ImportField::ApellidoMaterno),
        }
    }
}

impl From<ImportRow> for CreateUserInput {
    fn from(row: ImportRow) -> Self {
        CreateUserInput {
            user_name: row.user_name,
            password: row.password,
            email: Some(row.email).filter(|e| !e.is_empty()),
            name: row.name,
            apellido_paterno: row.apellido_paterno,
            apellido_materno: row.apellido_materno,
        }
    }
}

/// A row skipped for missing required fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRejection {
    /// 1-based row number as shown by spreadsheet software.
    pub row: usize,
    pub missing: Vec<ImportField>,
}

impl fmt::Display for ImportRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<_> = self.missing.iter().map(|m| m.label()).collect();
        write!(f, "Fila {}: faltan {}", self.row, fields.join(", "))
    }
}

/// Outcome of resolving a sheet: the rows to submit and the rows skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResolution {
    pub strategy: &'static str,
    pub rows: Vec<ImportRow>,
    pub rejected: Vec<ImportRejection>,
}

impl ImportResolution {
    fn extract(sheet: &Sheet, mapping: &ColumnMapping) -> Self {
        let mut rows = Vec::new();
        let mut rejected = Vec::new();
        for (index, cells) in sheet.rows().iter().enumerate().skip(mapping.first_data_row) {
            if cells.iter().all(Cell::is_blank) {
                continue;
            }
            let row = ImportRow::read(sheet, mapping, index);
            let missing = row.missing_fields();
            if missing.is_empty() {
                rows.push(row);
            } else {
                rejected.push(ImportRejection { row: index + 1, missing });
            }
        }
        Self {
            strategy: mapping.strategy,
            rows,
            rejected,
        }
    }
}

/// Ordered chain of column strategies.
pub struct ImportResolver {
    strategies: Vec<Box<dyn ColumnStrategy + Send + Sync>>,
}

impl Default for ImportResolver {
    fn default() -> Self {
        Self::with_strategies(vec![
            Box::new(SynonymHeaders),
            Box::new(LooseHeaders),
            Box::new(PositionalColumns),
        ])
    }
}

impl ImportResolver {
    pub fn with_strategies(strategies: Vec<Box<dyn ColumnStrategy + Send + Sync>>) -> Self {
        Self { strategies }
    }

    /// Run the chain. Fails with [`ImportError::NoValidRows`] when no
    /// strategy produces a single valid row.
    pub fn resolve(&self, sheet: &Sheet) -> Result<ImportResolution, ImportError> {
        for strategy in &self.strategies {
            let Some(mapping) = strategy.resolve(sheet) else {
                tracing::debug!(strategy = strategy.name(), "import strategy declined");
                continue;
            };
            let resolution = ImportResolution::extract(sheet, &mapping);
            if resolution.rows.is_empty() {
                tracing::debug!(
                    strategy = strategy.name(),
                    rejected = resolution.rejected.len(),
                    "import strategy produced no valid rows"
                );
                continue;
            }
            tracing::info!(
                strategy = strategy.name(),
                rows = resolution.rows.len(),
                rejected = resolution.rejected.len(),
                "resolved import columns"
            );
            return Ok(resolution);
        }
        Err(ImportError::NoValidRows)
    }

    /// Parse `bytes` by file extension and resolve the result.
    pub fn resolve_file(&self, bytes: &[u8], file_name: &str) -> Result<ImportResolution, ImportError> {
        self.resolve(&Sheet::from_bytes(bytes, file_name)?)
    }
}

/// Tally of an import batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub succeeded: Vec<String>,
    pub failures: Vec<String>,
}

impl ImportSummary {
    /// Start a summary with the rows the resolver already skipped.
    pub fn from_rejections(rejected: &[ImportRejection]) -> Self {
        Self {
            succeeded: Vec::new(),
            failures: rejected.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn record_success(&mut self, user_name: impl Into<String>) {
        self.succeeded.push(user_name.into());
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failures.push(message.into());
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Importación finalizada. Éxitos: {}. Fallos: {}.",
            self.succeeded.len(),
            self.failures.len()
        )?;
        if !self.failures.is_empty() {
            let quoted: Vec<_> = self
                .failures
                .iter()
                .take(SUMMARY_FAILURE_LIMIT)
                .map(String::as_str)
                .collect();
            write!(f, " Errores: {}", quoted.join("; "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: [&str; 6] = [
        "userName",
        "password",
        "email",
        "name",
        "apellidoPaterno",
        "apellidoMaterno",
    ];

    #[test]
    fn one_valid_row_and_one_rejection() {
        let sheet = Sheet::from_text_rows([
            HEADER.to_vec(),
            vec!["ana", "x", "a@a.com", "Ana", "Lopez", "Diaz"],
            vec!["", "y", "b@b.com", "Bea", "Ruiz", "Sanz"],
        ]);
        let resolution = ImportResolver::default().resolve(&sheet).unwrap();
        assert_eq!(resolution.strategy, "synonym-headers");
        assert_eq!(resolution.rows.len(), 1);
        assert_eq!(resolution.rows[0].user_name, "ana");
        assert_eq!(
            resolution.rejected,
            vec![ImportRejection { row: 3, missing: vec![ImportField::UserName] }]
        );
    }

    #[test]
    fn positional_fallback_when_surnames_do_not_resolve() {
        let sheet = Sheet::from_text_rows([
            vec!["Usuario", "Clave", "Correo", "Nombre", "A. Paterno", "A. Materno"],
            vec!["jdoe", "s3cret", "j@d.com", "John", "Doe", "Roe"],
        ]);
        let resolution = ImportResolver::default().resolve(&sheet).unwrap();
        assert_eq!(resolution.strategy, "positional");
        assert_eq!(
            resolution.rows,
            vec![ImportRow {
                user_name: "jdoe".into(),
                password: "s3cret".into(),
                email: "j@d.com".into(),
                name: "John".into(),
                apellido_paterno: "Doe".into(),
                apellido_materno: "Roe".into(),
            }]
        );
    }

    #[test]
    fn nothing_valid_is_an_error() {
        let sheet = Sheet::from_text_rows([vec!["a", "b"], vec!["1", "2"]]);
        assert!(matches!(
            ImportResolver::default().resolve(&sheet),
            Err(ImportError::NoValidRows)
        ));
        assert!(matches!(
            ImportResolver::default().resolve(&Sheet::default()),
            Err(ImportError::NoValidRows)
        ));
    }

    #[test]
    fn blank_rows_are_ignored() {
        let sheet = Sheet::from_text_rows([
            HEADER.to_vec(),
            vec!["", "", "", "", "", ""],
            vec!["ana", "x", "", "Ana", "Lopez", "Diaz"],
        ]);
        let resolution = ImportResolver::default().resolve(&sheet).unwrap();
        assert_eq!(resolution.rows.len(), 1);
        assert!(resolution.rejected.is_empty());
    }

    #[test]
    fn empty_email_is_not_sent() {
        let row = ImportRow {
            user_name: "ana".into(),
            password: "x".into(),
            name: "Ana".into(),
            apellido_paterno: "Lopez".into(),
            apellido_materno: "Diaz".into(),
            ..Default::default()
        };
        assert!(row.is_valid());
        assert_eq!(CreateUserInput::from(row).email, None);
    }

    #[test]
    fn summary_quotes_at_most_five_failures() {
        let mut summary = ImportSummary::default();
        summary.record_success("ana");
        for i in 0..7 {
            summary.record_failure(format!("u{i}: duplicado"));
        }
        let text = summary.to_string();
        assert!(text.starts_with("Importación finalizada. Éxitos: 1. Fallos: 7. Errores: u0"));
        assert!(text.contains("u4: duplicado"));
        assert!(!text.contains("u5"));
    }

    #[test]
    fn rejection_lists_missing_fields() {
        let rejection = ImportRejection {
            row: 4,
            missing: vec![ImportField::Password, ImportField::ApellidoMaterno],
        };
        assert_eq!(rejection.to_string(), "Fila 4: faltan contraseña, apellido materno");
    }
}
