//! Column-resolution strategies for the user import.
//!
//! Each strategy looks at a [`Sheet`] and either commits to a
//! [`ColumnMapping`] or declines. [`ImportResolver`](super::ImportResolver)
//! tries them in order and keeps the first mapping that yields a valid row.

use super::sheet::Sheet;
use super::ImportField;
use phf::phf_map;

/// Normalised header text → field. Keys are lower-case with whitespace and
/// underscores removed; see [`normalize_header`].
static HEADER_SYNONYMS: phf::Map<&'static str, ImportField> = phf_map! {
    "username" => ImportField::UserName,
    "user" => ImportField::UserName,
    "usuario" => ImportField::UserName,
    "email" => ImportField::Email,
    "correo" => ImportField::Email,
    "correoelectrónico" => ImportField::Email,
    "correoelectronico" => ImportField::Email,
    "password" => ImportField::Password,
    "pass" => ImportField::Password,
    "contraseña" => ImportField::Password,
    "clave" => ImportField::Password,
    "nombre" => ImportField::Name,
    "name" => ImportField::Name,
    "apellidopaterno" => ImportField::ApellidoPaterno,
    "apellidomaterno" => ImportField::ApellidoMaterno,
};

pub fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect()
}

/// The field a header names, if it is one of the known synonyms.
pub fn header_field(header: &str) -> Option<ImportField> {
    HEADER_SYNONYMS.get(normalize_header(header).as_str()).copied()
}

fn synonym_column(headers: &[(usize, String)], field: ImportField) -> Option<usize> {
    headers
        .iter()
        .find(|(_, header)| header_field(header) == Some(field))
        .map(|(col, _)| *col)
}

fn column_containing(headers: &[(usize, String)], needles: &[&str]) -> Option<usize> {
    headers
        .iter()
        .find(|(_, header)| {
            let normalized = normalize_header(header);
            needles.iter().any(|needle| normalized.contains(needle))
        })
        .map(|(col, _)| *col)
}

/// Where each field lives in the sheet, and the first row holding data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub strategy: &'static str,
    pub first_data_row: usize,
    columns: [Option<usize>; ImportField::COUNT],
}

impl ColumnMapping {
    pub fn new(strategy: &'static str, first_data_row: usize) -> Self {
        Self {
            strategy,
            first_data_row,
            columns: [None; ImportField::COUNT],
        }
    }

    pub fn with(mut self, field: ImportField, column: Option<usize>) -> Self {
        self.columns[field.index()] = column;
        self
    }

    pub fn column(&self, field: ImportField) -> Option<usize> {
        self.columns[field.index()]
    }

    /// Trimmed value of `field` in `row`; unmapped fields read as empty.
    pub fn value(&self, sheet: &Sheet, row: usize, field: ImportField) -> String {
        self.column(field)
            .map(|col| sheet.cell(row, col).to_text())
            .unwrap_or_default()
    }
}

pub trait ColumnStrategy {
    fn name(&self) -> &'static str;
    fn resolve(&self, sheet: &Sheet) -> Option<ColumnMapping>;
}

/// Header row matched against the bilingual synonym table. Commits only when
/// user name, email and password columns are all present.
#[derive(Debug, Default, Clone, Copy)]
pub struct SynonymHeaders;

impl SynonymHeaders {
    fn triad(headers: &[(usize, String)]) -> Option<(usize, usize, usize)> {
        Some((
            synonym_column(headers, ImportField::UserName)?,
            synonym_column(headers, ImportField::Email)?,
            synonym_column(headers, ImportField::Password)?,
        ))
    }
}

impl ColumnStrategy for SynonymHeaders {
    fn name(&self) -> &'static str {
        "synonym-headers"
    }

    fn resolve(&self, sheet: &Sheet) -> Option<ColumnMapping> {
        if !sheet.has_data_rows() {
            return None;
        }
        let headers = sheet.headers();
        let (user, email, password) = Self::triad(&headers)?;
        Some(
            ColumnMapping::new(self.name(), 1)
                .with(ImportField::UserName, Some(user))
                .with(ImportField::Email, Some(email))
                .with(ImportField::Password, Some(password))
                .with(ImportField::Name, synonym_column(&headers, ImportField::Name))
                .with(
                    ImportField::ApellidoPaterno,
                    synonym_column(&headers, ImportField::ApellidoPaterno),
                )
                .with(
                    ImportField::ApellidoMaterno,
                    synonym_column(&headers, ImportField::ApellidoMaterno),
                ),
        )
    }
}

/// Substring guess for sheets whose headers miss the synonym triad: any
/// header containing `user` and any containing `pass`, `clave` or
/// `contraseña`. Declines when [`SynonymHeaders`] would have matched.
#[derive(Debug, Default, Clone, Copy)]
pub struct LooseHeaders;

impl ColumnStrategy for LooseHeaders {
    fn name(&self) -> &'static str {
        "loose-headers"
    }

    fn resolve(&self, sheet: &Sheet) -> Option<ColumnMapping> {
        if !sheet.has_data_rows() {
            return None;
        }
        let headers = sheet.headers();
        if SynonymHeaders::triad(&headers).is_some() {
            return None;
        }
        let user = column_containing(&headers, &["user"])?;
        let password = column_containing(&headers, &["pass", "clave", "contraseña"])?;
        Some(
            ColumnMapping::new(self.name(), 1)
                .with(ImportField::UserName, Some(user))
                .with(ImportField::Password, Some(password))
                .with(ImportField::Email, synonym_column(&headers, ImportField::Email))
                .with(ImportField::Name, synonym_column(&headers, ImportField::Name))
                .with(
                    ImportField::ApellidoPaterno,
                    synonym_column(&headers, ImportField::ApellidoPaterno),
                )
                .with(
                    ImportField::ApellidoMaterno,
                    synonym_column(&headers, ImportField::ApellidoMaterno),
                ),
        )
    }
}

/// Fixed columns 0..=5 in [`ImportField::ALL`] order. The first row is
/// treated as a header, and skipped, only if it holds some non-blank text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PositionalColumns;

impl ColumnStrategy for PositionalColumns {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn resolve(&self, sheet: &Sheet) -> Option<ColumnMapping> {
        let first = sheet.rows().first()?;
        let first_data_row = usize::from(first.iter().any(|cell| cell.is_text()));
        Some(
            ImportField::ALL
                .iter()
                .enumerate()
                .fold(ColumnMapping::new(self.name(), first_data_row), |mapping, (col, field)| {
                    mapping.with(*field, Some(col))
                }),
        )
    }
}
