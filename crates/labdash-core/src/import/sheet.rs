//! Tabular input for the user import: a grid of [`Cell`]s read from CSV or
//! from the first worksheet of a workbook.

use super::ImportError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use encoding_rs::{Encoding, WINDOWS_1252};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;

/// One spreadsheet cell, reduced to the shapes the import cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// Type a raw text cell the way a spreadsheet would: blanks are empty,
    /// canonical numbers are numbers, everything else is text. `"007"` stays
    /// text so leading zeros in passwords survive.
    pub fn infer(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() && n.to_string() == trimmed => Cell::Number(n),
            _ => Cell::Text(raw.to_string()),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) | Cell::Bool(_) => false,
        }
    }

    /// A non-blank text cell. Header detection only counts these.
    pub fn is_text(&self) -> bool {
        matches!(self, Cell::Text(s) if !s.trim().is_empty())
    }

    /// Trimmed textual value. Integral numbers print without a fraction.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }

    fn from_data(data: &Data) -> Cell {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(raw: &str) -> Self {
        Cell::infer(raw)
    }
}

/// A rectangular-ish grid of cells. Rows may have different lengths; cells
/// past the end of a row read as [`Cell::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a sheet from plain strings, typing each cell with [`Cell::infer`].
    pub fn from_text_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(|c| Cell::infer(c.as_ref())).collect())
                .collect(),
        )
    }

    /// Read an uploaded file, choosing the parser from its extension.
    pub fn from_bytes(bytes: &[u8], file_name: &str) -> Result<Self, ImportError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Self::from_csv(bytes),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::from_workbook(bytes),
            _ => Err(ImportError::UnsupportedFormat(file_name.to_string())),
        }
    }

    /// CSV in UTF-8 (with or without a BOM) or, failing that, Windows-1252,
    /// which is what Excel writes under a Spanish locale.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, ImportError> {
        let text = decode_text(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(Cell::infer).collect());
        }
        Ok(Self::new(rows))
    }

    /// First worksheet of an xlsx/xls/ods workbook.
    pub fn from_workbook(bytes: &[u8]) -> Result<Self, ImportError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let first = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(ImportError::EmptyWorkbook)?;
        let range = workbook.worksheet_range(&first)?;
        Ok(Self::new(
            range
                .rows()
                .map(|row| row.iter().map(Cell::from_data).collect())
                .collect(),
        ))
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Non-blank cells of the first row as `(column, text)`.
    pub fn headers(&self) -> Vec<(usize, String)> {
        self.rows
            .first()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, cell)| !cell.is_blank())
                    .map(|(col, cell)| (col, cell.to_text()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True when some row after the first has a non-blank cell.
    pub fn has_data_rows(&self) -> bool {
        self.rows
            .iter()
            .skip(1)
            .any(|row| row.iter().any(|cell| !cell.is_blank()))
    }
}

fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return encoding.decode_without_bom_handling(&bytes[bom_len..]).0;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            tracing::debug!("csv is not utf-8, decoding as windows-1252");
            WINDOWS_1252.decode_without_bom_handling(bytes).0
        }
    }
}
