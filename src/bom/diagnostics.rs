//! BOM import diagnostics
//!
//! Three severities: file-level errors abort the whole import, row errors drop
//! a single row, row warnings keep the row with a defaulted value.

use miette::Diagnostic;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Reasons the whole file could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BomFileError {
    #[error("Could not read BOM file {path}: {message}")]
    #[diagnostic(
        code(inquiry::bom::unreadable),
        help("Check that the file exists and is readable")
    )]
    Unreadable { path: String, message: String },

    #[error("BOM file is not valid UTF-8 text")]
    #[diagnostic(
        code(inquiry::bom::encoding),
        help("Export the spreadsheet as CSV (UTF-8)")
    )]
    InvalidEncoding,

    #[error("BOM file is empty")]
    #[diagnostic(
        code(inquiry::bom::empty),
        help("The first non-empty line must be a header row")
    )]
    Empty,

    #[error("BOM file is missing required column(s): {}", .missing.join(", "))]
    #[diagnostic(
        code(inquiry::bom::missing_columns),
        help("Add a part number column (part_number, partnumber or model) and a quantity column (quantity or qty)")
    )]
    MissingColumns { missing: Vec<String> },
}

/// Why a row was dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowErrorKind {
    /// Field count differs from the header (often an unquoted delimiter in a value)
    ColumnCountMismatch { expected: usize, found: usize },
    MissingPartNumber,
    /// The line could not be tokenized at all
    Malformed { message: String },
}

impl fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowErrorKind::ColumnCountMismatch { expected, found } => write!(
                f,
                "column count mismatch (expected {}, found {})",
                expected, found
            ),
            RowErrorKind::MissingPartNumber => write!(f, "missing part number"),
            RowErrorKind::Malformed { message } => write!(f, "malformed row: {}", message),
        }
    }
}

/// Why a row was kept with a substituted value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowWarningKind {
    InvalidQuantity { value: String },
    InvalidUnitPrice { value: String },
}

impl fmt::Display for RowWarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowWarningKind::InvalidQuantity { value } => {
                write!(f, "invalid quantity '{}', defaulted to 1", value)
            }
            RowWarningKind::InvalidUnitPrice { value } => {
                write!(f, "invalid unit price '{}', left empty", value)
            }
        }
    }
}

/// A fatal problem with one row; the row is not imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    /// 1-based line number in the source file
    pub row: usize,
    #[serde(flatten)]
    pub kind: RowErrorKind,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.kind)
    }
}

/// A non-fatal problem with one row; the row is imported with a default
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    /// 1-based line number in the source file
    pub row: usize,
    #[serde(flatten)]
    pub kind: RowWarningKind,
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.kind)
    }
}

/// Any error reported by an import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "error", rename_all = "snake_case")]
pub enum BomError {
    File(BomFileError),
    Row(RowError),
}

impl BomError {
    /// Row number for row-scoped errors
    pub fn row(&self) -> Option<usize> {
        match self {
            BomError::File(_) => None,
            BomError::Row(e) => Some(e.row),
        }
    }

    pub fn is_file_level(&self) -> bool {
        matches!(self, BomError::File(_))
    }
}

impl fmt::Display for BomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BomError::File(e) => write!(f, "{}", e),
            BomError::Row(e) => write!(f, "{}", e),
        }
    }
}

impl From<BomFileError> for BomError {
    fn from(e: BomFileError) -> Self {
        BomError::File(e)
    }
}

impl From<RowError> for BomError {
    fn from(e: RowError) -> Self {
        BomError::Row(e)
    }
}
