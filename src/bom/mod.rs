//! BOM (bill of materials) import
//!
//! Delimited text in, [`InquiryProduct`](crate::entities::InquiryProduct)s out,
//! with row-scoped errors and warnings for everything that did not fit.

pub mod columns;
pub mod diagnostics;
pub mod parser;

pub use columns::{normalize_header, BomField, ColumnMap, COLUMN_SYNONYMS};
pub use diagnostics::{
    BomError, BomFileError, RowError, RowErrorKind, RowWarning, RowWarningKind,
};
pub use parser::{bom_template, parse_bom, BomParseResult, BomParser};
