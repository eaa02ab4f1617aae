//! BOM parsing
//!
//! Reads delimited text into [`InquiryProduct`]s. The parser is best effort:
//! it never fails outright, every problem lands in [`BomParseResult`].

use csv::{ReaderBuilder, StringRecord, Terminator, Trim};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::bom::columns::{BomField, ColumnMap, COLUMN_SYNONYMS};
use crate::bom::diagnostics::{
    BomError, BomFileError, RowError, RowErrorKind, RowWarning, RowWarningKind,
};
use crate::core::catalog::ProductEntry;
use crate::core::config::EngineConfig;
use crate::entities::product::InquiryProduct;

/// Outcome of importing one BOM file
#[derive(Debug, Clone, Serialize)]
pub struct BomParseResult {
    /// True iff `errors` is empty; warnings do not count
    pub success: bool,

    /// Rows that became line items, in file order
    pub products: Vec<InquiryProduct>,

    /// File-level or row-level errors, in file order
    pub errors: Vec<BomError>,

    /// Non-fatal row problems, in file order
    pub warnings: Vec<RowWarning>,

    /// Non-blank data rows examined
    pub rows_processed: usize,

    /// SHA-256 of the input bytes (hex), empty if the file could not be read
    pub source_hash: String,
}

impl BomParseResult {
    fn file_error(error: BomFileError, source_hash: String) -> Self {
        Self {
            success: false,
            products: Vec::new(),
            errors: vec![BomError::File(error)],
            warnings: Vec::new(),
            rows_processed: 0,
            source_hash,
        }
    }

    /// The file-level error, if the whole import was aborted
    pub fn file_error_kind(&self) -> Option<&BomFileError> {
        self.errors.iter().find_map(|e| match e {
            BomError::File(f) => Some(f),
            BomError::Row(_) => None,
        })
    }

    /// Row errors only
    pub fn row_errors(&self) -> impl Iterator<Item = &RowError> {
        self.errors.iter().filter_map(|e| match e {
            BomError::Row(r) => Some(r),
            BomError::File(_) => None,
        })
    }

    /// One-line summary for display
    pub fn summary(&self) -> String {
        format!(
            "{} product(s) imported from {} row(s), {} error(s), {} warning(s)",
            self.products.len(),
            self.rows_processed,
            self.errors.len(),
            self.warnings.len()
        )
    }
}

/// Delimited-text BOM parser
#[derive(Debug, Clone)]
pub struct BomParser {
    delimiter: u8,
    manufacturer_placeholder: String,
}

impl Default for BomParser {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl BomParser {
    /// Create a parser using the delimiter and manufacturer placeholder from `config`
    pub fn new(config: &EngineConfig) -> Self {
        // EngineConfig::validate guarantees an ASCII delimiter
        let delimiter = u8::try_from(config.delimiter).unwrap_or(b',');
        Self {
            delimiter,
            manufacturer_placeholder: config.manufacturer_placeholder.clone(),
        }
    }

    /// Use a different field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse a file from disk. Read failures become a file-level error.
    pub fn parse_file(&self, path: &Path) -> BomParseResult {
        match std::fs::read(path) {
            Ok(bytes) => self.parse_bytes(&bytes),
            Err(e) => {
                tracing::warn!("Could not read BOM file {}: {}", path.display(), e);
                BomParseResult::file_error(
                    BomFileError::Unreadable {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    },
                    String::new(),
                )
            }
        }
    }

    /// Parse a file from disk on the blocking thread pool
    pub async fn parse_file_async(&self, path: PathBuf) -> BomParseResult {
        let parser = self.clone();
        let display = path.display().to_string();
        match tokio::task::spawn_blocking(move || parser.parse_file(&path)).await {
            Ok(result) => result,
            Err(e) => BomParseResult::file_error(
                BomFileError::Unreadable {
                    path: display,
                    message: e.to_string(),
                },
                String::new(),
            ),
        }
    }

    /// Parse raw bytes, which must be UTF-8 (an optional byte order mark is ignored)
    pub fn parse_bytes(&self, bytes: &[u8]) -> BomParseResult {
        let source_hash = hash_hex(bytes);
        match std::str::from_utf8(bytes) {
            Ok(text) => self.parse_with_hash(text, source_hash),
            Err(_) => BomParseResult::file_error(BomFileError::InvalidEncoding, source_hash),
        }
    }

    /// Parse BOM text
    pub fn parse(&self, contents: &str) -> BomParseResult {
        self.parse_with_hash(contents, hash_hex(contents.as_bytes()))
    }

    fn parse_with_hash(&self, contents: &str, source_hash: String) -> BomParseResult {
        let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);

        // Blank lines never reach the reader and only '\n' ends a record, so
        // record i maps to line_numbers[i]
        let (line_numbers, lines): (Vec<usize>, Vec<&str>) = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| (idx + 1, line))
            .unzip();

        if lines.is_empty() {
            return BomParseResult::file_error(BomFileError::Empty, source_hash);
        }

        let joined = lines.join("\n");
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .terminator(Terminator::Any(b'\n'))
            .quoting(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(joined.as_bytes());

        let mut columns: Option<ColumnMap> = None;
        let mut products = Vec::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut rows_processed = 0;

        for (idx, result) in reader.records().enumerate() {
            let row = line_numbers.get(idx).copied().unwrap_or(idx + 1);

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    if columns.is_none() {
                        return BomParseResult::file_error(
                            BomFileError::Unreadable {
                                path: "<header>".to_string(),
                                message: e.to_string(),
                            },
                            source_hash,
                        );
                    }
                    rows_processed += 1;
                    errors.push(BomError::Row(RowError {
                        row,
                        kind: RowErrorKind::Malformed {
                            message: e.to_string(),
                        },
                    }));
                    continue;
                }
            };

            if is_blank(&record) {
                continue;
            }

            if columns.is_none() {
                let map = ColumnMap::resolve(record.iter());
                let missing = map.missing_required();
                if !missing.is_empty() {
                    let missing: Vec<String> =
                        missing.iter().map(|f| f.as_str().to_string()).collect();
                    tracing::info!("BOM rejected: missing column(s) {}", missing.join(", "));
                    return BomParseResult::file_error(
                        BomFileError::MissingColumns { missing },
                        source_hash,
                    );
                }
                tracing::debug!(
                    "BOM header resolved: {} column(s), {} specification column(s)",
                    map.width(),
                    map.extras().len()
                );
                columns = Some(map);
                continue;
            }

            let Some(map) = &columns else {
                continue;
            };

            rows_processed += 1;
            match self.parse_row(map, &record, row, &mut warnings) {
                Ok(product) => products.push(product),
                Err(kind) => errors.push(BomError::Row(RowError { row, kind })),
            }
        }

        if columns.is_none() {
            return BomParseResult::file_error(BomFileError::Empty, source_hash);
        }

        tracing::info!(
            "BOM parsed: {} product(s) from {} row(s), {} error(s), {} warning(s)",
            products.len(),
            rows_processed,
            errors.len(),
            warnings.len()
        );

        BomParseResult {
            success: errors.is_empty(),
            products,
            errors,
            warnings,
            rows_processed,
            source_hash,
        }
    }

    fn parse_row(
        &self,
        map: &ColumnMap,
        record: &StringRecord,
        row: usize,
        warnings: &mut Vec<RowWarning>,
    ) -> Result<InquiryProduct, RowErrorKind> {
        if record.len() != map.width() {
            return Err(RowErrorKind::ColumnCountMismatch {
                expected: map.width(),
                found: record.len(),
            });
        }

        let field = |f: BomField| -> Option<String> {
            map.index_of(f)
                .and_then(|idx| record.get(idx))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let part_number = field(BomField::PartNumber).ok_or(RowErrorKind::MissingPartNumber)?;

        let raw_quantity = field(BomField::Quantity).unwrap_or_default();
        let quantity = match parse_quantity(&raw_quantity) {
            Some(qty) => qty,
            None => {
                warnings.push(RowWarning {
                    row,
                    kind: RowWarningKind::InvalidQuantity {
                        value: raw_quantity,
                    },
                });
                1
            }
        };

        let target_unit_price = match field(BomField::UnitPrice) {
            Some(raw) => match parse_price(&raw) {
                Some(price) => Some(price),
                None => {
                    warnings.push(RowWarning {
                        row,
                        kind: RowWarningKind::InvalidUnitPrice { value: raw },
                    });
                    None
                }
            },
            None => None,
        };

        let specifications = map
            .extras()
            .iter()
            .filter_map(|(idx, header)| {
                record
                    .get(*idx)
                    .filter(|v| !v.is_empty())
                    .map(|v| (header.clone(), v.to_string()))
            })
            .collect();

        let entry = ProductEntry {
            model: part_number,
            quantity,
            name: field(BomField::Name),
            brand: field(BomField::Brand),
            manufacturer: field(BomField::Manufacturer),
            category: field(BomField::Category),
            description: field(BomField::Description),
            notes: field(BomField::Notes),
            urgency: field(BomField::Urgency),
            target_unit_price,
            specifications,
            ..Default::default()
        };

        Ok(entry.into_product(&self.manufacturer_placeholder))
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.is_empty())
}

/// Positive whole number; "10.0" counts, "2.5" does not
fn parse_quantity(raw: &str) -> Option<i64> {
    let qty = match raw.parse::<i64>() {
        Ok(qty) => qty,
        Err(_) => {
            let value = raw.parse::<f64>().ok()?;
            if !value.is_finite() || value.fract() != 0.0 || value > i64::MAX as f64 {
                return None;
            }
            value as i64
        }
    };
    (qty > 0).then_some(qty)
}

/// Non-negative finite price, tolerating a leading currency sign
fn parse_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start_matches(['$', '€', '£', '¥']).trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

fn hash_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Parse BOM text with the default configuration
pub fn parse_bom(contents: &str) -> BomParseResult {
    BomParser::default().parse(contents)
}

/// A ready-to-fill BOM: header row with the preferred spelling of every
/// recognized column, and one example row
pub fn bom_template(delimiter: char) -> String {
    let sep = delimiter.to_string();
    let header: Vec<&str> = COLUMN_SYNONYMS
        .iter()
        .filter_map(|(_, synonyms)| synonyms.first().copied())
        .collect();
    let example = [
        "STM32F401RCT6",
        "100",
        "STMicroelectronics",
        "ST",
        "MCU",
        "STM32F401 microcontroller",
        "ARM Cortex-M4 84MHz",
        "LQFP64 package",
        "2.50",
        "standard",
    ];
    format!("{}\n{}\n", header.join(&sep), example.join(&sep))
}
