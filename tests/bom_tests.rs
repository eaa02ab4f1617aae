//! BOM import tests

mod common;

use common::{memory_engine, temp_storage, write_bom};
use inquiry::bom::{
    bom_template, parse_bom, BomError, BomFileError, BomParser, RowErrorKind, RowWarningKind,
};
use inquiry::core::{EngineConfig, Urgency};

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_non_numeric_quantity_defaults_to_one() {
    let result = parse_bom("part_number,quantity\nSTM32F401,abc");

    assert!(result.success);
    assert_eq!(result.products.len(), 1);
    assert_eq!(result.products[0].model, "STM32F401");
    assert_eq!(result.products[0].quantity(), 1);

    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].row, 2);
    assert_eq!(
        result.warnings[0].kind,
        RowWarningKind::InvalidQuantity {
            value: "abc".to_string()
        }
    );
}

#[test]
fn test_non_positive_quantities_are_warnings() {
    let result = parse_bom("part_number,quantity\nA,0\nB,-5\nC,\nD,7");

    assert!(result.success);
    let quantities: Vec<u32> = result.products.iter().map(|p| p.quantity()).collect();
    assert_eq!(quantities, vec![1, 1, 1, 7]);

    let rows: Vec<usize> = result.warnings.iter().map(|w| w.row).collect();
    assert_eq!(rows, vec![2, 3, 4]);
}

#[test]
fn test_missing_quantity_column_fails_whole_file() {
    let result = parse_bom("part_number,manufacturer\nSTM32F401,ST\nLM358,TI");

    assert!(!result.success);
    assert!(result.products.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.rows_processed, 0);
    assert_eq!(
        result.file_error_kind(),
        Some(&BomFileError::MissingColumns {
            missing: vec!["quantity".to_string()]
        })
    );
}

#[test]
fn test_missing_part_number_drops_row() {
    let result = parse_bom("part_number,quantity\n,5\nLM358,10");

    assert!(!result.success);
    assert_eq!(result.products.len(), 1);
    assert_eq!(result.products[0].model, "LM358");

    let row_errors: Vec<_> = result.row_errors().collect();
    assert_eq!(row_errors.len(), 1);
    assert_eq!(row_errors[0].row, 2);
    assert_eq!(row_errors[0].kind, RowErrorKind::MissingPartNumber);
}

#[test]
fn test_embedded_delimiter_is_column_mismatch() {
    // No quoting: the comma inside the description splits the field
    let result = parse_bom(
        "part_number,quantity,description\nNE555,10,\"Timer, precision\"\nLM358,5,Op-amp",
    );

    assert!(!result.success);
    assert_eq!(result.products.len(), 1);
    assert_eq!(
        result.errors,
        vec![BomError::Row(inquiry::bom::RowError {
            row: 2,
            kind: RowErrorKind::ColumnCountMismatch {
                expected: 3,
                found: 4
            }
        })]
    );
}

#[test]
fn test_header_synonyms_and_case() {
    let csv = "Model, QTY ,Brand,Category,Remarks,Priority\n\
               STM32F401,25,ST,MCU,Sample first,very urgent";
    let result = parse_bom(csv);

    assert!(result.success);
    let product = &result.products[0];
    assert_eq!(product.model, "STM32F401");
    assert_eq!(product.quantity(), 25);
    assert_eq!(product.brand.as_deref(), Some("ST"));
    // manufacturer falls back to brand
    assert_eq!(product.manufacturer, "ST");
    assert_eq!(product.category.as_deref(), Some("MCU"));
    assert_eq!(product.notes.as_deref(), Some("Sample first"));
    assert_eq!(product.urgency, Urgency::VeryUrgent);
}

#[test]
fn test_defaults_for_unrecognized_fields() {
    let result = parse_bom("partnumber,qty\nLM358,10");
    let product = &result.products[0];

    assert_eq!(product.manufacturer, "pending confirmation");
    assert_eq!(product.name, "LM358");
    assert_eq!(product.urgency, Urgency::Standard);
    assert!(product.specifications.is_empty());
    assert!(product.target_unit_price.is_none());
}

#[test]
fn test_extra_columns_become_specifications() {
    let result = parse_bom("part_number,quantity,Package,Voltage\nLM358,10,SOIC-8,\nNE555,5,DIP-8,5V");

    assert!(result.success);
    let first = &result.products[0];
    assert_eq!(first.specifications.get("Package").map(String::as_str), Some("SOIC-8"));
    assert!(!first.specifications.contains_key("Voltage"));

    let second = &result.products[1];
    assert_eq!(second.specifications.len(), 2);
    assert_eq!(second.specifications.get("Voltage").map(String::as_str), Some("5V"));
}

#[test]
fn test_blank_lines_keep_physical_row_numbers() {
    let result = parse_bom("\npart_number,quantity\n\nLM358,x\n   \nNE555,0\n");

    assert_eq!(result.rows_processed, 2);
    let rows: Vec<usize> = result.warnings.iter().map(|w| w.row).collect();
    assert_eq!(rows, vec![4, 6]);
}

#[test]
fn test_unit_price_column() {
    let result = parse_bom("part_number,quantity,unit_price\nA,10,$2.50\nB,4,free");

    assert!(result.success);
    assert_eq!(result.products[0].target_unit_price, Some(2.5));
    assert_eq!(result.products[1].target_unit_price, None);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(
        result.warnings[0].kind,
        RowWarningKind::InvalidUnitPrice {
            value: "free".to_string()
        }
    );
}

#[test]
fn test_every_row_invalid_is_distinct_from_empty_file() {
    let all_bad = parse_bom("part_number,quantity\n,1\n,2");
    assert!(all_bad.file_error_kind().is_none());
    assert_eq!(all_bad.row_errors().count(), 2);

    let empty = parse_bom("   \n\n");
    assert_eq!(empty.file_error_kind(), Some(&BomFileError::Empty));
}

#[test]
fn test_header_only_succeeds_with_no_products() {
    let result = parse_bom("part_number,quantity\n");
    assert!(result.success);
    assert!(result.products.is_empty());
    assert_eq!(result.rows_processed, 0);
}

#[test]
fn test_parse_is_deterministic() {
    let csv = "part_number,quantity,price\n,1\nA,zero,1.0\nB,2,abc\nC,3,1,2\nD,4,0.5";
    let first = parse_bom(csv);
    let second = parse_bom(csv);

    assert_eq!(first.errors, second.errors);
    assert_eq!(first.warnings, second.warnings);
    assert_eq!(first.source_hash, second.source_hash);

    let strip = |r: &inquiry::bom::BomParseResult| -> Vec<(String, u32, Option<f64>)> {
        r.products
            .iter()
            .map(|p| (p.model.clone(), p.quantity(), p.target_unit_price))
            .collect()
    };
    assert_eq!(strip(&first), strip(&second));

    // identifiers are fresh per parse
    assert_ne!(first.products[0].id, second.products[0].id);
}

#[test]
fn test_semicolon_delimiter() {
    let config = EngineConfig {
        delimiter: ';',
        ..Default::default()
    };
    let parser = BomParser::new(&config);
    let result = parser.parse("part_number;quantity;description\nLM358;10;Dual op-amp, SOIC");

    assert!(result.success);
    assert_eq!(result.products[0].description.as_deref(), Some("Dual op-amp, SOIC"));
}

#[test]
fn test_template_parses_cleanly() {
    let result = parse_bom(&bom_template(','));

    assert!(result.success);
    assert!(result.warnings.is_empty());
    assert_eq!(result.products.len(), 1);
    assert_eq!(result.products[0].model, "STM32F401RCT6");
    assert_eq!(result.products[0].quantity(), 100);
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_parse_file_unreadable() {
    let tmp = temp_storage();
    let result = BomParser::default().parse_file(&tmp.path().join("missing.csv"));

    assert!(!result.success);
    assert!(result.products.is_empty());
    assert!(matches!(
        result.file_error_kind(),
        Some(BomFileError::Unreadable { .. })
    ));
}

#[test]
fn test_parse_file_invalid_utf8() {
    let tmp = temp_storage();
    let path = tmp.path().join("latin1.csv");
    std::fs::write(&path, b"part_number,quantity\nR\xe9sistance,10\n").unwrap();

    let result = BomParser::default().parse_file(&path);
    assert_eq!(result.file_error_kind(), Some(&BomFileError::InvalidEncoding));
    assert!(!result.source_hash.is_empty());
}

#[test]
fn test_parse_file_with_byte_order_mark() {
    let tmp = temp_storage();
    let path = write_bom(&tmp, "bom.csv", "\u{feff}part_number,quantity\nLM358,3\n");

    let result = BomParser::default().parse_file(&path);
    assert!(result.success);
    assert_eq!(result.products[0].quantity(), 3);
}

#[tokio::test]
async fn test_engine_imports_file_async() {
    let tmp = temp_storage();
    let path = write_bom(
        &tmp,
        "bom.csv",
        "part_number,quantity\nSTM32F401,10\n,4\nLM358,abc\n",
    );

    let mut engine = memory_engine();
    let result = engine.import_bom_file(path).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.products.len(), 2);
    assert_eq!(result.row_errors().count(), 1);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(engine.draft().products.len(), 2);
    assert_eq!(engine.draft().products[1].quantity(), 1);
}

#[test]
fn test_engine_import_failure_leaves_draft_alone() {
    let mut engine = memory_engine();
    engine.import_bom("part_number,quantity\nLM358,2").unwrap();

    let result = engine.import_bom("model,manufacturer\nNE555,TI").unwrap();
    assert!(result.file_error_kind().is_some());
    assert_eq!(engine.draft().products.len(), 1);
}
