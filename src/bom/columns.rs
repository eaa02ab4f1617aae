//! Column resolution for BOM headers
//!
//! A fixed table maps each canonical field to an ordered list of accepted
//! header spellings. Earlier synonyms win when a file carries more than one.
//! Headers that match nothing are kept as specification columns.

use std::collections::HashMap;

/// Canonical BOM fields the importer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BomField {
    PartNumber,
    Quantity,
    Manufacturer,
    Brand,
    Category,
    Name,
    Description,
    Notes,
    UnitPrice,
    Urgency,
}

impl BomField {
    pub fn as_str(&self) -> &'static str {
        match self {
            BomField::PartNumber => "part_number",
            BomField::Quantity => "quantity",
            BomField::Manufacturer => "manufacturer",
            BomField::Brand => "brand",
            BomField::Category => "category",
            BomField::Name => "name",
            BomField::Description => "description",
            BomField::Notes => "notes",
            BomField::UnitPrice => "unit_price",
            BomField::Urgency => "urgency",
        }
    }

    /// Fields a file must provide for any row to be usable
    pub fn required() -> &'static [BomField] {
        &[BomField::PartNumber, BomField::Quantity]
    }
}

impl std::fmt::Display for BomField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepted header spellings per field, in priority order
pub const COLUMN_SYNONYMS: &[(BomField, &[&str])] = &[
    (
        BomField::PartNumber,
        &["part_number", "partnumber", "model", "part_no", "mpn"],
    ),
    (BomField::Quantity, &["quantity", "qty"]),
    (BomField::Manufacturer, &["manufacturer", "mfr", "maker"]),
    (BomField::Brand, &["brand"]),
    (BomField::Category, &["category", "type"]),
    (BomField::Name, &["name", "product_name", "title"]),
    (BomField::Description, &["description", "desc"]),
    (
        BomField::Notes,
        &["remarks", "remark", "notes", "note", "comments", "comment"],
    ),
    (
        BomField::UnitPrice,
        &["target_price", "unit_price", "price"],
    ),
    (BomField::Urgency, &["urgency", "priority"]),
];

/// Normalize a header for matching: trimmed, lower-cased, spaces and dashes
/// turned into underscores
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Resolved layout of a BOM header row
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    /// Header cells as written (trimmed)
    headers: Vec<String>,
    /// Canonical field -> column index
    fields: HashMap<BomField, usize>,
    /// Unrecognized columns: (index, header as written)
    extras: Vec<(usize, String)>,
}

impl ColumnMap {
    /// Resolve a header row against [`COLUMN_SYNONYMS`]
    pub fn resolve<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| h.as_ref().trim().to_string())
            .collect();
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

        let mut fields = HashMap::new();
        let mut claimed = vec![false; headers.len()];

        for (field, synonyms) in COLUMN_SYNONYMS {
            let hit = synonyms.iter().find_map(|syn| {
                normalized
                    .iter()
                    .enumerate()
                    .find(|(idx, h)| !claimed[*idx] && h.as_str() == *syn)
                    .map(|(idx, _)| idx)
            });
            if let Some(idx) = hit {
                claimed[idx] = true;
                fields.insert(*field, idx);
            }
        }

        let extras = headers
            .iter()
            .enumerate()
            .filter(|(idx, h)| !claimed[*idx] && !h.is_empty())
            .map(|(idx, h)| (idx, h.clone()))
            .collect();

        Self {
            headers,
            fields,
            extras,
        }
    }

    /// Number of columns in the header row
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Column index of a canonical field
    pub fn index_of(&self, field: BomField) -> Option<usize> {
        self.fields.get(&field).copied()
    }

    /// Required fields with no matching column
    pub fn missing_required(&self) -> Vec<BomField> {
        BomField::required()
            .iter()
            .copied()
            .filter(|f| !self.fields.contains_key(f))
            .collect()
    }

    /// Columns that map to no canonical field
    pub fn extras(&self) -> &[(usize, String)] {
        &self.extras
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_synonyms_case_insensitive() {
        let map = ColumnMap::resolve(["Part Number", "QTY", "Brand", "Package"]);
        assert_eq!(map.index_of(BomField::PartNumber), Some(0));
        assert_eq!(map.index_of(BomField::Quantity), Some(1));
        assert_eq!(map.index_of(BomField::Brand), Some(2));
        assert!(map.missing_required().is_empty());
        assert_eq!(map.extras(), &[(3, "Package".to_string())]);
    }

    #[test]
    fn test_earlier_synonym_wins() {
        let map = ColumnMap::resolve(["model", "part_number", "qty"]);
        assert_eq!(map.index_of(BomField::PartNumber), Some(1));
        // the losing synonym becomes a specification column
        assert_eq!(map.extras(), &[(0, "model".to_string())]);
    }

    #[test]
    fn test_missing_required() {
        let map = ColumnMap::resolve(["part_number", "description"]);
        assert_eq!(map.missing_required(), vec![BomField::Quantity]);

        let map = ColumnMap::resolve(["foo", "bar"]);
        assert_eq!(
            map.missing_required(),
            vec![BomField::PartNumber, BomField::Quantity]
        );
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Unit-Price "), "unit_price");
        assert_eq!(normalize_header("PartNumber"), "partnumber");
    }
}
