//! Product catalog - normalizes product references into inquiry line items
//!
//! A line item can come from three places: a catalog product picked by id, a
//! manually typed entry, or a row of an imported BOM. All three end up as the
//! same canonical [`InquiryProduct`].

use std::collections::HashMap;
use thiserror::Error;

use crate::core::entity::Urgency;
use crate::entities::product::{InquiryProduct, Specifications};

/// A product known to the host's catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogProduct {
    /// Catalog identifier (slug, SKU, CMS id)
    pub id: String,
    pub name: String,
    pub model: String,
    pub brand: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    pub specifications: Specifications,
}

/// Unnormalized product data, as typed by a user or read from a BOM row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductEntry {
    pub product_ref: Option<String>,
    pub model: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    pub quantity: i64,
    pub target_unit_price: Option<f64>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub urgency: Option<String>,
    pub specifications: Specifications,
}

impl ProductEntry {
    /// Entry for a model number and quantity, everything else blank
    pub fn new(model: impl Into<String>, quantity: i64) -> Self {
        Self {
            model: model.into(),
            quantity,
            ..Default::default()
        }
    }

    /// Build the canonical line item.
    ///
    /// Blank strings count as absent. The display name falls back to the
    /// description, then the model; the manufacturer falls back to the brand,
    /// then `manufacturer_placeholder`.
    pub fn into_product(self, manufacturer_placeholder: &str) -> InquiryProduct {
        let model = self.model.trim().to_string();
        let description = non_blank(self.description);
        let brand = non_blank(self.brand);

        let mut product = InquiryProduct::new(model.clone(), self.quantity);
        product.product_ref = non_blank(self.product_ref);
        product.name = non_blank(self.name)
            .or_else(|| description.clone())
            .unwrap_or(model);
        product.manufacturer = non_blank(self.manufacturer)
            .or_else(|| brand.clone())
            .unwrap_or_else(|| manufacturer_placeholder.to_string());
        product.brand = brand;
        product.category = non_blank(self.category);
        product.target_unit_price = self.target_unit_price.filter(|p| p.is_finite() && *p >= 0.0);
        product.description = description;
        product.notes = non_blank(self.notes);
        product.urgency = self
            .urgency
            .as_deref()
            .map(Urgency::parse_lenient)
            .unwrap_or_default();
        product.specifications = self.specifications;
        product
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Errors from catalog lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Unknown catalog product: {0}")]
    UnknownProduct(String),
}

/// In-memory catalog used to resolve and enrich line items
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    products: HashMap<String, CatalogProduct>,
    /// Lower-cased model -> catalog id
    by_model: HashMap<String, String>,
    manufacturer_placeholder: String,
}

impl ProductCatalog {
    pub fn new(manufacturer_placeholder: impl Into<String>) -> Self {
        Self {
            products: HashMap::new(),
            by_model: HashMap::new(),
            manufacturer_placeholder: manufacturer_placeholder.into(),
        }
    }

    /// Add or replace a catalog product
    pub fn register(&mut self, product: CatalogProduct) {
        let model_key = product.model.trim().to_lowercase();
        if !model_key.is_empty() {
            self.by_model.insert(model_key, product.id.clone());
        }
        self.products.insert(product.id.clone(), product);
    }

    pub fn get(&self, id: &str) -> Option<&CatalogProduct> {
        self.products.get(id)
    }

    /// Find a catalog product by model / part number, ignoring case
    pub fn find_by_model(&self, model: &str) -> Option<&CatalogProduct> {
        self.by_model
            .get(&model.trim().to_lowercase())
            .and_then(|id| self.products.get(id))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Create a line item for a catalog product
    pub fn from_catalog(
        &self,
        product_id: &str,
        quantity: i64,
    ) -> Result<InquiryProduct, CatalogError> {
        let catalog = self
            .get(product_id)
            .ok_or_else(|| CatalogError::UnknownProduct(product_id.to_string()))?;

        let entry = ProductEntry {
            product_ref: Some(catalog.id.clone()),
            model: catalog.model.clone(),
            name: Some(catalog.name.clone()),
            brand: catalog.brand.clone(),
            manufacturer: catalog.manufacturer.clone(),
            category: catalog.category.clone(),
            quantity,
            specifications: catalog.specifications.clone(),
            ..Default::default()
        };
        Ok(entry.into_product(&self.manufacturer_placeholder))
    }

    /// Normalize a manual entry, filling gaps from a matching catalog product
    pub fn normalize(&self, mut entry: ProductEntry) -> InquiryProduct {
        let matched = entry
            .product_ref
            .as_deref()
            .and_then(|id| self.get(id))
            .or_else(|| self.find_by_model(&entry.model));

        if let Some(catalog) = matched {
            entry.product_ref = Some(catalog.id.clone());
            if entry.model.trim().is_empty() {
                entry.model = catalog.model.clone();
            }
            entry.name = non_blank(entry.name).or_else(|| Some(catalog.name.clone()));
            entry.brand = non_blank(entry.brand).or_else(|| catalog.brand.clone());
            entry.manufacturer = non_blank(entry.manufacturer).or_else(|| catalog.manufacturer.clone());
            entry.category = non_blank(entry.category).or_else(|| catalog.category.clone());
            for (key, value) in &catalog.specifications {
                entry
                    .specifications
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }

        entry.into_product(&self.manufacturer_placeholder)
    }

    /// Link an already-built line item (e.g. from a BOM import) to the catalog
    /// by model number. Returns true if a match was found.
    pub fn link(&self, product: &mut InquiryProduct) -> bool {
        if product.product_ref.is_some() {
            return false;
        }
        let Some(catalog) = self.find_by_model(&product.model) else {
            return false;
        };

        product.product_ref = Some(catalog.id.clone());
        if product.brand.is_none() {
            product.brand = catalog.brand.clone();
        }
        if product.category.is_none() {
            product.category = catalog.category.clone();
        }
        if product.manufacturer == self.manufacturer_placeholder {
            if let Some(manufacturer) = &catalog.manufacturer {
                product.manufacturer = manufacturer.clone();
            }
        }
        true
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::new("pending confirmation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stm32() -> CatalogProduct {
        CatalogProduct {
            id: "mcu-stm32f401".to_string(),
            name: "STM32F401 Microcontroller".to_string(),
            model: "STM32F401".to_string(),
            brand: Some("ST".to_string()),
            manufacturer: Some("STMicroelectronics".to_string()),
            category: Some("MCU".to_string()),
            specifications: Specifications::from([("core".to_string(), "Cortex-M4".to_string())]),
        }
    }

    #[test]
    fn test_entry_fallbacks() {
        let product = ProductEntry {
            description: Some("Adjustable regulator".to_string()),
            brand: Some("  ".to_string()),
            ..ProductEntry::new("LM317", 0)
        }
        .into_product("pending confirmation");

        assert_eq!(product.name, "Adjustable regulator");
        assert_eq!(product.manufacturer, "pending confirmation");
        assert_eq!(product.brand, None);
        assert_eq!(product.quantity(), 1);
        assert_eq!(product.urgency, Urgency::Standard);
    }

    #[test]
    fn test_manufacturer_falls_back_to_brand() {
        let product = ProductEntry {
            brand: Some("TI".to_string()),
            ..ProductEntry::new("LM317", 5)
        }
        .into_product("pending confirmation");
        assert_eq!(product.manufacturer, "TI");
        assert_eq!(product.name, "LM317");
    }

    #[test]
    fn test_from_catalog() {
        let mut catalog = ProductCatalog::default();
        catalog.register(stm32());

        let product = catalog.from_catalog("mcu-stm32f401", 100).unwrap();
        assert_eq!(product.product_ref.as_deref(), Some("mcu-stm32f401"));
        assert_eq!(product.manufacturer, "STMicroelectronics");
        assert_eq!(product.quantity(), 100);
        assert_eq!(product.specifications.get("core").map(String::as_str), Some("Cortex-M4"));

        assert_eq!(
            catalog.from_catalog("nope", 1),
            Err(CatalogError::UnknownProduct("nope".to_string()))
        );
    }

    #[test]
    fn test_normalize_enriches_by_model() {
        let mut catalog = ProductCatalog::default();
        catalog.register(stm32());

        let product = catalog.normalize(ProductEntry {
            urgency: Some("very urgent".to_string()),
            ..ProductEntry::new("stm32f401", 3)
        });

        assert_eq!(product.product_ref.as_deref(), Some("mcu-stm32f401"));
        assert_eq!(product.name, "STM32F401 Microcontroller");
        assert_eq!(product.category.as_deref(), Some("MCU"));
        assert_eq!(product.urgency, Urgency::VeryUrgent);
    }

    #[test]
    fn test_link_replaces_placeholder_manufacturer() {
        let mut catalog = ProductCatalog::default();
        catalog.register(stm32());

        let mut product = ProductEntry::new("STM32F401", 1).into_product("pending confirmation");
        assert!(catalog.link(&mut product));
        assert_eq!(product.manufacturer, "STMicroelectronics");

        let mut unknown = ProductEntry::new("XYZ", 1).into_product("pending confirmation");
        assert!(!catalog.link(&mut unknown));
        assert!(unknown.product_ref.is_none());
    }
}
