//! Inquiry product - one requested line item

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::core::entity::{Entity, Urgency};
use crate::core::identity::{EntityId, EntityPrefix};

/// Free-form technical attributes attached to a line item (e.g. "package" -> "LQFP64")
pub type Specifications = BTreeMap<String, String>;

/// A single line item on an inquiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InquiryProduct {
    /// Unique identifier
    pub id: EntityId,

    /// Catalog product this line refers to (absent for freeform/BOM rows)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_ref: Option<String>,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Model / part number
    pub model: String,

    /// Brand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Manufacturer
    #[serde(default)]
    pub manufacturer: String,

    /// Product category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Requested quantity, never below 1
    #[serde(default = "default_quantity", deserialize_with = "deserialize_quantity")]
    quantity: u32,

    /// Target unit price the requester hopes for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_unit_price: Option<f64>,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Requester notes / remarks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Delivery urgency
    #[serde(default, deserialize_with = "deserialize_urgency")]
    pub urgency: Urgency,

    /// Extra attributes, including unrecognized BOM columns
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub specifications: Specifications,

    /// Creation timestamp
    pub created: DateTime<Utc>,
}

fn default_quantity() -> u32 {
    1
}

fn deserialize_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(clamp_quantity(raw))
}

fn deserialize_urgency<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Urgency, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(Urgency::parse_lenient).unwrap_or_default())
}

fn clamp_quantity(raw: i64) -> u32 {
    raw.clamp(1, u32::MAX as i64) as u32
}

impl Entity for InquiryProduct {
    const PREFIX: &'static str = "ITEM";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

impl InquiryProduct {
    /// Create a new line item for a model number
    pub fn new(model: impl Into<String>, quantity: i64) -> Self {
        let model = model.into();
        Self {
            id: EntityId::new(EntityPrefix::Item),
            product_ref: None,
            name: model.clone(),
            model,
            brand: None,
            manufacturer: String::new(),
            category: None,
            quantity: clamp_quantity(quantity),
            target_unit_price: None,
            description: None,
            notes: None,
            urgency: Urgency::default(),
            specifications: Specifications::new(),
            created: Utc::now(),
        }
    }

    /// Requested quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Set the quantity; values below 1 become 1
    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = clamp_quantity(quantity);
    }

    /// Builder-style quantity setter
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.set_quantity(quantity);
        self
    }

    /// Quantity times target unit price, if a price is known
    pub fn line_value(&self) -> Option<f64> {
        self.target_unit_price.map(|p| p * self.quantity as f64)
    }

    /// Apply a partial update. Fields left as `None` in the patch are kept.
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(brand) = patch.brand {
            self.brand = Some(brand);
        }
        if let Some(manufacturer) = patch.manufacturer {
            self.manufacturer = manufacturer;
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(quantity) = patch.quantity {
            self.set_quantity(quantity);
        }
        if let Some(price) = patch.target_unit_price {
            self.target_unit_price = Some(price);
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        if let Some(urgency) = patch.urgency {
            self.urgency = urgency;
        }
        if let Some(specs) = patch.specifications {
            self.specifications.extend(specs);
        }
    }
}

/// Partial update for an [`InquiryProduct`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub model: Option<String>,
    pub brand: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub target_unit_price: Option<f64>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub urgency: Option<Urgency>,
    pub specifications: Option<Specifications>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_creation() {
        let product = InquiryProduct::new("STM32F401", 25);

        assert!(product.id.to_string().starts_with("ITEM-"));
        assert_eq!(product.model, "STM32F401");
        assert_eq!(product.name, "STM32F401");
        assert_eq!(product.quantity(), 25);
        assert_eq!(product.urgency, Urgency::Standard);
    }

    #[test]
    fn test_quantity_never_below_one() {
        assert_eq!(InquiryProduct::new("X", 0).quantity(), 1);
        assert_eq!(InquiryProduct::new("X", -40).quantity(), 1);

        let mut product = InquiryProduct::new("X", 5);
        product.set_quantity(-1);
        assert_eq!(product.quantity(), 1);
    }

    #[test]
    fn test_apply_patch_keeps_unset_fields() {
        let mut product = InquiryProduct::new("LM317", 10);
        product.manufacturer = "TI".to_string();

        product.apply(ProductPatch {
            quantity: Some(100),
            notes: Some("TO-220 only".to_string()),
            ..Default::default()
        });

        assert_eq!(product.quantity(), 100);
        assert_eq!(product.notes.as_deref(), Some("TO-220 only"));
        assert_eq!(product.manufacturer, "TI");
        assert_eq!(product.model, "LM317");
    }

    #[test]
    fn test_line_value() {
        let mut product = InquiryProduct::new("LM317", 10);
        assert_eq!(product.line_value(), None);
        product.target_unit_price = Some(0.25);
        assert_eq!(product.line_value(), Some(2.5));
    }

    #[test]
    fn test_deserialize_repairs_bad_values() {
        let id = EntityId::new(EntityPrefix::Item);
        let json = format!(
            r#"{{"id":"{}","model":"ABC","quantity":0,"urgency":"whenever","created":"2024-01-01T00:00:00Z"}}"#,
            id
        );
        let product: InquiryProduct = serde_json::from_str(&json).unwrap();
        assert_eq!(product.quantity(), 1);
        assert_eq!(product.urgency, Urgency::Standard);
    }
}
