//! Company info - the requesting organization and its contact

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Company headcount bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    /// 1-10 employees
    Micro,
    /// 11-50 employees
    Small,
    /// 51-200 employees
    Medium,
    /// 201-1000 employees
    Large,
    /// More than 1000 employees
    Enterprise,
}

impl std::fmt::Display for CompanySize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompanySize::Micro => write!(f, "1-10"),
            CompanySize::Small => write!(f, "11-50"),
            CompanySize::Medium => write!(f, "51-200"),
            CompanySize::Large => write!(f, "201-1000"),
            CompanySize::Enterprise => write!(f, "1000+"),
        }
    }
}

impl std::str::FromStr for CompanySize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "micro" | "1-10" => Ok(CompanySize::Micro),
            "small" | "11-50" => Ok(CompanySize::Small),
            "medium" | "51-200" => Ok(CompanySize::Medium),
            "large" | "201-1000" => Ok(CompanySize::Large),
            "enterprise" | "1000+" => Ok(CompanySize::Enterprise),
            _ => Err(format!("Invalid company size: {}", s)),
        }
    }
}

/// The requester's organization and contact details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Company name (required)
    #[serde(default)]
    pub company_name: String,

    /// Contact person (required)
    #[serde(default)]
    pub contact_person: String,

    /// Contact email (required)
    #[serde(default)]
    pub email: String,

    /// Contact phone (required)
    #[serde(default)]
    pub phone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<CompanySize>,

    /// Expected annual purchasing volume, as typed by the requester
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_volume: Option<String>,
}

impl CompanyInfo {
    /// Names of required fields that are still blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("company_name", &self.company_name),
            ("contact_person", &self.contact_person),
            ("email", &self.email),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// True when all four required fields are filled in
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Key used to decide whether two payloads describe the same template
    pub fn template_key(&self) -> (String, String) {
        (
            self.company_name.trim().to_lowercase(),
            self.email.trim().to_lowercase(),
        )
    }

    /// Apply a partial update. Fields left as `None` in the patch are kept.
    pub fn apply(&mut self, patch: CompanyPatch) {
        if let Some(v) = patch.company_name {
            self.company_name = v;
        }
        if let Some(v) = patch.contact_person {
            self.contact_person = v;
        }
        if let Some(v) = patch.email {
            self.email = v;
        }
        if let Some(v) = patch.phone {
            self.phone = v;
        }
        if let Some(v) = patch.position {
            self.position = Some(v);
        }
        if let Some(v) = patch.website {
            self.website = Some(v);
        }
        if let Some(v) = patch.address {
            self.address = Some(v);
        }
        if let Some(v) = patch.industry {
            self.industry = Some(v);
        }
        if let Some(v) = patch.company_size {
            self.company_size = Some(v);
        }
        if let Some(v) = patch.annual_volume {
            self.annual_volume = Some(v);
        }
    }
}

/// Partial update for [`CompanyInfo`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyPatch {
    pub company_name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<CompanySize>,
    pub annual_volume: Option<String>,
}

impl From<CompanyInfo> for CompanyPatch {
    fn from(info: CompanyInfo) -> Self {
        Self {
            company_name: Some(info.company_name),
            contact_person: Some(info.contact_person),
            email: Some(info.email),
            phone: Some(info.phone),
            position: info.position,
            website: info.website,
            address: info.address,
            industry: info.industry,
            company_size: info.company_size,
            annual_volume: info.annual_volume,
        }
    }
}

/// A complete [`CompanyInfo`] kept for reuse on later inquiries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyTemplate {
    pub id: EntityId,
    pub company: CompanyInfo,
    /// When this payload was last saved or promoted
    pub saved: DateTime<Utc>,
}

impl CompanyTemplate {
    pub fn new(company: CompanyInfo) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Tpl),
            company,
            saved: Utc::now(),
        }
    }
}

impl Entity for CompanyTemplate {
    const PREFIX: &'static str = "TPL";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created(&self) -> DateTime<Utc> {
        self.saved
    }
}
