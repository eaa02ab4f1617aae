//! Inquiry record - the saved or submitted snapshot of a quote request

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::entities::company::CompanyInfo;
use crate::entities::product::InquiryProduct;
use crate::entities::project::ProjectInfo;

/// Lifecycle status of an inquiry record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    /// Saved but not sent; payload may still change
    #[default]
    Draft,
    /// Sent to suppliers, awaiting quotes
    Submitted,
    /// At least one supplier quote received
    Quoted,
    /// Requester accepted a quote
    Accepted,
    /// Requester rejected the quotes
    Rejected,
    /// Passed its expiry date without a decision
    Expired,
    /// Withdrawn by the requester
    Cancelled,
}

impl InquiryStatus {
    /// No further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InquiryStatus::Accepted
                | InquiryStatus::Rejected
                | InquiryStatus::Expired
                | InquiryStatus::Cancelled
        )
    }

    /// Check if a status transition is valid
    pub fn can_transition_to(&self, to: InquiryStatus) -> bool {
        matches!(
            (self, to),
            (InquiryStatus::Draft, InquiryStatus::Submitted)
                | (InquiryStatus::Draft, InquiryStatus::Cancelled)
                | (InquiryStatus::Submitted, InquiryStatus::Quoted)
                | (InquiryStatus::Submitted, InquiryStatus::Expired)
                | (InquiryStatus::Submitted, InquiryStatus::Cancelled)
                | (InquiryStatus::Quoted, InquiryStatus::Accepted)
                | (InquiryStatus::Quoted, InquiryStatus::Rejected)
                | (InquiryStatus::Quoted, InquiryStatus::Expired)
                | (InquiryStatus::Quoted, InquiryStatus::Cancelled)
        )
    }

    /// Get allowed transitions from this status
    pub fn allowed_transitions(&self) -> Vec<InquiryStatus> {
        match self {
            InquiryStatus::Draft => vec![InquiryStatus::Submitted, InquiryStatus::Cancelled],
            InquiryStatus::Submitted => vec![
                InquiryStatus::Quoted,
                InquiryStatus::Expired,
                InquiryStatus::Cancelled,
            ],
            InquiryStatus::Quoted => vec![
                InquiryStatus::Accepted,
                InquiryStatus::Rejected,
                InquiryStatus::Expired,
                InquiryStatus::Cancelled,
            ],
            _ => vec![],
        }
    }
}

impl std::fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InquiryStatus::Draft => write!(f, "draft"),
            InquiryStatus::Submitted => write!(f, "submitted"),
            InquiryStatus::Quoted => write!(f, "quoted"),
            InquiryStatus::Accepted => write!(f, "accepted"),
            InquiryStatus::Rejected => write!(f, "rejected"),
            InquiryStatus::Expired => write!(f, "expired"),
            InquiryStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for InquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(InquiryStatus::Draft),
            "submitted" => Ok(InquiryStatus::Submitted),
            "quoted" => Ok(InquiryStatus::Quoted),
            "accepted" => Ok(InquiryStatus::Accepted),
            "rejected" => Ok(InquiryStatus::Rejected),
            "expired" => Ok(InquiryStatus::Expired),
            "cancelled" => Ok(InquiryStatus::Cancelled),
            _ => Err(format!(
                "Invalid inquiry status: {}. Use draft, submitted, quoted, accepted, rejected, expired, or cancelled",
                s
            )),
        }
    }
}

/// Currency code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Cny,
    Jpy,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::Usd => write!(f, "USD"),
            Currency::Eur => write!(f, "EUR"),
            Currency::Gbp => write!(f, "GBP"),
            Currency::Cny => write!(f, "CNY"),
            Currency::Jpy => write!(f, "JPY"),
        }
    }
}

/// A supplier's answer to a submitted inquiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierQuote {
    /// Supplier name or reference
    pub supplier: String,

    /// Line item the quote applies to (None = whole inquiry)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<EntityId>,

    /// Unit price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,

    /// Total price
    pub total_price: f64,

    #[serde(default)]
    pub currency: Currency,

    /// Lead time in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_time_days: Option<u32>,

    /// Date the quote stops being valid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub received: DateTime<Utc>,
}

/// A file attached to an inquiry (drawing, datasheet, BOM source)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,

    /// Where the host stored the file
    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(default)]
    pub size_bytes: u64,
}

/// Errors from record lifecycle operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("Invalid status transition: {from} → {to}")]
    InvalidTransition {
        from: InquiryStatus,
        to: InquiryStatus,
    },

    #[error("Inquiry is {status}; its products, company and project are frozen")]
    Frozen { status: InquiryStatus },

    #[error("Inquiry is {status} and cannot receive quotes")]
    NotQuotable { status: InquiryStatus },

    #[error("Inquiries only leave draft through submission")]
    RequiresSubmission,
}

/// The saved (draft) or submitted snapshot of an inquiry
///
/// Fields are private: once the status leaves `draft` the product, company
/// and project payload can no longer be changed, only status and quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InquiryRecord {
    id: EntityId,

    /// Human-readable number, assigned at submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inquiry_number: Option<String>,

    #[serde(default)]
    products: Vec<InquiryProduct>,

    #[serde(default)]
    company_info: CompanyInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    project_info: Option<ProjectInfo>,

    #[serde(default)]
    status: InquiryStatus,

    created: DateTime<Utc>,

    updated: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    submitted_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    quoted_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    total_items: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    expected_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<Attachment>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    quotes: Vec<SupplierQuote>,
}

impl Entity for InquiryRecord {
    const PREFIX: &'static str = "INQ";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

impl InquiryRecord {
    /// Create a draft record from the given payload
    pub fn draft(
        id: EntityId,
        products: Vec<InquiryProduct>,
        company_info: CompanyInfo,
        project_info: Option<ProjectInfo>,
        created: DateTime<Utc>,
    ) -> Self {
        let mut record = Self {
            id,
            inquiry_number: None,
            products: Vec::new(),
            company_info: CompanyInfo::default(),
            project_info: None,
            status: InquiryStatus::Draft,
            created,
            updated: created,
            submitted_at: None,
            quoted_at: None,
            expires_at: None,
            total_items: 0,
            expected_value: None,
            attachments: Vec::new(),
            quotes: Vec::new(),
        };
        record.set_payload(products, company_info, project_info);
        record
    }

    fn set_payload(
        &mut self,
        products: Vec<InquiryProduct>,
        company_info: CompanyInfo,
        project_info: Option<ProjectInfo>,
    ) {
        self.total_items = products
            .iter()
            .fold(0u32, |acc, p| acc.saturating_add(p.quantity()));
        let priced: Vec<f64> = products.iter().filter_map(|p| p.line_value()).collect();
        self.expected_value = if priced.is_empty() {
            None
        } else {
            Some(priced.iter().sum())
        };
        self.products = products;
        self.company_info = company_info;
        self.project_info = project_info.filter(|p| !p.is_empty());
    }

    /// Replace the payload of a draft record
    pub fn replace_payload(
        &mut self,
        products: Vec<InquiryProduct>,
        company_info: CompanyInfo,
        project_info: Option<ProjectInfo>,
    ) -> Result<(), RecordError> {
        self.ensure_draft()?;
        self.set_payload(products, company_info, project_info);
        self.updated = Utc::now();
        Ok(())
    }

    /// Attach a file to a draft record
    pub fn add_attachment(&mut self, attachment: Attachment) -> Result<(), RecordError> {
        self.ensure_draft()?;
        self.attachments.push(attachment);
        self.updated = Utc::now();
        Ok(())
    }

    fn ensure_draft(&self) -> Result<(), RecordError> {
        if self.status == InquiryStatus::Draft {
            Ok(())
        } else {
            Err(RecordError::Frozen {
                status: self.status,
            })
        }
    }

    /// Turn a draft into a submitted record, stamping number and timestamps
    pub fn into_submitted(
        mut self,
        inquiry_number: String,
        now: DateTime<Utc>,
        expiry_days: i64,
    ) -> Result<Self, RecordError> {
        if self.status != InquiryStatus::Draft {
            return Err(RecordError::InvalidTransition {
                from: self.status,
                to: InquiryStatus::Submitted,
            });
        }
        self.inquiry_number = Some(inquiry_number);
        self.status = InquiryStatus::Submitted;
        self.submitted_at = Some(now);
        self.expires_at = Some(now + Duration::days(expiry_days));
        self.updated = now;
        Ok(self)
    }

    /// Move to a new status. Submission goes through [`Self::into_submitted`].
    pub fn transition_to(&mut self, to: InquiryStatus) -> Result<(), RecordError> {
        if to == InquiryStatus::Submitted {
            return Err(RecordError::RequiresSubmission);
        }
        if !self.status.can_transition_to(to) {
            return Err(RecordError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated = Utc::now();
        Ok(())
    }

    /// Record a supplier quote; the inquiry becomes `quoted`
    pub fn record_quote(
        &mut self,
        quote: SupplierQuote,
        now: DateTime<Utc>,
    ) -> Result<(), RecordError> {
        match self.status {
            InquiryStatus::Submitted | InquiryStatus::Quoted => {
                self.quotes.push(quote);
                self.status = InquiryStatus::Quoted;
                self.quoted_at = Some(now);
                self.updated = now;
                Ok(())
            }
            status => Err(RecordError::NotQuotable { status }),
        }
    }

    /// Check if the inquiry is past its expiry and still awaiting a decision
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && self.expires_at.is_some_and(|exp| exp < now)
    }

    /// Mark as expired if overdue; returns true when the status changed
    pub fn expire_if_overdue(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_overdue(now) {
            self.status = InquiryStatus::Expired;
            self.updated = now;
            true
        } else {
            false
        }
    }

    pub fn inquiry_number(&self) -> Option<&str> {
        self.inquiry_number.as_deref()
    }

    pub fn products(&self) -> &[InquiryProduct] {
        &self.products
    }

    pub fn company_info(&self) -> &CompanyInfo {
        &self.company_info
    }

    pub fn project_info(&self) -> Option<&ProjectInfo> {
        self.project_info.as_ref()
    }

    pub fn status(&self) -> InquiryStatus {
        self.status
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn quoted_at(&self) -> Option<DateTime<Utc>> {
        self.quoted_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Sum of requested quantities across all line items
    pub fn total_items(&self) -> u32 {
        self.total_items
    }

    /// Sum of quantity × target price over priced line items
    pub fn expected_value(&self) -> Option<f64> {
        self.expected_value
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn quotes(&self) -> &[SupplierQuote] {
        &self.quotes
    }
}
