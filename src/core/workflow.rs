//! Inquiry wizard state machine
//!
//! Owns one in-progress draft and the wizard step it is on. Every mutation
//! takes `&mut self`; a host that shares a machine across threads wraps it in
//! a single mutex. Persistence is not done here, see
//! [`InquiryEngine`](crate::core::engine::InquiryEngine).

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::company::{CompanyInfo, CompanyPatch};
use crate::entities::inquiry::{InquiryRecord, InquiryStatus};
use crate::entities::product::{InquiryProduct, ProductPatch};
use crate::entities::project::{ProjectInfo, ProjectPatch};

/// Wizard steps, in display order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStep {
    #[default]
    Products,
    Company,
    Project,
    Review,
    Submit,
}

impl InquiryStep {
    pub fn all() -> &'static [InquiryStep] {
        &[
            InquiryStep::Products,
            InquiryStep::Company,
            InquiryStep::Project,
            InquiryStep::Review,
            InquiryStep::Submit,
        ]
    }

    /// The following step, if any
    pub fn next(&self) -> Option<InquiryStep> {
        match self {
            InquiryStep::Products => Some(InquiryStep::Company),
            InquiryStep::Company => Some(InquiryStep::Project),
            InquiryStep::Project => Some(InquiryStep::Review),
            InquiryStep::Review => Some(InquiryStep::Submit),
            InquiryStep::Submit => None,
        }
    }

    /// The preceding step, if any
    pub fn previous(&self) -> Option<InquiryStep> {
        match self {
            InquiryStep::Products => None,
            InquiryStep::Company => Some(InquiryStep::Products),
            InquiryStep::Project => Some(InquiryStep::Company),
            InquiryStep::Review => Some(InquiryStep::Project),
            InquiryStep::Submit => Some(InquiryStep::Review),
        }
    }

    /// Entering this step requires a complete draft
    pub fn requires_complete_draft(&self) -> bool {
        matches!(self, InquiryStep::Submit)
    }
}

impl fmt::Display for InquiryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InquiryStep::Products => write!(f, "products"),
            InquiryStep::Company => write!(f, "company"),
            InquiryStep::Project => write!(f, "project"),
            InquiryStep::Review => write!(f, "review"),
            InquiryStep::Submit => write!(f, "submit"),
        }
    }
}

impl std::str::FromStr for InquiryStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "products" => Ok(InquiryStep::Products),
            "company" => Ok(InquiryStep::Company),
            "project" => Ok(InquiryStep::Project),
            "review" => Ok(InquiryStep::Review),
            "submit" => Ok(InquiryStep::Submit),
            _ => Err(format!(
                "Invalid step: {}. Use products, company, project, review, or submit",
                s
            )),
        }
    }
}

/// Result of the completeness check that gates submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completeness {
    /// At least one product is on the draft
    pub products_complete: bool,
    /// Company name, contact person, email and phone are all filled in
    pub company_complete: bool,
    /// Required company fields that are still blank
    pub missing_company_fields: Vec<&'static str>,
}

impl Completeness {
    pub fn is_complete(&self) -> bool {
        self.products_complete && self.company_complete
    }
}

impl fmt::Display for Completeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut problems = Vec::new();
        if !self.products_complete {
            problems.push("no products added".to_string());
        }
        if !self.company_complete {
            problems.push(format!(
                "missing company fields: {}",
                self.missing_company_fields.join(", ")
            ));
        }
        if problems.is_empty() {
            write!(f, "complete")
        } else {
            write!(f, "{}", problems.join("; "))
        }
    }
}

/// Errors from state machine operations
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum WorkflowError {
    #[error("Product {0} is not on this inquiry")]
    #[diagnostic(code(inquiry::workflow::product_not_found))]
    ProductNotFound(EntityId),

    #[error("Inquiry is not ready for submission: {0}")]
    #[diagnostic(
        code(inquiry::workflow::incomplete),
        help("Add at least one product and fill in company name, contact person, email and phone")
    )]
    Incomplete(Completeness),

    #[error("Inquiry {id} is {status} and can no longer be edited as a draft")]
    #[diagnostic(code(inquiry::workflow::not_a_draft))]
    NotADraft { id: EntityId, status: InquiryStatus },
}

/// The in-progress inquiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InquiryDraft {
    /// Shared with the record this draft is saved or submitted as
    pub id: EntityId,

    #[serde(default)]
    pub products: Vec<InquiryProduct>,

    #[serde(default)]
    pub company_info: CompanyInfo,

    #[serde(default)]
    pub project_info: ProjectInfo,

    #[serde(default)]
    pub step: InquiryStep,

    pub created: DateTime<Utc>,

    pub updated: DateTime<Utc>,
}

impl Default for InquiryDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl InquiryDraft {
    /// A fresh, empty draft
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Inq),
            products: Vec::new(),
            company_info: CompanyInfo::default(),
            project_info: ProjectInfo::default(),
            step: InquiryStep::default(),
            created: now,
            updated: now,
        }
    }

    /// Nothing has been entered yet
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
            && self.company_info == CompanyInfo::default()
            && self.project_info.is_empty()
    }

    pub fn completeness(&self) -> Completeness {
        let missing_company_fields = self.company_info.missing_fields();
        Completeness {
            products_complete: !self.products.is_empty(),
            company_complete: missing_company_fields.is_empty(),
            missing_company_fields,
        }
    }

    /// Snapshot this draft as a `draft`-status record with the same id
    pub fn to_record(&self) -> InquiryRecord {
        let project = (!self.project_info.is_empty()).then(|| self.project_info.clone());
        InquiryRecord::draft(
            self.id,
            self.products.clone(),
            self.company_info.clone(),
            project,
            self.created,
        )
    }

    /// Reopen a saved draft record for editing
    pub fn from_record(record: &InquiryRecord) -> Result<Self, WorkflowError> {
        if record.status() != InquiryStatus::Draft {
            return Err(WorkflowError::NotADraft {
                id: *record.id(),
                status: record.status(),
            });
        }
        Ok(Self {
            id: *record.id(),
            products: record.products().to_vec(),
            company_info: record.company_info().clone(),
            project_info: record.project_info().cloned().unwrap_or_default(),
            step: InquiryStep::default(),
            created: record.created(),
            updated: record.updated(),
        })
    }

    fn touch(&mut self) {
        self.updated = Utc::now();
    }
}

/// What a company info update left behind
#[derive(Debug, Clone, PartialEq)]
pub enum CompanyUpdate {
    /// All required fields are filled; the payload is eligible as a template
    Complete(CompanyInfo),
    /// Some required fields are still blank
    Incomplete { missing: Vec<&'static str> },
}

impl CompanyUpdate {
    pub fn is_complete(&self) -> bool {
        matches!(self, CompanyUpdate::Complete(_))
    }
}

/// Owns one draft and its wizard position
#[derive(Debug, Clone, Default)]
pub struct InquiryStateMachine {
    draft: InquiryDraft,
}

impl InquiryStateMachine {
    /// Start with an empty draft
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume editing an existing draft
    pub fn from_draft(draft: InquiryDraft) -> Self {
        Self { draft }
    }

    pub fn draft(&self) -> &InquiryDraft {
        &self.draft
    }

    pub fn step(&self) -> InquiryStep {
        self.draft.step
    }

    pub fn products(&self) -> &[InquiryProduct] {
        &self.draft.products
    }

    pub fn completeness(&self) -> Completeness {
        self.draft.completeness()
    }

    /// Append a product; returns its id
    pub fn add_product(&mut self, product: InquiryProduct) -> EntityId {
        let id = product.id;
        tracing::debug!("Adding {} ({}) to {}", id, product.model, self.draft.id);
        self.draft.products.push(product);
        self.draft.touch();
        id
    }

    /// Remove a product by id
    pub fn remove_product(&mut self, id: &EntityId) -> Result<InquiryProduct, WorkflowError> {
        let idx = self
            .draft
            .products
            .iter()
            .position(|p| &p.id == id)
            .ok_or(WorkflowError::ProductNotFound(*id))?;
        let removed = self.draft.products.remove(idx);
        self.draft.touch();
        Ok(removed)
    }

    /// Apply a partial update to one product
    pub fn update_product(
        &mut self,
        id: &EntityId,
        patch: ProductPatch,
    ) -> Result<&InquiryProduct, WorkflowError> {
        let product = self
            .draft
            .products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or(WorkflowError::ProductNotFound(*id))?;
        product.apply(patch);
        self.draft.updated = Utc::now();
        Ok(&*product)
    }

    /// Merge a partial company update and report whether the result is complete
    pub fn update_company_info(&mut self, patch: CompanyPatch) -> CompanyUpdate {
        self.draft.company_info.apply(patch);
        self.draft.touch();

        let missing = self.draft.company_info.missing_fields();
        if missing.is_empty() {
            CompanyUpdate::Complete(self.draft.company_info.clone())
        } else {
            CompanyUpdate::Incomplete { missing }
        }
    }

    /// Merge a partial project update
    pub fn update_project_info(&mut self, patch: ProjectPatch) {
        self.draft.project_info.apply(patch);
        self.draft.touch();
    }

    /// Move to any step. Entering `submit` requires a complete draft.
    pub fn set_step(&mut self, step: InquiryStep) -> Result<(), WorkflowError> {
        if step.requires_complete_draft() {
            let completeness = self.completeness();
            if !completeness.is_complete() {
                return Err(WorkflowError::Incomplete(completeness));
            }
        }
        self.draft.step = step;
        Ok(())
    }

    /// Append imported products; existing ones are kept. Returns the count added.
    pub fn import_products(&mut self, products: Vec<InquiryProduct>) -> usize {
        let count = products.len();
        if count > 0 {
            self.draft.products.extend(products);
            self.draft.touch();
        }
        count
    }

    /// Reset to a fresh empty draft, returning the old one
    pub fn clear_draft(&mut self) -> InquiryDraft {
        std::mem::take(&mut self.draft)
    }

    /// Fail with [`WorkflowError::Incomplete`] unless the draft can be submitted
    pub fn ensure_complete(&self) -> Result<(), WorkflowError> {
        let completeness = self.completeness();
        if completeness.is_complete() {
            Ok(())
        } else {
            Err(WorkflowError::Incomplete(completeness))
        }
    }
}
