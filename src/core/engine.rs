//! Inquiry engine - one draft, its storage and its submission path
//!
//! The engine is what a host talks to. It forwards edits to the
//! [`InquiryStateMachine`], mirrors the draft into the [`DraftRepository`]
//! after each change, keeps company templates up to date, and runs BOM imports
//! and submissions.

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::bom::parser::{BomParseResult, BomParser};
use crate::core::catalog::{CatalogError, ProductCatalog, ProductEntry};
use crate::core::config::{ConfigError, EngineConfig};
use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::repository::{DraftRepository, RepositoryError};
use crate::core::store::KeyValueStore;
use crate::core::submission::{SubmissionCoordinator, SubmissionError, SubmissionTransport};
use crate::core::workflow::{
    Completeness, CompanyUpdate, InquiryDraft, InquiryStateMachine, InquiryStep, WorkflowError,
};
use crate::entities::company::{CompanyPatch, CompanyTemplate};
use crate::entities::inquiry::{InquiryRecord, InquiryStatus, SupplierQuote};
use crate::entities::product::{InquiryProduct, ProductPatch};
use crate::entities::project::ProjectPatch;

/// Errors surfaced by [`InquiryEngine`]
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No saved draft with id {0}")]
    #[diagnostic(code(inquiry::engine::draft_not_found))]
    DraftNotFound(EntityId),

    #[error("No company template with id {0}")]
    #[diagnostic(code(inquiry::engine::template_not_found))]
    TemplateNotFound(EntityId),
}

/// Facade over the state machine, repository, coordinator and catalog
pub struct InquiryEngine<S: KeyValueStore, T: SubmissionTransport> {
    config: EngineConfig,
    machine: InquiryStateMachine,
    repository: DraftRepository<S>,
    coordinator: SubmissionCoordinator<T>,
    catalog: ProductCatalog,
    parser: BomParser,
}

impl<S: KeyValueStore, T: SubmissionTransport> InquiryEngine<S, T> {
    /// Build an engine over `store`, loading any saved collections
    pub fn new(config: EngineConfig, store: S, transport: T) -> Result<Self, EngineError> {
        config.validate()?;
        let repository = DraftRepository::with_config(store, &config)?;
        let mut coordinator = SubmissionCoordinator::new(transport, &config);
        coordinator.seed_from_history(repository.list_history());

        Ok(Self {
            machine: InquiryStateMachine::new(),
            catalog: ProductCatalog::new(config.manufacturer_placeholder.clone()),
            parser: BomParser::new(&config),
            repository,
            coordinator,
            config,
        })
    }

    /// Use a populated catalog for lookups and enrichment
    pub fn with_catalog(mut self, catalog: ProductCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn draft(&self) -> &InquiryDraft {
        self.machine.draft()
    }

    pub fn step(&self) -> InquiryStep {
        self.machine.step()
    }

    pub fn completeness(&self) -> Completeness {
        self.machine.completeness()
    }

    pub fn repository(&self) -> &DraftRepository<S> {
        &self.repository
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut ProductCatalog {
        &mut self.catalog
    }

    pub fn transport(&self) -> &T {
        self.coordinator.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.coordinator.transport_mut()
    }

    // =========================================================================
    // Draft editing
    // =========================================================================

    /// Add a ready-made line item
    pub fn add_product(&mut self, product: InquiryProduct) -> Result<EntityId, EngineError> {
        let id = self.machine.add_product(product);
        self.autosave()?;
        Ok(id)
    }

    /// Add a catalog product by catalog id
    pub fn add_catalog_product(
        &mut self,
        product_id: &str,
        quantity: i64,
    ) -> Result<EntityId, EngineError> {
        let product = self.catalog.from_catalog(product_id, quantity)?;
        self.add_product(product)
    }

    /// Add a manually typed product, enriched from the catalog when it matches
    pub fn add_manual_product(&mut self, entry: ProductEntry) -> Result<EntityId, EngineError> {
        let product = self.catalog.normalize(entry);
        self.add_product(product)
    }

    pub fn remove_product(&mut self, id: &EntityId) -> Result<InquiryProduct, EngineError> {
        let removed = self.machine.remove_product(id)?;
        self.autosave()?;
        Ok(removed)
    }

    pub fn update_product(
        &mut self,
        id: &EntityId,
        patch: ProductPatch,
    ) -> Result<(), EngineError> {
        self.machine.update_product(id, patch)?;
        self.autosave()?;
        Ok(())
    }

    /// Merge company fields; a complete result is saved as a company template.
    ///
    /// If the template or the draft cannot be written the draft keeps its
    /// previous company info.
    pub fn update_company_info(&mut self, patch: CompanyPatch) -> Result<CompanyUpdate, EngineError> {
        let previous = self.machine.clone();
        let update = self.machine.update_company_info(patch);
        if let Err(e) = self.persist_company_update(&update) {
            tracing::warn!("Company info update not applied: {}", e);
            self.machine = previous;
            return Err(e);
        }
        Ok(update)
    }

    fn persist_company_update(&mut self, update: &CompanyUpdate) -> Result<(), EngineError> {
        if let CompanyUpdate::Complete(company) = update {
            self.repository.promote_company_template(company.clone())?;
        }
        self.autosave()
    }

    pub fn update_project_info(&mut self, patch: ProjectPatch) -> Result<(), EngineError> {
        self.machine.update_project_info(patch);
        self.autosave()?;
        Ok(())
    }

    /// Move the wizard; entering `submit` needs a complete draft
    pub fn set_step(&mut self, step: InquiryStep) -> Result<(), EngineError> {
        self.machine.set_step(step)?;
        Ok(())
    }

    /// Append already-built products to the draft
    pub fn import_products(&mut self, products: Vec<InquiryProduct>) -> Result<usize, EngineError> {
        let added = self.machine.import_products(products);
        if added > 0 {
            self.autosave()?;
        }
        Ok(added)
    }

    /// Reset to an empty draft. A saved copy of the old draft stays in the
    /// drafts collection; use [`Self::delete_draft`] to drop it.
    pub fn clear_draft(&mut self) -> InquiryDraft {
        self.machine.clear_draft()
    }

    /// Fill company info from a saved template
    pub fn apply_company_template(&mut self, id: &EntityId) -> Result<CompanyUpdate, EngineError> {
        let company = self
            .repository
            .find_company_template(id)
            .map(|t| t.company.clone())
            .ok_or(EngineError::TemplateNotFound(*id))?;
        self.update_company_info(CompanyPatch::from(company))
    }

    pub fn company_templates(&self) -> &[CompanyTemplate] {
        self.repository.list_company_templates()
    }

    // =========================================================================
    // BOM import
    // =========================================================================

    /// Parse BOM text and append every accepted row to the draft
    pub fn import_bom(&mut self, contents: &str) -> Result<BomParseResult, EngineError> {
        let result = self.parser.parse(contents);
        self.merge_import(result)
    }

    /// Read and parse a BOM file off the async runtime, then append its rows.
    ///
    /// `&mut self` is held across the read, so no other import or edit can
    /// interleave with this one.
    pub async fn import_bom_file(&mut self, path: PathBuf) -> Result<BomParseResult, EngineError> {
        let result = self.parser.parse_file_async(path).await;
        self.merge_import(result)
    }

    fn merge_import(&mut self, mut result: BomParseResult) -> Result<BomParseResult, EngineError> {
        for product in &mut result.products {
            self.catalog.link(product);
        }
        self.import_products(result.products.clone())?;
        Ok(result)
    }

    // =========================================================================
    // Saved drafts
    // =========================================================================

    /// Save the current draft now, regardless of the autosave setting
    pub fn save_draft(&mut self) -> Result<EntityId, EngineError> {
        let record = self.machine.draft().to_record();
        let id = *record.id();
        self.repository.save_draft(record)?;
        Ok(id)
    }

    pub fn list_drafts(&self) -> &[InquiryRecord] {
        self.repository.list_drafts()
    }

    /// Continue editing a saved draft. The current draft is saved first when
    /// autosave is on.
    pub fn resume_draft(&mut self, id: &EntityId) -> Result<(), EngineError> {
        let record = self
            .repository
            .load_draft(id)
            .ok_or(EngineError::DraftNotFound(*id))?;
        let draft = InquiryDraft::from_record(record)?;
        self.autosave()?;
        self.machine = InquiryStateMachine::from_draft(draft);
        tracing::debug!("Resumed draft {}", id);
        Ok(())
    }

    /// Discard a saved draft. If it is the one being edited, editing starts over.
    pub fn delete_draft(&mut self, id: &EntityId) -> Result<Option<InquiryRecord>, EngineError> {
        let removed = self.repository.delete_draft(id)?;
        if &self.machine.draft().id == id {
            self.machine.clear_draft();
        }
        Ok(removed)
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    pub fn add_favorite_product(&mut self, product: InquiryProduct) -> Result<(), EngineError> {
        self.repository.add_favorite_product(product)?;
        Ok(())
    }

    pub fn favorite_products(&self) -> &[InquiryProduct] {
        self.repository.list_favorite_products()
    }

    // =========================================================================
    // Submission and history
    // =========================================================================

    /// Submit the current draft. On success the editor starts a fresh draft;
    /// on failure the draft is left as it was.
    pub fn submit(&mut self) -> Result<InquiryRecord, EngineError> {
        let record = self
            .coordinator
            .submit(self.machine.draft(), &mut self.repository)?;
        self.machine.clear_draft();
        Ok(record)
    }

    pub fn history(&self) -> &[InquiryRecord] {
        self.repository.list_history()
    }

    /// Record a supplier quote against a submitted inquiry
    pub fn record_quote(&mut self, id: &EntityId, quote: SupplierQuote) -> Result<(), EngineError> {
        self.repository
            .update_history(id, |record| record.record_quote(quote, Utc::now()))?;
        Ok(())
    }

    /// Accept, reject or cancel a submitted inquiry
    pub fn set_record_status(
        &mut self,
        id: &EntityId,
        status: InquiryStatus,
    ) -> Result<(), EngineError> {
        self.repository
            .update_history(id, |record| record.transition_to(status))?;
        Ok(())
    }

    /// Expire every submitted inquiry whose deadline is before `now`
    pub fn expire_overdue(&mut self, now: DateTime<Utc>) -> Result<usize, EngineError> {
        Ok(self.repository.expire_overdue(now)?)
    }

    fn autosave(&mut self) -> Result<(), EngineError> {
        if !self.config.autosave_drafts || self.machine.draft().is_empty() {
            return Ok(());
        }
        self.repository.save_draft(self.machine.draft().to_record())?;
        Ok(())
    }
}
