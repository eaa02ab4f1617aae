//! Draft repository - durable collections of drafts, history, templates and favorites
//!
//! Each collection is mirrored in memory and stored as one JSON list under a
//! fixed key. Every mutating call writes the whole collection before it
//! returns, and the in-memory copy only changes once the write succeeded.

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::core::config::EngineConfig;
use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::store::{KeyValueStore, StoreError};
use crate::entities::company::{CompanyInfo, CompanyTemplate};
use crate::entities::inquiry::{InquiryRecord, InquiryStatus, RecordError};
use crate::entities::product::InquiryProduct;

/// Storage key of submitted inquiries
pub const HISTORY_KEY: &str = "inquiry_history";
/// Storage key of saved drafts
pub const DRAFTS_KEY: &str = "inquiry_drafts";
/// Storage key of company templates
pub const TEMPLATES_KEY: &str = "company_templates";
/// Storage key of favorite products
pub const FAVORITES_KEY: &str = "favorite_products";

/// Errors from repository operations
#[derive(Debug, Error, Diagnostic)]
pub enum RepositoryError {
    #[error("Storage failure")]
    #[diagnostic(code(inquiry::repository::storage))]
    Store(#[from] StoreError),

    #[error("Failed to serialize {key}")]
    #[diagnostic(code(inquiry::repository::serialize))]
    Serialization {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Inquiry {id} is {status}; only drafts can be saved as drafts")]
    #[diagnostic(code(inquiry::repository::not_a_draft))]
    NotADraft { id: EntityId, status: InquiryStatus },

    #[error("Inquiry {0} is not in the history")]
    #[diagnostic(code(inquiry::repository::not_found))]
    NotFound(EntityId),

    #[error(transparent)]
    #[diagnostic(code(inquiry::repository::lifecycle))]
    Record(#[from] RecordError),

    #[error("Company info is missing {} and cannot be saved as a template", .missing.join(", "))]
    #[diagnostic(
        code(inquiry::repository::incomplete_template),
        help("Fill in company name, contact person, email and phone first")
    )]
    IncompleteTemplate { missing: Vec<&'static str> },
}

/// A collection that could not be read at startup and was treated as empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub key: &'static str,
    pub message: String,
}

/// Persistent store of drafts, history, company templates and favorite products
#[derive(Debug)]
pub struct DraftRepository<S: KeyValueStore> {
    store: S,
    history: Vec<InquiryRecord>,
    drafts: Vec<InquiryRecord>,
    templates: Vec<CompanyTemplate>,
    favorites: Vec<InquiryProduct>,
    max_templates: usize,
    max_favorites: usize,
    load_warnings: Vec<LoadWarning>,
}

impl<S: KeyValueStore> DraftRepository<S> {
    /// Open with the default capacities
    pub fn open(store: S) -> Result<Self, RepositoryError> {
        Self::with_config(store, &EngineConfig::default())
    }

    /// Load all four collections from `store`.
    ///
    /// A missing key is an empty collection. A payload that is not UTF-8 or
    /// does not parse is skipped with a warning; the other collections still
    /// load. Only a failure of the store itself is an error.
    pub fn with_config(store: S, config: &EngineConfig) -> Result<Self, RepositoryError> {
        let mut load_warnings = Vec::new();
        let history = load_collection(&store, HISTORY_KEY, &mut load_warnings)?;
        let drafts = load_collection(&store, DRAFTS_KEY, &mut load_warnings)?;
        let templates = load_collection(&store, TEMPLATES_KEY, &mut load_warnings)?;
        let favorites = load_collection(&store, FAVORITES_KEY, &mut load_warnings)?;

        tracing::debug!(
            "Repository loaded: {} history, {} draft(s), {} template(s), {} favorite(s)",
            history.len(),
            drafts.len(),
            templates.len(),
            favorites.len()
        );

        Ok(Self {
            store,
            history,
            drafts,
            templates,
            favorites,
            max_templates: config.max_company_templates.max(1),
            max_favorites: config.max_favorite_products.max(1),
            load_warnings,
        })
    }

    /// Collections that were skipped at load time
    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.load_warnings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // =========================================================================
    // Drafts
    // =========================================================================

    /// Save a draft record, replacing any saved draft with the same id
    pub fn save_draft(&mut self, record: InquiryRecord) -> Result<(), RepositoryError> {
        if record.status() != InquiryStatus::Draft {
            return Err(RepositoryError::NotADraft {
                id: *record.id(),
                status: record.status(),
            });
        }
        let id = *record.id();
        let mut drafts = self.drafts.clone();
        upsert(&mut drafts, record);
        persist(&mut self.store, DRAFTS_KEY, &drafts)?;
        self.drafts = drafts;
        tracing::debug!("Saved draft {}", id);
        Ok(())
    }

    pub fn list_drafts(&self) -> &[InquiryRecord] {
        &self.drafts
    }

    pub fn load_draft(&self, id: &EntityId) -> Option<&InquiryRecord> {
        self.drafts.iter().find(|r| r.id() == id)
    }

    /// Remove a saved draft; returns it if it existed
    pub fn delete_draft(
        &mut self,
        id: &EntityId,
    ) -> Result<Option<InquiryRecord>, RepositoryError> {
        let Some(idx) = self.drafts.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };
        let mut drafts = self.drafts.clone();
        let removed = drafts.remove(idx);
        persist(&mut self.store, DRAFTS_KEY, &drafts)?;
        self.drafts = drafts;
        tracing::debug!("Deleted draft {}", id);
        Ok(Some(removed))
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Add a record to the history. A record with the same id is replaced.
    pub fn append_history(&mut self, record: InquiryRecord) -> Result<(), RepositoryError> {
        let mut history = self.history.clone();
        upsert(&mut history, record);
        persist(&mut self.store, HISTORY_KEY, &history)?;
        self.history = history;
        Ok(())
    }

    /// Move a submitted record into the history and drop its draft.
    ///
    /// If the draft collection cannot be written, the history write is undone
    /// so the two collections never disagree.
    pub fn commit_submission(&mut self, record: InquiryRecord) -> Result<(), RepositoryError> {
        let id = *record.id();
        let previous_history = self.history.clone();
        self.append_history(record)?;

        if self.load_draft(&id).is_some() {
            if let Err(e) = self.delete_draft(&id) {
                match persist(&mut self.store, HISTORY_KEY, &previous_history) {
                    Ok(()) => self.history = previous_history,
                    Err(rollback) => {
                        tracing::error!("Could not roll back history for {}: {}", id, rollback)
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn list_history(&self) -> &[InquiryRecord] {
        &self.history
    }

    pub fn find_history(&self, id: &EntityId) -> Option<&InquiryRecord> {
        self.history.iter().find(|r| r.id() == id)
    }

    /// Apply a lifecycle change to a historical record and persist it.
    ///
    /// The closure works through [`InquiryRecord`]'s own methods, so only
    /// status, quotes and timestamps can change.
    pub fn update_history<R>(
        &mut self,
        id: &EntityId,
        update: impl FnOnce(&mut InquiryRecord) -> Result<R, RecordError>,
    ) -> Result<R, RepositoryError> {
        let idx = self
            .history
            .iter()
            .position(|r| r.id() == id)
            .ok_or(RepositoryError::NotFound(*id))?;

        let mut history = self.history.clone();
        let result = update(&mut history[idx])?;
        persist(&mut self.store, HISTORY_KEY, &history)?;
        self.history = history;
        Ok(result)
    }

    /// Mark every overdue record as expired; returns how many changed
    pub fn expire_overdue(&mut self, now: DateTime<Utc>) -> Result<usize, RepositoryError> {
        let mut history = self.history.clone();
        let mut expired = 0;
        for record in history.iter_mut() {
            if record.expire_if_overdue(now) {
                expired += 1;
            }
        }
        if expired > 0 {
            persist(&mut self.store, HISTORY_KEY, &history)?;
            self.history = history;
            tracing::info!("Expired {} overdue inquiries", expired);
        }
        Ok(expired)
    }

    // =========================================================================
    // Company templates
    // =========================================================================

    /// Templates, oldest first
    pub fn list_company_templates(&self) -> &[CompanyTemplate] {
        &self.templates
    }

    pub fn find_company_template(&self, id: &EntityId) -> Option<&CompanyTemplate> {
        self.templates.iter().find(|t| &t.id == id)
    }

    /// Save a complete company payload as the newest template.
    ///
    /// A template for the same company (name and email, ignoring case) is
    /// moved to the newest position and refreshed instead of duplicated. The
    /// oldest template is evicted past capacity.
    pub fn promote_company_template(
        &mut self,
        company: CompanyInfo,
    ) -> Result<&CompanyTemplate, RepositoryError> {
        let missing = company.missing_fields();
        if !missing.is_empty() {
            return Err(RepositoryError::IncompleteTemplate { missing });
        }

        let key = company.template_key();
        let mut templates = self.templates.clone();
        let template = match templates
            .iter()
            .position(|t| t.company.template_key() == key)
        {
            Some(idx) => {
                let mut existing = templates.remove(idx);
                existing.company = company;
                existing.saved = Utc::now();
                existing
            }
            None => CompanyTemplate::new(company),
        };
        tracing::debug!("Promoting company template {}", template.id);
        templates.push(template);
        evict_oldest(&mut templates, self.max_templates);

        persist(&mut self.store, TEMPLATES_KEY, &templates)?;
        self.templates = templates;
        // just pushed, and capacity is at least 1
        let newest = self.templates.len() - 1;
        Ok(&self.templates[newest])
    }

    // =========================================================================
    // Favorite products
    // =========================================================================

    /// Favorites, oldest first
    pub fn list_favorite_products(&self) -> &[InquiryProduct] {
        &self.favorites
    }

    /// Add a product as the newest favorite.
    ///
    /// The same product (same id, same catalog reference, or same model
    /// ignoring case) is moved to the newest position rather than duplicated.
    pub fn add_favorite_product(&mut self, product: InquiryProduct) -> Result<(), RepositoryError> {
        let mut favorites = self.favorites.clone();
        favorites.retain(|f| !same_product(f, &product));
        favorites.push(product);
        evict_oldest(&mut favorites, self.max_favorites);

        persist(&mut self.store, FAVORITES_KEY, &favorites)?;
        self.favorites = favorites;
        Ok(())
    }
}

fn load_collection<S, T>(
    store: &S,
    key: &'static str,
    warnings: &mut Vec<LoadWarning>,
) -> Result<Vec<T>, RepositoryError>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Ok(Vec::new()),
        Err(e @ StoreError::InvalidEncoding { .. }) => {
            tracing::warn!("Skipping unreadable collection {}: {}", key, e);
            warnings.push(LoadWarning {
                key,
                message: e.to_string(),
            });
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    match serde_json::from_str(&raw) {
        Ok(items) => Ok(items),
        Err(e) => {
            tracing::warn!("Skipping malformed collection {}: {}", key, e);
            warnings.push(LoadWarning {
                key,
                message: e.to_string(),
            });
            Ok(Vec::new())
        }
    }
}

fn persist<S: KeyValueStore, T: Serialize>(
    store: &mut S,
    key: &'static str,
    items: &[T],
) -> Result<(), RepositoryError> {
    let json = serde_json::to_string_pretty(items)
        .map_err(|e| RepositoryError::Serialization { key, source: e })?;
    store.put(key, &json)?;
    Ok(())
}

/// Replace the entry with the same id, or append
fn upsert<T: Entity>(items: &mut Vec<T>, item: T) {
    match items.iter().position(|existing| existing.id() == item.id()) {
        Some(idx) => items[idx] = item,
        None => items.push(item),
    }
}

fn evict_oldest<T>(items: &mut Vec<T>, capacity: usize) {
    if items.len() > capacity {
        let excess = items.len() - capacity;
        items.drain(..excess);
    }
}

fn same_product(a: &InquiryProduct, b: &InquiryProduct) -> bool {
    if a.id == b.id {
        return true;
    }
    if let (Some(ra), Some(rb)) = (&a.product_ref, &b.product_ref) {
        return ra == rb;
    }
    !a.model.trim().is_empty() && a.model.trim().eq_ignore_ascii_case(b.model.trim())
}
