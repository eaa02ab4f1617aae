//! Core module - identity, configuration, state machine, storage and submission

pub mod catalog;
pub mod config;
pub mod engine;
pub mod entity;
pub mod identity;
pub mod repository;
pub mod store;
pub mod submission;
pub mod workflow;

pub use catalog::{CatalogError, CatalogProduct, ProductCatalog, ProductEntry};
pub use config::{ConfigError, EngineConfig, STORAGE_DIR_ENV};
pub use engine::{EngineError, InquiryEngine};
pub use entity::{Entity, Urgency};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use repository::{
    DraftRepository, LoadWarning, RepositoryError, DRAFTS_KEY, FAVORITES_KEY, HISTORY_KEY,
    TEMPLATES_KEY,
};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, SqliteStore, StoreError};
pub use submission::{
    Acknowledgement, SubmissionCoordinator, SubmissionError, SubmissionTransport, TransportError,
};
pub use workflow::{
    CompanyUpdate, Completeness, InquiryDraft, InquiryStateMachine, InquiryStep, WorkflowError,
};
