//! Entity type definitions
//!
//! - [`InquiryProduct`] - one requested line item
//! - [`CompanyInfo`] / [`CompanyTemplate`] - requester organization and saved copies of it
//! - [`ProjectInfo`] - optional project context
//! - [`InquiryRecord`] - the saved or submitted inquiry snapshot

pub mod company;
pub mod inquiry;
pub mod product;
pub mod project;

pub use company::{CompanyInfo, CompanyPatch, CompanySize, CompanyTemplate};
pub use inquiry::{
    Attachment, Currency, InquiryRecord, InquiryStatus, RecordError, SupplierQuote,
};
pub use product::{InquiryProduct, ProductPatch, Specifications};
pub use project::{ProjectInfo, ProjectPatch};
