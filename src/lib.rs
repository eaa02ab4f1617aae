//! Inquiry: the lifecycle engine behind a quote request
//!
//! Turns product requests, typed in or bulk-imported from a BOM spreadsheet,
//! into a validated and submittable inquiry, while keeping drafts, history and
//! reusable company details across sessions.
//!
//! - [`bom`] - delimited-text BOM import
//! - [`core`] - state machine, repository, submission and the [`InquiryEngine`](crate::core::InquiryEngine) facade
//! - [`entities`] - products, company and project info, inquiry records

pub mod bom;
pub mod core;
pub mod entities;
