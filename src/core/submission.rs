//! Submission - turns a complete draft into a submitted record
//!
//! The coordinator stamps the inquiry number and timestamps, hands the record
//! to the host's [`SubmissionTransport`], and only after the transport
//! acknowledges it moves the record from drafts to history.

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::EngineConfig;
use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::repository::{DraftRepository, RepositoryError};
use crate::core::store::KeyValueStore;
use crate::core::workflow::{Completeness, InquiryDraft};
use crate::entities::inquiry::{InquiryRecord, RecordError};

/// Opaque success returned by the transport
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Reference assigned by the receiving system, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Why the transport did not accept a record
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum TransportError {
    #[error("Submission rejected: {reason}")]
    #[diagnostic(code(inquiry::transport::rejected))]
    Rejected { reason: String },

    #[error("Submission timed out")]
    #[diagnostic(
        code(inquiry::transport::timeout),
        help("The draft was kept; try submitting again")
    )]
    Timeout,

    #[error("Submission failed: {0}")]
    #[diagnostic(code(inquiry::transport::failed))]
    Failed(String),
}

/// Delivers submitted records to whatever backend the host uses
pub trait SubmissionTransport {
    fn submit(&mut self, record: &InquiryRecord) -> Result<Acknowledgement, TransportError>;
}

impl<F> SubmissionTransport for F
where
    F: FnMut(&InquiryRecord) -> Result<Acknowledgement, TransportError>,
{
    fn submit(&mut self, record: &InquiryRecord) -> Result<Acknowledgement, TransportError> {
        self(record)
    }
}

/// Errors from [`SubmissionCoordinator::submit`]. The draft is untouched in
/// every case.
#[derive(Debug, Error, Diagnostic)]
pub enum SubmissionError {
    #[error("Inquiry is not ready for submission: {0}")]
    #[diagnostic(
        code(inquiry::submission::incomplete),
        help("Add at least one product and fill in company name, contact person, email and phone")
    )]
    Incomplete(Completeness),

    #[error("Inquiry {0} has already been submitted")]
    #[diagnostic(code(inquiry::submission::duplicate))]
    AlreadySubmitted(EntityId),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Finalizes drafts and issues inquiry numbers
#[derive(Debug)]
pub struct SubmissionCoordinator<T: SubmissionTransport> {
    transport: T,
    prefix: String,
    expiry_days: i64,
    last_sequence: u64,
}

impl<T: SubmissionTransport> SubmissionCoordinator<T> {
    pub fn new(transport: T, config: &EngineConfig) -> Self {
        Self {
            transport,
            prefix: config.inquiry_number_prefix.clone(),
            expiry_days: config.expiry_days,
            last_sequence: 0,
        }
    }

    /// Make sure new numbers sort after every number already in `history`
    pub fn seed_from_history(&mut self, history: &[InquiryRecord]) {
        let highest = history
            .iter()
            .filter_map(|r| r.inquiry_number())
            .filter_map(|n| self.parse_sequence(n))
            .max()
            .unwrap_or(0);
        self.last_sequence = self.last_sequence.max(highest);
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Format an inquiry number: `<prefix>-<sequence>`
    pub fn format_number(&self, sequence: u64) -> String {
        format!("{}-{}", self.prefix, sequence)
    }

    fn parse_sequence(&self, number: &str) -> Option<u64> {
        number
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|digits| digits.parse().ok())
    }

    /// Millisecond timestamp, bumped past the last issued value
    fn next_sequence(&self, now: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        millis.max(self.last_sequence.saturating_add(1))
    }

    /// Submit a draft.
    ///
    /// On success the returned record is in the repository's history with
    /// status `submitted`, and the saved draft with the same id is gone. On
    /// any error nothing has been written.
    pub fn submit<S: KeyValueStore>(
        &mut self,
        draft: &InquiryDraft,
        repository: &mut DraftRepository<S>,
    ) -> Result<InquiryRecord, SubmissionError> {
        let completeness = draft.completeness();
        if !completeness.is_complete() {
            tracing::debug!("Submission of {} blocked: {}", draft.id, completeness);
            return Err(SubmissionError::Incomplete(completeness));
        }
        if repository.find_history(&draft.id).is_some() {
            return Err(SubmissionError::AlreadySubmitted(draft.id));
        }

        let now = Utc::now();
        let sequence = self.next_sequence(now);
        let record = draft.to_record().into_submitted(
            self.format_number(sequence),
            now,
            self.expiry_days,
        )?;

        let ack = match self.transport.submit(&record) {
            Ok(ack) => ack,
            Err(e) => {
                tracing::warn!("Submission of {} failed: {}", record.id(), e);
                return Err(e.into());
            }
        };

        repository.commit_submission(record.clone())?;
        self.last_sequence = sequence;

        tracing::info!(
            "Submitted {} as {} ({} line item(s), reference {})",
            record.id(),
            record.inquiry_number().unwrap_or_default(),
            record.products().len(),
            ack.reference.as_deref().unwrap_or("none")
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;
    use crate::entities::company::CompanyInfo;
    use crate::entities::inquiry::InquiryStatus;
    use crate::entities::product::InquiryProduct;
    use chrono::Duration;

    fn complete_draft() -> InquiryDraft {
        let mut draft = InquiryDraft::new();
        draft.products.push(InquiryProduct::new("STM32F401", 10));
        draft.company_info = CompanyInfo {
            company_name: "Acme".to_string(),
            contact_person: "Sam".to_string(),
            email: "sam@acme.example".to_string(),
            phone: "555-0100".to_string(),
            ..Default::default()
        };
        draft
    }

    fn accept(_: &InquiryRecord) -> Result<Acknowledgement, TransportError> {
        Ok(Acknowledgement::default())
    }

    #[test]
    fn test_submit_stamps_record() {
        let mut repo = DraftRepository::open(MemoryStore::new()).unwrap();
        let mut coordinator = SubmissionCoordinator::new(accept, &EngineConfig::default());

        let record = coordinator.submit(&complete_draft(), &mut repo).unwrap();
        assert_eq!(record.status(), InquiryStatus::Submitted);
        assert!(record.inquiry_number().unwrap().starts_with("INQ-"));

        let submitted = record.submitted_at().unwrap();
        assert_eq!(record.expires_at(), Some(submitted + Duration::days(30)));
        assert_eq!(repo.list_history().len(), 1);
    }

    #[test]
    fn test_numbers_strictly_increase() {
        let mut repo = DraftRepository::open(MemoryStore::new()).unwrap();
        let mut coordinator = SubmissionCoordinator::new(accept, &EngineConfig::default());

        let mut last = 0;
        for _ in 0..5 {
            let record = coordinator.submit(&complete_draft(), &mut repo).unwrap();
            let seq = coordinator
                .parse_sequence(record.inquiry_number().unwrap())
                .unwrap();
            assert!(seq > last);
            last = seq;
        }
    }

    #[test]
    fn test_seed_from_history() {
        let mut repo = DraftRepository::open(MemoryStore::new()).unwrap();
        let far_future = u64::MAX / 2;
        let seeded = complete_draft()
            .to_record()
            .into_submitted(format!("INQ-{}", far_future), Utc::now(), 30)
            .unwrap();
        repo.append_history(seeded).unwrap();

        let mut coordinator = SubmissionCoordinator::new(accept, &EngineConfig::default());
        coordinator.seed_from_history(repo.list_history());

        let record = coordinator.submit(&complete_draft(), &mut repo).unwrap();
        assert_eq!(
            record.inquiry_number(),
            Some(format!("INQ-{}", far_future + 1).as_str())
        );
    }

    #[test]
    fn test_incomplete_draft_rejected() {
        let mut repo = DraftRepository::open(MemoryStore::new()).unwrap();
        let mut coordinator = SubmissionCoordinator::new(accept, &EngineConfig::default());

        let mut draft = complete_draft();
        draft.company_info.email.clear();
        let err = coordinator.submit(&draft, &mut repo).unwrap_err();
        match err {
            SubmissionError::Incomplete(c) => {
                assert!(c.products_complete);
                assert_eq!(c.missing_company_fields, vec!["email"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(repo.list_history().is_empty());
    }

    #[test]
    fn test_transport_failure_writes_nothing() {
        let mut repo = DraftRepository::open(MemoryStore::new()).unwrap();
        let draft = complete_draft();
        repo.save_draft(draft.to_record()).unwrap();

        let reject = |_: &InquiryRecord| -> Result<Acknowledgement, TransportError> {
            Err(TransportError::Timeout)
        };
        let mut coordinator = SubmissionCoordinator::new(reject, &EngineConfig::default());

        let err = coordinator.submit(&draft, &mut repo).unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::Transport(TransportError::Timeout)
        ));
        assert!(repo.list_history().is_empty());
        assert_eq!(repo.list_drafts().len(), 1);
    }

    #[test]
    fn test_double_submission_rejected() {
        let mut repo = DraftRepository::open(MemoryStore::new()).unwrap();
        let mut coordinator = SubmissionCoordinator::new(accept, &EngineConfig::default());
        let draft = complete_draft();

        coordinator.submit(&draft, &mut repo).unwrap();
        assert!(matches!(
            coordinator.submit(&draft, &mut repo),
            Err(SubmissionError::AlreadySubmitted(_))
        ));
        assert_eq!(repo.list_history().len(), 1);
    }
}
