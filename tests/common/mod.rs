//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use std::collections::VecDeque;

use inquiry::core::{
    Acknowledgement, EngineConfig, InquiryEngine, MemoryStore, SubmissionTransport, TransportError,
};
use inquiry::entities::{CompanyPatch, InquiryRecord};
use tempfile::TempDir;

/// Route engine logs to the test harness; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Transport that replays scripted outcomes and remembers what it was sent.
/// Once the script runs out every submission is accepted.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    script: VecDeque<Result<Acknowledgement, TransportError>>,
    pub submitted: Vec<InquiryRecord>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for the next submission
    pub fn then(mut self, outcome: Result<Acknowledgement, TransportError>) -> Self {
        self.script.push_back(outcome);
        self
    }

    pub fn failing_with(error: TransportError) -> Self {
        Self::new().then(Err(error))
    }
}

impl SubmissionTransport for RecordingTransport {
    fn submit(&mut self, record: &InquiryRecord) -> Result<Acknowledgement, TransportError> {
        let outcome = self.script.pop_front().unwrap_or_else(|| {
            Ok(Acknowledgement {
                reference: Some(format!("ACK-{}", self.submitted.len() + 1)),
                message: None,
            })
        });
        if outcome.is_ok() {
            self.submitted.push(record.clone());
        }
        outcome
    }
}

pub type TestEngine = InquiryEngine<MemoryStore, RecordingTransport>;

/// Engine over an empty in-memory store with an accepting transport
pub fn memory_engine() -> TestEngine {
    engine_with(RecordingTransport::new())
}

pub fn engine_with(transport: RecordingTransport) -> TestEngine {
    init_tracing();
    InquiryEngine::new(EngineConfig::default(), MemoryStore::new(), transport).unwrap()
}

/// Company details with every required field filled
pub fn complete_company() -> CompanyPatch {
    company_named("Acme Components")
}

pub fn company_named(name: &str) -> CompanyPatch {
    CompanyPatch {
        company_name: Some(name.to_string()),
        contact_person: Some("Sam Rivera".to_string()),
        email: Some("sam@acme.example".to_string()),
        phone: Some("+1 555 0100".to_string()),
        ..Default::default()
    }
}

/// Temporary directory for on-disk stores
pub fn temp_storage() -> TempDir {
    TempDir::new().unwrap()
}

/// Write `contents` to a BOM file inside `dir`
pub fn write_bom(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
