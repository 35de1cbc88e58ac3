#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

use async_trait::async_trait;
use dashmap::DashMap;
use stagehand_core::{
    CoachingConfig, DocumentAnalysis, SessionBundle, SessionStore, StoreError, StoreResult,
};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory session store.
///
/// Every read returns a clone of the stored row. Fetch counters record
/// how often each read was hit, and the document-analysis read can be
/// switched into a failure mode to exercise the engine's soft-failure
/// path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bundles: DashMap<String, SessionBundle>,
    coaching: RwLock<Option<CoachingConfig>>,
    analyses: DashMap<String, DocumentAnalysis>,
    bundle_fetches: AtomicUsize,
    coaching_fetches: AtomicUsize,
    analysis_fetches: AtomicUsize,
    fail_document_analysis: AtomicBool,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the bundle returned for `session_id`.
    pub fn insert_session(&self, session_id: impl Into<String>, bundle: SessionBundle) {
        self.bundles.insert(session_id.into(), bundle);
    }

    /// Sets the global coaching configuration.
    pub fn set_coaching_config(&self, config: CoachingConfig) {
        *self.coaching.write().expect("coaching lock poisoned") = Some(config);
    }

    /// Stores the document analysis returned for `session_id`.
    pub fn insert_document_analysis(
        &self,
        session_id: impl Into<String>,
        analysis: DocumentAnalysis,
    ) {
        self.analyses.insert(session_id.into(), analysis);
    }

    /// Makes every subsequent document-analysis read fail.
    pub fn fail_document_analysis(&self, fail: bool) {
        self.fail_document_analysis.store(fail, Ordering::SeqCst);
    }

    /// Number of session-bundle reads served so far.
    pub fn bundle_fetches(&self) -> usize {
        self.bundle_fetches.load(Ordering::SeqCst)
    }

    /// Number of coaching-config reads served so far.
    pub fn coaching_fetches(&self) -> usize {
        self.coaching_fetches.load(Ordering::SeqCst)
    }

    /// Number of document-analysis reads served so far.
    pub fn analysis_fetches(&self) -> usize {
        self.analysis_fetches.load(Ordering::SeqCst)
    }
}

/// Error type for the switchable failure mode.
#[derive(Debug)]
struct InjectedFailure;

impl std::fmt::Display for InjectedFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("injected store failure")
    }
}

impl std::error::Error for InjectedFailure {}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load_session_bundle(&self, session_id: &str) -> StoreResult<Option<SessionBundle>> {
        self.bundle_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.bundles.get(session_id).map(|row| row.clone()))
    }

    async fn load_coaching_config(&self) -> StoreResult<Option<CoachingConfig>> {
        self.coaching_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.coaching.read().expect("coaching lock poisoned").clone())
    }

    async fn load_document_analysis(
        &self,
        session_id: &str,
    ) -> StoreResult<Option<DocumentAnalysis>> {
        self.analysis_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_document_analysis.load(Ordering::SeqCst) {
            return Err(StoreError::internal(InjectedFailure));
        }
        Ok(self.analyses.get(session_id).map(|row| row.clone()))
    }
}
