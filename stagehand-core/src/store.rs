//! Data-store boundary.
//!
//! The engine reads slow-changing session data from a relational store it
//! treats as opaque: one combined per-session bundle, one global coaching
//! configuration, and an optional per-session document analysis. Each read
//! has an explicit row type with optional fields so missing-data fallback
//! handling is exhaustive at compile time rather than discovered at
//! runtime.

use crate::phase::PhaseInfo;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for data-store reads.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Internal store error, state or computation failure.
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),

    /// Network interaction error while reaching the store.
    #[error(transparent)]
    Connection(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps an arbitrary error as an internal store failure.
    pub fn internal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Internal(Box::new(err))
    }
}

/// Convenience alias for store read results.
pub type StoreResult<T> = Result<T, StoreError>;

/// Interviewer-profile row: the persona prompt text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewerRow {
    /// Persona prompt text, absent when the profile is incomplete.
    pub prompt: Option<String>,
}

/// One phase row of a case's plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRow {
    /// Phase name.
    pub name: String,
    /// Interviewer guidance for the phase.
    #[serde(default)]
    pub details: Option<String>,
    /// Planned duration in minutes.
    pub duration: f64,
}

impl From<PhaseRow> for PhaseInfo {
    fn from(row: PhaseRow) -> Self {
        PhaseInfo {
            name: row.name,
            details: row.details.unwrap_or_default(),
            duration: row.duration,
        }
    }
}

/// Interview-case row: template text plus the phase plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseRow {
    /// Case template text.
    pub prompt: Option<String>,
    /// Ordered phase plan, absent for untimed cases.
    #[serde(default)]
    pub phases: Option<Vec<PhaseRow>>,
    /// Overrun allowance in minutes before a timing nudge fires.
    #[serde(default)]
    pub nudge_buffer: Option<f64>,
}

/// Difficulty-profile row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DifficultyRow {
    /// Difficulty prompt text.
    pub prompt: Option<String>,
}

/// The combined per-session read: every linked row in one fetch.
///
/// Any linked row may be absent; only the absence of the session itself
/// (the bundle returning `None`) is fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionBundle {
    /// Linked interviewer profile.
    pub interviewer: Option<InterviewerRow>,
    /// Linked interview case.
    pub case: Option<CaseRow>,
    /// Linked difficulty profile.
    pub difficulty: Option<DifficultyRow>,
}

/// Global coaching-mode prompt pair, selected between by a boolean flag
/// at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingConfig {
    /// Prompt text used while coaching mode is on.
    pub enabled_content: String,
    /// Prompt text used while coaching mode is off.
    pub disabled_content: String,
}

impl CoachingConfig {
    /// Selects the prompt text for the given coaching-mode flag.
    pub fn select(&self, coaching_enabled: bool) -> &str {
        if coaching_enabled {
            &self.enabled_content
        } else {
            &self.disabled_content
        }
    }
}

/// Optional per-session document analysis: summaries of the candidate's
/// uploaded documents plus suggested questions, appended to the case text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    /// Markdown summary of the candidate's resume.
    #[serde(default)]
    pub resume_summary: Option<String>,
    /// Markdown summary of the target job description.
    #[serde(default)]
    pub job_description_summary: Option<String>,
    /// Questions suggested from the documents.
    #[serde(default)]
    pub suggested_questions: Vec<String>,
}

impl DocumentAnalysis {
    /// Whether the analysis carries no content at all.
    pub fn is_empty(&self) -> bool {
        self.resume_summary.is_none()
            && self.job_description_summary.is_none()
            && self.suggested_questions.is_empty()
    }

    /// Renders the analysis as a markdown block for prompt injection.
    pub fn render(&self) -> String {
        let mut out = String::from("## Candidate Document Context\n");
        if let Some(resume) = &self.resume_summary {
            out.push_str("\n### Resume Summary\n");
            out.push_str(resume);
            out.push('\n');
        }
        if let Some(job) = &self.job_description_summary {
            out.push_str("\n### Job Description Summary\n");
            out.push_str(job);
            out.push('\n');
        }
        if !self.suggested_questions.is_empty() {
            out.push_str("\n### Suggested Questions\n");
            for question in &self.suggested_questions {
                out.push_str("- ");
                out.push_str(question);
                out.push('\n');
            }
        }
        out
    }
}

/// Boundary trait for the backing data store.
///
/// Implementations are free to hit a relational service, a local file, or
/// an in-memory map; the engine only relies on these three reads.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the combined per-session bundle. `Ok(None)` means the
    /// session row itself does not exist.
    async fn load_session_bundle(&self, session_id: &str) -> StoreResult<Option<SessionBundle>>;

    /// Loads the global coaching configuration.
    async fn load_coaching_config(&self) -> StoreResult<Option<CoachingConfig>>;

    /// Loads the per-session document analysis, if one was produced.
    async fn load_document_analysis(
        &self,
        session_id: &str,
    ) -> StoreResult<Option<DocumentAnalysis>>;
}
