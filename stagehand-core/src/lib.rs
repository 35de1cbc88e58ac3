//! Core types and traits for the stagehand session-settings engine.
//!
//! This crate defines the vocabulary shared by every part of the engine:
//!
//! - [`VariableToken`] — a parsed `{{VAR}}` placeholder, dispatched as a
//!   tagged variant instead of re-matching regexes downstream
//! - [`SubstitutionContext`] — the read-only input threaded through every
//!   processor call during one substitution pass
//! - [`SubstitutionOutcome`] — the structured result of a pass, including
//!   soft-failure warnings
//! - [`VariableProcessor`] — the trait a variable resolver implements
//! - [`CaseMetadata`] / [`CurrentPhase`] — the phase-timing model
//! - [`SessionSettings`] — the wire payload handed to the voice-SDK peer
//! - [`SessionStore`] — the boundary trait for the backing data store
//!
//! No engine logic lives here; the `stagehand` crate builds the cache,
//! registry, and session orchestration on top of these types.

#![warn(missing_docs)]

pub mod context;
pub mod outcome;
pub mod phase;
pub mod processor;
pub mod settings;
pub mod store;
pub mod token;

pub use context::SubstitutionContext;
pub use outcome::{Substitution, SubstitutionOutcome, SubstitutionWarning, WarningCode};
pub use phase::{CaseMetadata, CurrentPhase, PhaseInfo};
pub use processor::{ProcessorError, ProcessorResult, VariableProcessor};
pub use settings::{
    ContextBlock, ContextKind, SessionSettings, SettingsType, Transcription, VariableMap,
};
pub use store::{
    CaseRow, CoachingConfig, DifficultyRow, DocumentAnalysis, InterviewerRow, PhaseRow,
    SessionBundle, SessionStore, StoreError, StoreResult,
};
pub use token::{ElapsedFormat, TokenKind, VariableToken};
