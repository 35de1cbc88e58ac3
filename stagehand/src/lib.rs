#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Process-wide TTL cache.
///
/// [`SessionCache`](cache::SessionCache) stores slow-changing data —
/// per-session static payloads, the global coaching configuration, and
/// arbitrary values other subsystems expose through `CACHE_VALUE_<key>`
/// variables — with lazy TTL expiry and typed reads.
pub mod cache;

/// Engine configuration.
///
/// [`EngineConfig`](config::EngineConfig) carries the cache TTLs, the
/// nudge buffer, the captured client user-agent, and the optional
/// transcription verbosity.
pub mod config;

/// Session orchestration.
///
/// [`SessionEngine`](engine::SessionEngine) runs the two-phase
/// lifecycle: one static fetch per session, then a fresh settings build
/// on every refresh.
pub mod engine;

/// Error types for session operations.
pub mod error;

/// Standard variable processors.
pub mod processors;

/// Variable registry and substitution pass.
pub mod registry;

pub use cache::SessionCache;
pub use config::EngineConfig;
pub use engine::{
    BuildRequest, COACHING_CONFIG_KEY, SessionEngine, SessionEngineBuilder, StaticSessionData,
    session_settings_key,
};
pub use error::SessionError;
pub use registry::VariableRegistry;

pub use stagehand_core::{
    CaseMetadata, CoachingConfig, CurrentPhase, PhaseInfo, ProcessorError, ProcessorResult,
    SessionSettings, SessionStore, Substitution, SubstitutionContext, SubstitutionOutcome,
    SubstitutionWarning, VariableProcessor, VariableToken, WarningCode,
};

/// The `stagehand` prelude.
///
/// ```rust
/// use stagehand::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BuildRequest, SessionEngine, SessionError, SessionSettings, SessionStore,
        SubstitutionContext, VariableProcessor, VariableRegistry,
    };
}
