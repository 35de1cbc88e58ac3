//! Error types for session operations.

use stagehand_core::StoreError;
use thiserror::Error;

/// Error type for session initialization and settings builds.
///
/// Per-field data problems never surface here — they degrade to fallback
/// text inside the build. These variants cover the cases a caller must
/// actually handle.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session row does not exist in the data store. A session cannot
    /// start without its record.
    #[error("session {0} not found in the data store")]
    SessionNotFound(String),

    /// `build` was called before `initialize` populated the cache for
    /// this session. Callers must always initialize first.
    #[error("session {0} has not been initialized")]
    SessionNotInitialized(String),

    /// The data store failed while loading the session bundle.
    #[error(transparent)]
    Store(#[from] StoreError),
}
