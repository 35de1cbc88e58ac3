//! Substitution context.

use crate::phase::{CaseMetadata, CurrentPhase};
use chrono::{DateTime, Utc};
use serde::Serialize;
use smol_str::SmolStr;
use std::time::Duration;

/// Read-only input threaded through every processor call during one
/// substitution pass.
///
/// Every field is optional: a template can be substituted with whatever
/// context the caller has, and processors whose required field is absent
/// fail softly into their fallback value.
///
/// The context serializes to JSON so the registry can fingerprint it for
/// value-cache keys — two calls with identical contexts may share a cached
/// resolution, while any change (including the elapsed time) produces a
/// fresh key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubstitutionContext {
    /// Identifier of the session being substituted for.
    pub session_id: Option<SmolStr>,
    /// Time elapsed since the session started.
    pub elapsed: Option<Duration>,
    /// Wall-clock instant the session started.
    pub started_at: Option<DateTime<Utc>>,
    /// Phase covering the current elapsed time, if the case has a plan.
    pub current_phase: Option<CurrentPhase>,
    /// The case plan itself.
    pub case: Option<CaseMetadata>,
}

impl SubstitutionContext {
    /// A context carrying only a session id.
    pub fn for_session(session_id: impl Into<SmolStr>) -> Self {
        SubstitutionContext {
            session_id: Some(session_id.into()),
            ..Default::default()
        }
    }

    /// Sets the elapsed time.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    /// Sets the session start instant.
    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// Sets the current phase and case plan together.
    pub fn with_phases(mut self, current: Option<CurrentPhase>, case: Option<CaseMetadata>) -> Self {
        self.current_phase = current;
        self.case = case;
        self
    }

    /// Elapsed time in fractional minutes, if known.
    pub fn elapsed_minutes(&self) -> Option<f64> {
        self.elapsed.map(|e| e.as_secs_f64() / 60.0)
    }

    /// Stable JSON rendering of the context, used in value-cache keys.
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_distinguishes_elapsed_time() {
        let a = SubstitutionContext::for_session("s1").with_elapsed(Duration::from_secs(60));
        let b = SubstitutionContext::for_session("s1").with_elapsed(Duration::from_secs(61));
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
    }

    #[test]
    fn elapsed_minutes_converts() {
        let ctx = SubstitutionContext::default().with_elapsed(Duration::from_secs(90));
        assert!((ctx.elapsed_minutes().unwrap() - 1.5).abs() < 1e-9);
        assert!(SubstitutionContext::default().elapsed_minutes().is_none());
    }
}
