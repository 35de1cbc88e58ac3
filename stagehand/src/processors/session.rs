//! Session- and phase-derived processors.

use async_trait::async_trait;
use stagehand_core::{
    CurrentPhase, ProcessorError, ProcessorResult, SubstitutionContext, VariableProcessor,
    VariableToken,
};
use std::time::Duration;

const ONE_HOUR: Duration = Duration::from_secs(3600);

/// Current phase from the context, recomputed from the case plan when the
/// caller supplied only elapsed time and metadata.
fn current_phase(context: &SubstitutionContext) -> Option<CurrentPhase> {
    if let Some(current) = &context.current_phase {
        return Some(current.clone());
    }
    let case = context.case.as_ref()?;
    case.locate(context.elapsed_minutes()?)
}

/// `SESSION_ID` — the session identifier. Constant per session, so the
/// resolved value is cacheable.
pub struct SessionId;

#[async_trait]
impl VariableProcessor for SessionId {
    fn name(&self) -> &str {
        "SESSION_ID"
    }

    fn description(&self) -> &str {
        "Identifier of the current session"
    }

    async fn resolve(
        &self,
        _token: &VariableToken,
        context: &SubstitutionContext,
    ) -> ProcessorResult<String> {
        context
            .session_id
            .as_ref()
            .map(|id| id.to_string())
            .ok_or(ProcessorError::MissingContext("session_id"))
    }

    fn fallback(&self) -> Option<&str> {
        Some("unknown-session")
    }

    fn cache_ttl(&self) -> Option<Duration> {
        Some(ONE_HOUR)
    }
}

/// `CURRENT_PHASE` — name of the phase covering the elapsed time.
pub struct CurrentPhaseName;

#[async_trait]
impl VariableProcessor for CurrentPhaseName {
    fn name(&self) -> &str {
        "CURRENT_PHASE"
    }

    fn description(&self) -> &str {
        "Name of the current interview phase"
    }

    async fn resolve(
        &self,
        _token: &VariableToken,
        context: &SubstitutionContext,
    ) -> ProcessorResult<String> {
        current_phase(context)
            .map(|current| current.phase.name)
            .ok_or(ProcessorError::MissingContext("current_phase"))
    }

    fn fallback(&self) -> Option<&str> {
        Some("Unknown Phase")
    }
}

/// `PHASE_DURATION` — planned duration of the current phase.
pub struct PhaseDuration;

#[async_trait]
impl VariableProcessor for PhaseDuration {
    fn name(&self) -> &str {
        "PHASE_DURATION"
    }

    fn description(&self) -> &str {
        "Planned duration of the current phase in minutes"
    }

    async fn resolve(
        &self,
        _token: &VariableToken,
        context: &SubstitutionContext,
    ) -> ProcessorResult<String> {
        let current =
            current_phase(context).ok_or(ProcessorError::MissingContext("current_phase"))?;
        Ok(format!(
            "{} minutes",
            format_minutes(current.phase.duration)
        ))
    }

    fn fallback(&self) -> Option<&str> {
        Some("unknown")
    }
}

/// Renders minutes without a trailing `.0` for whole values.
pub(crate) fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format!("{}", minutes as i64)
    } else {
        format!("{minutes:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::{CaseMetadata, PhaseInfo};

    fn case() -> CaseMetadata {
        CaseMetadata::from_phases(
            vec![
                PhaseInfo {
                    name: "Intro".into(),
                    details: String::new(),
                    duration: 5.0,
                },
                PhaseInfo {
                    name: "Deep Dive".into(),
                    details: String::new(),
                    duration: 10.0,
                },
            ],
            None,
        )
    }

    #[tokio::test]
    async fn phase_name_falls_back_to_lookup() {
        let ctx = SubstitutionContext::default()
            .with_elapsed(Duration::from_secs(6 * 60))
            .with_phases(None, Some(case()));
        let token = VariableToken::parse("CURRENT_PHASE");
        assert_eq!(
            CurrentPhaseName.resolve(&token, &ctx).await.unwrap(),
            "Deep Dive"
        );
    }

    #[tokio::test]
    async fn phase_duration_renders_minutes() {
        let meta = case();
        let current = meta.locate(1.0);
        let ctx = SubstitutionContext::default()
            .with_elapsed(Duration::from_secs(60))
            .with_phases(current, Some(meta));
        let token = VariableToken::parse("PHASE_DURATION");
        assert_eq!(
            PhaseDuration.resolve(&token, &ctx).await.unwrap(),
            "5 minutes"
        );
    }

    #[tokio::test]
    async fn missing_plan_is_an_error() {
        let token = VariableToken::parse("CURRENT_PHASE");
        let err = CurrentPhaseName
            .resolve(&token, &SubstitutionContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessorError::MissingContext(_)));
    }

    #[test]
    fn minute_rendering() {
        assert_eq!(format_minutes(5.0), "5");
        assert_eq!(format_minutes(7.5), "7.5");
    }
}
