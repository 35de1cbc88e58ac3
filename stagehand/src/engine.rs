//! Session orchestration.
//!
//! The engine runs a two-phase lifecycle per session. `initialize`
//! fetches everything static — persona text, case template, difficulty
//! text, phase plan, coaching prompt pair — once, and caches it for the
//! session's lifetime. `build` runs on every settings refresh (periodic
//! timer, phase change, coaching toggle, manual trigger) and recomputes
//! every time-sensitive value fresh, substitutes each prompt text through
//! the registry, and assembles the wire payload, optionally with a
//! phase-status and timing-nudge context block.
//!
//! Anything missing short of the session row itself degrades to a
//! fallback string with a warning log; a settings push is never lost to a
//! data gap.

use crate::cache::SessionCache;
use crate::config::EngineConfig;
use crate::error::SessionError;
use crate::processors::{format_elapsed, format_wall_clock, register_standard_processors};
use crate::registry::VariableRegistry;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde_json::Value;
use smol_str::SmolStr;
use stagehand_core::{
    CaseMetadata, CaseRow, CoachingConfig, CurrentPhase, PhaseInfo, SessionSettings, SessionStore,
    SubstitutionContext, SubstitutionOutcome, VariableMap, VariableProcessor,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cache key for the global coaching configuration.
pub const COACHING_CONFIG_KEY: &str = "coaching_config";

/// Cache key for a session's static payload.
pub fn session_settings_key(session_id: &str) -> SmolStr {
    SmolStr::from(format!("session_settings_{session_id}"))
}

/// Fallback prompt texts used when a data-store field is absent.
pub mod defaults {
    /// Persona used when the interviewer profile carries no prompt.
    pub const INTERVIEWER_IDENTITY: &str = "You are a professional interviewer conducting a \
        practice interview. Stay in character and keep the conversation moving.";

    /// Case used when the interview case carries no template.
    pub const INTERVIEW_CASE: &str = "Run a general practice interview appropriate for the \
        candidate's background, covering their experience and problem-solving approach.";

    /// Difficulty guidance used when the difficulty profile is absent.
    pub const DIFFICULTY_PROMPT: &str =
        "Calibrate question difficulty to the candidate's responses.";

    /// Coaching stance used when no coaching configuration is cached.
    pub const COACHING_PROMPT: &str = "Maintain professional distance. Do not coach the \
        candidate or provide feedback during the interview.";
}

/// Static per-session payload, fetched once and cached for the session's
/// lifetime. Immutable after initialization; the TTL is a safety net.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticSessionData {
    /// Interviewer persona prompt.
    pub interviewer_identity: Option<String>,
    /// Interview-case template text.
    pub case_template: Option<String>,
    /// Difficulty prompt text.
    pub difficulty_prompt: Option<String>,
    /// Phase plan derived from the case row.
    pub case_metadata: Option<CaseMetadata>,
}

/// One settings-build invocation.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// The session to build settings for.
    pub session_id: SmolStr,
    /// Time elapsed since the session started.
    pub elapsed: Duration,
    /// Wall-clock instant the session started.
    pub started_at: Option<DateTime<Utc>>,
    /// Caller-supplied extra context, appended to the context block.
    pub temporary_context: Option<String>,
    /// Whether coaching mode is currently on.
    pub coach_mode_enabled: bool,
}

impl BuildRequest {
    /// A request with only the required fields set.
    pub fn new(session_id: impl Into<SmolStr>, elapsed: Duration) -> Self {
        BuildRequest {
            session_id: session_id.into(),
            elapsed,
            started_at: None,
            temporary_context: None,
            coach_mode_enabled: false,
        }
    }

    /// Sets the session start instant.
    pub fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// Attaches caller-supplied context text.
    pub fn temporary_context(mut self, text: impl Into<String>) -> Self {
        self.temporary_context = Some(text.into());
        self
    }

    /// Sets the coaching-mode flag.
    pub fn coach_mode(mut self, enabled: bool) -> Self {
        self.coach_mode_enabled = enabled;
        self
    }
}

/// Builder for [`SessionEngine`].
pub struct SessionEngineBuilder {
    store: Arc<dyn SessionStore>,
    config: EngineConfig,
    extra_processors: Vec<Arc<dyn VariableProcessor>>,
}

impl SessionEngineBuilder {
    /// A builder over the given data store with default configuration.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        SessionEngineBuilder {
            store,
            config: EngineConfig::default(),
            extra_processors: Vec::new(),
        }
    }

    /// Replaces the engine configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Captures the client user-agent string.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(agent.into());
        self
    }

    /// Registers an additional processor on top of the standard set.
    /// Reusing a standard name replaces that processor.
    pub fn processor(mut self, processor: Arc<dyn VariableProcessor>) -> Self {
        self.extra_processors.push(processor);
        self
    }

    /// Builds the engine, registering the standard processor set.
    pub fn build(self) -> SessionEngine {
        let cache = Arc::new(SessionCache::with_default_ttl(self.config.default_cache_ttl));
        let mut registry = VariableRegistry::new();
        register_standard_processors(
            &mut registry,
            Arc::clone(&cache),
            self.config.user_agent.clone(),
        );
        for processor in self.extra_processors {
            registry.register(processor);
        }
        SessionEngine {
            cache,
            registry,
            store: self.store,
            config: self.config,
        }
    }
}

/// The session-settings engine: cache, registry, and data store wired
/// together as one explicitly constructed service.
pub struct SessionEngine {
    cache: Arc<SessionCache>,
    registry: VariableRegistry,
    store: Arc<dyn SessionStore>,
    config: EngineConfig,
}

impl SessionEngine {
    /// Starts building an engine over the given data store.
    pub fn builder(store: Arc<dyn SessionStore>) -> SessionEngineBuilder {
        SessionEngineBuilder::new(store)
    }

    /// The shared cache. Other subsystems key into it for
    /// `CACHE_VALUE_<key>` lookups.
    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    /// The variable registry.
    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetches and caches the static per-session data. Idempotent: a
    /// second call for an already-initialized session reads the cache and
    /// fetches nothing.
    ///
    /// Concurrent calls for the same session may both fetch and both
    /// write; the second write wins, which is harmless because the
    /// fetched content is identical per session.
    ///
    /// Fails only when the session row itself is missing
    /// ([`SessionError::SessionNotFound`]) or the store is unreachable.
    /// Every other absent field is logged and compensated for with a
    /// fallback string at build time.
    pub async fn initialize(&self, session_id: &str) -> Result<(), SessionError> {
        let key = session_settings_key(session_id);
        if self.cache.contains(&key) {
            debug!(session_id, "session settings already cached");
            return Ok(());
        }

        debug!(session_id, "loading static session data");
        let bundle = self
            .store
            .load_session_bundle(session_id)
            .await?
            .ok_or_else(|| SessionError::SessionNotFound(session_id.to_string()))?;

        if self
            .cache
            .get::<CoachingConfig>(COACHING_CONFIG_KEY)
            .is_none()
        {
            match self.store.load_coaching_config().await {
                Ok(Some(config)) => {
                    self.cache
                        .set(COACHING_CONFIG_KEY, config, self.config.coaching_ttl);
                }
                Ok(None) => {
                    warn!("coaching config missing, builds will use the generic prompt");
                }
                Err(err) => {
                    warn!(error = %err, "failed to load coaching config");
                }
            }
        }

        let interviewer_identity = bundle.interviewer.and_then(|row| row.prompt);
        if interviewer_identity.is_none() {
            warn!(session_id, "interviewer prompt missing, using default persona");
        }

        let (case_template, case_metadata) = match bundle.case {
            Some(CaseRow {
                prompt,
                phases,
                nudge_buffer,
            }) => {
                let metadata = phases.filter(|phases| !phases.is_empty()).map(|phases| {
                    CaseMetadata::from_phases(
                        phases.into_iter().map(PhaseInfo::from).collect(),
                        nudge_buffer.or(Some(self.config.nudge_buffer)),
                    )
                });
                (prompt, metadata)
            }
            None => (None, None),
        };
        if case_template.is_none() {
            warn!(session_id, "case template missing, using default case");
        }
        if case_metadata.is_none() {
            warn!(session_id, "no phase metadata, phase timing context disabled");
        }

        let difficulty_prompt = bundle.difficulty.and_then(|row| row.prompt);
        if difficulty_prompt.is_none() {
            warn!(session_id, "difficulty prompt missing, using default guidance");
        }

        self.cache.set(
            key,
            StaticSessionData {
                interviewer_identity,
                case_template,
                difficulty_prompt,
                case_metadata,
            },
            self.config.static_ttl,
        );
        debug!(session_id, "session settings initialized");
        Ok(())
    }

    /// Builds the settings payload for one refresh.
    ///
    /// Requires a prior [`initialize`](SessionEngine::initialize) for the
    /// session; a cold cache here is a caller bug and fails with
    /// [`SessionError::SessionNotInitialized`]. Every time-sensitive
    /// value — elapsed text, wall clock, current phase — is recomputed
    /// fresh on each call; overlapping invocations share no mutable
    /// state.
    pub async fn build(&self, request: &BuildRequest) -> Result<SessionSettings, SessionError> {
        let key = session_settings_key(&request.session_id);
        let static_data = self
            .cache
            .get::<StaticSessionData>(&key)
            .ok_or_else(|| SessionError::SessionNotInitialized(request.session_id.to_string()))?;

        let elapsed_text = format_elapsed(request.elapsed);
        let now_text = format_wall_clock();
        let elapsed_minutes = request.elapsed.as_secs_f64() / 60.0;
        let current_phase = static_data
            .case_metadata
            .as_ref()
            .and_then(|case| case.locate(elapsed_minutes));

        let coaching_text = match self.cache.get::<CoachingConfig>(COACHING_CONFIG_KEY) {
            Some(config) => config.select(request.coach_mode_enabled).to_string(),
            None => {
                debug!("no coaching config cached, using generic prompt");
                defaults::COACHING_PROMPT.to_string()
            }
        };

        let mut case_text = static_data
            .case_template
            .clone()
            .unwrap_or_else(|| defaults::INTERVIEW_CASE.to_string());
        match self.store.load_document_analysis(&request.session_id).await {
            Ok(Some(analysis)) if !analysis.is_empty() => {
                case_text.push_str("\n\n");
                case_text.push_str(&analysis.render());
            }
            Ok(_) => {}
            Err(err) => {
                // A missing or failing analysis never blocks a build.
                debug!(
                    session_id = %request.session_id,
                    error = %err,
                    "document analysis unavailable"
                );
            }
        }

        let interviewer_text = static_data
            .interviewer_identity
            .clone()
            .unwrap_or_else(|| defaults::INTERVIEWER_IDENTITY.to_string());
        let difficulty_text = static_data
            .difficulty_prompt
            .clone()
            .unwrap_or_else(|| defaults::DIFFICULTY_PROMPT.to_string());

        let context = SubstitutionContext {
            session_id: Some(request.session_id.clone()),
            elapsed: Some(request.elapsed),
            started_at: request.started_at,
            current_phase: current_phase.clone(),
            case: static_data.case_metadata.clone(),
        };

        // Four independent passes over one shared context.
        let passes = join_all([
            self.registry.substitute(&interviewer_text, &context),
            self.registry.substitute(&case_text, &context),
            self.registry.substitute(&coaching_text, &context),
            self.registry.substitute(&difficulty_text, &context),
        ])
        .await;

        let mut aggregate = SubstitutionOutcome::new("", Vec::new());
        for pass in &passes {
            aggregate.absorb(pass);
        }
        if !aggregate.unprocessed.is_empty() {
            warn!(
                session_id = %request.session_id,
                unprocessed = ?aggregate.unprocessed,
                "variables left unprocessed in session settings"
            );
        }

        let mut variables = VariableMap::new();
        let names = [
            "INTERVIEWER_IDENTITY",
            "INTERVIEW_CASE",
            "COACHING_PROMPT",
            "DIFFICULTY_PROMPT",
        ];
        for (name, pass) in names.iter().zip(&passes) {
            variables.insert((*name).to_string(), Value::String(pass.text.clone()));
        }
        variables.insert("TOTAL_ELAPSED_TIME".to_string(), Value::String(elapsed_text));
        variables.insert("now".to_string(), Value::String(now_text));

        let mut context_parts: Vec<String> = Vec::new();
        if let (Some(current), Some(case_meta)) =
            (&current_phase, static_data.case_metadata.as_ref())
        {
            context_parts.push(phase_status_text(current, case_meta));
            if current.exceeds_nudge(case_meta.nudge_buffer) {
                context_parts.push(nudge_text(current, case_meta));
            }
        }
        if let Some(temporary) = &request.temporary_context {
            context_parts.push(temporary.clone());
        }

        let mut settings = SessionSettings::new().with_variables(variables);
        if let Some(verbose) = self.config.transcription_verbose {
            settings = settings.with_transcription(verbose);
        }
        if !context_parts.is_empty() {
            settings = settings.with_temporary_context(context_parts.join("\n\n"));
        }
        Ok(settings)
    }

    /// A payload injecting `text` for the rest of the session, bypassing
    /// the temporary context that regular builds produce.
    pub fn persistent_context(&self, text: impl Into<String>) -> SessionSettings {
        SessionSettings::persistent_context(text)
    }

    /// Drops the cached static payload for a session, e.g. when the
    /// session ends.
    pub fn clear_session(&self, session_id: &str) {
        self.cache.invalidate(&session_settings_key(session_id));
    }
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("cache", &self.cache)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}

/// Verbose phase-status paragraph naming the current, previous, and next
/// phase with time-in-phase against the planned duration.
fn phase_status_text(current: &CurrentPhase, case: &CaseMetadata) -> String {
    use crate::processors::format_minutes;

    let mut text = format!(
        "Phase status: currently in \"{}\" (phase {} of {}), {:.1} minutes into its planned \
         {}-minute window.",
        current.phase.name,
        current.index + 1,
        case.phases.len(),
        current.time_in_phase,
        format_minutes(current.phase.duration),
    );
    match case.previous_phase(current.index) {
        Some(previous) => {
            text.push_str(&format!(" The previous phase was \"{}\".", previous.name));
        }
        None => text.push_str(" This is the first phase."),
    }
    match case.next_phase(current.index) {
        Some(next) => text.push_str(&format!(" The next phase is \"{}\".", next.name)),
        None => text.push_str(" This is the final phase."),
    }
    text
}

/// Timing-nudge sentence, produced only once the current phase has
/// overrun its planned duration beyond the nudge buffer.
fn nudge_text(current: &CurrentPhase, case: &CaseMetadata) -> String {
    match case.next_phase(current.index) {
        Some(next) => format!(
            "Timing: the candidate is {:.1} minutes over the planned duration of \"{}\". \
             Move the interview on to the next phase: \"{}\".",
            current.overrun(),
            current.phase.name,
            next.name,
        ),
        None => format!(
            "Timing: the candidate is {:.1} minutes over the planned duration of \"{}\". \
             This is the final phase, so begin wrapping up the interview.",
            current.overrun(),
            current.phase.name,
        ),
    }
}
