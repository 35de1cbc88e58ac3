//! Session-engine lifecycle against an in-memory store.

use stagehand::config::EngineConfig;
use stagehand::engine::{BuildRequest, SessionEngine};
use stagehand::error::SessionError;
use stagehand_core::{
    CaseRow, CoachingConfig, ContextKind, DifficultyRow, DocumentAnalysis, InterviewerRow,
    PhaseRow, SessionBundle,
};
use stagehand_memstore::MemoryStore;
use std::sync::Arc;
use std::time::Duration;

fn sample_bundle() -> SessionBundle {
    SessionBundle {
        interviewer: Some(InterviewerRow {
            prompt: Some("You are Morgan, interviewing session {{SESSION_ID}}.".into()),
        }),
        case: Some(CaseRow {
            prompt: Some("Walk through a market-entry case. Elapsed: {{TOTAL_ELAPSED_TIME}}.".into()),
            phases: Some(vec![
                PhaseRow {
                    name: "Intro".into(),
                    details: Some("Warm up.".into()),
                    duration: 5.0,
                },
                PhaseRow {
                    name: "Case Analysis".into(),
                    details: None,
                    duration: 10.0,
                },
            ]),
            nudge_buffer: Some(2.0),
        }),
        difficulty: Some(DifficultyRow {
            prompt: Some("Probe every assumption.".into()),
        }),
    }
}

fn engine_with(store: &Arc<MemoryStore>) -> SessionEngine {
    SessionEngine::builder(Arc::clone(store) as Arc<dyn stagehand_core::SessionStore>).build()
}

#[tokio::test]
async fn initialize_fetches_once_per_session() {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("s1", sample_bundle());
    let engine = engine_with(&store);

    engine.initialize("s1").await.unwrap();
    engine.initialize("s1").await.unwrap();

    assert_eq!(store.bundle_fetches(), 1);
}

#[tokio::test]
async fn initialize_fails_for_unknown_session() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_with(&store);

    let err = engine.initialize("ghost").await.unwrap_err();
    assert!(matches!(err, SessionError::SessionNotFound(id) if id == "ghost"));
}

#[tokio::test]
async fn build_requires_initialization() {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("s1", sample_bundle());
    let engine = engine_with(&store);

    let request = BuildRequest::new("s1", Duration::from_secs(60));
    let err = engine.build(&request).await.unwrap_err();
    assert!(matches!(err, SessionError::SessionNotInitialized(_)));
}

#[tokio::test]
async fn build_substitutes_every_prompt_variable() {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("s1", sample_bundle());
    let engine = engine_with(&store);
    engine.initialize("s1").await.unwrap();

    let request = BuildRequest::new("s1", Duration::from_secs(125));
    let settings = engine.build(&request).await.unwrap();
    let variables = settings.variables.unwrap();

    for key in [
        "INTERVIEWER_IDENTITY",
        "INTERVIEW_CASE",
        "COACHING_PROMPT",
        "DIFFICULTY_PROMPT",
        "TOTAL_ELAPSED_TIME",
        "now",
    ] {
        assert!(variables.contains_key(key), "missing variable {key}");
    }
    assert_eq!(
        variables["INTERVIEWER_IDENTITY"].as_str().unwrap(),
        "You are Morgan, interviewing session s1."
    );
    assert_eq!(
        variables["INTERVIEW_CASE"].as_str().unwrap(),
        "Walk through a market-entry case. Elapsed: 2 minutes and 5 seconds."
    );
    assert_eq!(
        variables["TOTAL_ELAPSED_TIME"].as_str().unwrap(),
        "2 minutes and 5 seconds"
    );
    assert!(!variables["now"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn coaching_flag_selects_prompt_text() {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("s1", sample_bundle());
    store.set_coaching_config(CoachingConfig {
        enabled_content: "Coach session {{SESSION_ID}} actively.".into(),
        disabled_content: "Observe only.".into(),
    });
    let engine = engine_with(&store);
    engine.initialize("s1").await.unwrap();

    let on = engine
        .build(&BuildRequest::new("s1", Duration::from_secs(60)).coach_mode(true))
        .await
        .unwrap();
    let off = engine
        .build(&BuildRequest::new("s1", Duration::from_secs(60)))
        .await
        .unwrap();

    assert_eq!(
        on.variables.unwrap()["COACHING_PROMPT"].as_str().unwrap(),
        "Coach session s1 actively."
    );
    assert_eq!(
        off.variables.unwrap()["COACHING_PROMPT"].as_str().unwrap(),
        "Observe only."
    );
}

#[tokio::test]
async fn missing_coaching_config_falls_back_to_generic_prompt() {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("s1", sample_bundle());
    let engine = engine_with(&store);
    engine.initialize("s1").await.unwrap();

    let settings = engine
        .build(&BuildRequest::new("s1", Duration::from_secs(60)))
        .await
        .unwrap();
    let coaching = settings.variables.unwrap()["COACHING_PROMPT"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(coaching.contains("professional distance"));
}

#[tokio::test]
async fn context_block_omitted_when_nothing_to_say() {
    let store = Arc::new(MemoryStore::new());
    let mut bundle = sample_bundle();
    if let Some(case) = bundle.case.as_mut() {
        case.phases = None;
    }
    store.insert_session("s1", bundle);
    let engine = engine_with(&store);
    engine.initialize("s1").await.unwrap();

    let settings = engine
        .build(&BuildRequest::new("s1", Duration::from_secs(60)))
        .await
        .unwrap();
    assert!(settings.context.is_none());

    let json = serde_json::to_value(&settings).unwrap();
    assert!(json.get("context").is_none());
    assert!(json.get("transcription").is_none());
}

#[tokio::test]
async fn context_block_carries_phase_status() {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("s1", sample_bundle());
    let engine = engine_with(&store);
    engine.initialize("s1").await.unwrap();

    // Six minutes in: second phase, well within plan, so no nudge.
    let settings = engine
        .build(&BuildRequest::new("s1", Duration::from_secs(360)))
        .await
        .unwrap();
    let context = settings.context.unwrap();
    assert_eq!(context.kind, ContextKind::Temporary);
    assert!(context.text.contains("currently in \"Case Analysis\""));
    assert!(!context.text.contains("Timing:"));
}

#[tokio::test]
async fn overrun_last_phase_adds_wrap_up_nudge() {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("s1", sample_bundle());
    let engine = engine_with(&store);
    engine.initialize("s1").await.unwrap();

    // 17.5 minutes: 12.5 into the planned 10-minute final phase, past the
    // 2-minute buffer.
    let settings = engine
        .build(&BuildRequest::new("s1", Duration::from_secs(1050)))
        .await
        .unwrap();
    let context = settings.context.unwrap();
    assert!(context.text.contains("Timing:"));
    assert!(context.text.contains("begin wrapping up"));
}

#[tokio::test]
async fn temporary_context_from_request_is_appended() {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("s1", sample_bundle());
    let engine = engine_with(&store);
    engine.initialize("s1").await.unwrap();

    let request = BuildRequest::new("s1", Duration::from_secs(60))
        .temporary_context("The candidate asked for a short break.");
    let settings = engine.build(&request).await.unwrap();
    let context = settings.context.unwrap();
    assert!(context.text.contains("currently in \"Intro\""));
    assert!(
        context
            .text
            .ends_with("The candidate asked for a short break.")
    );
}

#[tokio::test]
async fn document_analysis_extends_the_case_text() {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("s1", sample_bundle());
    store.insert_document_analysis(
        "s1",
        DocumentAnalysis {
            resume_summary: Some("Five years of Rust in payments.".into()),
            job_description_summary: None,
            suggested_questions: vec!["Describe a production incident you led.".into()],
        },
    );
    let engine = engine_with(&store);
    engine.initialize("s1").await.unwrap();

    let settings = engine
        .build(&BuildRequest::new("s1", Duration::from_secs(60)))
        .await
        .unwrap();
    let case_text = settings.variables.unwrap()["INTERVIEW_CASE"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(case_text.contains("## Candidate Document Context"));
    assert!(case_text.contains("Five years of Rust in payments."));
    assert!(case_text.contains("- Describe a production incident you led."));
}

#[tokio::test]
async fn failing_document_analysis_never_blocks_a_build() {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("s1", sample_bundle());
    store.fail_document_analysis(true);
    let engine = engine_with(&store);
    engine.initialize("s1").await.unwrap();

    let settings = engine
        .build(&BuildRequest::new("s1", Duration::from_secs(60)))
        .await
        .unwrap();
    let case_text = settings.variables.unwrap()["INTERVIEW_CASE"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(!case_text.contains("Candidate Document Context"));
}

#[tokio::test]
async fn missing_linked_rows_degrade_to_defaults() {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("s1", SessionBundle::default());
    let engine = engine_with(&store);
    engine.initialize("s1").await.unwrap();

    let settings = engine
        .build(&BuildRequest::new("s1", Duration::from_secs(60)))
        .await
        .unwrap();
    let variables = settings.variables.unwrap();
    assert!(
        variables["INTERVIEWER_IDENTITY"]
            .as_str()
            .unwrap()
            .contains("professional interviewer")
    );
    assert!(
        variables["DIFFICULTY_PROMPT"]
            .as_str()
            .unwrap()
            .contains("difficulty")
    );
    assert!(settings.context.is_none());
}

#[tokio::test]
async fn clear_session_requires_reinitialization() {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("s1", sample_bundle());
    let engine = engine_with(&store);
    engine.initialize("s1").await.unwrap();
    engine.clear_session("s1");

    let err = engine
        .build(&BuildRequest::new("s1", Duration::from_secs(60)))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::SessionNotInitialized(_)));

    engine.initialize("s1").await.unwrap();
    assert_eq!(store.bundle_fetches(), 2);
}

#[tokio::test]
async fn transcription_flag_comes_from_config() {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("s1", sample_bundle());
    let config = EngineConfig {
        transcription_verbose: Some(true),
        ..EngineConfig::default()
    };
    let engine = SessionEngine::builder(Arc::clone(&store) as _)
        .config(config)
        .build();
    engine.initialize("s1").await.unwrap();

    let settings = engine
        .build(&BuildRequest::new("s1", Duration::from_secs(60)))
        .await
        .unwrap();
    assert!(settings.transcription.unwrap().verbose);
}

#[tokio::test]
async fn persistent_context_payload_is_marked_persistent() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_with(&store);

    let settings = engine.persistent_context("Remember: the candidate prefers brevity.");
    let context = settings.context.as_ref().unwrap();
    assert_eq!(context.kind, ContextKind::Persistent);
    assert!(settings.variables.is_none());

    let json = serde_json::to_value(&settings).unwrap();
    assert_eq!(json["context"]["type"], "persistent");
    assert_eq!(json["type"], "session_settings");
}
