//! The session-settings wire payload.
//!
//! The engine's only output is an in-memory [`SessionSettings`] object the
//! caller forwards verbatim to the voice-SDK peer. The peer treats a
//! `"temporary"` context as applying to its next inbound turn only and a
//! `"persistent"` context as applying for the rest of the session; a
//! payload with no context block clears any previously injected temporary
//! context.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered name → value map for the `variables` block.
///
/// `serde_json::Map` preserves insertion order (the `preserve_order`
/// feature), so variables serialize in the order the builder added them.
pub type VariableMap = serde_json::Map<String, Value>;

/// Message-type tag. The wire format carries exactly one type today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SettingsType {
    /// A session-settings push.
    #[default]
    #[serde(rename = "session_settings")]
    SessionSettings,
}

/// Transcription options forwarded to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcription {
    /// Whether the peer should emit verbose transcription events.
    pub verbose: bool,
}

/// Lifetime of an injected context block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextKind {
    /// Applies to the peer's next inbound turn only.
    #[serde(rename = "temporary")]
    Temporary,
    /// Applies for the rest of the session.
    #[serde(rename = "persistent")]
    Persistent,
}

/// A context block injected into the peer's prompt state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextBlock {
    /// The injected text.
    pub text: String,
    /// Whether the injection is temporary or persistent.
    #[serde(rename = "type")]
    pub kind: ContextKind,
}

/// The settings payload handed to the voice-SDK peer.
///
/// All blocks besides the type tag are optional and omitted from the wire
/// entirely when absent — an omitted `context` is how a previously
/// injected temporary context gets cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Fixed message-type tag.
    #[serde(rename = "type")]
    pub kind: SettingsType,
    /// Prompt variables, in insertion order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<VariableMap>,
    /// Transcription options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<Transcription>,
    /// Injected context block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextBlock>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionSettings {
    /// An empty settings payload.
    pub fn new() -> Self {
        SessionSettings {
            kind: SettingsType::SessionSettings,
            variables: None,
            transcription: None,
            context: None,
        }
    }

    /// Attaches the variables block.
    pub fn with_variables(mut self, variables: VariableMap) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Attaches transcription options.
    pub fn with_transcription(mut self, verbose: bool) -> Self {
        self.transcription = Some(Transcription { verbose });
        self
    }

    /// Attaches a temporary context block.
    pub fn with_temporary_context(mut self, text: impl Into<String>) -> Self {
        self.context = Some(ContextBlock {
            text: text.into(),
            kind: ContextKind::Temporary,
        });
        self
    }

    /// A payload carrying only a persistent context block, applied for
    /// the rest of the session.
    pub fn persistent_context(text: impl Into<String>) -> Self {
        SessionSettings {
            context: Some(ContextBlock {
                text: text.into(),
                kind: ContextKind::Persistent,
            }),
            ..Self::new()
        }
    }
}
