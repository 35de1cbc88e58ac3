//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable knobs for the session engine.
///
/// TTL fields accept humantime strings when deserialized from
/// configuration (e.g. `"1h"`, `"5m"`, `"500ms"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// TTL for the per-session static payload. A safety net, not a
    /// functional expiry — the payload is immutable for the session.
    #[serde(default = "default_static_ttl", with = "humantime_serde")]
    pub static_ttl: Duration,

    /// TTL for the globally cached coaching configuration.
    #[serde(default = "default_coaching_ttl", with = "humantime_serde")]
    pub coaching_ttl: Duration,

    /// Default TTL for cache writes that do not specify one.
    #[serde(default = "default_cache_ttl", with = "humantime_serde")]
    pub default_cache_ttl: Duration,

    /// Overrun allowance in minutes before a timing nudge fires, used
    /// when a case specifies none.
    #[serde(default = "default_nudge_buffer")]
    pub nudge_buffer: f64,

    /// Client user-agent string captured at session creation.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// When set, every built payload carries a transcription block with
    /// this verbosity.
    #[serde(default)]
    pub transcription_verbose: Option<bool>,
}

fn default_static_ttl() -> Duration {
    Duration::from_secs(3600)
}

fn default_coaching_ttl() -> Duration {
    Duration::from_secs(3600)
}

fn default_cache_ttl() -> Duration {
    crate::cache::DEFAULT_TTL
}

fn default_nudge_buffer() -> f64 {
    stagehand_core::phase::DEFAULT_NUDGE_BUFFER
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            static_ttl: default_static_ttl(),
            coaching_ttl: default_coaching_ttl(),
            default_cache_ttl: default_cache_ttl(),
            nudge_buffer: default_nudge_buffer(),
            user_agent: None,
            transcription_verbose: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_humantime_ttls() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "static_ttl": "30m", "nudge_buffer": 3.5 }"#).unwrap();
        assert_eq!(config.static_ttl, Duration::from_secs(1800));
        assert_eq!(config.coaching_ttl, Duration::from_secs(3600));
        assert_eq!(config.nudge_buffer, 3.5);
        assert!(config.user_agent.is_none());
    }
}
