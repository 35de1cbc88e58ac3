//! Identifier, client, and cache-lookup processors.

use crate::cache::SessionCache;
use async_trait::async_trait;
use serde_json::Value;
use stagehand_core::{
    ProcessorError, ProcessorResult, SubstitutionContext, TokenKind, VariableProcessor,
    VariableToken,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const ONE_HOUR: Duration = Duration::from_secs(3600);

/// `RANDOM_UUID` — a freshly generated v4 UUID per resolution.
pub struct RandomUuid;

#[async_trait]
impl VariableProcessor for RandomUuid {
    fn name(&self) -> &str {
        "RANDOM_UUID"
    }

    fn description(&self) -> &str {
        "Freshly generated v4 UUID"
    }

    async fn resolve(
        &self,
        _token: &VariableToken,
        _context: &SubstitutionContext,
    ) -> ProcessorResult<String> {
        Ok(Uuid::new_v4().to_string())
    }

    fn fallback(&self) -> Option<&str> {
        Some("00000000-0000-0000-0000-000000000000")
    }
}

/// `USER_AGENT` — the client user-agent string captured when the session
/// was created.
pub struct UserAgent {
    agent: Option<String>,
}

impl UserAgent {
    /// A processor serving the given captured client string.
    pub fn new(agent: Option<String>) -> Self {
        UserAgent { agent }
    }
}

#[async_trait]
impl VariableProcessor for UserAgent {
    fn name(&self) -> &str {
        "USER_AGENT"
    }

    fn description(&self) -> &str {
        "Client user-agent string"
    }

    async fn resolve(
        &self,
        _token: &VariableToken,
        _context: &SubstitutionContext,
    ) -> ProcessorResult<String> {
        Ok(self
            .agent
            .clone()
            .unwrap_or_else(|| "Unknown Browser".to_string()))
    }

    fn fallback(&self) -> Option<&str> {
        Some("Unknown Browser")
    }

    fn cache_ttl(&self) -> Option<Duration> {
        Some(ONE_HOUR)
    }
}

/// `CACHE_VALUE_<key>` — looks `<key>` up in the shared cache and
/// stringifies whatever it finds.
pub struct CacheValueLookup {
    cache: Arc<SessionCache>,
}

impl CacheValueLookup {
    /// A processor reading from the given shared cache.
    pub fn new(cache: Arc<SessionCache>) -> Self {
        CacheValueLookup { cache }
    }

    fn lookup(&self, key: &str) -> Option<String> {
        if let Some(text) = self.cache.get::<String>(key) {
            return Some((*text).clone());
        }
        let value = self.cache.get::<Value>(key)?;
        Some(match &*value {
            Value::String(inner) => inner.clone(),
            other => other.to_string(),
        })
    }
}

#[async_trait]
impl VariableProcessor for CacheValueLookup {
    fn name(&self) -> &str {
        "CACHE_VALUE"
    }

    fn description(&self) -> &str {
        "Direct lookup of a key in the shared cache"
    }

    fn matches(&self, token: &VariableToken) -> bool {
        matches!(token.kind(), TokenKind::CacheValue(_))
    }

    async fn resolve(
        &self,
        token: &VariableToken,
        _context: &SubstitutionContext,
    ) -> ProcessorResult<String> {
        let TokenKind::CacheValue(key) = token.kind() else {
            return Err(ProcessorError::WrongToken(token.name().to_string()));
        };
        self.lookup(key)
            .ok_or_else(|| ProcessorError::Resolution(format!("no cached value under {key}")))
    }

    fn fallback(&self) -> Option<&str> {
        Some("cache_error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn cache_lookup_stringifies_values() {
        let cache = Arc::new(SessionCache::new());
        cache.set_default("plain", String::from("text"));
        cache.set_default("json_string", json!("quoted"));
        cache.set_default("json_number", json!(12));
        let processor = CacheValueLookup::new(cache);
        let ctx = SubstitutionContext::default();

        let resolve = |name: &str| {
            let token = VariableToken::parse(name);
            let processor = &processor;
            let ctx = &ctx;
            async move { processor.resolve(&token, ctx).await }
        };

        assert_eq!(resolve("CACHE_VALUE_plain").await.unwrap(), "text");
        assert_eq!(resolve("CACHE_VALUE_json_string").await.unwrap(), "quoted");
        assert_eq!(resolve("CACHE_VALUE_json_number").await.unwrap(), "12");
        assert!(resolve("CACHE_VALUE_missing").await.is_err());
    }

    #[tokio::test]
    async fn uuid_is_fresh_each_time() {
        let token = VariableToken::parse("RANDOM_UUID");
        let ctx = SubstitutionContext::default();
        let first = RandomUuid.resolve(&token, &ctx).await.unwrap();
        let second = RandomUuid.resolve(&token, &ctx).await.unwrap();
        assert_ne!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[tokio::test]
    async fn user_agent_defaults_when_uncaptured() {
        let token = VariableToken::parse("USER_AGENT");
        let ctx = SubstitutionContext::default();
        assert_eq!(
            UserAgent::new(None).resolve(&token, &ctx).await.unwrap(),
            "Unknown Browser"
        );
        assert_eq!(
            UserAgent::new(Some("TestClient/1.0".into()))
                .resolve(&token, &ctx)
                .await
                .unwrap(),
            "TestClient/1.0"
        );
    }
}
