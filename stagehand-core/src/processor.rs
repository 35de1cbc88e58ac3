//! The variable-processor trait.

use crate::context::SubstitutionContext;
use crate::token::VariableToken;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Error returned by a processor that could not resolve its variable.
///
/// A processor error never aborts a substitution pass; the registry
/// substitutes the processor's fallback value and records a warning.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// A context field the processor requires was not provided.
    #[error("required context field missing: {0}")]
    MissingContext(&'static str),
    /// The token carried the wrong kind for this processor.
    #[error("token {0} does not belong to this processor")]
    WrongToken(String),
    /// Resolution failed for a processor-specific reason.
    #[error("{0}")]
    Resolution(String),
}

/// Convenience alias for processor resolution results.
pub type ProcessorResult<T> = Result<T, ProcessorError>;

/// A resolver for one variable name or one family of variable names.
///
/// Processors are registered into a registry which dispatches detected
/// tokens to them: exact-name lookup first, then the first processor whose
/// [`matches`](VariableProcessor::matches) accepts the parsed token, in
/// registration order.
///
/// # Caching
///
/// [`cache_ttl`](VariableProcessor::cache_ttl) returning `None` (the
/// default) or a zero duration means the value is recomputed on every
/// pass. Only values that are constant for a session or globally
/// slow-changing should advertise a TTL; anything time-derived must stay
/// fresh.
#[async_trait]
pub trait VariableProcessor: Send + Sync {
    /// Unique processor name. Re-registering a name replaces the
    /// previous processor.
    fn name(&self) -> &str;

    /// One-line description, used in diagnostics.
    fn description(&self) -> &str;

    /// Whether this processor claims the given token.
    ///
    /// The default claims exactly [`name`](VariableProcessor::name);
    /// family processors override this to match their token variant.
    fn matches(&self, token: &VariableToken) -> bool {
        token.name() == self.name()
    }

    /// Resolves the token to its substitution value.
    async fn resolve(
        &self,
        token: &VariableToken,
        context: &SubstitutionContext,
    ) -> ProcessorResult<String>;

    /// Text substituted when [`resolve`](VariableProcessor::resolve)
    /// fails. Without one, a synthesized `[NAME_ERROR]` marker is used.
    fn fallback(&self) -> Option<&str> {
        None
    }

    /// How long resolved values may be served from the registry's value
    /// cache. `None` means never cache.
    fn cache_ttl(&self) -> Option<Duration> {
        None
    }
}
