//! Variable registry and substitution pass.
//!
//! The registry holds every registered [`VariableProcessor`], detects
//! `{{VAR}}` tokens in template strings, dispatches each to a processor,
//! and assembles a [`SubstitutionOutcome`] with soft-failure warnings.
//!
//! Dispatch order: exact-name lookup first; otherwise the first processor
//! (in registration order) whose `matches` accepts the parsed token. A
//! later registration under an existing name replaces the earlier one in
//! place, so name lookup always sees the newest processor while pattern
//! iteration order stays stable.
//!
//! The registry owns a private value cache. A processor advertising a
//! cache TTL has its resolved values keyed by
//! `(processor name, variable, serialized context)` — any context change,
//! including the elapsed time, produces a fresh key.

use crate::cache::SessionCache;
use regex::{NoExpand, Regex};
use smol_str::SmolStr;
use stagehand_core::{
    Substitution, SubstitutionContext, SubstitutionOutcome, SubstitutionWarning, VariableProcessor,
    VariableToken, WarningCode,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry of variable processors with its own resolved-value cache.
pub struct VariableRegistry {
    processors: Vec<Arc<dyn VariableProcessor>>,
    by_name: HashMap<SmolStr, usize>,
    values: SessionCache,
    token_pattern: Regex,
}

impl VariableRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        VariableRegistry {
            processors: Vec::new(),
            by_name: HashMap::new(),
            values: SessionCache::new(),
            token_pattern: Regex::new(r"\{\{([^{}]+)\}\}").expect("token pattern is valid"),
        }
    }

    /// Registers a processor. A processor with an already-registered name
    /// replaces the earlier one in place.
    pub fn register(&mut self, processor: Arc<dyn VariableProcessor>) {
        let name = SmolStr::new(processor.name());
        match self.by_name.get(&name) {
            Some(&index) => {
                debug!(processor = %name, "replacing registered processor");
                self.processors[index] = processor;
            }
            None => {
                self.by_name.insert(name, self.processors.len());
                self.processors.push(processor);
            }
        }
    }

    /// Number of registered processors.
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Whether no processor is registered.
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Scans a template for `{{...}}` tokens, trimming the inner
    /// whitespace and deduplicating while preserving first-seen order.
    pub fn detect_variables(&self, template: &str) -> Vec<String> {
        let mut detected: Vec<String> = Vec::new();
        for capture in self.token_pattern.captures_iter(template) {
            let name = capture[1].trim();
            if !name.is_empty() && !detected.iter().any(|seen| seen == name) {
                detected.push(name.to_string());
            }
        }
        detected
    }

    /// Finds the processor claiming `variable`: exact name match first,
    /// then the first registered processor whose pattern accepts the
    /// parsed token.
    pub fn find_processor(&self, variable: &str) -> Option<Arc<dyn VariableProcessor>> {
        if let Some(&index) = self.by_name.get(variable) {
            return Some(Arc::clone(&self.processors[index]));
        }
        let token = VariableToken::parse(variable);
        self.processors
            .iter()
            .find(|processor| processor.matches(&token))
            .cloned()
    }

    /// Substitutes every detected variable in `template`.
    ///
    /// Soft-failure policy: an unknown variable leaves its token in place
    /// and records a [`WarningCode::UnknownVariable`] warning; a processor
    /// error substitutes the processor's fallback (or a synthesized
    /// `[NAME_ERROR]` marker), records a [`WarningCode::ProcessorFailed`]
    /// warning, and clears the `success` flag. One failure never aborts
    /// the pass.
    pub async fn substitute(
        &self,
        template: &str,
        context: &SubstitutionContext,
    ) -> SubstitutionOutcome {
        let detected = self.detect_variables(template);
        let mut outcome = SubstitutionOutcome::new(template, detected.clone());
        if detected.is_empty() {
            return outcome;
        }
        let fingerprint = context.fingerprint();

        for variable in &detected {
            let Some(processor) = self.find_processor(variable) else {
                warn!(variable, "no processor registered for variable");
                outcome.warnings.push(SubstitutionWarning {
                    code: WarningCode::UnknownVariable,
                    variable: variable.clone(),
                    message: format!("no processor registered for {{{{{variable}}}}}"),
                    fallback: None,
                });
                outcome.unprocessed.push(variable.clone());
                continue;
            };

            let token = VariableToken::parse(variable);
            let ttl = processor.cache_ttl().filter(|ttl| !ttl.is_zero());
            let value_key = format!("{}:{}:{}", processor.name(), variable, fingerprint);

            if ttl.is_some() {
                if let Some(cached) = self.values.get::<String>(&value_key) {
                    replace_all(&mut outcome.text, variable, &cached);
                    outcome.substitutions.push(Substitution {
                        variable: variable.clone(),
                        value: (*cached).clone(),
                        cached: true,
                    });
                    continue;
                }
            }

            match processor.resolve(&token, context).await {
                Ok(value) => {
                    if let Some(ttl) = ttl {
                        self.values.set(value_key, value.clone(), ttl);
                    }
                    replace_all(&mut outcome.text, variable, &value);
                    outcome.substitutions.push(Substitution {
                        variable: variable.clone(),
                        value,
                        cached: false,
                    });
                }
                Err(err) => {
                    let fallback = processor
                        .fallback()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("[{variable}_ERROR]"));
                    warn!(
                        variable,
                        processor = processor.name(),
                        error = %err,
                        fallback = %fallback,
                        "processor failed, substituting fallback"
                    );
                    replace_all(&mut outcome.text, variable, &fallback);
                    outcome.warnings.push(SubstitutionWarning {
                        code: WarningCode::ProcessorFailed,
                        variable: variable.clone(),
                        message: err.to_string(),
                        fallback: Some(fallback),
                    });
                    outcome.success = false;
                }
            }
        }

        outcome
    }

    /// Drops every cached resolved value.
    pub fn clear_value_cache(&self) {
        self.values.clear();
    }
}

impl Default for VariableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VariableRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableRegistry")
            .field("processors", &self.processors.len())
            .field("values", &self.values)
            .finish()
    }
}

/// Replaces every whitespace-tolerant `{{ variable }}` occurrence.
///
/// The replacement value is inserted literally; `$` sequences in resolved
/// values must not be treated as capture references.
fn replace_all(text: &mut String, variable: &str, value: &str) {
    let pattern = Regex::new(&format!(r"\{{\{{\s*{}\s*\}}\}}", regex::escape(variable)))
        .expect("escaped variable name forms a valid pattern");
    *text = pattern.replace_all(text, NoExpand(value)).into_owned();
}
