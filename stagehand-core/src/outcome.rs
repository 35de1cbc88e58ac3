//! Substitution results and soft-failure warnings.
//!
//! A substitution pass never aborts: unknown variables stay in place and
//! broken processors degrade to fallback text, each recorded as a coded
//! warning. A live voice session must never lose a settings push to a
//! templating bug.

use std::fmt;

/// Warning codes attached to soft failures during substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    /// No processor claims the variable; its token is left untouched.
    UnknownVariable,
    /// A processor returned an error; its fallback value was substituted.
    ProcessorFailed,
}

impl WarningCode {
    /// The stable code string used in logs and reports.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            WarningCode::UnknownVariable => "W0106",
            WarningCode::ProcessorFailed => "E0001",
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One soft failure recorded during a substitution pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionWarning {
    /// Classification of the failure.
    pub code: WarningCode,
    /// The variable name the warning concerns.
    pub variable: String,
    /// Human-readable description.
    pub message: String,
    /// The fallback text substituted, when one was used.
    pub fallback: Option<String>,
}

/// One successful variable replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    /// The variable name that was replaced.
    pub variable: String,
    /// The value every occurrence was replaced with.
    pub value: String,
    /// Whether the value was served from the registry's value cache.
    pub cached: bool,
}

/// The structured result of substituting one template.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionOutcome {
    /// `false` iff at least one processor returned an error.
    /// Unknown variables do not clear this flag.
    pub success: bool,
    /// The template with every resolvable token replaced.
    pub text: String,
    /// Replacements performed, in detection order.
    pub substitutions: Vec<Substitution>,
    /// Soft failures encountered during the pass.
    pub warnings: Vec<SubstitutionWarning>,
    /// Every variable detected in the template, first-seen order, deduplicated.
    pub detected: Vec<String>,
    /// Detected variables no processor claimed.
    pub unprocessed: Vec<String>,
}

impl SubstitutionOutcome {
    /// An outcome for a template before any variable is processed.
    pub fn new(template: impl Into<String>, detected: Vec<String>) -> Self {
        SubstitutionOutcome {
            success: true,
            text: template.into(),
            substitutions: Vec::new(),
            warnings: Vec::new(),
            detected,
            unprocessed: Vec::new(),
        }
    }

    /// Whether any warning was recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Folds another outcome's bookkeeping into this one.
    ///
    /// Used after substituting several templates independently to report
    /// aggregate warnings. The text fields remain per-template.
    pub fn absorb(&mut self, other: &SubstitutionOutcome) {
        self.success &= other.success;
        self.substitutions.extend(other.substitutions.iter().cloned());
        self.warnings.extend(other.warnings.iter().cloned());
        for variable in &other.unprocessed {
            if !self.unprocessed.contains(variable) {
                self.unprocessed.push(variable.clone());
            }
        }
    }
}
