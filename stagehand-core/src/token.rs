//! Parsed variable tokens.
//!
//! Template variables arrive as raw names between `{{` and `}}`. A few of
//! them are families rather than fixed names: `ELAPSED_TIME_FORMAT_<FMT>`
//! selects an output shape for the elapsed time, and `CACHE_VALUE_<key>`
//! addresses an arbitrary cache key. Parsing happens once, up front, so
//! processors dispatch on a tagged variant instead of re-deriving the
//! argument from the raw name.

use smol_str::SmolStr;
use std::fmt;

/// Output shape selector for the `ELAPSED_TIME_FORMAT_*` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElapsedFormat {
    /// Hours with one decimal place, e.g. `"1.5 hours"`.
    Hours,
    /// Whole seconds, e.g. `"90 seconds"`.
    Seconds,
    /// Clock-style `H:MM:SS`.
    Hms,
    /// The standard `"<m> minutes and <s> seconds"` shape, used for any
    /// unrecognized suffix.
    #[default]
    Default,
}

impl ElapsedFormat {
    /// Parses a format suffix. Unknown suffixes map to [`ElapsedFormat::Default`].
    pub fn from_suffix(suffix: &str) -> Self {
        match suffix {
            "HOURS" => ElapsedFormat::Hours,
            "SECONDS" => ElapsedFormat::Seconds,
            "HMS" => ElapsedFormat::Hms,
            _ => ElapsedFormat::Default,
        }
    }
}

/// The structural kind of a parsed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A plain named variable, resolved by exact-name lookup.
    Named,
    /// `ELAPSED_TIME_FORMAT_<FMT>` — elapsed time in an alternate shape.
    ElapsedFormat(ElapsedFormat),
    /// `CACHE_VALUE_<key>` — a direct lookup of `<key>` in the shared cache.
    CacheValue(SmolStr),
}

/// A `{{VAR}}` placeholder parsed into its raw name and structural kind.
///
/// The raw name is preserved verbatim so the substitution pass can replace
/// the exact token occurrences and report warnings against the name the
/// template author wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableToken {
    raw: SmolStr,
    kind: TokenKind,
}

impl VariableToken {
    /// Parses a trimmed variable name into a token.
    pub fn parse(name: &str) -> Self {
        let kind = if let Some(suffix) = name.strip_prefix("ELAPSED_TIME_FORMAT_") {
            TokenKind::ElapsedFormat(ElapsedFormat::from_suffix(suffix))
        } else if let Some(key) = name.strip_prefix("CACHE_VALUE_") {
            if key.is_empty() {
                TokenKind::Named
            } else {
                TokenKind::CacheValue(SmolStr::new(key))
            }
        } else {
            TokenKind::Named
        };
        VariableToken {
            raw: SmolStr::new(name),
            kind,
        }
    }

    /// The variable name exactly as it appeared inside the braces.
    pub fn name(&self) -> &str {
        &self.raw
    }

    /// The structural kind of this token.
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }
}

impl fmt::Display for VariableToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
