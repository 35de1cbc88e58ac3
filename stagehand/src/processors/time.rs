//! Time-derived processors. All of them resolve fresh on every pass.

use async_trait::async_trait;
use chrono::{Local, Utc};
use stagehand_core::{
    ElapsedFormat, ProcessorError, ProcessorResult, SubstitutionContext, TokenKind,
    VariableProcessor, VariableToken,
};
use std::time::Duration;

/// Renders an elapsed duration as `"<m> minutes and <s> seconds"`,
/// dropping whichever component is zero. Zero elapsed renders as
/// `"0 seconds"`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_seconds = elapsed.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    match (minutes, seconds) {
        (0, s) => format!("{s} seconds"),
        (m, 0) => format!("{m} minutes"),
        (m, s) => format!("{m} minutes and {s} seconds"),
    }
}

/// Locale-style wall-clock rendering: weekday, month, day, 12-hour time.
pub fn format_wall_clock() -> String {
    Local::now().format("%A, %B %-d, %-I:%M %p").to_string()
}

/// `TOTAL_ELAPSED_TIME` — human-readable elapsed time.
pub struct TotalElapsedTime;

#[async_trait]
impl VariableProcessor for TotalElapsedTime {
    fn name(&self) -> &str {
        "TOTAL_ELAPSED_TIME"
    }

    fn description(&self) -> &str {
        "Elapsed session time as minutes and seconds"
    }

    async fn resolve(
        &self,
        _token: &VariableToken,
        context: &SubstitutionContext,
    ) -> ProcessorResult<String> {
        let elapsed = context
            .elapsed
            .ok_or(ProcessorError::MissingContext("elapsed"))?;
        Ok(format_elapsed(elapsed))
    }

    fn fallback(&self) -> Option<&str> {
        Some("unknown time")
    }
}

/// `now` — locale-formatted current wall-clock time.
///
/// Deliberately shadows the host platform's own `now` variable so every
/// template sees the same rendering.
pub struct WallClockNow;

#[async_trait]
impl VariableProcessor for WallClockNow {
    fn name(&self) -> &str {
        "now"
    }

    fn description(&self) -> &str {
        "Current wall-clock time (weekday, month, day, 12-hour time)"
    }

    async fn resolve(
        &self,
        _token: &VariableToken,
        _context: &SubstitutionContext,
    ) -> ProcessorResult<String> {
        Ok(format_wall_clock())
    }

    fn fallback(&self) -> Option<&str> {
        Some("current time")
    }
}

/// `CURRENT_TIME_UTC` — ISO-8601 UTC timestamp.
pub struct CurrentTimeUtc;

#[async_trait]
impl VariableProcessor for CurrentTimeUtc {
    fn name(&self) -> &str {
        "CURRENT_TIME_UTC"
    }

    fn description(&self) -> &str {
        "Current time as an ISO-8601 UTC timestamp"
    }

    async fn resolve(
        &self,
        _token: &VariableToken,
        _context: &SubstitutionContext,
    ) -> ProcessorResult<String> {
        Ok(Utc::now().to_rfc3339())
    }
}

/// `ELAPSED_MINUTES` — whole elapsed minutes as a bare number.
pub struct ElapsedMinutes;

#[async_trait]
impl VariableProcessor for ElapsedMinutes {
    fn name(&self) -> &str {
        "ELAPSED_MINUTES"
    }

    fn description(&self) -> &str {
        "Whole elapsed minutes"
    }

    async fn resolve(
        &self,
        _token: &VariableToken,
        context: &SubstitutionContext,
    ) -> ProcessorResult<String> {
        let elapsed = context
            .elapsed
            .ok_or(ProcessorError::MissingContext("elapsed"))?;
        Ok((elapsed.as_secs() / 60).to_string())
    }

    fn fallback(&self) -> Option<&str> {
        Some("0")
    }
}

/// `TIMESTAMP_MS` — current Unix time in milliseconds.
pub struct TimestampMs;

#[async_trait]
impl VariableProcessor for TimestampMs {
    fn name(&self) -> &str {
        "TIMESTAMP_MS"
    }

    fn description(&self) -> &str {
        "Current Unix timestamp in milliseconds"
    }

    async fn resolve(
        &self,
        _token: &VariableToken,
        _context: &SubstitutionContext,
    ) -> ProcessorResult<String> {
        Ok(Utc::now().timestamp_millis().to_string())
    }

    fn fallback(&self) -> Option<&str> {
        Some("0")
    }
}

/// `ELAPSED_TIME_FORMAT_<FMT>` — elapsed time in an alternate shape.
pub struct ElapsedTimeFormat;

#[async_trait]
impl VariableProcessor for ElapsedTimeFormat {
    fn name(&self) -> &str {
        "ELAPSED_TIME_FORMAT"
    }

    fn description(&self) -> &str {
        "Elapsed time reformatted per the variable's format suffix"
    }

    fn matches(&self, token: &VariableToken) -> bool {
        matches!(token.kind(), TokenKind::ElapsedFormat(_))
    }

    async fn resolve(
        &self,
        token: &VariableToken,
        context: &SubstitutionContext,
    ) -> ProcessorResult<String> {
        let TokenKind::ElapsedFormat(format) = token.kind() else {
            return Err(ProcessorError::WrongToken(token.name().to_string()));
        };
        let elapsed = context
            .elapsed
            .ok_or(ProcessorError::MissingContext("elapsed"))?;
        let total_seconds = elapsed.as_secs();
        Ok(match format {
            ElapsedFormat::Hours => {
                format!("{:.1} hours", elapsed.as_secs_f64() / 3600.0)
            }
            ElapsedFormat::Seconds => format!("{total_seconds} seconds"),
            ElapsedFormat::Hms => format!(
                "{}:{:02}:{:02}",
                total_seconds / 3600,
                (total_seconds % 3600) / 60,
                total_seconds % 60
            ),
            ElapsedFormat::Default => format_elapsed(elapsed),
        })
    }

    fn fallback(&self) -> Option<&str> {
        Some("0")
    }
}
