//! Standard variable processors.
//!
//! Every value that can change between two calls within the same session
//! (wall clock, elapsed time, current phase) advertises no cache TTL and
//! is recomputed on every pass; only values constant for a session
//! (`SESSION_ID`) or globally slow-changing (`USER_AGENT`) are cached.
//!
//! Processors receive their dependencies through construction — the
//! cache-value processor takes the shared [`SessionCache`] handle, the
//! user-agent processor takes the captured client string — so the
//! registry and its processors have no circular reference by construction.

mod misc;
mod session;
mod time;

pub use misc::{CacheValueLookup, RandomUuid, UserAgent};
pub use session::{CurrentPhaseName, PhaseDuration, SessionId};
pub(crate) use session::format_minutes;
pub use time::{
    CurrentTimeUtc, ElapsedMinutes, ElapsedTimeFormat, TimestampMs, TotalElapsedTime, WallClockNow,
    format_elapsed, format_wall_clock,
};

use crate::cache::SessionCache;
use crate::registry::VariableRegistry;
use std::sync::Arc;

/// Registers the full standard processor set into `registry`.
///
/// `cache` backs `CACHE_VALUE_<key>` lookups; `user_agent` is the client
/// string captured when the session was created, if any.
pub fn register_standard_processors(
    registry: &mut VariableRegistry,
    cache: Arc<SessionCache>,
    user_agent: Option<String>,
) {
    registry.register(Arc::new(TotalElapsedTime));
    registry.register(Arc::new(WallClockNow));
    registry.register(Arc::new(CurrentTimeUtc));
    registry.register(Arc::new(ElapsedMinutes));
    registry.register(Arc::new(SessionId));
    registry.register(Arc::new(CurrentPhaseName));
    registry.register(Arc::new(PhaseDuration));
    registry.register(Arc::new(RandomUuid));
    registry.register(Arc::new(TimestampMs));
    registry.register(Arc::new(UserAgent::new(user_agent)));
    registry.register(Arc::new(ElapsedTimeFormat));
    registry.register(Arc::new(CacheValueLookup::new(cache)));
}
