//! Phase timing model.
//!
//! An interview case plans its time as an ordered list of named phases laid
//! out contiguously on a virtual timeline starting at zero. The current
//! phase is never stored — it is recomputed from the elapsed time on every
//! settings build, so two overlapping builds can never disagree about
//! shared state.

use serde::{Deserialize, Serialize};

/// Default overrun allowance, in minutes, before a timing nudge fires.
pub const DEFAULT_NUDGE_BUFFER: f64 = 2.0;

/// One named, timed segment of a case plan. Durations are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseInfo {
    /// Display name of the phase, e.g. `"Case Analysis"`.
    pub name: String,
    /// Free-form guidance for the interviewer during this phase.
    #[serde(default)]
    pub details: String,
    /// Planned duration in minutes.
    pub duration: f64,
}

/// The planned timeline of a case: ordered phases plus derived totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseMetadata {
    /// Ordered, contiguous phases starting at minute zero.
    pub phases: Vec<PhaseInfo>,
    /// Sum of all phase durations, in minutes.
    pub total_duration: f64,
    /// Overrun allowance in minutes before a timing nudge fires.
    pub nudge_buffer: f64,
}

impl CaseMetadata {
    /// Builds metadata from a phase list, deriving the total duration.
    ///
    /// A missing nudge buffer falls back to [`DEFAULT_NUDGE_BUFFER`].
    pub fn from_phases(phases: Vec<PhaseInfo>, nudge_buffer: Option<f64>) -> Self {
        let total_duration = phases.iter().map(|p| p.duration).sum();
        CaseMetadata {
            phases,
            total_duration,
            nudge_buffer: nudge_buffer.unwrap_or(DEFAULT_NUDGE_BUFFER),
        }
    }

    /// Finds the phase covering `elapsed_minutes`.
    ///
    /// Each phase owns the half-open interval `[start, start + duration)`.
    /// Elapsed time past the end of the timeline keeps the last phase
    /// current with an unclamped `time_in_phase`, so overrun handling
    /// always has a phase to talk about. Returns `None` only when the
    /// phase list is empty.
    pub fn locate(&self, elapsed_minutes: f64) -> Option<CurrentPhase> {
        let mut start = 0.0;
        for (index, phase) in self.phases.iter().enumerate() {
            if elapsed_minutes < start + phase.duration {
                return Some(CurrentPhase {
                    phase: phase.clone(),
                    time_in_phase: (elapsed_minutes - start).max(0.0),
                    index,
                    total_elapsed: elapsed_minutes,
                });
            }
            start += phase.duration;
        }
        let last = self.phases.last()?;
        let last_start = self.total_duration - last.duration;
        Some(CurrentPhase {
            phase: last.clone(),
            time_in_phase: elapsed_minutes - last_start,
            index: self.phases.len() - 1,
            total_elapsed: elapsed_minutes,
        })
    }

    /// Phase preceding `index`, if any.
    pub fn previous_phase(&self, index: usize) -> Option<&PhaseInfo> {
        index.checked_sub(1).and_then(|i| self.phases.get(i))
    }

    /// Phase following `index`, if any.
    pub fn next_phase(&self, index: usize) -> Option<&PhaseInfo> {
        self.phases.get(index + 1)
    }
}

/// The phase covering a given elapsed time. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentPhase {
    /// The phase itself.
    pub phase: PhaseInfo,
    /// Minutes spent inside this phase. Exceeds the planned duration only
    /// on the last phase of the timeline.
    pub time_in_phase: f64,
    /// Zero-based index of the phase in the case plan.
    pub index: usize,
    /// Total elapsed minutes at the time of the lookup.
    pub total_elapsed: f64,
}

impl CurrentPhase {
    /// Minutes spent beyond the planned duration. Negative while on plan.
    pub fn overrun(&self) -> f64 {
        self.time_in_phase - self.phase.duration
    }

    /// Whether the overrun has passed the nudge buffer.
    pub fn exceeds_nudge(&self, nudge_buffer: f64) -> bool {
        self.time_in_phase > self.phase.duration + nudge_buffer
    }

    /// Whether this is the last phase of a plan with `phase_count` phases.
    pub fn is_last(&self, phase_count: usize) -> bool {
        self.index + 1 == phase_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_phase_case() -> CaseMetadata {
        CaseMetadata::from_phases(
            vec![
                PhaseInfo {
                    name: "Intro".into(),
                    details: String::new(),
                    duration: 5.0,
                },
                PhaseInfo {
                    name: "Case Analysis".into(),
                    details: String::new(),
                    duration: 10.0,
                },
            ],
            None,
        )
    }

    #[test]
    fn total_duration_is_sum_of_phases() {
        let case = two_phase_case();
        assert_eq!(case.total_duration, 15.0);
        assert_eq!(case.nudge_buffer, DEFAULT_NUDGE_BUFFER);
    }

    #[test]
    fn elapsed_inside_first_phase() {
        let current = two_phase_case().locate(4.9).unwrap();
        assert_eq!(current.index, 0);
        assert!((current.time_in_phase - 4.9).abs() < 1e-9);
    }

    #[test]
    fn phase_boundary_belongs_to_the_next_phase() {
        // [start, end) intervals: minute 5.0 opens the second phase.
        let current = two_phase_case().locate(5.0).unwrap();
        assert_eq!(current.index, 1);
        assert!(current.time_in_phase.abs() < 1e-9);
    }

    #[test]
    fn overflow_keeps_last_phase_current() {
        let case = two_phase_case();

        let current = case.locate(15.0).unwrap();
        assert_eq!(current.index, 1);
        assert!((current.time_in_phase - 10.0).abs() < 1e-9);

        // Past the end the last phase absorbs all remaining time,
        // unclamped and never negative.
        let current = case.locate(20.0).unwrap();
        assert_eq!(current.index, 1);
        assert!((current.time_in_phase - 15.0).abs() < 1e-9);
        assert!(current.is_last(case.phases.len()));
    }

    #[test]
    fn empty_plan_has_no_current_phase() {
        let case = CaseMetadata::from_phases(Vec::new(), Some(1.0));
        assert!(case.locate(3.0).is_none());
    }

    #[test]
    fn nudge_threshold_is_strict() {
        let current = CurrentPhase {
            phase: PhaseInfo {
                name: "Intro".into(),
                details: String::new(),
                duration: 5.0,
            },
            time_in_phase: 6.9,
            index: 0,
            total_elapsed: 6.9,
        };
        assert!(!current.exceeds_nudge(2.0));

        let over = CurrentPhase {
            time_in_phase: 7.1,
            ..current
        };
        assert!(over.exceeds_nudge(2.0));
        assert!((over.overrun() - 2.1).abs() < 1e-9);
    }

    #[test]
    fn neighbor_lookup() {
        let case = two_phase_case();
        assert!(case.previous_phase(0).is_none());
        assert_eq!(case.previous_phase(1).unwrap().name, "Intro");
        assert_eq!(case.next_phase(0).unwrap().name, "Case Analysis");
        assert!(case.next_phase(1).is_none());
    }
}
