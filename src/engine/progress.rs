//! Cycle progress summary

use crate::workout::{ScheduledWorkout, WorkoutStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleProgress {
    pub total: usize,
    pub completed: usize,
    pub partial: usize,
    pub skipped: usize,
    pub pending: usize,
    /// Sequence number of the first pending workout
    pub next_sequence: Option<u32>,
}

impl CycleProgress {
    /// Share of workouts no longer pending, 0-100
    pub fn percent_done(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.total - self.pending) as f64 / self.total as f64 * 100.0
    }

    pub fn is_finished(&self) -> bool {
        self.total > 0 && self.pending == 0
    }
}

/// Summarize cycle-generated workouts; ad-hoc ones are ignored
pub fn summarize(workouts: &[ScheduledWorkout]) -> CycleProgress {
    let mut progress = CycleProgress::default();

    for workout in workouts.iter().filter(|w| !w.ad_hoc) {
        progress.total += 1;
        match workout.status {
            WorkoutStatus::Completed => progress.completed += 1,
            WorkoutStatus::Partial => progress.partial += 1,
            WorkoutStatus::Skipped => progress.skipped += 1,
            WorkoutStatus::Pending => {
                progress.pending += 1;
                progress.next_sequence = Some(
                    progress
                        .next_sequence
                        .map_or(workout.sequence_number, |n| n.min(workout.sequence_number)),
                );
            }
        }
    }

    progress
}
