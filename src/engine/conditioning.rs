//! Weekly-stepped targets for conditioning exercises

use crate::cycle::{Cycle, ExerciseAssignment};
use crate::exercises::{Exercise, MeasurementType};
use crate::workout::WorkingDetail;

/// `baseline + weekly_increment × (week_number - 1)`
pub fn conditioning_target(baseline: u32, weekly_increment: u32, week_number: u32) -> u32 {
    baseline.saturating_add(weekly_increment.saturating_mul(week_number.saturating_sub(1)))
}

/// Per-exercise increment, else the cycle fallback for the measurement
pub fn weekly_increment(
    cycle: &Cycle,
    assignment: &ExerciseAssignment,
    exercise: &Exercise,
) -> u32 {
    assignment.conditioning_increment.unwrap_or_else(|| {
        match exercise.measurement {
            MeasurementType::Reps => cycle.conditioning_increment.reps,
            MeasurementType::Time => cycle.conditioning_increment.seconds,
        }
        .unwrap_or(0)
    })
}

/// Snapshot a conditioning set for the given week
pub fn conditioning_detail(
    cycle: &Cycle,
    assignment: &ExerciseAssignment,
    exercise: &Exercise,
    week_number: u32,
) -> WorkingDetail {
    WorkingDetail::Conditioning {
        baseline: assignment
            .conditioning_baseline
            .or(exercise.default_conditioning_baseline),
        weekly_increment: weekly_increment(cycle, assignment, exercise),
        week_number,
    }
}
