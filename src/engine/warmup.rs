//! Warm-up sets sized from the most recent max

use crate::cycle::{ExerciseAssignment, WarmupSettings};
use crate::exercises::Exercise;
use crate::workout::WarmupDetail;

/// Whether a working set of this exercise gets a warm-up.
///
/// A per-assignment override wins over the cycle toggles. Conditioning
/// exercises never reference a max and never get one.
pub fn wants_warmup(
    settings: &WarmupSettings,
    assignment: Option<&ExerciseAssignment>,
    exercise: &Exercise,
) -> bool {
    if exercise.is_conditioning() {
        return false;
    }
    if let Some(include) = assignment.and_then(|a| a.include_warmup) {
        return include;
    }
    settings.include_warmup_sets && (!exercise.is_timed() || settings.include_timed_warmups)
}

/// `round(max × percentage / 100)`, at least 1
pub fn warmup_target(previous_max: u32, percentage: u32) -> u32 {
    ((previous_max as f64 * percentage as f64 / 100.0).round() as u32).max(1)
}

/// Warm-up detail, or `None` when no max is established yet
pub fn warmup_detail(previous_max: Option<u32>, percentage: u32) -> Option<WarmupDetail> {
    let previous_max = previous_max.filter(|m| *m > 0)?;
    Some(WarmupDetail {
        percentage,
        previous_max,
        target: warmup_target(previous_max, percentage),
    })
}
