//! Cycle scheduling and progression engine
//!
//! Pure functions only. Features:
//! - Day skeleton from group and RFEM rotations
//! - RFEM, simple and mixed progression targets
//! - Conditioning weekly steps and warm-up sizing
//! - Max-testing day planning
//! - Duplicate workout reconciliation

pub mod builder;
pub mod conditioning;
pub mod max_testing;
pub mod progress;
pub mod progression;
pub mod reconcile;
pub mod rotation;
pub mod warmup;

pub use builder::ScheduleBuilder;
pub use max_testing::{plan_max_testing, BaselineUpdate, MaxTestCandidate, MaxTestPlan};
pub use progress::{summarize, CycleProgress};
pub use reconcile::{reconcile_duplicates, Reconciliation};

use crate::cycle::Cycle;
use crate::error::ConfigurationError;
use crate::exercises::{Exercise, ExerciseLookup, MaxLookup, MaxRecord};
use crate::workout::{ScheduledSet, ScheduledWorkout, SetDetail, Target};

/// Expand a cycle into its full list of scheduled workouts
pub fn build_schedule<E, M>(
    cycle: &Cycle,
    exercises: &E,
    maxes: &M,
) -> Result<Vec<ScheduledWorkout>, ConfigurationError>
where
    E: ExerciseLookup + ?Sized,
    M: MaxLookup + ?Sized,
{
    ScheduleBuilder::new(cycle, exercises, maxes).build()
}

/// Live target for a set.
///
/// Working sets are recomputed from `current_max`; warm-ups keep the
/// target sized from their max snapshot.
pub fn compute_set_target(
    set: &ScheduledSet,
    exercise: &Exercise,
    current_max: Option<&MaxRecord>,
) -> Target {
    match &set.detail {
        SetDetail::Warmup(warmup) => Target::Value(warmup.target),
        SetDetail::MaxTest { .. } => Target::MaxAttempt,
        SetDetail::Working(detail) => progression::working_target(
            detail,
            exercise.measurement,
            current_max.and_then(|m| m.value(exercise.measurement)),
        ),
    }
}

/// Weight to use for a set, if the exercise tracks weight
pub fn compute_set_weight(set: &ScheduledSet, exercise: &Exercise) -> Option<f64> {
    match &set.detail {
        SetDetail::Working(detail) => progression::working_weight(detail)
            .or_else(|| exercise.default_weight.filter(|_| exercise.tracks_weight)),
        _ => None,
    }
}
