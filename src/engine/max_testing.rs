//! Max-testing cycles
//!
//! Spreads the exercises to re-test over the fewest days such that no day
//! tests two exercises of the same movement type. Conditioning exercises
//! are never tested; they only get a new baseline.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use super::builder::new_set;
use super::warmup::warmup_detail;
use crate::cycle::{
    ConditioningIncrement, Cycle, CycleProgression, CycleStatus, CycleType,
    DEFAULT_WARMUP_PERCENTAGE, ExerciseAssignment, Group, Rotation, WarmupSettings,
};
use crate::error::ValidationError;
use crate::exercises::{Exercise, MovementType};
use crate::workout::{ScheduledWorkout, SetDetail, WorkoutStatus};

/// RFEM value marking a day as a max test rather than an RFEM day
pub const MAX_TEST_RFEM: u32 = 0;

/// An exercise the athlete wants to re-test
#[derive(Debug, Clone)]
pub struct MaxTestCandidate {
    pub exercise: Exercise,
    /// Latest max, used to size the warm-up
    pub previous_max: Option<u32>,
    /// New baseline for a conditioning exercise
    pub new_baseline: Option<u32>,
}

/// Baseline change for a conditioning exercise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineUpdate {
    pub exercise_id: String,
    pub baseline: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct MaxTestPlan {
    pub cycle: Cycle,
    pub workouts: Vec<ScheduledWorkout>,
    /// Previously active cycle, now `completed`
    pub demoted: Option<Cycle>,
    pub baseline_updates: Vec<BaselineUpdate>,
}

/// Number of days needed so each day has at most one exercise per type
pub fn days_needed(standard: &[&MaxTestCandidate]) -> usize {
    let mut counts: Vec<(MovementType, usize)> = Vec::new();
    for candidate in standard {
        let movement = candidate.exercise.movement_type;
        match counts.iter_mut().find(|(m, _)| *m == movement) {
            Some((_, count)) => *count += 1,
            None => counts.push((movement, 1)),
        }
    }
    counts.iter().map(|(_, count)| *count).max().unwrap_or(0)
}

/// Assign exercises to days; the i-th exercise of each type lands on day i.
///
/// Movement types keep the order in which they first appear.
pub fn distribute<'c>(standard: &[&'c MaxTestCandidate]) -> Vec<Vec<&'c MaxTestCandidate>> {
    let mut by_type: Vec<(MovementType, Vec<&'c MaxTestCandidate>)> = Vec::new();
    for &candidate in standard {
        let movement = candidate.exercise.movement_type;
        match by_type.iter_mut().find(|(m, _)| *m == movement) {
            Some((_, list)) => list.push(candidate),
            None => by_type.push((movement, vec![candidate])),
        }
    }

    let mut days: Vec<Vec<&'c MaxTestCandidate>> = vec![Vec::new(); days_needed(standard)];
    for (_, list) in by_type {
        for (i, candidate) in list.into_iter().enumerate() {
            days[i].push(candidate);
        }
    }
    days
}

pub fn day_name(day: usize, total: usize) -> String {
    if total == 1 {
        "Max Test".to_string()
    } else {
        format!("Max Test Day {}", day)
    }
}

/// Plan a max-testing cycle starting on `start_date`.
///
/// The returned cycle is already `active`; the caller must persist the
/// demotion of `previous` and the new cycle as one unit.
pub fn plan_max_testing(
    selected: &[MaxTestCandidate],
    previous: Option<&Cycle>,
    start_date: NaiveDate,
) -> Result<MaxTestPlan, ValidationError> {
    // First selection of an exercise wins; repeats would add days
    let mut seen = HashSet::new();
    let (standard, conditioning): (Vec<&MaxTestCandidate>, Vec<&MaxTestCandidate>) = selected
        .iter()
        .filter(|c| seen.insert(c.exercise.id.as_str()))
        .partition(|c| !c.exercise.is_conditioning());

    if standard.is_empty() {
        return Err(ValidationError::NoExercisesSelected);
    }

    let days = distribute(&standard);
    if days.is_empty() {
        return Err(ValidationError::NothingToSchedule);
    }

    let cycle_id = Uuid::new_v4().to_string();
    let total = days.len();

    let groups: Vec<Group> = days
        .iter()
        .enumerate()
        .map(|(i, day)| Group {
            id: format!("{}-day-{}", cycle_id, i + 1),
            name: day_name(i + 1, total),
            assignments: day
                .iter()
                .map(|c| ExerciseAssignment::new(c.exercise.id.clone()))
                .collect(),
        })
        .collect();

    let rotation = Rotation::new(
        groups.iter().map(|g| g.id.clone()).collect(),
        vec![MAX_TEST_RFEM],
    )
    .map_err(|_| ValidationError::NothingToSchedule)?;

    let cycle = Cycle {
        id: cycle_id.clone(),
        name: "Max Testing".to_string(),
        cycle_type: CycleType::MaxTesting,
        progression_mode: CycleProgression::Rfem,
        start_date,
        number_of_weeks: 1,
        workout_days_per_week: total as u32,
        groups,
        rotation,
        conditioning_increment: ConditioningIncrement::default(),
        warmups: WarmupSettings {
            include_warmup_sets: true,
            include_timed_warmups: true,
            percentage: DEFAULT_WARMUP_PERCENTAGE,
        },
        status: CycleStatus::Active,
    };

    let workouts = days
        .iter()
        .zip(&cycle.groups)
        .enumerate()
        .map(|(i, (day, group))| {
            let mut sets = Vec::new();
            for candidate in day {
                let warmup = warmup_detail(candidate.previous_max, DEFAULT_WARMUP_PERCENTAGE);
                if let Some(detail) = warmup {
                    sets.push(new_set(
                        sets.len(),
                        &candidate.exercise,
                        SetDetail::Warmup(detail),
                    ));
                }
                sets.push(new_set(
                    sets.len(),
                    &candidate.exercise,
                    SetDetail::MaxTest {
                        previous_max: candidate.previous_max,
                    },
                ));
            }
            let sequence_number = i as u32 + 1;
            ScheduledWorkout {
                id: super::builder::workout_id(&cycle_id, sequence_number),
                cycle_id: cycle_id.clone(),
                sequence_number,
                week_number: 1,
                day_in_week: sequence_number,
                scheduled_date: start_date + chrono::Days::new(i as u64),
                group_id: group.id.clone(),
                group_name: group.name.clone(),
                rfem_value: MAX_TEST_RFEM,
                sets,
                status: WorkoutStatus::Pending,
                completed_at: None,
                ad_hoc: false,
            }
        })
        .collect();

    let demoted = previous.filter(|c| c.is_active()).map(|c| Cycle {
        status: CycleStatus::Completed,
        ..c.clone()
    });

    let baseline_updates = conditioning
        .iter()
        .map(|c| BaselineUpdate {
            exercise_id: c.exercise.id.clone(),
            baseline: c.new_baseline,
        })
        .collect();

    info!(
        cycle_id = %cycle.id,
        days = total,
        tested = standard.len(),
        conditioning = conditioning.len(),
        "max_test.planned"
    );

    Ok(MaxTestPlan {
        cycle,
        workouts,
        demoted,
        baseline_updates,
    })
}
