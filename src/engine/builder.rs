//! Composes the day skeleton and calculators into scheduled workouts

use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;

use super::conditioning::conditioning_detail;
use super::progression::working_detail;
use super::rotation::{SkeletonDay, skeleton};
use super::warmup::{wants_warmup, warmup_detail};
use crate::cycle::{Cycle, ExerciseAssignment};
use crate::error::ConfigurationError;
use crate::exercises::{Exercise, ExerciseLookup, MaxLookup};
use crate::workout::{ScheduledSet, ScheduledWorkout, SetDetail, WorkoutStatus};

/// Deterministic id for a cycle-generated workout
pub fn workout_id(cycle_id: &str, sequence_number: u32) -> String {
    let name = format!("{}:{}", cycle_id, sequence_number);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

/// Builds the full workout list for one cycle
pub struct ScheduleBuilder<'a, E: ?Sized, M: ?Sized> {
    cycle: &'a Cycle,
    exercises: &'a E,
    maxes: &'a M,
    /// Occurrences seen so far per exercise, for per-workout progression
    occurrences: HashMap<String, u32>,
}

impl<'a, E, M> ScheduleBuilder<'a, E, M>
where
    E: ExerciseLookup + ?Sized,
    M: MaxLookup + ?Sized,
{
    pub fn new(cycle: &'a Cycle, exercises: &'a E, maxes: &'a M) -> Self {
        Self {
            cycle,
            exercises,
            maxes,
            occurrences: HashMap::new(),
        }
    }

    pub fn build(mut self) -> Result<Vec<ScheduledWorkout>, ConfigurationError> {
        let days = skeleton(self.cycle)?;
        let workouts: Vec<ScheduledWorkout> = days.iter().map(|day| self.build_day(day)).collect();

        debug!(
            cycle_id = %self.cycle.id,
            workouts = workouts.len(),
            "schedule.built"
        );
        Ok(workouts)
    }

    fn build_day(&mut self, day: &SkeletonDay) -> ScheduledWorkout {
        let cycle = self.cycle;
        let exercises = self.exercises;
        // validate() guarantees every rotation entry names a group
        let group = cycle.group(&day.group_id);
        let mut sets = Vec::new();

        for assignment in group.map(|g| g.assignments.as_slice()).unwrap_or_default() {
            let Some(exercise) = exercises.exercise(&assignment.exercise_id) else {
                warn!(
                    cycle_id = %cycle.id,
                    group_id = %day.group_id,
                    exercise_id = %assignment.exercise_id,
                    "schedule.unknown_exercise_skipped"
                );
                continue;
            };
            self.push_exercise_sets(&mut sets, day, assignment, exercise);
        }

        ScheduledWorkout {
            id: workout_id(&cycle.id, day.sequence_number),
            cycle_id: cycle.id.clone(),
            sequence_number: day.sequence_number,
            week_number: day.week_number,
            day_in_week: day.day_in_week,
            scheduled_date: day.date,
            group_id: day.group_id.clone(),
            group_name: group.map(|g| g.name.clone()).unwrap_or_default(),
            rfem_value: day.rfem_value,
            sets,
            status: WorkoutStatus::Pending,
            completed_at: None,
            ad_hoc: false,
        }
    }

    fn push_exercise_sets(
        &mut self,
        sets: &mut Vec<ScheduledSet>,
        day: &SkeletonDay,
        assignment: &ExerciseAssignment,
        exercise: &Exercise,
    ) {
        let cycle = self.cycle;
        let occurrence = self.occurrences.entry(exercise.id.clone()).or_insert(0);
        let occurrence_index = *occurrence;
        *occurrence += 1;

        if wants_warmup(&cycle.warmups, Some(assignment), exercise) {
            let previous_max = self
                .maxes
                .latest_max(&exercise.id)
                .and_then(|m| m.value(exercise.measurement));
            if let Some(detail) = warmup_detail(previous_max, cycle.warmups.percentage) {
                sets.push(new_set(sets.len(), exercise, SetDetail::Warmup(detail)));
            }
        }

        let detail = if exercise.is_conditioning() {
            conditioning_detail(cycle, assignment, exercise, day.week_number)
        } else {
            working_detail(
                cycle,
                assignment,
                day.rfem_value,
                day.week_number,
                occurrence_index,
            )
        };

        for _ in 0..assignment.working_sets.max(1) {
            sets.push(new_set(sets.len(), exercise, SetDetail::Working(detail.clone())));
        }
    }
}

pub(crate) fn new_set(index: usize, exercise: &Exercise, detail: SetDetail) -> ScheduledSet {
    ScheduledSet {
        set_number: index as u32 + 1,
        exercise_id: exercise.id.clone(),
        exercise_name: exercise.name.clone(),
        movement_type: exercise.movement_type,
        measurement: exercise.measurement,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::tests::create_cycle;
    use crate::cycle::{
        CycleProgression, ExerciseProgression, LinearTrack, ProgressionInterval, Rotation,
    };
    use crate::exercises::{ExerciseMode, LatestMaxes, MaxRecord, MeasurementType, MovementType};
    use crate::workout::WorkingDetail;
    use chrono::Utc;

    fn create_exercise(id: &str, movement_type: MovementType) -> Exercise {
        Exercise {
            id: id.to_string(),
            name: id.to_string(),
            movement_type,
            mode: ExerciseMode::Standard,
            measurement: MeasurementType::Reps,
            default_conditioning_baseline: None,
            tracks_weight: false,
            default_weight: None,
        }
    }

    fn create_max(exercise_id: &str, reps: u32) -> MaxRecord {
        MaxRecord {
            id: None,
            exercise_id: exercise_id.to_string(),
            reps: Some(reps),
            seconds: None,
            weight: None,
            recorded_at: Utc::now(),
            notes: None,
        }
    }

    fn catalog() -> HashMap<String, Exercise> {
        [
            create_exercise("pushups", MovementType::Push),
            create_exercise("squats", MovementType::Legs),
        ]
        .into_iter()
        .map(|e| (e.id.clone(), e))
        .collect()
    }

    #[test]
    fn test_one_workout_per_day_with_contiguous_sequence() {
        let cycle = create_cycle("c1", 4, 3);
        let workouts = ScheduleBuilder::new(&cycle, &catalog(), &LatestMaxes::default())
            .build()
            .unwrap();

        assert_eq!(workouts.len(), 12);
        let sequence: Vec<u32> = workouts.iter().map(|w| w.sequence_number).collect();
        assert_eq!(sequence, (1..=12).collect::<Vec<_>>());
        assert_eq!(workouts[0].group_id, "a");
        assert_eq!(workouts[1].group_id, "b");
        assert_eq!(workouts[0].group_name, "Upper");
    }

    #[test]
    fn test_build_is_deterministic() {
        let cycle = create_cycle("c1", 2, 2);
        let maxes = LatestMaxes::from_history(vec![create_max("pushups", 15)]);
        let first = ScheduleBuilder::new(&cycle, &catalog(), &maxes).build().unwrap();
        let second = ScheduleBuilder::new(&cycle, &catalog(), &maxes).build().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_warmup_precedes_working_set() {
        let mut cycle = create_cycle("c1", 1, 2);
        cycle.warmups.include_warmup_sets = true;
        let maxes = LatestMaxes::from_history(vec![create_max("pushups", 20)]);

        let workouts = ScheduleBuilder::new(&cycle, &catalog(), &maxes).build().unwrap();

        let upper = &workouts[0];
        assert_eq!(upper.sets.len(), 2);
        assert!(upper.sets[0].is_warmup());
        assert_eq!(upper.sets[0].set_number, 1);
        assert!(matches!(
            upper.sets[0].detail,
            SetDetail::Warmup(crate::workout::WarmupDetail { target: 4, .. })
        ));
        assert_eq!(upper.sets[1].set_number, 2);

        // No max for squats, so no warm-up
        let lower = &workouts[1];
        assert_eq!(lower.sets.len(), 1);
        assert!(!lower.has_warmup());
    }

    #[test]
    fn test_unknown_exercise_is_skipped() {
        let mut cycle = create_cycle("c1", 1, 1);
        cycle.groups[0]
            .assignments
            .insert(0, ExerciseAssignment::new("deleted"));

        let workouts = ScheduleBuilder::new(&cycle, &catalog(), &LatestMaxes::default())
            .build()
            .unwrap();

        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].sets.len(), 1);
        assert_eq!(workouts[0].sets[0].exercise_id, "pushups");
        assert_eq!(workouts[0].sets[0].set_number, 1);
    }

    #[test]
    fn test_per_workout_counts_exercise_occurrences() {
        let mut cycle = create_cycle("c1", 1, 4);
        cycle.progression_mode = CycleProgression::Mixed;
        cycle.rotation = Rotation::new(vec!["a".into(), "b".into()], vec![3]).unwrap();
        let assignment = &mut cycle.groups[0].assignments[0];
        assignment.progression_mode = Some(ExerciseProgression::Simple);
        assignment.simple.reps = Some(LinearTrack {
            base: 10.0,
            increment: 1.0,
            interval: ProgressionInterval::PerWorkout,
        });

        let workouts = ScheduleBuilder::new(&cycle, &catalog(), &LatestMaxes::default())
            .build()
            .unwrap();

        // Upper falls on days 1 and 3; its second occurrence has index 1
        let indexes: Vec<u32> = [0, 2]
            .iter()
            .map(|&i| match &workouts[i].sets[0].detail {
                SetDetail::Working(WorkingDetail::Simple {
                    occurrence_index, ..
                }) => *occurrence_index,
                other => panic!("unexpected detail {:?}", other),
            })
            .collect();
        assert_eq!(indexes, vec![0, 1]);

        // Lower stays RFEM in the mixed cycle
        assert!(matches!(
            workouts[1].sets[0].detail,
            SetDetail::Working(WorkingDetail::Rfem { rfem_value: 3 })
        ));
    }

    #[test]
    fn test_multiple_working_sets() {
        let mut cycle = create_cycle("c1", 1, 1);
        cycle.groups[0].assignments[0].working_sets = 3;
        let workouts = ScheduleBuilder::new(&cycle, &catalog(), &LatestMaxes::default())
            .build()
            .unwrap();
        let numbers: Vec<u32> = workouts[0].sets.iter().map(|s| s.set_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_days_config_error() {
        let mut cycle = create_cycle("c1", 1, 1);
        cycle.workout_days_per_week = 0;
        let result = ScheduleBuilder::new(&cycle, &catalog(), &LatestMaxes::default()).build();
        assert_eq!(result, Err(ConfigurationError::ZeroDaysPerWeek));
    }

    #[test]
    fn test_workout_ids_stable_and_distinct() {
        assert_eq!(workout_id("c1", 1), workout_id("c1", 1));
        assert_ne!(workout_id("c1", 1), workout_id("c1", 2));
        assert_ne!(workout_id("c1", 1), workout_id("c2", 1));
    }
}
