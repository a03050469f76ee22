//! Working-set targets for RFEM and simple progression

use crate::cycle::{Cycle, ExerciseAssignment, ExerciseProgression, LinearTrack};
use crate::exercises::MeasurementType;
use crate::workout::{Target, WorkingDetail};

/// `current_max - rfem_value`, never below 1
pub fn rfem_target(current_max: u32, rfem_value: u32) -> u32 {
    current_max.saturating_sub(rfem_value).max(1)
}

/// `base + increment × progression_count`, rounded to whole units
pub fn simple_target(track: &LinearTrack, week_number: u32, occurrence_index: u32) -> u32 {
    let count = track.progression_count(week_number, occurrence_index);
    track.value_at(count).round().max(0.0) as u32
}

/// Snapshot the parameters of a non-conditioning working set
pub fn working_detail(
    cycle: &Cycle,
    assignment: &ExerciseAssignment,
    rfem_value: u32,
    week_number: u32,
    occurrence_index: u32,
) -> WorkingDetail {
    match cycle.resolve_progression(assignment) {
        ExerciseProgression::Rfem => WorkingDetail::Rfem { rfem_value },
        ExerciseProgression::Simple => WorkingDetail::Simple {
            reps: assignment.simple.reps,
            seconds: assignment.simple.seconds,
            weight: assignment.simple.weight,
            week_number,
            occurrence_index,
        },
    }
}

/// Live target for an RFEM or simple working set.
///
/// RFEM targets are recomputed from the current max every time they are
/// read; without a max the target is unestablished.
pub fn working_target(
    detail: &WorkingDetail,
    measurement: MeasurementType,
    current_max: Option<u32>,
) -> Target {
    match detail {
        WorkingDetail::Rfem { rfem_value } => match current_max {
            Some(max) => Target::Value(rfem_target(max, *rfem_value)),
            None => Target::Unestablished,
        },
        WorkingDetail::Simple {
            reps,
            seconds,
            week_number,
            occurrence_index,
            ..
        } => {
            let track = match measurement {
                MeasurementType::Reps => reps,
                MeasurementType::Time => seconds,
            };
            match track {
                Some(track) => Target::Value(simple_target(track, *week_number, *occurrence_index)),
                None => Target::Unestablished,
            }
        }
        WorkingDetail::Conditioning {
            baseline,
            weekly_increment,
            week_number,
        } => match baseline {
            Some(base) => Target::Value(super::conditioning::conditioning_target(
                *base,
                *weekly_increment,
                *week_number,
            )),
            None => Target::Unestablished,
        },
    }
}

/// Weight for a simple-mode set with a weight track
pub fn working_weight(detail: &WorkingDetail) -> Option<f64> {
    match detail {
        WorkingDetail::Simple {
            weight: Some(track),
            week_number,
            occurrence_index,
            ..
        } => Some(track.value_at(track.progression_count(*week_number, *occurrence_index))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::tests::create_cycle;
    use crate::cycle::{CycleProgression, ProgressionInterval};

    fn create_track(base: f64, increment: f64, interval: ProgressionInterval) -> LinearTrack {
        LinearTrack {
            base,
            increment,
            interval,
        }
    }

    #[test]
    fn test_rfem_target() {
        assert_eq!(rfem_target(15, 4), 11);
        assert_eq!(rfem_target(3, 5), 1);
        assert_eq!(rfem_target(5, 5), 1);
        assert_eq!(rfem_target(20, 0), 20);
    }

    #[test]
    fn test_simple_per_week() {
        let track = create_track(10.0, 2.0, ProgressionInterval::PerWeek);
        assert_eq!(simple_target(&track, 1, 0), 10);
        assert_eq!(simple_target(&track, 3, 0), 14);
    }

    #[test]
    fn test_simple_per_workout() {
        let track = create_track(8.0, 1.0, ProgressionInterval::PerWorkout);
        assert_eq!(simple_target(&track, 1, 0), 8);
        assert_eq!(simple_target(&track, 1, 1), 9);
        assert_eq!(simple_target(&track, 2, 5), 13);
    }

    #[test]
    fn test_simple_constant() {
        let track = create_track(30.0, 5.0, ProgressionInterval::Constant);
        assert_eq!(simple_target(&track, 4, 7), 30);
    }

    #[test]
    fn test_rfem_without_max_is_unestablished() {
        let detail = WorkingDetail::Rfem { rfem_value: 3 };
        assert_eq!(
            working_target(&detail, MeasurementType::Reps, None),
            Target::Unestablished
        );
        assert_eq!(
            working_target(&detail, MeasurementType::Reps, Some(12)),
            Target::Value(9)
        );
    }

    #[test]
    fn test_simple_uses_measurement_track() {
        let detail = WorkingDetail::Simple {
            reps: None,
            seconds: Some(create_track(30.0, 10.0, ProgressionInterval::PerWeek)),
            weight: None,
            week_number: 2,
            occurrence_index: 0,
        };
        assert_eq!(
            working_target(&detail, MeasurementType::Time, None),
            Target::Value(40)
        );
        assert_eq!(
            working_target(&detail, MeasurementType::Reps, Some(20)),
            Target::Unestablished
        );
    }

    #[test]
    fn test_working_weight() {
        let detail = WorkingDetail::Simple {
            reps: Some(create_track(5.0, 0.0, ProgressionInterval::Constant)),
            seconds: None,
            weight: Some(create_track(10.0, 2.5, ProgressionInterval::PerWeek)),
            week_number: 3,
            occurrence_index: 0,
        };
        assert_eq!(working_weight(&detail), Some(15.0));
        assert_eq!(working_weight(&WorkingDetail::Rfem { rfem_value: 3 }), None);
    }

    #[test]
    fn test_mixed_dispatch() {
        let mut cycle = create_cycle("c1", 4, 3);
        cycle.progression_mode = CycleProgression::Mixed;

        let mut assignment = ExerciseAssignment::new("pushups");
        assert_eq!(
            working_detail(&cycle, &assignment, 4, 1, 0),
            WorkingDetail::Rfem { rfem_value: 4 }
        );

        assignment.progression_mode = Some(ExerciseProgression::Simple);
        assert!(matches!(
            working_detail(&cycle, &assignment, 4, 2, 1),
            WorkingDetail::Simple {
                week_number: 2,
                occurrence_index: 1,
                ..
            }
        ));
    }
}
