//! Duplicate workout reconciliation
//!
//! Generation can run more than once for the same cycle from different
//! devices. After reconciliation exactly one workout remains per
//! `(cycle_id, sequence_number)`; ad-hoc workouts are never touched.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::workout::ScheduledWorkout;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub kept: Vec<ScheduledWorkout>,
    /// Ids to delete locally and retract from any remote replica
    pub removed_ids: Vec<String>,
}

/// Which of two duplicates to keep: warm-up first, then progress, then id
fn preference(a: &ScheduledWorkout, b: &ScheduledWorkout) -> Ordering {
    a.has_warmup()
        .cmp(&b.has_warmup())
        .then_with(|| a.status.has_progress().cmp(&b.status.has_progress()))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn reconcile_duplicates(workouts: Vec<ScheduledWorkout>) -> Reconciliation {
    let mut winners: HashMap<(&str, u32), usize> = HashMap::new();
    for (index, workout) in workouts.iter().enumerate() {
        if workout.ad_hoc {
            continue;
        }
        let key = (workout.cycle_id.as_str(), workout.sequence_number);
        match winners.get(&key) {
            Some(&current) if preference(workout, &workouts[current]) != Ordering::Greater => {}
            _ => {
                winners.insert(key, index);
            }
        }
    }

    let keep: Vec<bool> = workouts
        .iter()
        .enumerate()
        .map(|(index, w)| {
            w.ad_hoc || winners.get(&(w.cycle_id.as_str(), w.sequence_number)) == Some(&index)
        })
        .collect();

    // A loser may share its id with the winner; deleting that id would drop both
    let kept_ids: HashSet<&str> = workouts
        .iter()
        .zip(&keep)
        .filter(|(_, keep)| **keep)
        .map(|(w, _)| w.id.as_str())
        .collect();
    let removed_ids: Vec<String> = workouts
        .iter()
        .zip(&keep)
        .filter(|(w, keep)| !**keep && !kept_ids.contains(w.id.as_str()))
        .map(|(w, _)| w.id.clone())
        .collect();

    let mut result = Reconciliation {
        kept: Vec::new(),
        removed_ids,
    };
    for (workout, keep) in workouts.into_iter().zip(keep) {
        if keep {
            result.kept.push(workout);
        }
    }

    if !result.removed_ids.is_empty() {
        info!(removed = result.removed_ids.len(), "workouts.duplicates_removed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::{MeasurementType, MovementType};
    use crate::workout::{ScheduledSet, SetDetail, WarmupDetail, WorkingDetail, WorkoutStatus};
    use chrono::NaiveDate;

    fn create_set(detail: SetDetail) -> ScheduledSet {
        ScheduledSet {
            set_number: 1,
            exercise_id: "pushups".to_string(),
            exercise_name: "Pushups".to_string(),
            movement_type: MovementType::Push,
            measurement: MeasurementType::Reps,
            detail,
        }
    }

    fn create_workout(
        id: &str,
        sequence_number: u32,
        status: WorkoutStatus,
        warmup: bool,
    ) -> ScheduledWorkout {
        let mut sets = Vec::new();
        if warmup {
            sets.push(create_set(SetDetail::Warmup(WarmupDetail {
                percentage: 20,
                previous_max: 20,
                target: 4,
            })));
        }
        sets.push(create_set(SetDetail::Working(WorkingDetail::Rfem { rfem_value: 3 })));
        ScheduledWorkout {
            id: id.to_string(),
            cycle_id: "c1".to_string(),
            sequence_number,
            week_number: 1,
            day_in_week: sequence_number,
            scheduled_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            group_id: "a".to_string(),
            group_name: "Upper".to_string(),
            rfem_value: 3,
            sets,
            status,
            completed_at: None,
            ad_hoc: false,
        }
    }

    #[test]
    fn test_no_duplicates_is_noop() {
        let workouts = vec![
            create_workout("w1", 1, WorkoutStatus::Pending, false),
            create_workout("w2", 2, WorkoutStatus::Completed, true),
        ];
        let result = reconcile_duplicates(workouts.clone());
        assert!(result.removed_ids.is_empty());
        assert_eq!(result.kept, workouts);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let workouts = vec![
            create_workout("w1", 1, WorkoutStatus::Pending, false),
            create_workout("w2", 1, WorkoutStatus::Pending, true),
            create_workout("w3", 2, WorkoutStatus::Pending, false),
        ];
        let once = reconcile_duplicates(workouts);
        let twice = reconcile_duplicates(once.kept.clone());
        assert!(twice.removed_ids.is_empty());
        assert_eq!(twice.kept, once.kept);
    }

    #[test]
    fn test_warmup_beats_status() {
        let workouts = vec![
            create_workout("b", 1, WorkoutStatus::Completed, false),
            create_workout("a", 1, WorkoutStatus::Pending, true),
        ];
        let result = reconcile_duplicates(workouts);
        assert_eq!(result.kept.len(), 1);
        assert_eq!(result.kept[0].id, "a");
        assert_eq!(result.removed_ids, vec!["b".to_string()]);
    }

    #[test]
    fn test_progress_beats_pending() {
        let workouts = vec![
            create_workout("z", 1, WorkoutStatus::Pending, false),
            create_workout("a", 1, WorkoutStatus::Partial, false),
        ];
        let result = reconcile_duplicates(workouts);
        assert_eq!(result.kept[0].id, "a");
        assert_eq!(result.removed_ids, vec!["z".to_string()]);
    }

    #[test]
    fn test_later_id_breaks_ties() {
        let workouts = vec![
            create_workout("b", 1, WorkoutStatus::Pending, false),
            create_workout("c", 1, WorkoutStatus::Pending, false),
            create_workout("a", 1, WorkoutStatus::Pending, false),
        ];
        let result = reconcile_duplicates(workouts);
        assert_eq!(result.kept.len(), 1);
        assert_eq!(result.kept[0].id, "c");
        assert_eq!(result.removed_ids, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_shared_id_is_not_removed() {
        let workouts = vec![
            create_workout("same", 1, WorkoutStatus::Completed, false),
            create_workout("same", 1, WorkoutStatus::Pending, false),
        ];
        let result = reconcile_duplicates(workouts);
        assert_eq!(result.kept.len(), 1);
        assert_eq!(result.kept[0].status, WorkoutStatus::Completed);
        assert!(result.removed_ids.is_empty());
    }

    #[test]
    fn test_ad_hoc_never_removed() {
        let mut extra = create_workout("x", 1, WorkoutStatus::Pending, false);
        extra.ad_hoc = true;
        let workouts = vec![create_workout("w1", 1, WorkoutStatus::Pending, false), extra];
        let result = reconcile_duplicates(workouts);
        assert!(result.removed_ids.is_empty());
        assert_eq!(result.kept.len(), 2);
    }
}
