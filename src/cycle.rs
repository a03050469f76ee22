//! Training cycles - groups, rotations and progression settings

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CycleType {
    #[default]
    Training,
    MaxTesting,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    #[default]
    Planning,
    Active,
    Completed,
}

impl CycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CycleStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(Self::Planning),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Unknown cycle status: {}", s)),
        }
    }
}

/// Cycle-level progression mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CycleProgression {
    #[default]
    Rfem,
    Simple,
    /// Each assignment picks its own mode, RFEM when unset
    Mixed,
}

/// Progression mode resolved for a single exercise
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseProgression {
    Rfem,
    Simple,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionInterval {
    #[default]
    Constant,
    PerWorkout,
    PerWeek,
}

/// Linear progression for one dimension (reps, seconds or weight)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LinearTrack {
    pub base: f64,
    #[serde(default)]
    pub increment: f64,
    #[serde(default)]
    pub interval: ProgressionInterval,
}

impl LinearTrack {
    /// Number of increments applied at a given position in the cycle.
    ///
    /// `occurrence_index` is the zero-based count of this exercise's
    /// scheduled occurrences up to and including the current one.
    pub fn progression_count(&self, week_number: u32, occurrence_index: u32) -> u32 {
        match self.interval {
            ProgressionInterval::Constant => 0,
            ProgressionInterval::PerWorkout => occurrence_index,
            ProgressionInterval::PerWeek => week_number.saturating_sub(1),
        }
    }

    pub fn value_at(&self, progression_count: u32) -> f64 {
        self.base + self.increment * progression_count as f64
    }
}

/// Simple-mode parameters, tracked independently per dimension
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimpleProgression {
    #[serde(default)]
    pub reps: Option<LinearTrack>,
    #[serde(default)]
    pub seconds: Option<LinearTrack>,
    #[serde(default)]
    pub weight: Option<LinearTrack>,
}

/// One exercise inside a group, with cycle-scoped overrides
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseAssignment {
    pub exercise_id: String,
    /// Only consulted when the cycle mode is `mixed`
    #[serde(default)]
    pub progression_mode: Option<ExerciseProgression>,
    #[serde(default)]
    pub include_warmup: Option<bool>,
    #[serde(default)]
    pub conditioning_baseline: Option<u32>,
    #[serde(default)]
    pub conditioning_increment: Option<u32>,
    #[serde(default)]
    pub simple: SimpleProgression,
    #[serde(default = "default_working_sets")]
    pub working_sets: u32,
}

fn default_working_sets() -> u32 {
    1
}

impl ExerciseAssignment {
    pub fn new(exercise_id: impl Into<String>) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            progression_mode: None,
            include_warmup: None,
            conditioning_baseline: None,
            conditioning_increment: None,
            simple: SimpleProgression::default(),
            working_sets: default_working_sets(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub assignments: Vec<ExerciseAssignment>,
}

#[derive(Deserialize)]
struct RawRotation {
    groups: Vec<String>,
    rfem: Vec<u32>,
}

/// Group and RFEM rotations, both guaranteed non-empty
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawRotation")]
pub struct Rotation {
    groups: Vec<String>,
    rfem: Vec<u32>,
}

impl Rotation {
    pub fn new(groups: Vec<String>, rfem: Vec<u32>) -> Result<Self, ConfigurationError> {
        if groups.is_empty() {
            return Err(ConfigurationError::EmptyGroupRotation);
        }
        if rfem.is_empty() {
            return Err(ConfigurationError::EmptyRfemRotation);
        }
        Ok(Self { groups, rfem })
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn rfem(&self) -> &[u32] {
        &self.rfem
    }

    /// Group id for a zero-based day index, wrapping
    pub fn group_at(&self, index: usize) -> &str {
        &self.groups[index % self.groups.len()]
    }

    /// RFEM value for a zero-based day index, wrapping
    pub fn rfem_at(&self, index: usize) -> u32 {
        self.rfem[index % self.rfem.len()]
    }
}

impl TryFrom<RawRotation> for Rotation {
    type Error = ConfigurationError;

    fn try_from(raw: RawRotation) -> Result<Self, Self::Error> {
        Rotation::new(raw.groups, raw.rfem)
    }
}

/// Global weekly step for conditioning exercises without their own override
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConditioningIncrement {
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub seconds: Option<u32>,
}

pub const DEFAULT_WARMUP_PERCENTAGE: u32 = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WarmupSettings {
    #[serde(default)]
    pub include_warmup_sets: bool,
    #[serde(default)]
    pub include_timed_warmups: bool,
    #[serde(default = "default_warmup_percentage")]
    pub percentage: u32,
}

fn default_warmup_percentage() -> u32 {
    DEFAULT_WARMUP_PERCENTAGE
}

impl Default for WarmupSettings {
    fn default() -> Self {
        Self {
            include_warmup_sets: false,
            include_timed_warmups: false,
            percentage: DEFAULT_WARMUP_PERCENTAGE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cycle {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cycle_type: CycleType,
    #[serde(default)]
    pub progression_mode: CycleProgression,
    pub start_date: NaiveDate,
    pub number_of_weeks: u32,
    pub workout_days_per_week: u32,
    pub groups: Vec<Group>,
    pub rotation: Rotation,
    #[serde(default)]
    pub conditioning_increment: ConditioningIncrement,
    #[serde(default)]
    pub warmups: WarmupSettings,
    #[serde(default)]
    pub status: CycleStatus,
}

impl Cycle {
    pub fn total_workouts(&self) -> u32 {
        self.number_of_weeks.saturating_mul(self.workout_days_per_week)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn is_active(&self) -> bool {
        self.status == CycleStatus::Active
    }

    /// Check that the cycle can be expanded into a schedule
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.number_of_weeks == 0 {
            return Err(ConfigurationError::ZeroWeeks);
        }
        if self.workout_days_per_week == 0 {
            return Err(ConfigurationError::ZeroDaysPerWeek);
        }

        for group_id in self.rotation.groups() {
            if self.group(group_id).is_none() {
                return Err(ConfigurationError::UnknownGroup(group_id.clone()));
            }
        }

        for group in &self.groups {
            let mut seen = HashSet::new();
            for assignment in &group.assignments {
                if !seen.insert(assignment.exercise_id.as_str()) {
                    return Err(ConfigurationError::DuplicateAssignment {
                        group_id: group.id.clone(),
                        exercise_id: assignment.exercise_id.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Resolve the effective mode for one assignment.
    ///
    /// Never falls back to `simple` unless the athlete chose it.
    pub fn resolve_progression(&self, assignment: &ExerciseAssignment) -> ExerciseProgression {
        match self.progression_mode {
            CycleProgression::Rfem => ExerciseProgression::Rfem,
            CycleProgression::Simple => ExerciseProgression::Simple,
            CycleProgression::Mixed => assignment
                .progression_mode
                .unwrap_or(ExerciseProgression::Rfem),
        }
    }
}

/// Make `cycle_id` the only active cycle.
///
/// The previously active cycle, if any, is demoted to `completed`.
/// Returns the id of the demoted cycle.
pub fn activate(cycles: &mut [Cycle], cycle_id: &str) -> Result<Option<String>, ValidationError> {
    if !cycles.iter().any(|c| c.id == cycle_id) {
        return Err(ValidationError::UnknownCycle(cycle_id.to_string()));
    }

    let mut demoted = None;
    for cycle in cycles.iter_mut() {
        if cycle.id == cycle_id {
            cycle.status = CycleStatus::Active;
        } else if cycle.is_active() {
            cycle.status = CycleStatus::Completed;
            demoted = Some(cycle.id.clone());
        }
    }

    tracing::info!(cycle_id, demoted = ?demoted, "cycle.activated");
    Ok(demoted)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn create_cycle(id: &str, weeks: u32, days: u32) -> Cycle {
        Cycle {
            id: id.to_string(),
            name: format!("Cycle {}", id),
            cycle_type: CycleType::Training,
            progression_mode: CycleProgression::Rfem,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            number_of_weeks: weeks,
            workout_days_per_week: days,
            groups: vec![
                Group {
                    id: "a".to_string(),
                    name: "Upper".to_string(),
                    assignments: vec![ExerciseAssignment::new("pushups")],
                },
                Group {
                    id: "b".to_string(),
                    name: "Lower".to_string(),
                    assignments: vec![ExerciseAssignment::new("squats")],
                },
            ],
            rotation: Rotation::new(
                vec!["a".to_string(), "b".to_string()],
                vec![3, 4, 5, 4],
            )
            .unwrap(),
            conditioning_increment: ConditioningIncrement::default(),
            warmups: WarmupSettings::default(),
            status: CycleStatus::Planning,
        }
    }

    #[test]
    fn test_rotation_rejects_empty() {
        assert_eq!(
            Rotation::new(vec![], vec![3]),
            Err(ConfigurationError::EmptyGroupRotation)
        );
        assert_eq!(
            Rotation::new(vec!["a".to_string()], vec![]),
            Err(ConfigurationError::EmptyRfemRotation)
        );
    }

    #[test]
    fn test_rotation_deserialize_rejects_empty() {
        let json = r#"{"groups": [], "rfem": [3]}"#;
        assert!(serde_json::from_str::<Rotation>(json).is_err());

        let json = r#"{"groups": ["a"], "rfem": [3, 4]}"#;
        let rotation: Rotation = serde_json::from_str(json).unwrap();
        assert_eq!(rotation.rfem_at(3), 4);
    }

    #[test]
    fn test_rotation_wraps() {
        let rotation = Rotation::new(vec!["a".into(), "b".into(), "a".into()], vec![3, 4]).unwrap();
        assert_eq!(rotation.group_at(0), "a");
        assert_eq!(rotation.group_at(1), "b");
        assert_eq!(rotation.group_at(4), "b");
        assert_eq!(rotation.rfem_at(5), 4);
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(create_cycle("c1", 4, 3).validate(), Ok(()));
    }

    #[test]
    fn test_validate_zero_days() {
        assert_eq!(
            create_cycle("c1", 4, 0).validate(),
            Err(ConfigurationError::ZeroDaysPerWeek)
        );
        assert_eq!(
            create_cycle("c1", 0, 3).validate(),
            Err(ConfigurationError::ZeroWeeks)
        );
    }

    #[test]
    fn test_validate_unknown_group() {
        let mut cycle = create_cycle("c1", 4, 3);
        cycle.rotation = Rotation::new(vec!["a".into(), "zzz".into()], vec![3]).unwrap();
        assert_eq!(
            cycle.validate(),
            Err(ConfigurationError::UnknownGroup("zzz".to_string()))
        );
    }

    #[test]
    fn test_validate_duplicate_assignment() {
        let mut cycle = create_cycle("c1", 4, 3);
        cycle.groups[0]
            .assignments
            .push(ExerciseAssignment::new("pushups"));
        assert!(matches!(
            cycle.validate(),
            Err(ConfigurationError::DuplicateAssignment { .. })
        ));
    }

    #[test]
    fn test_resolve_progression() {
        let mut cycle = create_cycle("c1", 4, 3);
        let mut assignment = ExerciseAssignment::new("pushups");
        assignment.progression_mode = Some(ExerciseProgression::Simple);

        // Per-exercise mode is ignored outside mixed cycles
        assert_eq!(cycle.resolve_progression(&assignment), ExerciseProgression::Rfem);

        cycle.progression_mode = CycleProgression::Mixed;
        assert_eq!(cycle.resolve_progression(&assignment), ExerciseProgression::Simple);

        assignment.progression_mode = None;
        assert_eq!(cycle.resolve_progression(&assignment), ExerciseProgression::Rfem);

        cycle.progression_mode = CycleProgression::Simple;
        assert_eq!(cycle.resolve_progression(&assignment), ExerciseProgression::Simple);
    }

    #[test]
    fn test_activate_leaves_single_active() {
        let mut cycles = vec![
            create_cycle("c1", 4, 3),
            create_cycle("c2", 4, 3),
            create_cycle("c3", 4, 3),
        ];
        cycles[0].status = CycleStatus::Active;

        let demoted = activate(&mut cycles, "c3").unwrap();
        assert_eq!(demoted.as_deref(), Some("c1"));
        assert_eq!(cycles.iter().filter(|c| c.is_active()).count(), 1);
        assert_eq!(cycles[0].status, CycleStatus::Completed);
        assert_eq!(cycles[1].status, CycleStatus::Planning);
        assert!(cycles[2].is_active());
    }

    #[test]
    fn test_activate_unknown_cycle() {
        let mut cycles = vec![create_cycle("c1", 4, 3)];
        assert_eq!(
            activate(&mut cycles, "nope"),
            Err(ValidationError::UnknownCycle("nope".to_string()))
        );
    }

    #[test]
    fn test_linear_track_progression_count() {
        let track = LinearTrack {
            base: 10.0,
            increment: 2.0,
            interval: ProgressionInterval::PerWeek,
        };
        assert_eq!(track.value_at(track.progression_count(1, 5)), 10.0);
        assert_eq!(track.value_at(track.progression_count(3, 0)), 14.0);

        let constant = LinearTrack {
            interval: ProgressionInterval::Constant,
            ..track
        };
        assert_eq!(constant.progression_count(4, 9), 0);
    }
}
