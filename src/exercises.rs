//! Exercise definitions and personal max records

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Movement types used to spread max tests across days
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Push,
    Pull,
    Legs,
    Core,
    Balance,
    Mobility,
    Other,
}

impl MovementType {
    pub fn emoji(&self) -> &'static str {
        match self {
            MovementType::Push => "💪",
            MovementType::Pull => "🏋️",
            MovementType::Legs => "🦵",
            MovementType::Core => "🎯",
            MovementType::Balance => "🤸",
            MovementType::Mobility => "🧘",
            MovementType::Other => "•",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Push => "push",
            MovementType::Pull => "pull",
            MovementType::Legs => "legs",
            MovementType::Core => "core",
            MovementType::Balance => "balance",
            MovementType::Mobility => "mobility",
            MovementType::Other => "other",
        }
    }

    /// All movement types for iteration
    pub fn all() -> &'static [MovementType] {
        &[
            MovementType::Push,
            MovementType::Pull,
            MovementType::Legs,
            MovementType::Core,
            MovementType::Balance,
            MovementType::Mobility,
            MovementType::Other,
        ]
    }
}

impl FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MovementType::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown movement type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseMode {
    #[default]
    Standard,
    /// Fixed target with a flat weekly step, never derived from a max
    Conditioning,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementType {
    #[default]
    Reps,
    /// Seconds held or worked
    Time,
}

impl MeasurementType {
    /// Render a numeric target in this measurement's unit
    pub fn format_value(&self, value: u32) -> String {
        match self {
            MeasurementType::Reps => value.to_string(),
            MeasurementType::Time => format!("{}:{:02}", value / 60, value % 60),
        }
    }
}

/// User-defined movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub movement_type: MovementType,
    #[serde(default)]
    pub mode: ExerciseMode,
    #[serde(default)]
    pub measurement: MeasurementType,
    /// Default conditioning baseline (reps or seconds, per `measurement`)
    #[serde(default)]
    pub default_conditioning_baseline: Option<u32>,
    #[serde(default)]
    pub tracks_weight: bool,
    #[serde(default)]
    pub default_weight: Option<f64>,
}

impl Exercise {
    pub fn is_conditioning(&self) -> bool {
        self.mode == ExerciseMode::Conditioning
    }

    pub fn is_timed(&self) -> bool {
        self.measurement == MeasurementType::Time
    }
}

/// A recorded best performance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaxRecord {
    pub id: Option<i64>,
    pub exercise_id: String,
    pub reps: Option<u32>,
    pub seconds: Option<u32>,
    pub weight: Option<f64>,
    pub recorded_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl MaxRecord {
    /// Best performance in the given unit, if recorded
    pub fn value(&self, measurement: MeasurementType) -> Option<u32> {
        match measurement {
            MeasurementType::Reps => self.reps,
            MeasurementType::Time => self.seconds,
        }
    }
}

/// Exercise lookup by id
pub trait ExerciseLookup {
    fn exercise(&self, id: &str) -> Option<&Exercise>;
}

/// Most recent max per exercise
pub trait MaxLookup {
    fn latest_max(&self, exercise_id: &str) -> Option<&MaxRecord>;
}

impl ExerciseLookup for HashMap<String, Exercise> {
    fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.get(id)
    }
}

impl ExerciseLookup for [Exercise] {
    fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.iter().find(|e| e.id == id)
    }
}

/// Latest max record per exercise, reduced from a full history
#[derive(Debug, Clone, Default)]
pub struct LatestMaxes {
    by_exercise: HashMap<String, MaxRecord>,
}

impl LatestMaxes {
    pub fn from_history(records: impl IntoIterator<Item = MaxRecord>) -> Self {
        let mut by_exercise: HashMap<String, MaxRecord> = HashMap::new();
        for record in records {
            match by_exercise.get(&record.exercise_id) {
                Some(existing) if existing.recorded_at >= record.recorded_at => {}
                _ => {
                    by_exercise.insert(record.exercise_id.clone(), record);
                }
            }
        }
        Self { by_exercise }
    }

    pub fn len(&self) -> usize {
        self.by_exercise.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_exercise.is_empty()
    }
}

impl MaxLookup for LatestMaxes {
    fn latest_max(&self, exercise_id: &str) -> Option<&MaxRecord> {
        self.by_exercise.get(exercise_id)
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
