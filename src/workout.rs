//! Scheduled workouts and sets produced by the engine

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cycle::LinearTrack;
use crate::exercises::{MeasurementType, MovementType};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    #[default]
    Pending,
    Completed,
    Partial,
    Skipped,
}

impl WorkoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Partial => "partial",
            Self::Skipped => "skipped",
        }
    }

    /// Completed or partially completed
    pub fn has_progress(&self) -> bool {
        matches!(self, Self::Completed | Self::Partial)
    }
}

impl fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for WorkoutStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "partial" => Ok(Self::Partial),
            "skipped" => Ok(Self::Skipped),
            _ => Err(format!("Unknown workout status: {}", s)),
        }
    }
}

/// Warm-up sized from a fixed snapshot of the previous max
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WarmupDetail {
    pub percentage: u32,
    pub previous_max: u32,
    pub target: u32,
}

/// Parameters needed to redisplay a working set without the cycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WorkingDetail {
    Rfem {
        rfem_value: u32,
    },
    Simple {
        reps: Option<LinearTrack>,
        seconds: Option<LinearTrack>,
        weight: Option<LinearTrack>,
        week_number: u32,
        occurrence_index: u32,
    },
    Conditioning {
        baseline: Option<u32>,
        weekly_increment: u32,
        week_number: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SetDetail {
    Warmup(WarmupDetail),
    Working(WorkingDetail),
    MaxTest { previous_max: Option<u32> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledSet {
    pub set_number: u32,
    pub exercise_id: String,
    pub exercise_name: String,
    pub movement_type: MovementType,
    pub measurement: MeasurementType,
    pub detail: SetDetail,
}

impl ScheduledSet {
    pub fn is_warmup(&self) -> bool {
        matches!(self.detail, SetDetail::Warmup(_))
    }

    pub fn is_max_test(&self) -> bool {
        matches!(self.detail, SetDetail::MaxTest { .. })
    }

    pub fn is_conditioning(&self) -> bool {
        matches!(
            self.detail,
            SetDetail::Working(WorkingDetail::Conditioning { .. })
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledWorkout {
    pub id: String,
    pub cycle_id: String,
    /// 1-indexed position in the whole cycle
    pub sequence_number: u32,
    pub week_number: u32,
    pub day_in_week: u32,
    pub scheduled_date: NaiveDate,
    pub group_id: String,
    pub group_name: String,
    pub rfem_value: u32,
    pub sets: Vec<ScheduledSet>,
    #[serde(default)]
    pub status: WorkoutStatus,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Added by hand rather than generated from the cycle rotation
    #[serde(default)]
    pub ad_hoc: bool,
}

impl ScheduledWorkout {
    pub fn has_warmup(&self) -> bool {
        self.sets.iter().any(|s| s.is_warmup())
    }
}

/// Numeric goal for a set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Value(u32),
    /// No max recorded yet; never shown as zero
    Unestablished,
    /// Max attempt, the athlete fills in the result
    MaxAttempt,
}

impl Target {
    pub fn value(&self) -> Option<u32> {
        match self {
            Target::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn display(&self, measurement: MeasurementType) -> String {
        match self {
            Target::Value(v) => measurement.format_value(*v),
            Target::Unestablished => "not yet established".to_string(),
            Target::MaxAttempt => "max".to_string(),
        }
    }
}
