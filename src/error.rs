//! Error types for cycle configuration and planning

use thiserror::Error;

/// The cycle configuration cannot be scheduled as given.
///
/// Not retryable until the configuration changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("group rotation is empty")]
    EmptyGroupRotation,
    #[error("RFEM rotation is empty")]
    EmptyRfemRotation,
    #[error("cycle must span at least one week")]
    ZeroWeeks,
    #[error("cycle must have at least one workout day per week")]
    ZeroDaysPerWeek,
    #[error("group rotation references unknown group {0}")]
    UnknownGroup(String),
    #[error("exercise {exercise_id} appears more than once in group {group_id}")]
    DuplicateAssignment {
        group_id: String,
        exercise_id: String,
    },
}

/// The user asked for something that has nothing to act on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("select at least one exercise")]
    NoExercisesSelected,
    #[error("nothing to schedule")]
    NothingToSchedule,
    #[error("unknown cycle {0}")]
    UnknownCycle(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("cycle {0} already has generated workouts; its groups and rotation are locked")]
    CyclePlanLocked(String),
}
