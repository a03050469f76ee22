//! repcycle - Personal strength-training planner
//!
//! Expands training cycles into dated workouts with RFEM, simple or mixed
//! progression, and plans max-testing cycles.

pub mod cycle;
pub mod db;
pub mod engine;
pub mod error;
pub mod exercises;
pub mod workout;

pub use db::Database;
pub use engine::{build_schedule, compute_set_target, plan_max_testing, reconcile_duplicates};
pub use error::{ConfigurationError, Error, ValidationError};
