//! Day skeleton: maps each cycle day onto the group and RFEM rotations

use chrono::{Days, NaiveDate};

use crate::cycle::Cycle;
use crate::error::ConfigurationError;

/// One scheduled day before any set detail is filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonDay {
    pub sequence_number: u32,
    pub week_number: u32,
    pub day_in_week: u32,
    pub group_id: String,
    pub rfem_value: u32,
    pub date: NaiveDate,
}

/// Days after the week's start for `day` (1-based).
///
/// Up to seven days are spaced `⌊7 / days_per_week⌋` apart. Beyond that
/// several workouts share a date, still inside the same week.
fn day_offset(day: u32, days_per_week: u32) -> u64 {
    let (day, per_week) = (day as u64 - 1, days_per_week as u64);
    if per_week <= 7 {
        day * (7 / per_week)
    } else {
        day * 7 / per_week
    }
}

/// Expand a cycle into `weeks × days_per_week` skeleton days.
///
/// Both rotations advance by one per day and wrap independently, so an
/// RFEM rotation like `[3, 4, 5, 4]` waves regardless of week length.
pub fn skeleton(cycle: &Cycle) -> Result<Vec<SkeletonDay>, ConfigurationError> {
    cycle.validate()?;

    let days_per_week = cycle.workout_days_per_week;
    let mut days = Vec::with_capacity(cycle.total_workouts() as usize);

    for week in 1..=cycle.number_of_weeks {
        for day in 1..=days_per_week {
            let index = days.len();
            let offset = 7 * (week as u64 - 1) + day_offset(day, days_per_week);
            days.push(SkeletonDay {
                sequence_number: index as u32 + 1,
                week_number: week,
                day_in_week: day,
                group_id: cycle.rotation.group_at(index).to_string(),
                rfem_value: cycle.rotation.rfem_at(index),
                date: cycle
                    .start_date
                    .checked_add_days(Days::new(offset))
                    .unwrap_or(cycle.start_date),
            });
        }
    }

    Ok(days)
}
