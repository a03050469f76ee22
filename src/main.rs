//! repcycle - Personal strength-training planner

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};

use repcycle::Database;
use repcycle::cycle::Cycle;
use repcycle::engine::{self, MaxTestCandidate};
use repcycle::exercises::{
    Exercise, ExerciseLookup, ExerciseMode, LatestMaxes, MaxLookup, MaxRecord, MeasurementType,
    MovementType,
};

#[derive(Parser)]
#[command(name = "repcycle")]
#[command(author, version, about = "Strength-training cycle planner")]
struct Cli {
    /// SQLite database path
    #[arg(long, global = true, env = "REPCYCLE_DB", default_value = "repcycle.db")]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage exercises
    Exercise {
        #[command(subcommand)]
        action: ExerciseAction,
    },

    /// Record or list personal maxes
    Max {
        #[command(subcommand)]
        action: MaxAction,
    },

    /// Manage training cycles
    Cycle {
        #[command(subcommand)]
        action: CycleAction,
    },

    /// Generate and store the workouts of a cycle
    Schedule { cycle_id: String },

    /// Show a cycle's workouts with live targets
    Show {
        cycle_id: String,
        /// Only show this week
        #[arg(short, long)]
        week: Option<u32>,
    },

    /// Plan and activate a max-testing cycle
    MaxTest {
        /// Exercises to re-test
        #[arg(required = true)]
        exercise_ids: Vec<String>,
        /// New conditioning baseline, as EXERCISE=VALUE
        #[arg(short, long = "baseline", value_parser = parse_baseline)]
        baselines: Vec<(String, u32)>,
    },

    /// Remove duplicate workouts of a cycle
    Reconcile { cycle_id: String },

    /// Show how far a cycle has progressed
    Progress { cycle_id: String },
}

#[derive(Subcommand)]
enum ExerciseAction {
    /// Add or replace an exercise
    Add {
        id: String,
        name: String,
        #[arg(short = 't', long, value_enum)]
        movement: MovementArg,
        /// Fixed weekly-step exercise instead of max-based
        #[arg(long)]
        conditioning: bool,
        /// Measured in seconds instead of reps
        #[arg(long)]
        timed: bool,
        /// Default conditioning baseline (reps or seconds)
        #[arg(short, long)]
        baseline: Option<u32>,
        /// Default added weight
        #[arg(short, long)]
        weight: Option<f64>,
    },
    List,
}

#[derive(Subcommand)]
enum MaxAction {
    /// Log a new best performance
    Log {
        exercise_id: String,
        /// Reps, or seconds for timed exercises
        value: u32,
        #[arg(short, long)]
        weight: Option<f64>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    List {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum CycleAction {
    /// Import a cycle configuration from a JSON file
    Import { path: PathBuf },
    List,
    /// Make a cycle the only active one
    Activate { cycle_id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum MovementArg {
    Push,
    Pull,
    Legs,
    Core,
    Balance,
    Mobility,
    Other,
}

impl From<MovementArg> for MovementType {
    fn from(arg: MovementArg) -> Self {
        match arg {
            MovementArg::Push => MovementType::Push,
            MovementArg::Pull => MovementType::Pull,
            MovementArg::Legs => MovementType::Legs,
            MovementArg::Core => MovementType::Core,
            MovementArg::Balance => MovementType::Balance,
            MovementArg::Mobility => MovementType::Mobility,
            MovementArg::Other => MovementType::Other,
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut db = Database::open(&cli.db)?;

    match cli.command {
        Commands::Exercise { action } => match action {
            ExerciseAction::Add {
                id,
                name,
                movement,
                conditioning,
                timed,
                baseline,
                weight,
            } => {
                let exercise = Exercise {
                    id,
                    name,
                    movement_type: movement.into(),
                    mode: if conditioning {
                        ExerciseMode::Conditioning
                    } else {
                        ExerciseMode::Standard
                    },
                    measurement: if timed {
                        MeasurementType::Time
                    } else {
                        MeasurementType::Reps
                    },
                    default_conditioning_baseline: baseline,
                    tracks_weight: weight.is_some(),
                    default_weight: weight,
                };
                db.save_exercise(&exercise)?;
                println!(
                    "Saved: {} {} ({})",
                    exercise.movement_type.emoji(),
                    exercise.name,
                    exercise.id
                );
            }
            ExerciseAction::List => {
                println!("{:-<60}", "");
                for e in db.get_exercises()? {
                    println!(
                        "{} {:20} | {:8} | {:?} / {:?}",
                        e.movement_type.emoji(),
                        e.id,
                        e.movement_type,
                        e.mode,
                        e.measurement
                    );
                }
            }
        },

        Commands::Max { action } => match action {
            MaxAction::Log {
                exercise_id,
                value,
                weight,
                notes,
            } => {
                let exercises = db.get_exercises()?;
                let exercise = exercises
                    .exercise(&exercise_id)
                    .with_context(|| format!("unknown exercise {}", exercise_id))?;
                let (reps, seconds) = match exercise.measurement {
                    MeasurementType::Reps => (Some(value), None),
                    MeasurementType::Time => (None, Some(value)),
                };
                let id = db.add_max_record(&MaxRecord {
                    id: None,
                    exercise_id: exercise_id.clone(),
                    reps,
                    seconds,
                    weight,
                    recorded_at: Utc::now(),
                    notes,
                })?;
                println!(
                    "Max logged: {} - {} (id: {})",
                    exercise.name,
                    exercise.measurement.format_value(value),
                    id
                );
            }
            MaxAction::List { limit } => {
                println!("{:-<60}", "");
                for r in db.get_max_records()?.iter().take(limit) {
                    println!(
                        "{} | {:20} | {} | {}",
                        r.recorded_at.format("%Y-%m-%d %H:%M"),
                        r.exercise_id,
                        r.reps
                            .map(|v| v.to_string())
                            .or_else(|| r.seconds.map(|s| MeasurementType::Time.format_value(s)))
                            .unwrap_or_else(|| "-".to_string()),
                        r.notes.as_deref().unwrap_or("-")
                    );
                }
            }
        },

        Commands::Cycle { action } => match action {
            CycleAction::Import { path } => {
                let json = fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let mut cycle: Cycle = serde_json::from_str(&json)
                    .with_context(|| format!("parsing {}", path.display()))?;
                cycle.validate()?;
                let activate = cycle.is_active();
                cycle.status = repcycle::cycle::CycleStatus::Planning;
                db.insert_cycle(&cycle)?;
                if activate {
                    db.activate_cycle(&cycle.id)?;
                }
                println!("Imported cycle {} ({} workouts)", cycle.id, cycle.total_workouts());
            }
            CycleAction::List => {
                println!("{:-<60}", "");
                for c in db.get_cycles()? {
                    println!(
                        "{:36} | {:20} | {:9} | {} | {}w x {}d",
                        c.id,
                        c.name,
                        c.status,
                        c.start_date,
                        c.number_of_weeks,
                        c.workout_days_per_week
                    );
                }
            }
            CycleAction::Activate { cycle_id } => {
                db.activate_cycle(&cycle_id)?;
                println!("Active cycle: {}", cycle_id);
            }
        },

        Commands::Schedule { cycle_id } => {
            let cycle = load_cycle(&db, &cycle_id)?;
            let exercises = db.get_exercises()?;
            let maxes = LatestMaxes::from_history(db.get_max_records()?);

            let workouts = engine::build_schedule(&cycle, exercises.as_slice(), &maxes)?;
            db.insert_workouts(&workouts)?;

            let result = engine::reconcile_duplicates(db.workouts_for_cycle(&cycle_id)?);
            db.delete_workouts(&result.removed_ids)?;
            println!(
                "Scheduled {} workouts ({} duplicates removed)",
                workouts.len(),
                result.removed_ids.len()
            );
        }

        Commands::Show { cycle_id, week } => {
            let cycle = load_cycle(&db, &cycle_id)?;
            let exercises = db.get_exercises()?;
            let maxes = LatestMaxes::from_history(db.get_max_records()?);

            println!("{} ({:?}, {:?})", cycle.name, cycle.cycle_type, cycle.progression_mode);
            for workout in db
                .workouts_for_cycle(&cycle_id)?
                .iter()
                .filter(|w| week.is_none_or(|wk| w.week_number == wk))
            {
                println!("{:-<60}", "");
                println!(
                    "#{} {} | week {} day {} | {} | RFEM {} | {}",
                    workout.sequence_number,
                    workout.scheduled_date,
                    workout.week_number,
                    workout.day_in_week,
                    workout.group_name,
                    workout.rfem_value,
                    workout.status
                );
                for set in &workout.sets {
                    let Some(exercise) = exercises.exercise(&set.exercise_id) else {
                        println!("  {}. {} (deleted)", set.set_number, set.exercise_name);
                        continue;
                    };
                    let current_max = maxes.latest_max(&exercise.id);
                    let target = engine::compute_set_target(set, exercise, current_max);
                    let weight = engine::compute_set_weight(set, exercise)
                        .map(|w| format!(" @ {:.1}", w))
                        .unwrap_or_default();
                    let tag = if set.is_warmup() {
                        " (warm-up)"
                    } else if set.is_max_test() {
                        " (max test)"
                    } else {
                        ""
                    };
                    println!(
                        "  {}. {:20} {}{}{}",
                        set.set_number,
                        exercise.name,
                        target.display(exercise.measurement),
                        weight,
                        tag
                    );
                }
            }
        }

        Commands::MaxTest {
            exercise_ids,
            baselines,
        } => {
            let exercises = db.get_exercises()?;
            let maxes = LatestMaxes::from_history(db.get_max_records()?);

            let mut selected = Vec::new();
            for id in &exercise_ids {
                let Some(exercise) = exercises.exercise(id) else {
                    bail!("unknown exercise {}", id);
                };
                selected.push(MaxTestCandidate {
                    exercise: exercise.clone(),
                    previous_max: maxes
                        .latest_max(id)
                        .and_then(|m| m.value(exercise.measurement)),
                    new_baseline: baselines
                        .iter()
                        .find(|(b, _)| b == id)
                        .map(|(_, v)| *v)
                        .or(exercise.default_conditioning_baseline),
                });
            }

            let previous = db.active_cycle()?;
            let today = Local::now().date_naive();
            let plan = engine::plan_max_testing(&selected, previous.as_ref(), today)?;
            db.save_max_test_plan(&plan)?;
            println!(
                "Max-test cycle {} created: {} day(s)",
                plan.cycle.id,
                plan.workouts.len()
            );
        }

        Commands::Reconcile { cycle_id } => {
            let result = engine::reconcile_duplicates(db.workouts_for_cycle(&cycle_id)?);
            db.delete_workouts(&result.removed_ids)?;
            println!("Kept {} workouts", result.kept.len());
            for id in &result.removed_ids {
                println!("Removed {}", id);
            }
        }

        Commands::Progress { cycle_id } => {
            let progress = engine::summarize(&db.workouts_for_cycle(&cycle_id)?);
            println!(
                "{}/{} done ({:.0}%) | completed {} | partial {} | skipped {}",
                progress.total - progress.pending,
                progress.total,
                progress.percent_done(),
                progress.completed,
                progress.partial,
                progress.skipped
            );
            match progress.next_sequence {
                Some(seq) => println!("Next workout: #{}", seq),
                None if progress.is_finished() => println!("Cycle finished"),
                None => println!("No workouts scheduled"),
            }
        }
    }

    Ok(())
}

fn load_cycle(db: &Database, cycle_id: &str) -> Result<Cycle> {
    db.get_cycle(cycle_id)?
        .with_context(|| format!("unknown cycle {}", cycle_id))
}

fn parse_baseline(s: &str) -> Result<(String, u32), String> {
    let (id, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected EXERCISE=VALUE, got {}", s))?;
    let value = value
        .parse()
        .map_err(|e| format!("invalid baseline {}: {}", value, e))?;
    Ok((id.to_string(), value))
}
