//! Database module - SQLite storage for exercises, cycles and workouts

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use tracing::{debug, info};

use crate::cycle::{self, Cycle};
use crate::engine::{BaselineUpdate, MaxTestPlan};
use crate::error::{Error, ValidationError};
use crate::exercises::{Exercise, MaxRecord};
use crate::workout::ScheduledWorkout;

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS exercises (
                id TEXT PRIMARY KEY,
                payload TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS max_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                exercise_id TEXT NOT NULL,
                reps INTEGER,
                seconds INTEGER,
                weight REAL,
                recorded_at TEXT NOT NULL,
                notes TEXT
            );
            CREATE TABLE IF NOT EXISTS cycles (
                id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                payload TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS scheduled_workouts (
                id TEXT PRIMARY KEY,
                cycle_id TEXT NOT NULL,
                sequence_number INTEGER NOT NULL,
                payload TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_workouts_cycle
                ON scheduled_workouts (cycle_id, sequence_number);",
        )?;
        Ok(())
    }

    /// Add or replace an exercise
    pub fn save_exercise(&self, exercise: &Exercise) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO exercises (id, payload) VALUES (?1, ?2)",
            params![exercise.id, serde_json::to_string(exercise)?],
        )?;
        Ok(())
    }

    pub fn get_exercises(&self) -> Result<Vec<Exercise>> {
        let mut stmt = self.conn.prepare("SELECT payload FROM exercises ORDER BY id")?;
        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        payloads
            .iter()
            .map(|p| serde_json::from_str(p).context("corrupt exercise payload"))
            .collect()
    }

    /// Record a new best performance
    pub fn add_max_record(&self, record: &MaxRecord) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO max_records (exercise_id, reps, seconds, weight, recorded_at, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.exercise_id,
                record.reps,
                record.seconds,
                record.weight,
                record.recorded_at.to_rfc3339(),
                record.notes,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Full max history, newest first
    pub fn get_max_records(&self) -> Result<Vec<MaxRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, exercise_id, reps, seconds, weight, recorded_at, notes FROM max_records ORDER BY recorded_at DESC, id DESC"
        )?;

        let records = stmt
            .query_map([], |row| {
                let date_str: String = row.get(5)?;
                Ok(MaxRecord {
                    id: Some(row.get(0)?),
                    exercise_id: row.get(1)?,
                    reps: row.get(2)?,
                    seconds: row.get(3)?,
                    weight: row.get(4)?,
                    recorded_at: DateTime::parse_from_rfc3339(&date_str)
                        .map(|d| d.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                    notes: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub fn latest_max(&self, exercise_id: &str) -> Result<Option<MaxRecord>> {
        Ok(self
            .get_max_records()?
            .into_iter()
            .find(|r| r.exercise_id == exercise_id))
    }

    pub fn insert_cycle(&self, cycle: &Cycle) -> Result<()> {
        insert_cycle(&self.conn, cycle)
    }

    /// Replace a cycle's plan; refused once workouts were generated from it.
    ///
    /// Status is left alone, only `activate_cycle` changes it.
    pub fn update_cycle(&mut self, cycle: &Cycle) -> Result<()> {
        // Immediate so no workouts can land between the lock check and the write
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing = load_cycle(&tx, &cycle.id)?
            .ok_or_else(|| Error::from(ValidationError::UnknownCycle(cycle.id.clone())))?;
        let plan_changed = existing.groups != cycle.groups || existing.rotation != cycle.rotation;
        if plan_changed && count_workouts(&tx, &cycle.id)? > 0 {
            return Err(Error::CyclePlanLocked(cycle.id.clone()).into());
        }

        let updated = Cycle {
            status: existing.status,
            ..cycle.clone()
        };
        tx.execute(
            "UPDATE cycles SET payload = ?2 WHERE id = ?1",
            params![updated.id, serde_json::to_string(&updated)?],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_cycle(&self, id: &str) -> Result<Option<Cycle>> {
        load_cycle(&self.conn, id)
    }

    pub fn get_cycles(&self) -> Result<Vec<Cycle>> {
        let mut stmt = self.conn.prepare("SELECT payload FROM cycles ORDER BY rowid")?;
        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        payloads
            .iter()
            .map(|p| serde_json::from_str(p).context("corrupt cycle payload"))
            .collect()
    }

    pub fn active_cycle(&self) -> Result<Option<Cycle>> {
        Ok(self.get_cycles()?.into_iter().find(|c| c.is_active()))
    }

    /// Demote the active cycle and promote `cycle_id` in one transaction
    pub fn activate_cycle(&mut self, cycle_id: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        activate_in(&tx, cycle_id)?;
        tx.commit()?;
        debug!(cycle_id, "cycle.activation_committed");
        Ok(())
    }

    /// Store generated workouts atomically; ids already stored are kept as they are
    pub fn insert_workouts(&mut self, workouts: &[ScheduledWorkout]) -> Result<()> {
        let tx = self.conn.transaction()?;
        insert_workouts(&tx, workouts)?;
        tx.commit()?;
        debug!(count = workouts.len(), "workouts.inserted");
        Ok(())
    }

    pub fn workouts_for_cycle(&self, cycle_id: &str) -> Result<Vec<ScheduledWorkout>> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM scheduled_workouts WHERE cycle_id = ?1 ORDER BY sequence_number, id",
        )?;
        let payloads = stmt
            .query_map(params![cycle_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        payloads
            .iter()
            .map(|p| serde_json::from_str(p).context("corrupt workout payload"))
            .collect()
    }

    pub fn workout_count(&self, cycle_id: &str) -> Result<i64> {
        count_workouts(&self.conn, cycle_id)
    }

    pub fn delete_workouts(&mut self, ids: &[String]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut deleted = 0;
        for id in ids {
            deleted += tx.execute("DELETE FROM scheduled_workouts WHERE id = ?1", params![id])?;
        }
        tx.commit()?;
        Ok(deleted)
    }

    /// Persist a max-test plan as one unit
    pub fn save_max_test_plan(&mut self, plan: &MaxTestPlan) -> Result<()> {
        let tx = self.conn.transaction()?;
        insert_cycle(&tx, &plan.cycle)?;
        activate_in(&tx, &plan.cycle.id)?;
        insert_workouts(&tx, &plan.workouts)?;
        for update in &plan.baseline_updates {
            apply_baseline(&tx, update)?;
        }
        tx.commit()?;
        info!(cycle_id = %plan.cycle.id, workouts = plan.workouts.len(), "max_test.saved");
        Ok(())
    }
}

fn insert_cycle(conn: &Connection, cycle: &Cycle) -> Result<()> {
    conn.execute(
        "INSERT INTO cycles (id, status, payload) VALUES (?1, ?2, ?3)",
        params![cycle.id, cycle.status.as_str(), serde_json::to_string(cycle)?],
    )?;
    Ok(())
}

fn load_cycle(conn: &Connection, id: &str) -> Result<Option<Cycle>> {
    let payload: Option<String> = conn
        .query_row("SELECT payload FROM cycles WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;
    payload
        .map(|p| serde_json::from_str(&p).context("corrupt cycle payload"))
        .transpose()
}

fn count_workouts(conn: &Connection, cycle_id: &str) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM scheduled_workouts WHERE cycle_id = ?1",
        params![cycle_id],
        |row| row.get(0),
    )?)
}

fn activate_in(tx: &Transaction, cycle_id: &str) -> Result<()> {
    let mut stmt = tx.prepare("SELECT payload FROM cycles WHERE id = ?1 OR status = 'active'")?;
    let mut cycles = stmt
        .query_map(params![cycle_id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?
        .iter()
        .map(|p| serde_json::from_str::<Cycle>(p).context("corrupt cycle payload"))
        .collect::<Result<Vec<_>>>()?;

    cycle::activate(&mut cycles, cycle_id).map_err(Error::from)?;

    for updated in &cycles {
        tx.execute(
            "UPDATE cycles SET status = ?2, payload = ?3 WHERE id = ?1",
            params![updated.id, updated.status.as_str(), serde_json::to_string(updated)?],
        )?;
    }
    Ok(())
}

fn insert_workouts(tx: &Transaction, workouts: &[ScheduledWorkout]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT OR IGNORE INTO scheduled_workouts (id, cycle_id, sequence_number, payload) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for workout in workouts {
        stmt.execute(params![
            workout.id,
            workout.cycle_id,
            workout.sequence_number,
            serde_json::to_string(workout)?,
        ])?;
    }
    Ok(())
}

fn apply_baseline(tx: &Transaction, update: &BaselineUpdate) -> Result<()> {
    let payload: Option<String> = tx
        .query_row(
            "SELECT payload FROM exercises WHERE id = ?1",
            params![update.exercise_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(payload) = payload else {
        return Ok(());
    };

    let mut exercise: Exercise = serde_json::from_str(&payload)?;
    exercise.default_conditioning_baseline = update.baseline;
    tx.execute(
        "UPDATE exercises SET payload = ?2 WHERE id = ?1",
        params![exercise.id, serde_json::to_string(&exercise)?],
    )?;
    Ok(())
}
