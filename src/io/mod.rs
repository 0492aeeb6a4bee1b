//! CSV input/output boundary.
//!
//! Loads tasks, participants, and optional pinned assignments from
//! semicolon-delimited CSV (matching the upstream data files, where
//! the exclusion list is itself comma-separated), and writes the
//! assignment table as comma-delimited CSV. Record-level parse
//! failures fail fast and name the offending record.

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::PlanError;
use crate::models::{Participant, Role, Roster, Task, TimeSpan};

/// Input date format (`DD/MM/YYYY`).
const DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Deserialize)]
struct RawTaskRow {
    task_id: String,
    date: String,
    duration: String,
    task_description: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    min_people: Option<u32>,
    #[serde(default)]
    max_people: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawParticipantRow {
    first_name: String,
    last_name: String,
    role: String,
    #[serde(default)]
    constraint_event_ids: Option<String>,
}

/// A pre-seeded assignment read from an existing-assignments file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedAssignment {
    /// Participant full name.
    pub participant: String,
    /// Task to force onto that participant.
    pub task_id: String,
}

fn input_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, PlanError> {
    Ok(ReaderBuilder::new()
        .delimiter(b';')
        .trim(Trim::All)
        .from_path(path)?)
}

/// Loads the task table.
///
/// Malformed dates or duration strings abort the load, identifying
/// the task; an absent `min_people` defaults to 1.
pub fn load_tasks(path: impl AsRef<Path>) -> Result<Vec<Task>, PlanError> {
    let mut reader = input_reader(path.as_ref())?;
    let mut tasks = Vec::new();

    for row in reader.deserialize() {
        let row: RawTaskRow = row?;
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT).map_err(|e| {
            PlanError::InvalidTask {
                task_id: row.task_id.clone(),
                reason: format!("bad date '{}': {e}", row.date),
            }
        })?;
        let span = TimeSpan::parse(&row.duration).map_err(|e| PlanError::InvalidTask {
            task_id: row.task_id.clone(),
            reason: e.to_string(),
        })?;

        let mut task = Task::new(row.task_id, date, span)
            .with_description(row.task_description)
            .with_coverage(row.min_people.unwrap_or(1), row.max_people)
            .with_duration_label(row.duration);
        if let Some(location) = row.location.filter(|l| !l.is_empty()) {
            task = task.with_location(location);
        }
        tasks.push(task);
    }

    info!(count = tasks.len(), "tasks loaded");
    Ok(tasks)
}

/// Loads the participant table.
///
/// `constraint_event_ids` is a comma-separated list of task IDs the
/// participant may never receive.
pub fn load_participants(path: impl AsRef<Path>) -> Result<Vec<Participant>, PlanError> {
    let mut reader = input_reader(path.as_ref())?;
    let mut participants = Vec::new();

    for row in reader.deserialize() {
        let row: RawParticipantRow = row?;
        let name = format!("{} {}", row.first_name, row.last_name);
        let role = Role::parse(&row.role).ok_or_else(|| PlanError::InvalidParticipant {
            name: name.clone(),
            reason: format!("unknown role '{}'", row.role),
        })?;

        let exclusions = row
            .constraint_event_ids
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();

        participants.push(
            Participant::new(row.first_name, row.last_name, role).with_exclusions(exclusions),
        );
    }

    info!(count = participants.len(), "participants loaded");
    Ok(participants)
}

/// Loads pre-seeded assignments to pin into the solution.
pub fn load_pins(path: impl AsRef<Path>) -> Result<Vec<PinnedAssignment>, PlanError> {
    let mut reader = input_reader(path.as_ref())?;
    let mut pins = Vec::new();
    for row in reader.deserialize() {
        pins.push(row?);
    }
    info!(count = pins.len(), "pinned assignments loaded");
    Ok(pins)
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    participant: &'a str,
    task_id: &'a str,
    task_description: &'a str,
    location: &'a str,
    date: String,
    duration: &'a str,
    min_people: u32,
    max_people: Option<u32>,
    total_hours: f64,
    day: u32,
    participant_workload: String,
}

/// Writes the assignment table as comma-delimited CSV.
///
/// One row per (participant, task); `total_hours` carries the task's
/// own hours, as in the upstream export.
pub fn write_roster(path: impl AsRef<Path>, roster: &Roster) -> Result<(), PlanError> {
    let mut writer = WriterBuilder::new().from_path(path.as_ref())?;
    for a in &roster.assignments {
        writer.serialize(OutputRow {
            participant: &a.participant,
            task_id: &a.task_id,
            task_description: &a.description,
            location: a.location.as_deref().unwrap_or(""),
            date: a.date.format(DATE_FORMAT).to_string(),
            duration: &a.duration_label,
            min_people: a.min_people,
            max_people: a.max_people,
            total_hours: (a.task_hours * 100.0).round() / 100.0,
            day: a.day,
            participant_workload: a.workload.to_string(),
        })?;
    }
    writer.flush()?;
    info!(rows = roster.len(), path = %path.as_ref().display(), "assignments written");
    Ok(())
}
