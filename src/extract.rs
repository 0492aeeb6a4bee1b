//! Solution extraction and validation.
//!
//! Turns true-valued solver variables into [`Roster`] records,
//! recomputing every derived statistic (hour totals, workload labels,
//! day indices) from the actual solution rather than trusting any
//! objective-side bookkeeping. Before records are built, every hard
//! invariant is re-checked independently; a violation means the model
//! builder or solver is buggy and is surfaced as a fatal error, never
//! silently corrected.

use std::collections::HashMap;
use std::fmt;

use tracing::info;

use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::model::AssignmentModel;
use crate::models::{AssignedTask, Participant, Roster, Task, WorkloadLevel};
use crate::solver::{SolveStatus, SolverOutcome};

/// A hard constraint violated by an accepted solution.
#[derive(Debug, Clone, PartialEq)]
pub struct InvariantViolation {
    /// Which invariant failed.
    pub invariant: InvariantKind,
    /// Human-readable description.
    pub message: String,
}

/// The five hard invariants every accepted solution must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantKind {
    /// Task coverage outside `[min_people, max_people]`.
    Coverage,
    /// A participant holds two conflicting tasks.
    Conflict,
    /// A participant holds a task they are excluded from.
    Exclusion,
    /// An SNU participant exceeds an hour cap.
    HourCap,
    /// A participant's task count is outside `[min_tasks, max_tasks]`.
    TaskCount,
}

impl InvariantViolation {
    fn new(invariant: InvariantKind, message: impl Into<String>) -> Self {
        Self {
            invariant,
            message: message.into(),
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Re-checks every hard invariant against selected pairs.
///
/// Recomputes overlaps, totals, and counts directly from the domain
/// data rather than from the structures the model was built from.
pub fn check_invariants(
    selected: &[(usize, usize)],
    tasks: &[Task],
    participants: &[Participant],
    config: &PlannerConfig,
) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    // 1. Coverage bounds per task.
    let mut coverage = vec![0u32; tasks.len()];
    for &(_, t) in selected {
        coverage[t] += 1;
    }
    for (t, task) in tasks.iter().enumerate() {
        if coverage[t] < task.min_people {
            violations.push(InvariantViolation::new(
                InvariantKind::Coverage,
                format!(
                    "task '{}' has {} assignees, below minimum {}",
                    task.id, coverage[t], task.min_people
                ),
            ));
        }
        if let Some(max) = task.max_people {
            if coverage[t] > max {
                violations.push(InvariantViolation::new(
                    InvariantKind::Coverage,
                    format!(
                        "task '{}' has {} assignees, above maximum {}",
                        task.id, coverage[t], max
                    ),
                ));
            }
        }
    }

    // Group per participant for the remaining checks.
    let mut by_participant: Vec<Vec<usize>> = vec![Vec::new(); participants.len()];
    for &(p, t) in selected {
        by_participant[p].push(t);
    }

    for (p, participant) in participants.iter().enumerate() {
        let held = &by_participant[p];
        let name = participant.name();

        // 2. Pairwise conflict freedom (overlaps recomputed from spans).
        for i in 0..held.len() {
            for j in (i + 1)..held.len() {
                let (a, b) = (&tasks[held[i]], &tasks[held[j]]);
                if a.conflicts_with(b) {
                    violations.push(InvariantViolation::new(
                        InvariantKind::Conflict,
                        format!("'{name}' holds overlapping tasks '{}' and '{}'", a.id, b.id),
                    ));
                }
            }
        }

        // 3. Exclusion respect.
        for &t in held {
            if !participant.may_take(&tasks[t].id) {
                violations.push(InvariantViolation::new(
                    InvariantKind::Exclusion,
                    format!("'{name}' holds excluded task '{}'", tasks[t].id),
                ));
            }
        }

        // 4. SNU hour caps (total, plus the daily cap when configured).
        if participant.is_snu() {
            let total: u32 = held.iter().map(|&t| tasks[t].duration_minutes()).sum();
            if total > config.snu_cap_minutes() {
                violations.push(InvariantViolation::new(
                    InvariantKind::HourCap,
                    format!(
                        "SNU '{name}' is assigned {:.1}h, above the {}h cap",
                        f64::from(total) / 60.0,
                        config.snu_hour_cap
                    ),
                ));
            }
            if let Some(daily_cap) = config.snu_daily_cap_minutes() {
                let mut per_day: HashMap<chrono::NaiveDate, u32> = HashMap::new();
                for &t in held {
                    *per_day.entry(tasks[t].date).or_insert(0) += tasks[t].duration_minutes();
                }
                let mut days: Vec<_> = per_day.into_iter().collect();
                days.sort_unstable_by_key(|(d, _)| *d);
                for (date, minutes) in days {
                    if minutes > daily_cap {
                        violations.push(InvariantViolation::new(
                            InvariantKind::HourCap,
                            format!(
                                "SNU '{name}' is assigned {:.1}h on {date}, above the daily cap",
                                f64::from(minutes) / 60.0
                            ),
                        ));
                    }
                }
            }
        }

        // 5. Task-count bounds.
        let count = held.len() as u32;
        if count < config.min_tasks {
            violations.push(InvariantViolation::new(
                InvariantKind::TaskCount,
                format!(
                    "'{name}' holds {count} tasks, below minimum {}",
                    config.min_tasks
                ),
            ));
        }
        if count > config.max_tasks {
            violations.push(InvariantViolation::new(
                InvariantKind::TaskCount,
                format!(
                    "'{name}' holds {count} tasks, above maximum {}",
                    config.max_tasks
                ),
            ));
        }
    }

    violations
}

/// Converts a solver outcome into a validated, deterministically
/// ordered roster.
pub fn extract_roster(
    model: &AssignmentModel,
    outcome: &SolverOutcome,
    tasks: &[Task],
    participants: &[Participant],
    config: &PlannerConfig,
) -> Result<Roster, PlanError> {
    let selected: Vec<(usize, usize)> = model
        .pairs()
        .iter()
        .filter(|pair| outcome.values.get(pair.var.0).copied().unwrap_or(0.0) > 0.5)
        .map(|pair| (pair.participant, pair.task))
        .collect();

    let violations = check_invariants(&selected, tasks, participants, config);
    if !violations.is_empty() {
        return Err(PlanError::Inconsistent(violations));
    }

    // Derived statistics come from the accepted pairs only.
    let mut minutes_by_participant = vec![0u32; participants.len()];
    for &(p, t) in &selected {
        minutes_by_participant[p] += tasks[t].duration_minutes();
    }

    let first_day = tasks.iter().map(|t| t.date).min();

    let mut assignments: Vec<AssignedTask> = selected
        .iter()
        .map(|&(p, t)| {
            let participant = &participants[p];
            let task = &tasks[t];
            let total_hours = f64::from(minutes_by_participant[p]) / 60.0;
            let day = first_day
                .map(|d| (task.date - d).num_days().max(0) as u32)
                .unwrap_or(0);
            AssignedTask {
                participant: participant.name(),
                role: participant.role,
                task_id: task.id.clone(),
                description: task.description.clone(),
                location: task.location.clone(),
                date: task.date,
                span: task.span,
                duration_label: task.duration_label.clone(),
                min_people: task.min_people,
                max_people: task.max_people,
                task_hours: task.duration_hours(),
                total_hours,
                day,
                workload: WorkloadLevel::derive(
                    total_hours,
                    participant.role,
                    &config.workload_thresholds,
                ),
            }
        })
        .collect();

    assignments.sort_by(|a, b| {
        (a.date, a.span.start, &a.task_id, &a.participant)
            .cmp(&(b.date, b.span.start, &b.task_id, &b.participant))
    });

    info!(
        assignments = assignments.len(),
        proven_optimal = outcome.status == SolveStatus::Optimal,
        "solution extracted and validated"
    );

    Ok(Roster {
        assignments,
        proven_optimal: outcome.status == SolveStatus::Optimal,
    })
}
