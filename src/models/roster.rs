//! Roster (solution) model.
//!
//! A roster is the validated output of one solve: assignment records
//! with derived hour totals and workload labels, in deterministic
//! order (date, start time, task id, participant).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Role, TimeSpan};

/// Categorical workload indicator derived from a participant's
/// cumulative assigned hours and role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkloadLevel {
    /// Light load.
    Low,
    /// Moderate load.
    Medium,
    /// Heavy load.
    High,
    /// Capped role; labeled by role, not by hours.
    Snu,
}

/// Hour boundaries between workload labels.
///
/// A participant at or below `low_max_hours` is `Low`, at or below
/// `medium_max_hours` is `Medium`, above that `High`. SNU
/// participants always label as `Snu`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkloadThresholds {
    /// Upper bound of the `Low` band (hours).
    pub low_max_hours: f64,
    /// Upper bound of the `Medium` band (hours).
    pub medium_max_hours: f64,
}

impl Default for WorkloadThresholds {
    fn default() -> Self {
        Self {
            low_max_hours: 8.0,
            medium_max_hours: 14.0,
        }
    }
}

impl WorkloadLevel {
    /// Derives the label from cumulative hours and role.
    pub fn derive(total_hours: f64, role: Role, thresholds: &WorkloadThresholds) -> Self {
        if role == Role::Snu {
            return WorkloadLevel::Snu;
        }
        if total_hours <= thresholds.low_max_hours {
            WorkloadLevel::Low
        } else if total_hours <= thresholds.medium_max_hours {
            WorkloadLevel::Medium
        } else {
            WorkloadLevel::High
        }
    }
}

impl fmt::Display for WorkloadLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadLevel::Low => write!(f, "Low"),
            WorkloadLevel::Medium => write!(f, "Medium"),
            WorkloadLevel::High => write!(f, "High"),
            WorkloadLevel::Snu => write!(f, "SNU"),
        }
    }
}

/// One accepted (participant, task) assignment with derived fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedTask {
    /// Participant display name.
    pub participant: String,
    /// Participant role.
    pub role: Role,
    /// Assigned task ID.
    pub task_id: String,
    /// Task description.
    pub description: String,
    /// Task location.
    pub location: Option<String>,
    /// Task date.
    pub date: NaiveDate,
    /// Task time interval.
    pub span: TimeSpan,
    /// Raw duration string echoed from the input.
    pub duration_label: String,
    /// Task coverage lower bound.
    pub min_people: u32,
    /// Task coverage upper bound.
    pub max_people: Option<u32>,
    /// Hours this task contributes.
    pub task_hours: f64,
    /// The participant's cumulative assigned hours over the event.
    pub total_hours: f64,
    /// 0-indexed day-of-event.
    pub day: u32,
    /// Workload label for the participant.
    pub workload: WorkloadLevel,
}

/// The validated solution of one solve.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    /// Assignment records in deterministic output order.
    pub assignments: Vec<AssignedTask>,
    /// Whether the solver proved optimality (vs. best-found feasible).
    pub proven_optimal: bool,
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of assignment records.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the roster holds no assignments.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// All assignments for a participant, in output order.
    pub fn assignments_for(&self, participant: &str) -> Vec<&AssignedTask> {
        self.assignments
            .iter()
            .filter(|a| a.participant == participant)
            .collect()
    }

    /// All assignments on a 0-indexed event day, in output order.
    pub fn assignments_on_day(&self, day: u32) -> Vec<&AssignedTask> {
        self.assignments.iter().filter(|a| a.day == day).collect()
    }

    /// Participants assigned to a task.
    pub fn task_assignees(&self, task_id: &str) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|a| a.task_id == task_id)
            .map(|a| a.participant.as_str())
            .collect()
    }

    /// A participant's cumulative hours (0.0 if unassigned).
    pub fn participant_hours(&self, participant: &str) -> f64 {
        self.assignments
            .iter()
            .find(|a| a.participant == participant)
            .map(|a| a.total_hours)
            .unwrap_or(0.0)
    }

    /// Distinct participants in output order of first appearance.
    pub fn participants(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for a in &self.assignments {
            if !seen.contains(&a.participant.as_str()) {
                seen.push(a.participant.as_str());
            }
        }
        seen
    }

    /// Distinct (day, date) pairs in ascending day order.
    pub fn days(&self) -> Vec<(u32, NaiveDate)> {
        let mut days: Vec<(u32, NaiveDate)> = Vec::new();
        for a in &self.assignments {
            if !days.iter().any(|(d, _)| *d == a.day) {
                days.push((a.day, a.date));
            }
        }
        days.sort_by_key(|(d, _)| *d);
        days
    }
}
