//! Participant model.
//!
//! A participant is a person who can be assigned to event tasks.
//! Each participant carries a staffing role and a hard exclusion
//! list: task IDs the participant may never receive.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Staffing role of a participant.
///
/// The role determines hard hour limits (SNU) and objective
/// priorities (critical tasks prefer permanent staff).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Permanent staff member.
    Permanent,
    /// Non-permanent staff member.
    NonPermanent,
    /// Participant subject to the total hour cap.
    Snu,
}

impl Role {
    /// Parses a role from its input-file spelling.
    ///
    /// Accepts `"Permanent"`, `"Non-Permanent"`/`"NonPermanent"`, and
    /// `"SNU"` case-insensitively. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permanent" => Some(Role::Permanent),
            "non-permanent" | "nonpermanent" => Some(Role::NonPermanent),
            "snu" => Some(Role::Snu),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Permanent => write!(f, "Permanent"),
            Role::NonPermanent => write!(f, "Non-Permanent"),
            Role::Snu => write!(f, "SNU"),
        }
    }
}

/// A participant available for task assignment.
///
/// Immutable once loaded; the planner never mutates participants
/// during a solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Staffing role.
    pub role: Role,
    /// Task IDs this participant may never be assigned to.
    pub excluded_task_ids: BTreeSet<String>,
}

impl Participant {
    /// Creates a participant with no exclusions.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, role: Role) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
            excluded_task_ids: BTreeSet::new(),
        }
    }

    /// Adds a task ID to the exclusion list.
    pub fn with_exclusion(mut self, task_id: impl Into<String>) -> Self {
        self.excluded_task_ids.insert(task_id.into());
        self
    }

    /// Adds several task IDs to the exclusion list.
    pub fn with_exclusions<I, S>(mut self, task_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_task_ids
            .extend(task_ids.into_iter().map(Into::into));
        self
    }

    /// Full display name, used as the participant identity in output.
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether this participant may be assigned to the given task.
    pub fn may_take(&self, task_id: &str) -> bool {
        !self.excluded_task_ids.contains(task_id)
    }

    /// Whether this participant is subject to the SNU hour cap.
    pub fn is_snu(&self) -> bool {
        self.role == Role::Snu
    }
}
