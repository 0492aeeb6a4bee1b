//! Input validation and structural feasibility checks.
//!
//! Two independent gates run before model construction:
//!
//! 1. **Integrity** ([`validate_input`]): duplicate IDs, inverted
//!    coverage bounds, references to unknown tasks, bad config. All
//!    findings are reported at once.
//! 2. **Structural feasibility** ([`check_feasibility`]): conditions
//!    that make the problem infeasible by inspection: an eligible
//!    pool smaller than a task's minimum coverage, a participant who
//!    cannot reach `min_tasks`, an SNU participant whose cheapest
//!    admissible load already busts the hour cap. When any issue is
//!    found the solver is never invoked.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::config::PlannerConfig;
use crate::eligibility::EligibilityMap;
use crate::io::PinnedAssignment;
use crate::models::{Participant, Task};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description naming the offending record.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two tasks share the same ID.
    DuplicateTaskId,
    /// Two participants share the same full name.
    DuplicateParticipant,
    /// A task's `max_people` is below its `min_people`.
    InvalidCoverageBounds,
    /// An exclusion references a task that doesn't exist.
    UnknownTaskReference,
    /// A pinned assignment references an unknown participant or task.
    UnknownPinReference,
    /// A pinned assignment targets an excluded pair.
    ExcludedPin,
    /// Configuration values are mutually inconsistent.
    InvalidConfig,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Validates input integrity before any model work.
///
/// Checks:
/// 1. No duplicate task IDs
/// 2. No duplicate participant names
/// 3. `min_people <= max_people` for every capped task
/// 4. Every exclusion references an existing task
/// 5. Every pin references an existing participant and task, and not
///    an excluded pair
/// 6. `min_tasks <= max_tasks` in the configuration
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    tasks: &[Task],
    participants: &[Participant],
    pins: &[PinnedAssignment],
    config: &PlannerConfig,
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut task_ids = HashSet::new();
    for t in tasks {
        if !task_ids.insert(t.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateTaskId,
                format!("duplicate task ID '{}'", t.id),
            ));
        }
        if let Some(max) = t.max_people {
            if max < t.min_people {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidCoverageBounds,
                    format!(
                        "task '{}' has max_people {} below min_people {}",
                        t.id, max, t.min_people
                    ),
                ));
            }
        }
    }

    let mut names = HashSet::new();
    for p in participants {
        let name = p.name();
        if !names.insert(name.clone()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateParticipant,
                format!("duplicate participant '{name}'"),
            ));
        }
        for excluded in &p.excluded_task_ids {
            if !task_ids.contains(excluded.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTaskReference,
                    format!("participant '{name}' excludes unknown task '{excluded}'"),
                ));
            }
        }
    }

    let by_name: HashMap<String, &Participant> =
        participants.iter().map(|p| (p.name(), p)).collect();
    for pin in pins {
        match by_name.get(&pin.participant) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownPinReference,
                format!("pin references unknown participant '{}'", pin.participant),
            )),
            Some(p) => {
                if !task_ids.contains(pin.task_id.as_str()) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownPinReference,
                        format!(
                            "pin for '{}' references unknown task '{}'",
                            pin.participant, pin.task_id
                        ),
                    ));
                } else if !p.may_take(&pin.task_id) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::ExcludedPin,
                        format!(
                            "pin assigns '{}' to task '{}' they are excluded from",
                            pin.participant, pin.task_id
                        ),
                    ));
                }
            }
        }
    }

    if config.min_tasks > config.max_tasks {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidConfig,
            format!(
                "min_tasks {} exceeds max_tasks {}",
                config.min_tasks, config.max_tasks
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A structural infeasibility detected before solving.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralIssue {
    /// Issue category.
    pub kind: StructuralIssueKind,
    /// Human-readable description of the violated requirement.
    pub message: String,
}

/// Categories of structural infeasibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralIssueKind {
    /// A task's eligible pool is smaller than its minimum coverage.
    InsufficientEligiblePool,
    /// A participant cannot reach `min_tasks` from their eligible set.
    TaskCountUnreachable,
    /// An SNU participant's cheapest admissible load exceeds the cap.
    HourCapUnreachable,
    /// Total minimum coverage exceeds total assignment capacity.
    InsufficientTotalCapacity,
    /// Two pinned tasks for one participant overlap in time.
    PinnedConflict,
}

impl StructuralIssue {
    fn new(kind: StructuralIssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Detects infeasibility visible by inspection, without solving.
///
/// `pins` are resolved `(participant_idx, task_idx)` pairs.
pub fn check_feasibility(
    tasks: &[Task],
    participants: &[Participant],
    eligibility: &EligibilityMap,
    pins: &[(usize, usize)],
    config: &PlannerConfig,
) -> Result<(), Vec<StructuralIssue>> {
    let mut issues = Vec::new();

    // Coverage demand vs. eligible pool, per task.
    for (t, task) in tasks.iter().enumerate() {
        let pool = eligibility.eligible_pool(t).len();
        if pool < task.min_people as usize {
            issues.push(StructuralIssue::new(
                StructuralIssueKind::InsufficientEligiblePool,
                format!(
                    "task '{}' needs at least {} people but only {} are eligible",
                    task.id, task.min_people, pool
                ),
            ));
        }
    }

    // min_tasks reachability and SNU hour cap, per participant.
    for (p, participant) in participants.iter().enumerate() {
        let eligible = eligibility.eligible_tasks(p);
        if (eligible.len() as u32) < config.min_tasks {
            issues.push(StructuralIssue::new(
                StructuralIssueKind::TaskCountUnreachable,
                format!(
                    "participant '{}' must take {} tasks but only {} are eligible",
                    participant.name(),
                    config.min_tasks,
                    eligible.len()
                ),
            ));
            continue;
        }

        if participant.is_snu() && config.min_tasks > 0 {
            // The lightest admissible load: the min_tasks shortest
            // eligible tasks. If even that busts the cap, no solution
            // exists for this participant.
            let mut minutes: Vec<u32> = eligible
                .iter()
                .map(|&t| tasks[t].duration_minutes())
                .collect();
            minutes.sort_unstable();
            let lightest: u32 = minutes.iter().take(config.min_tasks as usize).sum();
            if lightest > config.snu_cap_minutes() {
                issues.push(StructuralIssue::new(
                    StructuralIssueKind::HourCapUnreachable,
                    format!(
                        "SNU participant '{}' cannot take {} tasks within the {}h cap \
                         (lightest load is {:.1}h)",
                        participant.name(),
                        config.min_tasks,
                        config.snu_hour_cap,
                        f64::from(lightest) / 60.0
                    ),
                ));
            }
        }
    }

    // Aggregate demand vs. aggregate capacity.
    let demand: u64 = tasks.iter().map(|t| u64::from(t.min_people)).sum();
    let capacity = participants.len() as u64 * u64::from(config.max_tasks);
    if demand > capacity {
        issues.push(StructuralIssue::new(
            StructuralIssueKind::InsufficientTotalCapacity,
            format!(
                "total minimum coverage ({demand}) exceeds total capacity \
                 ({} participants x {} tasks)",
                participants.len(),
                config.max_tasks
            ),
        ));
    }

    // Pinned assignments must be mutually satisfiable.
    let mut pins_by_participant: HashMap<usize, Vec<usize>> = HashMap::new();
    for &(p, t) in pins {
        pins_by_participant.entry(p).or_default().push(t);
    }
    let mut pinned: Vec<_> = pins_by_participant.into_iter().collect();
    pinned.sort_unstable_by_key(|(p, _)| *p);
    for (p, mut pinned_tasks) in pinned {
        pinned_tasks.sort_unstable();
        if pinned_tasks.len() as u32 > config.max_tasks {
            issues.push(StructuralIssue::new(
                StructuralIssueKind::TaskCountUnreachable,
                format!(
                    "participant '{}' has {} pinned tasks but max_tasks is {}",
                    participants[p].name(),
                    pinned_tasks.len(),
                    config.max_tasks
                ),
            ));
        }
        for i in 0..pinned_tasks.len() {
            for j in (i + 1)..pinned_tasks.len() {
                let (a, b) = (&tasks[pinned_tasks[i]], &tasks[pinned_tasks[j]]);
                if a.conflicts_with(b) {
                    issues.push(StructuralIssue::new(
                        StructuralIssueKind::PinnedConflict,
                        format!(
                            "participant '{}' has overlapping pinned tasks '{}' and '{}'",
                            participants[p].name(),
                            a.id,
                            b.id
                        ),
                    ));
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
