//! Error taxonomy.
//!
//! Every failure mode of a solve run, surfaced whole to the caller:
//! record-level input errors, batch validation findings, structural
//! infeasibility detected before the solver runs, solver-reported
//! infeasibility/timeouts, and fatal post-solve consistency faults.

use std::fmt::Display;
use thiserror::Error;

use crate::extract::InvariantViolation;
use crate::model::ConstraintFamily;
use crate::validation::{StructuralIssue, ValidationError};

/// Joins a list of displayable findings for an error message.
fn join_list<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn suspects_or_unknown(suspects: &[ConstraintFamily]) -> String {
    if suspects.is_empty() {
        "unknown".to_string()
    } else {
        join_list(suspects)
    }
}

/// Any failure of the planning pipeline.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Filesystem failure reading inputs or writing output.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or serialization failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be parsed.
    #[error("invalid configuration: {reason}")]
    Config {
        /// Parser diagnostic.
        reason: String,
    },

    /// A task record failed input validation.
    #[error("invalid task '{task_id}': {reason}")]
    InvalidTask {
        /// The offending task ID.
        task_id: String,
        /// What was wrong with the record.
        reason: String,
    },

    /// A participant record failed input validation.
    #[error("invalid participant '{name}': {reason}")]
    InvalidParticipant {
        /// The offending participant name.
        name: String,
        /// What was wrong with the record.
        reason: String,
    },

    /// Batch input validation found inconsistencies.
    #[error("input validation failed: {}", join_list(.0))]
    Validation(Vec<ValidationError>),

    /// The problem is infeasible by inspection; the solver was never
    /// invoked.
    #[error("structurally infeasible: {}", join_list(.0))]
    Infeasible(Vec<StructuralIssue>),

    /// The solver proved that no assignment satisfies all hard
    /// constraints.
    #[error(
        "no assignment satisfies all hard constraints (likely responsible: {})",
        suspects_or_unknown(.suspects)
    )]
    SolverInfeasible {
        /// Constraint families most likely responsible (heuristic, not
        /// a minimal core).
        suspects: Vec<ConstraintFamily>,
    },

    /// No feasible solution was found within the time budget (after
    /// the single relaxed retry).
    #[error("solver found no solution within the {budget_secs}s time budget")]
    SolverTimeout {
        /// The final budget that expired.
        budget_secs: f64,
    },

    /// The extracted solution violates a hard invariant. Indicates a
    /// model/solver mismatch bug; never silently corrected.
    #[error("internal consistency failure: {}", join_list(.0))]
    Inconsistent(Vec<InvariantViolation>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{ValidationError, ValidationErrorKind};

    #[test]
    fn test_validation_message_joins_findings() {
        let err = PlanError::Validation(vec![
            ValidationError::new(ValidationErrorKind::DuplicateTaskId, "duplicate task ID 'T1'"),
            ValidationError::new(
                ValidationErrorKind::UnknownTaskReference,
                "unknown exclusion 'T9'",
            ),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("duplicate task ID 'T1'"));
        assert!(msg.contains("unknown exclusion 'T9'"));
    }

    #[test]
    fn test_solver_infeasible_names_families() {
        let err = PlanError::SolverInfeasible {
            suspects: vec![ConstraintFamily::Coverage, ConstraintFamily::HourCap],
        };
        let msg = err.to_string();
        assert!(msg.contains("coverage"));
        assert!(msg.contains("hour-cap"));

        let unknown = PlanError::SolverInfeasible { suspects: vec![] };
        assert!(unknown.to_string().contains("unknown"));
    }

    #[test]
    fn test_timeout_reports_budget() {
        let err = PlanError::SolverTimeout { budget_secs: 30.0 };
        assert!(err.to_string().contains("30"));
    }
}
