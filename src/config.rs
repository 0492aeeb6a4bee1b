//! Planner configuration.
//!
//! All tunable values in one serde-deserializable struct: task-count
//! bounds, hour caps, objective weights, workload label thresholds,
//! and the solver time budget. Loadable from a TOML file; every field
//! has a default so a partial (or absent) file works.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::PlanError;
use crate::models::WorkloadThresholds;

/// Solver time budget, with an optional relaxed retry.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverBudget {
    /// First-attempt wall-clock budget in seconds.
    pub time_budget_secs: f64,
    /// Budget for the single retry after a timeout; `None` disables
    /// the retry.
    pub retry_time_budget_secs: Option<f64>,
}

impl Default for SolverBudget {
    fn default() -> Self {
        Self {
            time_budget_secs: 30.0,
            retry_time_budget_secs: Some(60.0),
        }
    }
}

/// Tunable planner parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Minimum tasks per participant.
    pub min_tasks: u32,
    /// Maximum tasks per participant.
    pub max_tasks: u32,
    /// Total hour cap for SNU participants.
    pub snu_hour_cap: f64,
    /// Optional per-day hour cap for SNU participants.
    pub snu_daily_hour_cap: Option<f64>,
    /// Weight of the workload-balance objective term.
    pub workload_weight: f64,
    /// Weight of the critical-task priority objective term.
    pub priority_weight: f64,
    /// Tasks whose coverage should lean on permanent staff.
    pub critical_task_ids: BTreeSet<String>,
    /// Hour boundaries for workload labels.
    pub workload_thresholds: WorkloadThresholds,
    /// Solver time budget and retry policy.
    pub solver: SolverBudget,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_tasks: 1,
            max_tasks: 6,
            snu_hour_cap: 21.0,
            snu_daily_hour_cap: None,
            workload_weight: 1.0,
            priority_weight: 2.0,
            critical_task_ids: BTreeSet::new(),
            workload_thresholds: WorkloadThresholds::default(),
            solver: SolverBudget::default(),
        }
    }
}

impl PlannerConfig {
    /// Parses a TOML configuration string.
    pub fn from_toml(s: &str) -> Result<Self, PlanError> {
        toml::from_str(s).map_err(|e| PlanError::Config {
            reason: e.to_string(),
        })
    }

    /// Loads configuration from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PlanError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&raw)
    }

    /// SNU hour cap in whole minutes (constraint coefficients stay
    /// integral).
    pub fn snu_cap_minutes(&self) -> u32 {
        (self.snu_hour_cap * 60.0).round() as u32
    }

    /// SNU daily cap in whole minutes, when configured.
    pub fn snu_daily_cap_minutes(&self) -> Option<u32> {
        self.snu_daily_hour_cap
            .map(|h| (h * 60.0).round() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = PlannerConfig::default();
        assert_eq!(cfg.min_tasks, 1);
        assert_eq!(cfg.max_tasks, 6);
        assert_eq!(cfg.snu_cap_minutes(), 1260);
        assert_eq!(cfg.snu_daily_cap_minutes(), None);
        assert!(cfg.critical_task_ids.is_empty());
        assert!((cfg.solver.time_budget_secs - 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = PlannerConfig::from_toml("max_tasks = 4\n").unwrap();
        assert_eq!(cfg.max_tasks, 4);
        assert_eq!(cfg.min_tasks, 1);
        assert!((cfg.snu_hour_cap - 21.0).abs() < 1e-10);
    }

    #[test]
    fn test_full_toml() {
        let raw = r#"
            min_tasks = 0
            max_tasks = 5
            snu_hour_cap = 18.5
            snu_daily_hour_cap = 8.0
            workload_weight = 0.5
            priority_weight = 3.0
            critical_task_ids = ["SAT15", "FRI5"]

            [workload_thresholds]
            low_max_hours = 6.0
            medium_max_hours = 12.0

            [solver]
            time_budget_secs = 10.0
        "#;
        let cfg = PlannerConfig::from_toml(raw).unwrap();

        assert_eq!(cfg.min_tasks, 0);
        assert_eq!(cfg.snu_cap_minutes(), 1110);
        assert_eq!(cfg.snu_daily_cap_minutes(), Some(480));
        assert!(cfg.critical_task_ids.contains("SAT15"));
        assert!((cfg.workload_thresholds.low_max_hours - 6.0).abs() < 1e-10);
        assert!((cfg.solver.time_budget_secs - 10.0).abs() < 1e-10);
        // Partial [solver] table keeps the retry default.
        assert_eq!(cfg.solver.retry_time_budget_secs, Some(60.0));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let err = PlannerConfig::from_toml("max_tasks = \"many\"").unwrap_err();
        assert!(matches!(err, PlanError::Config { .. }));
    }
}
