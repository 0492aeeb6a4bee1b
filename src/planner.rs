//! End-to-end planning pipeline.
//!
//! One batch run: validate → analyze conflicts → filter eligibility →
//! feasibility gate → build model → compose objective → solve →
//! extract. Everything is rebuilt from fresh input per run; the solver
//! call is the only long-running step and is bounded by the configured
//! time budget (with a single relaxed retry after a timeout).

use std::collections::HashMap;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::PlannerConfig;
use crate::conflict::ConflictTable;
use crate::eligibility::EligibilityMap;
use crate::error::PlanError;
use crate::extract::extract_roster;
use crate::io::PinnedAssignment;
use crate::model::{compose_objective, ConstraintFamily, ModelBuilder};
use crate::models::{Participant, Roster, Task};
use crate::solver::{MilpSolver, SolveStatus, Solver};
use crate::validation::{check_feasibility, validate_input};

/// Batch planner over one set of inputs.
pub struct Planner {
    tasks: Vec<Task>,
    participants: Vec<Participant>,
    pins: Vec<PinnedAssignment>,
    config: PlannerConfig,
}

impl Planner {
    /// Creates a planner over loaded inputs.
    pub fn new(tasks: Vec<Task>, participants: Vec<Participant>, config: PlannerConfig) -> Self {
        Self {
            tasks,
            participants,
            pins: Vec::new(),
            config,
        }
    }

    /// Adds pre-seeded assignments to force into the solution.
    pub fn with_pins(mut self, pins: Vec<PinnedAssignment>) -> Self {
        self.pins = pins;
        self
    }

    /// Runs the full pipeline with the bundled MILP solver.
    pub fn solve(&self) -> Result<Roster, PlanError> {
        self.solve_with(&MilpSolver::new())
    }

    /// Runs the full pipeline with any [`Solver`] implementation.
    pub fn solve_with<S: Solver>(&self, solver: &S) -> Result<Roster, PlanError> {
        validate_input(&self.tasks, &self.participants, &self.pins, &self.config)
            .map_err(PlanError::Validation)?;
        let pins = self.resolve_pins();

        let conflicts = ConflictTable::build(&self.tasks);
        let eligibility = EligibilityMap::build(&self.participants, &self.tasks);
        info!(
            tasks = self.tasks.len(),
            participants = self.participants.len(),
            conflicting_pairs = conflicts.len(),
            eligible_pairs = eligibility.pair_count(),
            "inputs analyzed"
        );

        check_feasibility(
            &self.tasks,
            &self.participants,
            &eligibility,
            &pins,
            &self.config,
        )
        .map_err(PlanError::Infeasible)?;

        let mut model = ModelBuilder::new(
            &self.tasks,
            &self.participants,
            &conflicts,
            &eligibility,
            &self.config,
        )
        .with_pins(pins)
        .build();
        compose_objective(&mut model, &self.tasks, &self.participants, &self.config);
        info!(
            variables = model.var_count(),
            constraints = model.constraint_count(),
            "model ready"
        );

        let mut budget_secs = self.config.solver.time_budget_secs.max(0.0);
        let mut outcome = solver.solve(&model, Duration::from_secs_f64(budget_secs));

        if outcome.status == SolveStatus::Unknown {
            if let Some(retry_secs) = self.config.solver.retry_time_budget_secs {
                warn!(
                    retry_budget_secs = retry_secs,
                    "no result within budget, retrying once"
                );
                budget_secs = retry_secs.max(0.0);
                outcome = solver.solve(&model, Duration::from_secs_f64(budget_secs));
            }
        }

        match outcome.status {
            SolveStatus::Optimal | SolveStatus::Feasible => {
                if outcome.status == SolveStatus::Feasible {
                    warn!("solution is feasible but not proven optimal");
                }
                extract_roster(
                    &model,
                    &outcome,
                    &self.tasks,
                    &self.participants,
                    &self.config,
                )
            }
            SolveStatus::Infeasible => Err(PlanError::SolverInfeasible {
                suspects: diagnose_infeasibility(
                    &self.tasks,
                    &self.participants,
                    &eligibility,
                    &self.config,
                ),
            }),
            SolveStatus::Unknown => Err(PlanError::SolverTimeout { budget_secs }),
        }
    }

    /// Resolves pin names to indices. Validation has already verified
    /// every reference, so unresolved pins cannot occur here.
    fn resolve_pins(&self) -> Vec<(usize, usize)> {
        let participant_idx: HashMap<String, usize> = self
            .participants
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name(), i))
            .collect();
        let task_idx: HashMap<&str, usize> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();

        self.pins
            .iter()
            .filter_map(|pin| {
                let p = participant_idx.get(&pin.participant)?;
                let t = task_idx.get(pin.task_id.as_str())?;
                Some((*p, *t))
            })
            .collect()
    }
}

/// Heuristic hint at which constraint families made the model
/// infeasible. Aids debugging only; this is not a minimal core.
fn diagnose_infeasibility(
    tasks: &[Task],
    participants: &[Participant],
    eligibility: &EligibilityMap,
    config: &PlannerConfig,
) -> Vec<ConstraintFamily> {
    let mut suspects = Vec::new();
    let mut add = |s: &mut Vec<ConstraintFamily>, f: ConstraintFamily| {
        if !s.contains(&f) {
            s.push(f);
        }
    };

    // Coverage pressure: a pool with no slack over the minimum.
    for (t, task) in tasks.iter().enumerate() {
        if task.min_people > 0 && eligibility.eligible_pool(t).len() == task.min_people as usize {
            add(&mut suspects, ConstraintFamily::Coverage);
            break;
        }
    }

    for (p, participant) in participants.iter().enumerate() {
        // Conflict pressure: even ignoring everything else, the most
        // non-overlapping eligible tasks this participant can hold
        // (greedy by end time per date, exact for intervals) is below
        // min_tasks.
        if config.min_tasks > 0 {
            let mut by_date: HashMap<chrono::NaiveDate, Vec<usize>> = HashMap::new();
            for &t in eligibility.eligible_tasks(p) {
                by_date.entry(tasks[t].date).or_default().push(t);
            }
            let mut capacity = 0u32;
            for day_tasks in by_date.values_mut() {
                day_tasks.sort_by_key(|&t| tasks[t].span.end);
                let mut last_end = None;
                for &t in day_tasks.iter() {
                    if last_end.is_none_or(|end| tasks[t].span.start >= end) {
                        capacity += 1;
                        last_end = Some(tasks[t].span.end);
                    }
                }
            }
            if capacity < config.min_tasks {
                add(&mut suspects, ConstraintFamily::Conflict);
                add(&mut suspects, ConstraintFamily::TaskCount);
            }
        }

        // Hour-cap pressure: the lightest admissible SNU load sits
        // near the cap.
        if participant.is_snu() && config.min_tasks > 0 {
            let mut minutes: Vec<u32> = eligibility
                .eligible_tasks(p)
                .iter()
                .map(|&t| tasks[t].duration_minutes())
                .collect();
            minutes.sort_unstable();
            let lightest: u32 = minutes.iter().take(config.min_tasks as usize).sum();
            if f64::from(lightest) > 0.8 * f64::from(config.snu_cap_minutes()) {
                add(&mut suspects, ConstraintFamily::HourCap);
            }
        }
    }

    // Aggregate pressure: little slack between total demand and total
    // assignment capacity.
    let demand: u64 = tasks.iter().map(|t| u64::from(t.min_people)).sum();
    let capacity = participants.len() as u64 * u64::from(config.max_tasks);
    if capacity > 0 && demand as f64 > 0.8 * capacity as f64 {
        add(&mut suspects, ConstraintFamily::Coverage);
        add(&mut suspects, ConstraintFamily::TaskCount);
    }

    suspects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssignmentModel;
    use crate::models::{Role, TimeSpan};
    use crate::solver::SolverOutcome;
    use chrono::NaiveDate;
    use std::cell::Cell;

    fn task(id: &str, day: u32, span: &str) -> Task {
        Task::new(
            id,
            NaiveDate::from_ymd_opt(2025, 10, day).unwrap(),
            TimeSpan::parse(span).unwrap(),
        )
    }

    fn relaxed_config() -> PlannerConfig {
        PlannerConfig {
            min_tasks: 0,
            ..PlannerConfig::default()
        }
    }

    /// Solver stub that must never be reached.
    struct UnreachableSolver;

    impl Solver for UnreachableSolver {
        fn solve(&self, _: &AssignmentModel, _: Duration) -> SolverOutcome {
            panic!("solver must not be invoked for structurally infeasible input");
        }
    }

    /// Solver stub with a scripted status sequence.
    struct ScriptedSolver {
        statuses: Vec<SolveStatus>,
        calls: Cell<usize>,
    }

    impl ScriptedSolver {
        fn new(statuses: Vec<SolveStatus>) -> Self {
            Self {
                statuses,
                calls: Cell::new(0),
            }
        }
    }

    impl Solver for ScriptedSolver {
        fn solve(&self, model: &AssignmentModel, _: Duration) -> SolverOutcome {
            let call = self.calls.get();
            self.calls.set(call + 1);
            let status = self.statuses[call.min(self.statuses.len() - 1)];
            match status {
                SolveStatus::Optimal | SolveStatus::Feasible => {
                    SolverOutcome::solved(status, vec![1.0; model.var_count()])
                }
                other => SolverOutcome::empty(other),
            }
        }
    }

    #[test]
    fn test_single_task_two_candidates_exactly_one_assigned() {
        let tasks = vec![task("T1", 10, "10H00-12H00").with_coverage(1, Some(1))];
        let participants = vec![
            Participant::new("Alice", "A", Role::Permanent),
            Participant::new("Bob", "B", Role::Permanent),
        ];
        let roster = Planner::new(tasks, participants, relaxed_config())
            .solve()
            .unwrap();

        assert_eq!(roster.len(), 1);
        assert_eq!(roster.task_assignees("T1").len(), 1);
        assert!(roster.proven_optimal);
    }

    #[test]
    fn test_exclusions_never_assigned() {
        let tasks = vec![
            task("SAT1", 11, "09H00-12H00"),
            task("SAT8", 11, "14H00-17H00"),
            task("SAT9", 11, "18H00-20H00"),
        ];
        let participants = vec![
            Participant::new("Minh-Hoang", "DANG", Role::Permanent)
                .with_exclusions(vec!["SAT1", "SAT8"]),
            Participant::new("Alice", "A", Role::Permanent),
        ];
        let roster = Planner::new(tasks, participants, relaxed_config())
            .solve()
            .unwrap();

        for a in roster.assignments_for("Minh-Hoang DANG") {
            assert!(a.task_id != "SAT1" && a.task_id != "SAT8");
        }
        // Excluded tasks still get covered by the other participant.
        assert_eq!(roster.task_assignees("SAT1"), vec!["Alice A"]);
        assert_eq!(roster.task_assignees("SAT8"), vec!["Alice A"]);
    }

    #[test]
    fn test_overlapping_tasks_split_between_participants() {
        let tasks = vec![
            task("T1", 10, "10H00-13H00"),
            task("T2", 10, "12H00-15H00"),
        ];
        let participants = vec![
            Participant::new("Alice", "A", Role::Permanent),
            Participant::new("Bob", "B", Role::Permanent),
        ];
        let roster = Planner::new(tasks, participants, relaxed_config())
            .solve()
            .unwrap();

        // Both tasks covered; nobody holds both.
        assert_eq!(roster.len(), 2);
        for name in ["Alice A", "Bob B"] {
            assert!(roster.assignments_for(name).len() <= 1);
        }
    }

    #[test]
    fn test_structural_infeasibility_skips_solver() {
        // min_people 2, but only one participant is eligible.
        let tasks = vec![task("T1", 10, "10H00-12H00").with_coverage(2, None)];
        let participants = vec![Participant::new("Alice", "A", Role::Permanent)];
        let err = Planner::new(tasks, participants, relaxed_config())
            .solve_with(&UnreachableSolver)
            .unwrap_err();

        assert!(matches!(err, PlanError::Infeasible(_)));
    }

    #[test]
    fn test_snu_forced_past_cap_is_structural() {
        // Only 9h tasks; min_tasks 3 forces 27h > 21h.
        let tasks = vec![
            task("T1", 10, "08H00-17H00"),
            task("T2", 11, "08H00-17H00"),
            task("T3", 12, "08H00-17H00"),
        ];
        let participants = vec![Participant::new("Sam", "S", Role::Snu)];
        let config = PlannerConfig {
            min_tasks: 3,
            ..PlannerConfig::default()
        };
        let err = Planner::new(tasks, participants, config)
            .solve_with(&UnreachableSolver)
            .unwrap_err();

        assert!(matches!(err, PlanError::Infeasible(_)));
    }

    #[test]
    fn test_validation_errors_reported_before_solving() {
        let tasks = vec![
            task("T1", 10, "10H00-12H00"),
            task("T1", 10, "14H00-16H00"),
        ];
        let participants = vec![Participant::new("Alice", "A", Role::Permanent)];
        let err = Planner::new(tasks, participants, relaxed_config())
            .solve_with(&UnreachableSolver)
            .unwrap_err();

        assert!(matches!(err, PlanError::Validation(_)));
    }

    #[test]
    fn test_timeout_retries_once_then_fails() {
        let tasks = vec![task("T1", 10, "10H00-12H00")];
        let participants = vec![Participant::new("Alice", "A", Role::Permanent)];
        let solver = ScriptedSolver::new(vec![SolveStatus::Unknown, SolveStatus::Unknown]);
        let err = Planner::new(tasks, participants, relaxed_config())
            .solve_with(&solver)
            .unwrap_err();

        assert_eq!(solver.calls.get(), 2);
        assert!(matches!(err, PlanError::SolverTimeout { .. }));
    }

    #[test]
    fn test_timeout_then_success_on_retry() {
        let tasks = vec![task("T1", 10, "10H00-12H00")];
        let participants = vec![Participant::new("Alice", "A", Role::Permanent)];
        let solver = ScriptedSolver::new(vec![SolveStatus::Unknown, SolveStatus::Optimal]);
        let roster = Planner::new(tasks, participants, relaxed_config())
            .solve_with(&solver)
            .unwrap();

        assert_eq!(solver.calls.get(), 2);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_retry_disabled_fails_immediately() {
        let tasks = vec![task("T1", 10, "10H00-12H00")];
        let participants = vec![Participant::new("Alice", "A", Role::Permanent)];
        let config = PlannerConfig {
            min_tasks: 0,
            solver: crate::config::SolverBudget {
                time_budget_secs: 1.0,
                retry_time_budget_secs: None,
            },
            ..PlannerConfig::default()
        };
        let solver = ScriptedSolver::new(vec![SolveStatus::Unknown]);
        let err = Planner::new(tasks, participants, config)
            .solve_with(&solver)
            .unwrap_err();

        assert_eq!(solver.calls.get(), 1);
        assert!(matches!(err, PlanError::SolverTimeout { .. }));
    }

    #[test]
    fn test_feasible_solution_not_proven_optimal() {
        let tasks = vec![task("T1", 10, "10H00-12H00")];
        let participants = vec![Participant::new("Alice", "A", Role::Permanent)];
        let solver = ScriptedSolver::new(vec![SolveStatus::Feasible]);
        let roster = Planner::new(tasks, participants, relaxed_config())
            .solve_with(&solver)
            .unwrap();

        assert!(!roster.proven_optimal);
    }

    #[test]
    fn test_solver_infeasibility_diagnosed() {
        // One participant must take two overlapping tasks: the
        // pre-solve gate cannot see it, the solver proves it, and the
        // diagnostic points at conflict/task-count pressure.
        let tasks = vec![
            task("T1", 10, "10H00-13H00"),
            task("T2", 10, "11H00-14H00"),
        ];
        let participants = vec![Participant::new("Alice", "A", Role::Permanent)];
        let config = PlannerConfig {
            min_tasks: 2,
            ..PlannerConfig::default()
        };
        let err = Planner::new(tasks, participants, config).solve().unwrap_err();

        match err {
            PlanError::SolverInfeasible { suspects } => {
                assert!(suspects.contains(&ConstraintFamily::Conflict));
                assert!(suspects.contains(&ConstraintFamily::TaskCount));
            }
            other => panic!("expected SolverInfeasible, got {other:?}"),
        }
    }

    #[test]
    fn test_pins_are_honored() {
        let tasks = vec![task("T1", 10, "10H00-12H00").with_coverage(1, Some(1))];
        let participants = vec![
            Participant::new("Alice", "A", Role::Permanent),
            Participant::new("Bob", "B", Role::Permanent),
        ];
        let pins = vec![PinnedAssignment {
            participant: "Bob B".into(),
            task_id: "T1".into(),
        }];
        let roster = Planner::new(tasks, participants, relaxed_config())
            .with_pins(pins)
            .solve()
            .unwrap();

        assert_eq!(roster.task_assignees("T1"), vec!["Bob B"]);
    }

    #[test]
    fn test_determinism_across_runs() {
        let make = || {
            let tasks = vec![
                task("FRI1", 10, "16H00-19H00"),
                task("SAT1", 11, "09H00-12H00"),
                task("SAT2", 11, "10H00-13H00"),
                task("SUN1", 12, "09H00-11H00"),
            ];
            let participants = vec![
                Participant::new("Alice", "A", Role::Permanent),
                Participant::new("Bob", "B", Role::NonPermanent),
                Participant::new("Sam", "S", Role::Snu).with_exclusion("SUN1"),
            ];
            Planner::new(tasks, participants, relaxed_config())
        };

        let first = make().solve().unwrap();
        let second = make().solve().unwrap();

        let rows = |r: &Roster| {
            r.assignments
                .iter()
                .map(|a| (a.participant.clone(), a.task_id.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(rows(&first), rows(&second));
    }

    #[test]
    fn test_workload_balance_spreads_tasks() {
        // Four disjoint tasks, two identical participants: a balanced
        // optimum gives two tasks each.
        let tasks = vec![
            task("T1", 10, "08H00-10H00"),
            task("T2", 10, "11H00-13H00"),
            task("T3", 10, "14H00-16H00"),
            task("T4", 10, "17H00-19H00"),
        ];
        let participants = vec![
            Participant::new("Alice", "A", Role::Permanent),
            Participant::new("Bob", "B", Role::Permanent),
        ];
        let roster = Planner::new(tasks, participants, relaxed_config())
            .solve()
            .unwrap();

        assert_eq!(roster.assignments_for("Alice A").len(), 2);
        assert_eq!(roster.assignments_for("Bob B").len(), 2);
    }

    #[test]
    fn test_critical_task_prefers_permanent_staff() {
        let tasks = vec![task("CASH", 10, "10H00-12H00").with_coverage(1, Some(1))];
        let participants = vec![
            Participant::new("Nina", "N", Role::NonPermanent),
            Participant::new("Paula", "P", Role::Permanent),
        ];
        let config = PlannerConfig {
            min_tasks: 0,
            critical_task_ids: ["CASH".to_string()].into(),
            ..PlannerConfig::default()
        };
        let roster = Planner::new(tasks, participants, config).solve().unwrap();

        assert_eq!(roster.task_assignees("CASH"), vec!["Paula P"]);
    }
}
