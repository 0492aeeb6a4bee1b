//! Objective composition.
//!
//! Builds the single linear minimization objective from two weighted
//! terms:
//!
//! - **Workload balance**: each participant's absolute deviation from
//!   the mean task count, linearized with paired non-negative
//!   excess/deficit slacks (absolute value is not directly linear).
//! - **Role priority**: a shortfall penalty for each critical task not
//!   covered by at least one permanent participant: a nudge, not a
//!   hard constraint.

use tracing::warn;

use crate::config::PlannerConfig;
use crate::models::{Participant, Role, Task};

use super::{AssignmentModel, ConstraintFamily, LinearConstraint, LinearExpr};

/// Adds the fairness/priority auxiliaries and objective terms.
///
/// For participant `p` with load `L_p = Σ_t x[p,t]` and `n`
/// participants, the balance slacks satisfy
/// `n·L_p − Σ_q L_q = n·(excess_p − deficit_p)`, so
/// `excess_p + deficit_p >= |L_p − mean|` at optimum. Scaling by `n`
/// keeps every constraint coefficient integral.
pub fn compose_objective(
    model: &mut AssignmentModel,
    tasks: &[Task],
    participants: &[Participant],
    config: &PlannerConfig,
) {
    let n = participants.len();
    if n == 0 {
        return;
    }

    // Workload-balance term.
    let nf = n as f64;
    for p in 0..n {
        let excess = model.add_non_negative(format!("excess_{p}"));
        let deficit = model.add_non_negative(format!("deficit_{p}"));

        let mut link = LinearExpr::new();
        for pair in model.pairs() {
            // n·L_p gets +n per own pair; −Σ_q L_q gets −1 per pair.
            if pair.participant == p {
                link.add_term(pair.var, nf - 1.0);
            } else {
                link.add_term(pair.var, -1.0);
            }
        }
        link.add_term(excess, -nf);
        link.add_term(deficit, nf);

        model.add_constraint(LinearConstraint::eq(
            format!("balance[{}]", participants[p].name()),
            ConstraintFamily::Balance,
            link,
            0.0,
        ));
        model.add_objective_term(excess, config.workload_weight);
        model.add_objective_term(deficit, config.workload_weight);
    }

    // Role-priority term for critical tasks.
    for critical_id in &config.critical_task_ids {
        let Some(t) = tasks.iter().position(|task| &task.id == critical_id) else {
            warn!(task_id = %critical_id, "critical task not present in this run");
            continue;
        };

        let mut permanent_cover = LinearExpr::new();
        for (p, participant) in participants.iter().enumerate() {
            if participant.role == Role::Permanent {
                if let Some(var) = model.pair_var(p, t) {
                    permanent_cover.add_term(var, 1.0);
                }
            }
        }

        let shortfall = model.add_non_negative(format!("shortfall_{critical_id}"));
        permanent_cover.add_term(shortfall, 1.0);
        model.add_constraint(LinearConstraint::geq(
            format!("priority[{critical_id}]"),
            ConstraintFamily::Priority,
            permanent_cover,
            1.0,
        ));
        model.add_objective_term(shortfall, config.priority_weight);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictTable;
    use crate::eligibility::EligibilityMap;
    use crate::model::ModelBuilder;
    use crate::models::TimeSpan;
    use chrono::NaiveDate;

    fn task(id: &str, span: &str) -> Task {
        Task::new(
            id,
            NaiveDate::from_ymd_opt(2025, 10, 10).unwrap(),
            TimeSpan::parse(span).unwrap(),
        )
    }

    fn compose(
        tasks: &[Task],
        participants: &[Participant],
        config: &PlannerConfig,
    ) -> AssignmentModel {
        let conflicts = ConflictTable::build(tasks);
        let eligibility = EligibilityMap::build(participants, tasks);
        let mut model =
            ModelBuilder::new(tasks, participants, &conflicts, &eligibility, config).build();
        compose_objective(&mut model, tasks, participants, config);
        model
    }

    #[test]
    fn test_balance_slacks_per_participant() {
        let tasks = vec![task("T1", "10H00-12H00"), task("T2", "14H00-16H00")];
        let participants = vec![
            Participant::new("Alice", "A", Role::Permanent),
            Participant::new("Bob", "B", Role::NonPermanent),
        ];
        let config = PlannerConfig {
            min_tasks: 0,
            ..PlannerConfig::default()
        };
        let model = compose(&tasks, &participants, &config);

        assert_eq!(model.constraint_count_for(ConstraintFamily::Balance), 2);
        // 4 pair vars + 2 slacks per participant.
        assert_eq!(model.var_count(), 4 + 4);
        // Each slack carries the workload weight.
        assert_eq!(model.objective().terms.len(), 4);
        assert!(model
            .objective()
            .terms
            .iter()
            .all(|(_, c)| (*c - config.workload_weight).abs() < 1e-10));
    }

    #[test]
    fn test_balance_link_holds_for_solution() {
        // Alice takes both tasks, Bob none: loads 2 and 0, mean 1.
        let tasks = vec![task("T1", "10H00-12H00"), task("T2", "14H00-16H00")];
        let participants = vec![
            Participant::new("Alice", "A", Role::Permanent),
            Participant::new("Bob", "B", Role::NonPermanent),
        ];
        let config = PlannerConfig {
            min_tasks: 0,
            ..PlannerConfig::default()
        };
        let model = compose(&tasks, &participants, &config);

        let mut values = vec![0.0; model.var_count()];
        values[model.pair_var(0, 0).unwrap().0] = 1.0;
        values[model.pair_var(0, 1).unwrap().0] = 1.0;
        // Alice deviates +1 from the mean, Bob −1.
        let excess_alice = model
            .vars()
            .iter()
            .position(|v| v.name == "excess_0")
            .unwrap();
        let deficit_bob = model
            .vars()
            .iter()
            .position(|v| v.name == "deficit_1")
            .unwrap();
        values[excess_alice] = 1.0;
        values[deficit_bob] = 1.0;

        for c in model.constraints() {
            if c.family == ConstraintFamily::Balance {
                assert!(
                    c.expr.value(&values).abs() < 1e-9,
                    "balance link '{}' not satisfied",
                    c.label
                );
            }
        }
        // Total deviation penalty: |+1| + |−1| = 2 × weight.
        assert!((model.objective().value(&values) - 2.0 * config.workload_weight).abs() < 1e-9);
    }

    #[test]
    fn test_critical_task_shortfall() {
        let tasks = vec![task("T1", "10H00-12H00")];
        let participants = vec![
            Participant::new("Alice", "A", Role::Permanent),
            Participant::new("Bob", "B", Role::NonPermanent),
        ];
        let config = PlannerConfig {
            min_tasks: 0,
            critical_task_ids: ["T1".to_string()].into(),
            priority_weight: 5.0,
            ..PlannerConfig::default()
        };
        let model = compose(&tasks, &participants, &config);

        assert_eq!(model.constraint_count_for(ConstraintFamily::Priority), 1);
        let priority = model
            .constraints()
            .iter()
            .find(|c| c.family == ConstraintFamily::Priority)
            .unwrap();
        // Only Alice (permanent) plus the shortfall slack appear.
        assert_eq!(priority.expr.terms.len(), 2);

        // Permanent coverage satisfies the link with zero shortfall.
        let mut values = vec![0.0; model.var_count()];
        values[model.pair_var(0, 0).unwrap().0] = 1.0;
        assert!(priority.expr.value(&values) >= 1.0 - 1e-9);

        // Non-permanent coverage needs shortfall 1 → weighted penalty.
        let shortfall = model
            .vars()
            .iter()
            .position(|v| v.name == "shortfall_T1")
            .unwrap();
        let mut values = vec![0.0; model.var_count()];
        values[model.pair_var(1, 0).unwrap().0] = 1.0;
        values[shortfall] = 1.0;
        assert!(priority.expr.value(&values) >= 1.0 - 1e-9);
        assert!((model.objective().value(&values) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_critical_task_skipped() {
        let tasks = vec![task("T1", "10H00-12H00")];
        let participants = vec![Participant::new("Alice", "A", Role::Permanent)];
        let config = PlannerConfig {
            min_tasks: 0,
            critical_task_ids: ["GHOST".to_string()].into(),
            ..PlannerConfig::default()
        };
        let model = compose(&tasks, &participants, &config);

        assert_eq!(model.constraint_count_for(ConstraintFamily::Priority), 0);
    }

    #[test]
    fn test_no_participants_is_noop() {
        let tasks = vec![task("T1", "10H00-12H00")];
        let mut model = AssignmentModel::new();
        compose_objective(&mut model, &tasks, &[], &PlannerConfig::default());
        assert_eq!(model.var_count(), 0);
        assert!(model.objective().is_empty());
    }
}
