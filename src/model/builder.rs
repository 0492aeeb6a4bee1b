//! Model builder.
//!
//! Materializes the optimization model from the domain inputs: one
//! binary variable per *eligible* (participant, task) pair, then the
//! hard constraint families. Ineligible pairs get no variable at all;
//! they are structurally impossible rather than constrained to false,
//! which keeps the search space and the constraint count down.
//!
//! Variable creation is participant-major in ascending task order, so
//! identical inputs always produce an identical model.

use tracing::debug;

use crate::config::PlannerConfig;
use crate::conflict::ConflictTable;
use crate::eligibility::EligibilityMap;
use crate::models::{Participant, Task};

use super::{AssignmentModel, ConstraintFamily, LinearConstraint, LinearExpr};

/// Builds an [`AssignmentModel`] from validated inputs.
pub struct ModelBuilder<'a> {
    tasks: &'a [Task],
    participants: &'a [Participant],
    conflicts: &'a ConflictTable,
    eligibility: &'a EligibilityMap,
    config: &'a PlannerConfig,
    pins: Vec<(usize, usize)>,
}

impl<'a> ModelBuilder<'a> {
    /// Creates a builder over validated inputs.
    pub fn new(
        tasks: &'a [Task],
        participants: &'a [Participant],
        conflicts: &'a ConflictTable,
        eligibility: &'a EligibilityMap,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            tasks,
            participants,
            conflicts,
            eligibility,
            config,
            pins: Vec::new(),
        }
    }

    /// Adds pre-seeded assignments forced into the solution.
    ///
    /// Pins are resolved `(participant_idx, task_idx)` pairs and must
    /// reference eligible pairs (guaranteed by validation).
    pub fn with_pins(mut self, pins: Vec<(usize, usize)>) -> Self {
        self.pins = pins;
        self
    }

    /// Builds decision variables and all hard constraints.
    ///
    /// The objective is composed separately by
    /// [`super::compose_objective`].
    pub fn build(&self) -> AssignmentModel {
        let mut model = AssignmentModel::new();

        self.add_pair_variables(&mut model);
        self.add_coverage_constraints(&mut model);
        self.add_conflict_constraints(&mut model);
        self.add_hour_cap_constraints(&mut model);
        self.add_task_count_constraints(&mut model);
        self.add_pin_constraints(&mut model);

        debug!(
            variables = model.var_count(),
            constraints = model.constraint_count(),
            pairs = model.pairs().len(),
            "assignment model built"
        );
        model
    }

    fn add_pair_variables(&self, model: &mut AssignmentModel) {
        for p in 0..self.participants.len() {
            for &t in self.eligibility.eligible_tasks(p) {
                model.add_pair(p, t);
            }
        }
    }

    /// Per task: `min_people <= sum of assignable pairs <= max_people`.
    fn add_coverage_constraints(&self, model: &mut AssignmentModel) {
        for (t, task) in self.tasks.iter().enumerate() {
            let mut expr = LinearExpr::new();
            for p in 0..self.participants.len() {
                if let Some(var) = model.pair_var(p, t) {
                    expr.add_term(var, 1.0);
                }
            }
            if expr.is_empty() {
                // No eligible pool; the feasibility gate reports this
                // when min_people > 0.
                continue;
            }
            if task.min_people > 0 {
                model.add_constraint(LinearConstraint::geq(
                    format!("coverage_min[{}]", task.id),
                    ConstraintFamily::Coverage,
                    expr.clone(),
                    f64::from(task.min_people),
                ));
            }
            if let Some(max) = task.max_people {
                model.add_constraint(LinearConstraint::leq(
                    format!("coverage_max[{}]", task.id),
                    ConstraintFamily::Coverage,
                    expr,
                    f64::from(max),
                ));
            }
        }
    }

    /// Per participant and conflicting eligible task pair:
    /// `x[p,t1] + x[p,t2] <= 1`.
    fn add_conflict_constraints(&self, model: &mut AssignmentModel) {
        for (p, participant) in self.participants.iter().enumerate() {
            for &(t1, t2) in self.conflicts.conflicting_pairs() {
                let (Some(v1), Some(v2)) = (model.pair_var(p, t1), model.pair_var(p, t2))
                else {
                    continue;
                };
                model.add_constraint(LinearConstraint::leq(
                    format!(
                        "conflict[{}:{},{}]",
                        participant.name(),
                        self.tasks[t1].id,
                        self.tasks[t2].id
                    ),
                    ConstraintFamily::Conflict,
                    LinearExpr::new().with_term(v1, 1.0).with_term(v2, 1.0),
                    1.0,
                ));
            }
        }
    }

    /// SNU participants: total assigned minutes within the cap, plus
    /// the optional per-day cap.
    fn add_hour_cap_constraints(&self, model: &mut AssignmentModel) {
        for (p, participant) in self.participants.iter().enumerate() {
            if !participant.is_snu() {
                continue;
            }

            let mut total = LinearExpr::new();
            for &t in self.eligibility.eligible_tasks(p) {
                if let Some(var) = model.pair_var(p, t) {
                    total.add_term(var, f64::from(self.tasks[t].duration_minutes()));
                }
            }
            if !total.is_empty() {
                model.add_constraint(LinearConstraint::leq(
                    format!("hour_cap[{}]", participant.name()),
                    ConstraintFamily::HourCap,
                    total,
                    f64::from(self.config.snu_cap_minutes()),
                ));
            }

            let Some(daily_cap) = self.config.snu_daily_cap_minutes() else {
                continue;
            };
            let mut dates: Vec<_> = self
                .eligibility
                .eligible_tasks(p)
                .iter()
                .map(|&t| self.tasks[t].date)
                .collect();
            dates.sort_unstable();
            dates.dedup();
            for date in dates {
                let mut daily = LinearExpr::new();
                for &t in self.eligibility.eligible_tasks(p) {
                    if self.tasks[t].date != date {
                        continue;
                    }
                    if let Some(var) = model.pair_var(p, t) {
                        daily.add_term(var, f64::from(self.tasks[t].duration_minutes()));
                    }
                }
                if !daily.is_empty() {
                    model.add_constraint(LinearConstraint::leq(
                        format!("daily_cap[{}:{}]", participant.name(), date),
                        ConstraintFamily::HourCap,
                        daily,
                        f64::from(daily_cap),
                    ));
                }
            }
        }
    }

    /// Per participant: `min_tasks <= sum of their pairs <= max_tasks`.
    fn add_task_count_constraints(&self, model: &mut AssignmentModel) {
        for (p, participant) in self.participants.iter().enumerate() {
            let mut expr = LinearExpr::new();
            for &t in self.eligibility.eligible_tasks(p) {
                if let Some(var) = model.pair_var(p, t) {
                    expr.add_term(var, 1.0);
                }
            }
            if expr.is_empty() {
                continue;
            }
            if self.config.min_tasks > 0 {
                model.add_constraint(LinearConstraint::geq(
                    format!("task_count_min[{}]", participant.name()),
                    ConstraintFamily::TaskCount,
                    expr.clone(),
                    f64::from(self.config.min_tasks),
                ));
            }
            model.add_constraint(LinearConstraint::leq(
                format!("task_count_max[{}]", participant.name()),
                ConstraintFamily::TaskCount,
                expr,
                f64::from(self.config.max_tasks),
            ));
        }
    }

    /// Pinned pairs are forced on.
    fn add_pin_constraints(&self, model: &mut AssignmentModel) {
        for &(p, t) in &self.pins {
            if let Some(var) = model.pair_var(p, t) {
                model.add_constraint(LinearConstraint::eq(
                    format!("pinned[{}:{}]", self.participants[p].name(), self.tasks[t].id),
                    ConstraintFamily::Pinned,
                    LinearExpr::new().with_term(var, 1.0),
                    1.0,
                ));
            }
        }
    }
}
