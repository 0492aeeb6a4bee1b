//! MILP adapter over `good_lp`.
//!
//! Translates the model IR into a `good_lp` problem and solves it with
//! the crate's bundled backend (`default_solver`). The solve runs on a
//! worker thread and the adapter waits at most the time budget, so the
//! call can never block indefinitely regardless of backend behavior.

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError,
    Solution, SolverModel, Variable,
};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::model::{AssignmentModel, LinearExpr, Sense, VarKind};

use super::{SolveStatus, Solver, SolverOutcome};

/// Mixed-integer solver backed by `good_lp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MilpSolver;

impl MilpSolver {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl Solver for MilpSolver {
    fn solve(&self, model: &AssignmentModel, budget: Duration) -> SolverOutcome {
        let (tx, rx) = mpsc::channel();
        let model = model.clone();
        thread::spawn(move || {
            // The receiver may have given up on us; ignore send errors.
            let _ = tx.send(solve_once(&model));
        });

        match rx.recv_timeout(budget) {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    budget_secs = budget.as_secs_f64(),
                    "solver exceeded its time budget"
                );
                SolverOutcome::empty(SolveStatus::Unknown)
            }
        }
    }
}

/// One blocking solve of the translated problem.
fn solve_once(model: &AssignmentModel) -> SolverOutcome {
    let mut vars = ProblemVariables::new();
    let handles: Vec<Variable> = model
        .vars()
        .iter()
        .map(|v| {
            let def = match v.kind {
                VarKind::Binary => variable().binary(),
                VarKind::NonNegative => variable().min(0.0),
            };
            vars.add(def.name(v.name.clone()))
        })
        .collect();

    let objective = to_expression(model.objective(), &handles);
    let mut problem = vars.minimise(objective).using(default_solver);
    for c in model.constraints() {
        let lhs = to_expression(&c.expr, &handles);
        let bound = match c.sense {
            Sense::Leq => constraint::leq(lhs, c.rhs),
            Sense::Geq => constraint::geq(lhs, c.rhs),
            Sense::Eq => constraint::eq(lhs, c.rhs),
        };
        problem = problem.with(bound);
    }

    match problem.solve() {
        Ok(solution) => {
            let values = handles.iter().map(|&h| solution.value(h)).collect();
            debug!(variables = model.var_count(), "solver proved optimality");
            SolverOutcome::solved(SolveStatus::Optimal, values)
        }
        Err(ResolutionError::Infeasible) => SolverOutcome::empty(SolveStatus::Infeasible),
        Err(other) => {
            warn!(error = %other, "solver gave no usable result");
            SolverOutcome::empty(SolveStatus::Unknown)
        }
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::from(expr.constant);
    for &(var, coeff) in &expr.terms {
        out += coeff * handles[var.0];
    }
    out
}
